//! The `beacon_due` flag.
//!
//! This is the only piece of state shared between the control loop and the
//! beacon timers. The timers set and clear it; the state machine reads it
//! once per cycle and "consumes" it only by leaving `Beacon` after the
//! duration timer has cleared it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable handle to the shared beacon flag.
///
/// All clones observe the same flag. Reads use `Acquire` and writes use
/// `Release` so a timer's store is visible to the next control cycle.
#[derive(Debug, Clone, Default)]
pub struct BeaconSignal {
    due: Arc<AtomicBool>,
}

impl BeaconSignal {
    /// Create a flag that is not due.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a beacon is currently due.
    pub fn is_due(&self) -> bool {
        self.due.load(Ordering::Acquire)
    }

    /// Mark a beacon as due (period timer elapsed).
    pub fn raise(&self) {
        self.due.store(true, Ordering::Release);
    }

    /// Clear the flag (beacon duration elapsed).
    pub fn clear(&self) {
        self.due.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_not_due() {
        assert!(!BeaconSignal::new().is_due());
    }

    #[test]
    fn raise_and_clear() {
        let signal = BeaconSignal::new();
        signal.raise();
        assert!(signal.is_due());
        signal.raise();
        assert!(signal.is_due());
        signal.clear();
        assert!(!signal.is_due());
    }

    #[test]
    fn clones_share_the_flag() {
        let loop_side = BeaconSignal::new();
        let timer_side = loop_side.clone();

        timer_side.raise();
        assert!(loop_side.is_due());

        loop_side.clear();
        assert!(!timer_side.is_due());
    }

    #[test]
    fn visible_across_threads() {
        let signal = BeaconSignal::new();
        let writer = signal.clone();

        std::thread::spawn(move || writer.raise())
            .join()
            .expect("writer thread panicked");

        assert!(signal.is_due());
    }
}
