//! Tail hold for the local transmit line.
//!
//! When the state machine stops asking for the local transmitter, the line
//! is kept keyed for a grace period before it is dropped. This smooths over
//! the one-cycle gaps at state boundaries (relay -> waiting -> relay) that
//! would otherwise make the transmitter chatter.
//!
//! Keying is never delayed, only unkeying.

use std::time::{Duration, Instant};

/// Default hold time after the local transmit intent drops.
pub const DEFAULT_TAIL_HOLD: Duration = Duration::from_millis(1000);

/// Minimum-hold timer for a single transmit line.
///
/// The timer tracks what it last told the caller to drive. A hold window is
/// only armed while the line is still keyed; once the line has been dropped
/// it stays low until the intent comes back.
#[derive(Debug, Clone)]
pub struct TailHold {
    /// How long the line stays keyed after the intent drops.
    hold: Duration,
    /// First sample of the current run of `false` intents.
    pending_off_since: Option<Instant>,
    /// Whether the line was reported keyed on the last call.
    asserted: bool,
}

impl TailHold {
    /// Create a timer for a line that is currently unkeyed.
    pub fn new(hold: Duration) -> Self {
        Self {
            hold,
            pending_off_since: None,
            asserted: false,
        }
    }

    /// Physical value to drive for this cycle's intent.
    ///
    /// - `true` intent keys immediately and cancels any pending hold.
    /// - `false` intent on a keyed line starts the hold window at `now`, or
    ///   keeps holding until `hold` has elapsed since the window started.
    /// - `false` intent on an unkeyed line does nothing.
    pub fn apply(&mut self, intent: bool, now: Instant) -> bool {
        if intent {
            self.pending_off_since = None;
            self.asserted = true;
            return true;
        }

        if !self.asserted {
            return false;
        }

        match self.pending_off_since {
            None => {
                self.pending_off_since = Some(now);
                true
            }
            Some(since) if now.saturating_duration_since(since) < self.hold => true,
            Some(_) => {
                self.pending_off_since = None;
                self.asserted = false;
                false
            }
        }
    }

    /// Drop the line immediately, discarding any pending hold.
    pub fn release(&mut self) {
        self.pending_off_since = None;
        self.asserted = false;
    }

    /// Start of the running hold window, if any.
    pub fn pending_off_since(&self) -> Option<Instant> {
        self.pending_off_since
    }

    /// Whether the line is currently held keyed after its intent dropped.
    pub fn is_holding(&self) -> bool {
        self.pending_off_since.is_some()
    }

    /// Whether the line was reported keyed on the last call.
    pub fn is_asserted(&self) -> bool {
        self.asserted
    }

    /// Configured hold time.
    pub fn hold(&self) -> Duration {
        self.hold
    }
}

impl Default for TailHold {
    fn default() -> Self {
        Self::new(DEFAULT_TAIL_HOLD)
    }
}
