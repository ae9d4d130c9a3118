//! Console status line.
//!
//! One line per control cycle showing what each side is doing:
//!
//! ```text
//!   12.300s | Local: >RX< >TX< - Remote:  rx   tx  - Beacon:  bc  - State: Relaying local signal
//! ```

use crate::control::Cycle;
use std::time::Instant;

/// Formats the per-cycle status line.
#[derive(Debug, Clone, Copy)]
pub struct StatusLine {
    started: Instant,
}

impl StatusLine {
    /// Create a status line with uptime measured from `started`.
    pub fn new(started: Instant) -> Self {
        Self { started }
    }

    /// Render the line for one cycle.
    pub fn format(&self, now: Instant, cycle: &Cycle) -> String {
        let uptime = now.saturating_duration_since(self.started).as_secs_f64();
        format!(
            "{:>8.3}s | Local: {} {} - Remote: {} {} - Beacon: {} - State: {}",
            uptime,
            rx_marker(cycle.rx.local),
            tx_marker(cycle.local_tx),
            rx_marker(cycle.rx.remote),
            tx_marker(cycle.remote_tx),
            if cycle.beacon_due { " BC " } else { " bc " },
            cycle.state,
        )
    }

    /// Print the line for one cycle to stdout.
    pub fn print(&self, now: Instant, cycle: &Cycle) {
        println!("{}", self.format(now, cycle));
    }
}

fn rx_marker(active: bool) -> &'static str {
    if active {
        ">RX<"
    } else {
        " rx "
    }
}

fn tx_marker(keyed: bool) -> &'static str {
    if keyed {
        ">TX<"
    } else {
        " tx "
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repeater_core::{ReceiveSnapshot, RepeaterState, TransmitIntent};
    use std::time::Duration;

    fn cycle(state: RepeaterState, rx: ReceiveSnapshot, local_tx: bool, remote_tx: bool) -> Cycle {
        Cycle {
            rx,
            previous: state,
            state,
            intent: state.outputs(),
            local_tx,
            remote_tx,
            beacon_due: false,
            beacon_entered: false,
        }
    }

    #[test]
    fn relaying_local() {
        let started = Instant::now();
        let line = StatusLine::new(started);
        let c = cycle(
            RepeaterState::RelayLocal,
            ReceiveSnapshot::new(true, false),
            true,
            true,
        );

        assert_eq!(
            line.format(started + Duration::from_millis(12_300), &c),
            "  12.300s | Local: >RX< >TX< - Remote:  rx  >TX< - Beacon:  bc  - State: Relaying local signal"
        );
    }

    #[test]
    fn waiting_with_beacon_due() {
        let started = Instant::now();
        let line = StatusLine::new(started);
        let mut c = cycle(RepeaterState::Waiting, ReceiveSnapshot::IDLE, false, false);
        c.beacon_due = true;
        c.intent = TransmitIntent::QUIET;

        assert_eq!(
            line.format(started, &c),
            "   0.000s | Local:  rx   tx  - Remote:  rx   tx  - Beacon:  BC  - State: Waiting"
        );
    }
}
