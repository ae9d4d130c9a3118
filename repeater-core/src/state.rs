//! Repeater state machine.
//!
//! This module decides what the repeater transmits. It is a pure,
//! side-effect-free state machine: the control loop feeds it the current
//! receive snapshot and the beacon flag once per cycle and gets back the next
//! state, from which the transmit intents are derived.
//!
//! Pin I/O, timers and the tail hold on the local transmitter are handled by
//! the caller, not by this module.

use std::fmt;

/// Repeater state machine - NO I/O, just state transitions.
///
/// `Off` and `Deinit` are kept as defined states but nothing in the
/// transition table leads into them. They exist so a future shutdown
/// sequence has somewhere to go; today the controller starts in `Off`,
/// is moved to `Init` by the control loop and never returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RepeaterState {
    /// Controller not running.
    #[default]
    Off,
    /// Lines configured, first cycle not yet evaluated.
    Init,
    /// Idle, listening on both receivers.
    Waiting,
    /// Local receiver active; repeating it out of both transmitters.
    RelayLocal,
    /// Remote receiver active; repeating it out of the local transmitter.
    RelayRemote,
    /// Beacon interval elapsed; keying the local transmitter.
    Beacon,
    /// Shutting down. Not reachable from the modeled transitions.
    Deinit,
}

/// Receive activity sampled at the start of a cycle.
///
/// Values are already converted to "active" using the configured input
/// polarity; `true` means the receiver hears a carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReceiveSnapshot {
    /// Local receiver carrier detect.
    pub local: bool,
    /// Remote receiver carrier detect.
    pub remote: bool,
}

impl ReceiveSnapshot {
    /// Snapshot with both receivers idle.
    pub const IDLE: Self = Self {
        local: false,
        remote: false,
    };

    /// Create a snapshot from the two receive flags.
    pub const fn new(local: bool, remote: bool) -> Self {
        Self { local, remote }
    }
}

/// Logical transmit intents for one cycle.
///
/// The local intent still goes through the tail hold before it reaches the
/// pin; the remote intent is written as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransmitIntent {
    /// Key the local transmitter.
    pub local: bool,
    /// Key the remote transmitter.
    pub remote: bool,
}

impl TransmitIntent {
    /// Both transmitters unkeyed.
    pub const QUIET: Self = Self {
        local: false,
        remote: false,
    };

    /// Create an intent from the two transmit flags.
    pub const fn new(local: bool, remote: bool) -> Self {
        Self { local, remote }
    }
}

impl RepeaterState {
    /// Every state, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Off,
        Self::Init,
        Self::Waiting,
        Self::RelayLocal,
        Self::RelayRemote,
        Self::Beacon,
        Self::Deinit,
    ];

    /// Compute the next state for one control cycle.
    ///
    /// This is a pure function. In `Waiting` the beacon wins over both
    /// receivers and the local receiver wins over the remote one. A relay
    /// state is held for as long as its own receiver stays active, so a
    /// beacon that comes due mid-relay waits for the relay to finish.
    pub fn advance(self, rx: ReceiveSnapshot, beacon_due: bool) -> Self {
        match self {
            Self::Off => Self::Off,
            Self::Init => Self::Waiting,
            Self::Waiting => {
                if beacon_due {
                    Self::Beacon
                } else if rx.local {
                    Self::RelayLocal
                } else if rx.remote {
                    Self::RelayRemote
                } else {
                    Self::Waiting
                }
            }
            Self::RelayLocal if !rx.local => Self::Waiting,
            Self::RelayLocal => Self::RelayLocal,
            Self::RelayRemote if !rx.remote => Self::Waiting,
            Self::RelayRemote => Self::RelayRemote,
            Self::Beacon if !beacon_due => Self::Waiting,
            Self::Beacon => Self::Beacon,
            Self::Deinit => Self::Off,
        }
    }

    /// Transmit intents for this state.
    ///
    /// Local traffic is cross-repeated out of both transmitters. Remote
    /// traffic and the beacon only key the local transmitter; the remote
    /// transmitter carries nothing but locally received audio.
    pub fn outputs(self) -> TransmitIntent {
        match self {
            Self::Off | Self::Init | Self::Waiting | Self::Deinit => TransmitIntent::QUIET,
            Self::RelayLocal => TransmitIntent::new(true, true),
            Self::RelayRemote => TransmitIntent::new(true, false),
            Self::Beacon => TransmitIntent::new(true, false),
        }
    }

    /// True when a cycle moved the machine into `Beacon`.
    ///
    /// The control loop starts the beacon duration timer on this edge.
    pub fn entered_beacon(previous: Self, next: Self) -> bool {
        previous != Self::Beacon && next == Self::Beacon
    }

    /// Check if the repeater is currently keying any transmitter.
    pub fn is_transmitting(&self) -> bool {
        let intent = self.outputs();
        intent.local || intent.remote
    }

    /// Human-readable label used by the status line.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::Init => "Initialization",
            Self::Waiting => "Waiting",
            Self::RelayLocal => "Relaying local signal",
            Self::RelayRemote => "Relaying remote signal",
            Self::Beacon => "Sending beacon",
            Self::Deinit => "Deinitialization",
        }
    }
}

impl fmt::Display for RepeaterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCAL: ReceiveSnapshot = ReceiveSnapshot::new(true, false);
    const REMOTE: ReceiveSnapshot = ReceiveSnapshot::new(false, true);
    const BOTH: ReceiveSnapshot = ReceiveSnapshot::new(true, true);
    const IDLE: ReceiveSnapshot = ReceiveSnapshot::IDLE;

    fn all_snapshots() -> [ReceiveSnapshot; 4] {
        [IDLE, LOCAL, REMOTE, BOTH]
    }

    /// Reference table, written out independently of `advance`.
    fn expected_next(state: RepeaterState, rx: ReceiveSnapshot, beacon_due: bool) -> RepeaterState {
        use RepeaterState::*;
        match (state, rx.local, rx.remote, beacon_due) {
            (Init, _, _, _) => Waiting,
            (Waiting, _, _, true) => Beacon,
            (Waiting, true, _, false) => RelayLocal,
            (Waiting, false, true, false) => RelayRemote,
            (Waiting, false, false, false) => Waiting,
            (RelayLocal, false, _, _) => Waiting,
            (RelayLocal, true, _, _) => RelayLocal,
            (RelayRemote, _, false, _) => Waiting,
            (RelayRemote, _, true, _) => RelayRemote,
            (Beacon, _, _, false) => Waiting,
            (Beacon, _, _, true) => Beacon,
            (Deinit, _, _, _) => Off,
            (Off, _, _, _) => Off,
        }
    }

    #[test]
    fn starts_off() {
        assert_eq!(RepeaterState::default(), RepeaterState::Off);
    }

    #[test]
    fn advance_matches_transition_table_for_every_input() {
        for state in RepeaterState::ALL {
            for rx in all_snapshots() {
                for beacon_due in [false, true] {
                    assert_eq!(
                        state.advance(rx, beacon_due),
                        expected_next(state, rx, beacon_due),
                        "state={state:?} rx={rx:?} beacon_due={beacon_due}"
                    );
                }
            }
        }
    }

    #[test]
    fn advance_is_deterministic() {
        for state in RepeaterState::ALL {
            for rx in all_snapshots() {
                for beacon_due in [false, true] {
                    assert_eq!(state.advance(rx, beacon_due), state.advance(rx, beacon_due));
                }
            }
        }
    }

    #[test]
    fn init_always_moves_to_waiting() {
        for rx in all_snapshots() {
            assert_eq!(RepeaterState::Init.advance(rx, true), RepeaterState::Waiting);
            assert_eq!(RepeaterState::Init.advance(rx, false), RepeaterState::Waiting);
        }
    }

    #[test]
    fn idle_waiting_stays_waiting() {
        let mut state = RepeaterState::Waiting;
        for _ in 0..50 {
            state = state.advance(IDLE, false);
        }
        assert_eq!(state, RepeaterState::Waiting);
    }

    #[test]
    fn beacon_beats_local_receive() {
        let next = RepeaterState::Waiting.advance(LOCAL, true);
        assert_eq!(next, RepeaterState::Beacon);
    }

    #[test]
    fn local_beats_remote_receive() {
        let next = RepeaterState::Waiting.advance(BOTH, false);
        assert_eq!(next, RepeaterState::RelayLocal);
    }

    #[test]
    fn remote_receive_starts_remote_relay() {
        let next = RepeaterState::Waiting.advance(REMOTE, false);
        assert_eq!(next, RepeaterState::RelayRemote);
    }

    #[test]
    fn relay_holds_while_receiver_active_even_if_beacon_due() {
        assert_eq!(
            RepeaterState::RelayLocal.advance(LOCAL, true),
            RepeaterState::RelayLocal
        );
        assert_eq!(
            RepeaterState::RelayRemote.advance(REMOTE, true),
            RepeaterState::RelayRemote
        );
    }

    #[test]
    fn remote_relay_ignores_local_receive() {
        // Remote relay only ends when the remote receiver drops
        assert_eq!(
            RepeaterState::RelayRemote.advance(BOTH, false),
            RepeaterState::RelayRemote
        );
        assert_eq!(
            RepeaterState::RelayRemote.advance(LOCAL, false),
            RepeaterState::Waiting
        );
    }

    #[test]
    fn beacon_ends_when_flag_clears() {
        assert_eq!(RepeaterState::Beacon.advance(BOTH, true), RepeaterState::Beacon);
        assert_eq!(RepeaterState::Beacon.advance(BOTH, false), RepeaterState::Waiting);
    }

    #[test]
    fn dead_states_are_stable() {
        assert_eq!(RepeaterState::Deinit.advance(BOTH, true), RepeaterState::Off);
        assert_eq!(RepeaterState::Off.advance(BOTH, true), RepeaterState::Off);
    }

    #[test]
    fn dead_states_unreachable_from_running_states() {
        let running = [
            RepeaterState::Init,
            RepeaterState::Waiting,
            RepeaterState::RelayLocal,
            RepeaterState::RelayRemote,
            RepeaterState::Beacon,
        ];
        for state in running {
            for rx in all_snapshots() {
                for beacon_due in [false, true] {
                    let next = state.advance(rx, beacon_due);
                    assert!(
                        !matches!(next, RepeaterState::Off | RepeaterState::Deinit),
                        "{state:?} reached {next:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn outputs_table() {
        use RepeaterState::*;
        assert_eq!(Off.outputs(), TransmitIntent::QUIET);
        assert_eq!(Init.outputs(), TransmitIntent::QUIET);
        assert_eq!(Waiting.outputs(), TransmitIntent::QUIET);
        assert_eq!(Deinit.outputs(), TransmitIntent::QUIET);
        assert_eq!(RelayLocal.outputs(), TransmitIntent::new(true, true));
        assert_eq!(RelayRemote.outputs(), TransmitIntent::new(true, false));
        assert_eq!(Beacon.outputs(), TransmitIntent::new(true, false));
    }

    #[test]
    fn remote_transmitter_only_keyed_for_local_traffic() {
        for state in RepeaterState::ALL {
            assert_eq!(state.outputs().remote, state == RepeaterState::RelayLocal);
        }
    }

    #[test]
    fn local_relay_round_trip() {
        let state = RepeaterState::Waiting.advance(LOCAL, false);
        assert_eq!(state, RepeaterState::RelayLocal);
        assert_eq!(state.outputs(), TransmitIntent::new(true, true));

        let state = state.advance(IDLE, false);
        assert_eq!(state, RepeaterState::Waiting);
        assert_eq!(state.outputs(), TransmitIntent::QUIET);
    }

    #[test]
    fn entered_beacon_detects_edge_only() {
        use RepeaterState::*;
        assert!(RepeaterState::entered_beacon(Waiting, Beacon));
        assert!(!RepeaterState::entered_beacon(Beacon, Beacon));
        assert!(!RepeaterState::entered_beacon(Beacon, Waiting));
        assert!(!RepeaterState::entered_beacon(Waiting, RelayLocal));
    }

    #[test]
    fn is_transmitting_helper() {
        assert!(!RepeaterState::Waiting.is_transmitting());
        assert!(RepeaterState::RelayLocal.is_transmitting());
        assert!(RepeaterState::RelayRemote.is_transmitting());
        assert!(RepeaterState::Beacon.is_transmitting());
    }

    #[test]
    fn display_uses_label() {
        assert_eq!(RepeaterState::RelayLocal.to_string(), "Relaying local signal");
        assert_eq!(RepeaterState::Beacon.to_string(), "Sending beacon");
    }
}
