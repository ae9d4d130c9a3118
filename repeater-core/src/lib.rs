//! # repeater-core
//!
//! Pure control logic for a two-port amateur-radio repeater controller.
//!
//! The controller watches two carrier-detect inputs (a local and a remote
//! receiver) and drives two transmit-enable outputs. This crate holds the
//! decision-making parts and nothing else:
//!
//! - [`RepeaterState`] - the relay state machine (`advance` + `outputs`)
//! - [`TailHold`] - minimum-hold timer for the local transmit line
//! - [`BeaconSignal`] - the `beacon_due` flag shared with the scheduler
//! - [`Line`] / [`Polarity`] - logical lines and active-level conventions
//!
//! ## Design Philosophy
//!
//! Everything here is deterministic: time is passed in, levels are passed in,
//! decisions come out. Pin I/O lives in `repeater-gpio` and the loop that
//! wires them together lives in `repeater-daemon`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod beacon;
pub mod line;
pub mod state;
pub mod tail;

pub use beacon::BeaconSignal;
pub use line::{Line, Polarity};
pub use state::{ReceiveSnapshot, RepeaterState, TransmitIntent};
pub use tail::{TailHold, DEFAULT_TAIL_HOLD};
