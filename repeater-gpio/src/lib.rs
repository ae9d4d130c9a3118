//! # repeater-gpio
//!
//! GPIO port abstraction for the repeater controller.
//!
//! The control loop only ever talks to a [`Port`]: configure the four lines
//! once at startup, then read the receivers and write the transmitters every
//! cycle. Two implementations are provided:
//!
//! - [`MockPort`] - in-memory levels for tests and `--simulate` runs
//! - `RpiPort` - Raspberry Pi header GPIO via `rppal` (feature `rpi`)
//!
//! Ports deal in raw levels only. Active-high/active-low conventions are
//! applied by the caller using [`repeater_core::Polarity`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod port;

pub use port::{GpioError, MockPort, PinMap, PinMode, Port, Pull};
#[cfg(feature = "rpi")]
pub use port::RpiPort;
