//! # repeater-daemon
//!
//! Control loop and daemon plumbing for a two-port repeater.
//!
//! This crate wires the pure logic from `repeater-core` to a GPIO port from
//! `repeater-gpio`:
//! - Samples both carrier-detect inputs every 100 ms
//! - Cross-repeats local traffic out of both transmitters
//! - Repeats remote traffic out of the local transmitter
//! - Interrupts idle time with a periodic beacon
//!
//! ## Architecture
//!
//! ```text
//!   ┌───────────────┐   beacon_due   ┌──────────────────────────┐
//!   │ beacon timers │ ─────────────► │       Controller         │
//!   │ (tokio tasks) │ ◄───────────── │ sample → advance → drive │
//!   └───────────────┘  start timer   └────────────┬─────────────┘
//!                                                 │ read / write
//!                                          ┌──────┴──────┐
//!                                          │  GPIO port  │
//!                                          └─────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod beacon;
pub mod config;
pub mod control;
pub mod error;
pub mod logging;
pub mod status;

pub use config::{Config, ConfigError};
pub use control::{Controller, Cycle};
pub use error::{RepeaterError, Result};
