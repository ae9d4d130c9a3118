//! GPIO port abstraction.
//!
//! This module provides a pluggable port layer that abstracts the
//! underlying pin access (Raspberry Pi header, mock for testing).
//!
//! # Design
//!
//! The port trait is synchronous and line-oriented:
//! - `configure()` claims a line as input or output, once at startup
//! - `read()` returns the raw level of a line
//! - `write()` drives an output line
//!
//! Every call is fallible. The controller treats any error as fatal, since
//! assuming a receiver is idle after a failed read could key a transmitter
//! nobody asked for.
//!
//! # Example
//!
//! ```ignore
//! let mut port = MockPort::new();
//! port.configure(Line::LocalRx, PinMode::Input, Pull::Up, false)?;
//! let level = port.read(Line::LocalRx)?;
//! ```

mod mock;
#[cfg(feature = "rpi")]
mod rpi;

pub use mock::MockPort;
#[cfg(feature = "rpi")]
pub use rpi::RpiPort;

use repeater_core::Line;
use serde::Deserialize;
use thiserror::Error;

/// GPIO errors.
#[derive(Debug, Error)]
pub enum GpioError {
    /// GPIO peripheral could not be opened.
    #[error("GPIO unavailable: {0}")]
    Unavailable(String),

    /// A pin could not be claimed.
    #[error("cannot claim {line} (pin {pin}): {reason}")]
    Claim {
        /// Logical line being configured.
        line: Line,
        /// Hardware pin number.
        pin: u8,
        /// Underlying failure.
        reason: String,
    },

    /// Line used before `configure()`.
    #[error("{0} is not configured")]
    NotConfigured(Line),

    /// Write to an input line.
    #[error("{line} is configured as {mode:?}")]
    WrongDirection {
        /// Offending line.
        line: Line,
        /// Mode the line was configured with.
        mode: PinMode,
    },

    /// Read or write failed at runtime.
    #[error("I/O failure on {line}: {reason}")]
    Io {
        /// Offending line.
        line: Line,
        /// Underlying failure.
        reason: String,
    },
}

/// Pin direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    /// Line is read.
    Input,
    /// Line is driven.
    Output,
}

/// Pull resistor on an input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pull {
    /// Pull up to the supply rail.
    Up,
    /// Pull down to ground.
    Down,
    /// No pull resistor.
    None,
}

/// Port trait for the four repeater lines.
///
/// Implementations handle the underlying pin mechanism
/// (Raspberry Pi GPIO, mock, etc).
pub trait Port: Send {
    /// Claim a line with the given direction and pull.
    ///
    /// `initial` is the level an output starts at; inputs ignore it.
    fn configure(
        &mut self,
        line: Line,
        mode: PinMode,
        pull: Pull,
        initial: bool,
    ) -> Result<(), GpioError>;

    /// Read the raw level of a line.
    ///
    /// Output lines report the level they are currently driven to.
    fn read(&self, line: Line) -> Result<bool, GpioError>;

    /// Drive an output line to `level`.
    ///
    /// Writing the level a line already has is harmless.
    fn write(&mut self, line: Line, level: bool) -> Result<(), GpioError>;
}

/// Hardware pin numbers for the four lines.
///
/// Numbers are whatever the adapter expects; for `RpiPort` that is BCM
/// numbering. The defaults are the usual wiring on header pins 11, 13, 16
/// and 18.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PinMap {
    /// Local receiver carrier detect (default: BCM 17, header pin 11).
    #[serde(default = "default_local_rx")]
    pub local_rx: u8,
    /// Local transmitter enable (default: BCM 27, header pin 13).
    #[serde(default = "default_local_tx")]
    pub local_tx: u8,
    /// Remote receiver carrier detect (default: BCM 23, header pin 16).
    #[serde(default = "default_remote_rx")]
    pub remote_rx: u8,
    /// Remote transmitter enable (default: BCM 24, header pin 18).
    #[serde(default = "default_remote_tx")]
    pub remote_tx: u8,
}

fn default_local_rx() -> u8 {
    17
}

fn default_local_tx() -> u8 {
    27
}

fn default_remote_rx() -> u8 {
    23
}

fn default_remote_tx() -> u8 {
    24
}

impl PinMap {
    /// Pin number assigned to `line`.
    pub fn pin(&self, line: Line) -> u8 {
        match line {
            Line::LocalRx => self.local_rx,
            Line::LocalTx => self.local_tx,
            Line::RemoteRx => self.remote_rx,
            Line::RemoteTx => self.remote_tx,
        }
    }

    /// First pair of lines sharing a pin number, if any.
    pub fn duplicate(&self) -> Option<(Line, Line)> {
        for (i, a) in Line::ALL.iter().enumerate() {
            for b in &Line::ALL[i + 1..] {
                if self.pin(*a) == self.pin(*b) {
                    return Some((*a, *b));
                }
            }
        }
        None
    }
}

impl Default for PinMap {
    fn default() -> Self {
        Self {
            local_rx: default_local_rx(),
            local_tx: default_local_tx(),
            remote_rx: default_remote_rx(),
            remote_tx: default_remote_tx(),
        }
    }
}
