//! Logical lines and their active-level conventions.
//!
//! GPIO adapters deal in raw levels. Whether a low input means "carrier
//! present" or a high output means "keyed" depends on how the radios are
//! wired, so that mapping lives here rather than in the adapter.

use serde::Deserialize;
use std::fmt;

/// The four signal lines the controller uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Line {
    /// Local receiver carrier detect (input).
    LocalRx,
    /// Local transmitter enable (output).
    LocalTx,
    /// Remote receiver carrier detect (input).
    RemoteRx,
    /// Remote transmitter enable (output).
    RemoteTx,
}

impl Line {
    /// Every line, inputs first.
    pub const ALL: [Self; 4] = [Self::LocalRx, Self::RemoteRx, Self::LocalTx, Self::RemoteTx];

    /// Whether the controller reads this line.
    pub fn is_input(&self) -> bool {
        matches!(self, Self::LocalRx | Self::RemoteRx)
    }

    /// Short name used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LocalRx => "local-rx",
            Self::LocalTx => "local-tx",
            Self::RemoteRx => "remote-rx",
            Self::RemoteTx => "remote-tx",
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which raw level counts as "active" on a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Polarity {
    /// High level is active.
    ActiveHigh,
    /// Low level is active (open-collector carrier detect with pull-up).
    ActiveLow,
}

impl Polarity {
    /// Convert a raw level into an active flag.
    pub fn is_active(self, level: bool) -> bool {
        match self {
            Self::ActiveHigh => level,
            Self::ActiveLow => !level,
        }
    }

    /// Raw level that represents `active`.
    pub fn level(self, active: bool) -> bool {
        match self {
            Self::ActiveHigh => active,
            Self::ActiveLow => !active,
        }
    }
}
