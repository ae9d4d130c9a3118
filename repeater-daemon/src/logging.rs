//! Tracing subscriber setup.
//!
//! Console output always; a second, ANSI-free layer appends to
//! `logging.file` (`repeater.log` unless set to an empty path). `RUST_LOG`
//! takes precedence over `logging.level`.

use crate::config::LoggingConfig;
use crate::error::{RepeaterError, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Build the level filter for this configuration.
pub fn filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            RepeaterError::Logging(format!("invalid log level {:?}: {}", config.level, e))
        }),
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Fails if the level directive is invalid, the log file cannot be opened,
/// or a subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = filter(config)?;

    let console = fmt::layer().with_thread_names(true);

    let file = match config.file_path() {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_thread_names(true)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| RepeaterError::Logging(e.to_string()))
}
