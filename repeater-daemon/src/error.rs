//! Error types for repeaterd.

use repeater_gpio::GpioError;

/// Main error type for repeater operations.
#[derive(Debug, thiserror::Error)]
pub enum RepeaterError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// GPIO error. Always fatal for the control loop.
    #[error("GPIO error: {0}")]
    Gpio(#[from] GpioError),

    /// Logging could not be set up.
    #[error("logging setup failed: {0}")]
    Logging(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for repeater operations.
pub type Result<T> = std::result::Result<T, RepeaterError>;

#[cfg(test)]
mod tests {
    use super::*;
    use repeater_core::Line;

    #[test]
    fn gpio_error_converts() {
        let err: RepeaterError = GpioError::NotConfigured(Line::LocalTx).into();
        assert!(matches!(err, RepeaterError::Gpio(_)));
        assert_eq!(err.to_string(), "GPIO error: local-tx is not configured");
    }

    #[test]
    fn config_error_converts() {
        let err: RepeaterError = crate::config::ConfigError::Invalid("bad".into()).into();
        assert_eq!(
            err.to_string(),
            "configuration error: invalid configuration: bad"
        );
    }
}
