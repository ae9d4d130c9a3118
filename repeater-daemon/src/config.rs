//! Configuration loading for repeaterd.
//!
//! Configuration is loaded from a TOML file (default: `repeater.toml`).
//! Every section and field is optional; anything left out takes the value
//! the controller has always used.

use repeater_core::Polarity;
use repeater_gpio::PinMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name.
pub const DEFAULT_CONFIG_PATH: &str = "repeater.toml";

/// Upper bound for `timing.poll_interval_ms` and `timing.tail_hold_ms` (1 minute).
pub const MAX_TIMING_MS: u64 = 60_000;

/// Upper bound for `beacon.interval_secs` and `beacon.duration_secs` (1 day).
pub const MAX_BEACON_SECS: u64 = 86_400;

/// Root configuration for repeaterd.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Hardware pin numbers.
    #[serde(default)]
    pub pins: PinMap,
    /// Active levels of the receive and transmit lines.
    #[serde(default)]
    pub polarity: PolarityConfig,
    /// Control loop timing.
    #[serde(default)]
    pub timing: TimingConfig,
    /// Beacon schedule.
    #[serde(default)]
    pub beacon: BeaconConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Console status line.
    #[serde(default)]
    pub status: StatusConfig,
}

/// Line polarity configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PolarityConfig {
    /// Receive (carrier detect) inputs (default: active-low).
    #[serde(default = "default_rx_polarity")]
    pub rx: Polarity,
    /// Transmit enable outputs (default: active-high).
    #[serde(default = "default_tx_polarity")]
    pub tx: Polarity,
}

/// Control loop timing configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TimingConfig {
    /// Control loop period in milliseconds (default: 100).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Local transmitter tail hold in milliseconds (default: 1000).
    #[serde(default = "default_tail_hold_ms")]
    pub tail_hold_ms: u64,
}

/// Beacon schedule configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BeaconConfig {
    /// Enable the periodic beacon (default: true).
    #[serde(default = "default_beacon_enabled")]
    pub enabled: bool,
    /// Seconds between beacons (default: 10).
    #[serde(default = "default_beacon_interval")]
    pub interval_secs: u64,
    /// Seconds the beacon keeps the transmitter keyed (default: 3).
    #[serde(default = "default_beacon_duration")]
    pub duration_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set (default: "warn").
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file appended to alongside console output (default:
    /// "repeater.log"). An empty path disables file output.
    #[serde(default = "default_log_file")]
    pub file: Option<PathBuf>,
}

/// Status line configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StatusConfig {
    /// Print a status line every control cycle (default: true).
    #[serde(default = "default_status_enabled")]
    pub enabled: bool,
}

// Default value functions
fn default_rx_polarity() -> Polarity {
    Polarity::ActiveLow
}

fn default_tx_polarity() -> Polarity {
    Polarity::ActiveHigh
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_tail_hold_ms() -> u64 {
    1000
}

fn default_beacon_enabled() -> bool {
    true
}

fn default_beacon_interval() -> u64 {
    10
}

fn default_beacon_duration() -> u64 {
    3
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_file() -> Option<PathBuf> {
    Some(PathBuf::from("repeater.log"))
}

fn default_status_enabled() -> bool {
    true
}

impl Default for PolarityConfig {
    fn default() -> Self {
        Self {
            rx: default_rx_polarity(),
            tx: default_tx_polarity(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            tail_hold_ms: default_tail_hold_ms(),
        }
    }
}

impl TimingConfig {
    /// Control loop period.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Local transmitter tail hold.
    pub fn tail_hold(&self) -> Duration {
        Duration::from_millis(self.tail_hold_ms)
    }
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            enabled: default_beacon_enabled(),
            interval_secs: default_beacon_interval(),
            duration_secs: default_beacon_duration(),
        }
    }
}

impl BeaconConfig {
    /// Time between beacons.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Time a beacon keeps the transmitter keyed.
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

impl LoggingConfig {
    /// Log file to append to, if file output is enabled.
    pub fn file_path(&self) -> Option<&Path> {
        self.file
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            enabled: default_status_enabled(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load an explicitly named file, or `repeater.toml` if it exists.
    ///
    /// A missing default file falls back to [`Config::default`]; a missing
    /// explicitly named file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Reject configurations the controller cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timing.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "timing.poll_interval_ms must be > 0".into(),
            ));
        }

        if self.timing.poll_interval_ms > MAX_TIMING_MS {
            return Err(ConfigError::Invalid(format!(
                "timing.poll_interval_ms must be <= {}",
                MAX_TIMING_MS
            )));
        }
        if self.timing.tail_hold_ms > MAX_TIMING_MS {
            return Err(ConfigError::Invalid(format!(
                "timing.tail_hold_ms must be <= {}",
                MAX_TIMING_MS
            )));
        }

        if self.beacon.enabled {
            if self.beacon.interval_secs == 0 {
                return Err(ConfigError::Invalid(
                    "beacon.interval_secs must be > 0".into(),
                ));
            }
            if self.beacon.duration_secs == 0 {
                return Err(ConfigError::Invalid(
                    "beacon.duration_secs must be > 0".into(),
                ));
            }
            if self.beacon.interval_secs > MAX_BEACON_SECS {
                return Err(ConfigError::Invalid(format!(
                    "beacon.interval_secs must be <= {}",
                    MAX_BEACON_SECS
                )));
            }
            if self.beacon.duration_secs > MAX_BEACON_SECS {
                return Err(ConfigError::Invalid(format!(
                    "beacon.duration_secs must be <= {}",
                    MAX_BEACON_SECS
                )));
            }
        }

        if let Some((a, b)) = self.pins.duplicate() {
            return Err(ConfigError::Invalid(format!(
                "{} and {} share pin {}",
                a,
                b,
                self.pins.pin(a)
            )));
        }

        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// Configuration values are inconsistent.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.timing.poll_interval(), Duration::from_millis(100));
        assert_eq!(config.timing.tail_hold(), Duration::from_millis(1000));
        assert_eq!(config.beacon.interval(), Duration::from_secs(10));
        assert_eq!(config.beacon.duration(), Duration::from_secs(3));
        assert_eq!(config.polarity.rx, Polarity::ActiveLow);
        assert_eq!(config.polarity.tx, Polarity::ActiveHigh);
        assert_eq!(config.logging.level, "warn");
        assert!(config.status.enabled);
        config.validate().unwrap();
    }

    #[test]
    fn config_from_toml_string() {
        let toml = r#"
[pins]
local_rx = 5
local_tx = 6
remote_rx = 13
remote_tx = 19

[polarity]
rx = "active-high"

[timing]
poll_interval_ms = 50
tail_hold_ms = 1500

[beacon]
interval_secs = 600
duration_secs = 8

[logging]
level = "info"
file = "/var/log/repeater.log"

[status]
enabled = false
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.pins.local_rx, 5);
        assert_eq!(config.pins.remote_tx, 19);
        assert_eq!(config.polarity.rx, Polarity::ActiveHigh);
        assert_eq!(config.polarity.tx, Polarity::ActiveHigh);
        assert_eq!(config.timing.poll_interval_ms, 50);
        assert_eq!(config.timing.tail_hold_ms, 1500);
        assert_eq!(config.beacon.interval_secs, 600);
        assert_eq!(config.beacon.duration_secs, 8);
        assert_eq!(
            config.logging.file,
            Some(PathBuf::from("/var/log/repeater.log"))
        );
        assert!(!config.status.enabled);
        config.validate().unwrap();
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.pins, PinMap::default());
        assert_eq!(config.beacon.interval_secs, 10);
        assert_eq!(config.logging.file_path(), Some(Path::new("repeater.log")));
    }

    #[test]
    fn empty_log_file_disables_file_output() {
        let config: Config = toml::from_str("[logging]\nfile = \"\"").unwrap();
        assert!(config.logging.file_path().is_none());
    }

    #[test]
    fn config_missing_fields_use_defaults() {
        let toml = r#"
[timing]
[beacon]
enabled = false
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.timing.poll_interval_ms, 100);
        assert!(!config.beacon.enabled);
        assert_eq!(config.beacon.duration_secs, 3);
    }

    #[test]
    fn zero_poll_interval_rejected() {
        let mut config = Config::default();
        config.timing.poll_interval_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn zero_beacon_timing_rejected_only_when_enabled() {
        let mut config = Config::default();
        config.beacon.interval_secs = 0;
        assert!(config.validate().is_err());

        config.beacon.enabled = false;
        config.validate().unwrap();

        config.beacon.enabled = true;
        config.beacon.interval_secs = 10;
        config.beacon.duration_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_timing_rejected() {
        let mut config = Config::default();
        config.beacon.interval_secs = u64::MAX;
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid configuration: beacon.interval_secs must be <= 86400"
        );

        config.beacon.interval_secs = MAX_BEACON_SECS;
        config.validate().unwrap();

        config.beacon.duration_secs = MAX_BEACON_SECS + 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.timing.poll_interval_ms = MAX_TIMING_MS + 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.timing.tail_hold_ms = u64::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn duplicate_pins_rejected() {
        let mut config = Config::default();
        config.pins.remote_rx = config.pins.local_rx;

        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid configuration: local-rx and remote-rx share pin 17"
        );
    }

    #[test]
    fn bad_polarity_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[polarity]\nrx = \"sideways\"").unwrap();

        let result = Config::from_file(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[timing]\ntail_hold_ms = 250").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.timing.tail_hold_ms, 250);
    }

    #[test]
    fn load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let result = Config::load(Some(&path));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }
}
