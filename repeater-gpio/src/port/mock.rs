//! Mock port for testing.
//!
//! Keeps line levels in memory, records every physical write and can be told
//! to fail the next configure, read or write.

use super::{GpioError, PinMode, Port, Pull};
use repeater_core::Line;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock port for testing.
///
/// Clones share state, so a test can hand one clone to the controller and
/// keep another to drive the receivers and inspect the transmitters.
#[derive(Debug, Default)]
pub struct MockPort {
    inner: Arc<Mutex<MockPortInner>>,
}

#[derive(Debug, Default)]
struct MockPortInner {
    levels: HashMap<Line, bool>,
    modes: HashMap<Line, PinMode>,
    writes: Vec<(Line, bool)>,
    fail_next_configure: Option<String>,
    fail_next_read: Option<String>,
    fail_next_write: Option<String>,
}

impl MockPort {
    /// Create a new mock port with nothing configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the level seen on a line, as if driven from outside.
    ///
    /// Use this to simulate a receiver raising or dropping carrier detect.
    pub fn set_level(&self, line: Line, level: bool) {
        let mut inner = self.inner.lock().unwrap();
        inner.levels.insert(line, level);
    }

    /// Current level of a line, if it has one.
    pub fn level(&self, line: Line) -> Option<bool> {
        let inner = self.inner.lock().unwrap();
        inner.levels.get(&line).copied()
    }

    /// Mode a line was configured with.
    pub fn mode(&self, line: Line) -> Option<PinMode> {
        let inner = self.inner.lock().unwrap();
        inner.modes.get(&line).copied()
    }

    /// All physical writes so far, in order.
    pub fn writes(&self) -> Vec<(Line, bool)> {
        let inner = self.inner.lock().unwrap();
        inner.writes.clone()
    }

    /// Number of physical writes made to `line`.
    pub fn write_count(&self, line: Line) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.writes.iter().filter(|(l, _)| *l == line).count()
    }

    /// Cause the next configure() to fail with the given error.
    pub fn fail_next_configure(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_configure = Some(error.to_string());
    }

    /// Cause the next read() to fail with the given error.
    pub fn fail_next_read(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_read = Some(error.to_string());
    }

    /// Cause the next write() to fail with the given error.
    pub fn fail_next_write(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_write = Some(error.to_string());
    }
}

impl Clone for MockPort {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Port for MockPort {
    fn configure(
        &mut self,
        line: Line,
        mode: PinMode,
        pull: Pull,
        initial: bool,
    ) -> Result<(), GpioError> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(reason) = inner.fail_next_configure.take() {
            return Err(GpioError::Claim {
                line,
                pin: 0,
                reason,
            });
        }

        // Pull resistors set the idle level of an undriven input
        let level = match (mode, pull) {
            (PinMode::Output, _) => initial,
            (PinMode::Input, Pull::Up) => true,
            (PinMode::Input, Pull::Down) => false,
            (PinMode::Input, Pull::None) => inner.levels.get(&line).copied().unwrap_or(false),
        };

        inner.modes.insert(line, mode);
        inner.levels.insert(line, level);
        Ok(())
    }

    fn read(&self, line: Line) -> Result<bool, GpioError> {
        let mut inner = self.inner.lock().unwrap();

        if !inner.modes.contains_key(&line) {
            return Err(GpioError::NotConfigured(line));
        }

        if let Some(reason) = inner.fail_next_read.take() {
            return Err(GpioError::Io { line, reason });
        }

        Ok(inner.levels.get(&line).copied().unwrap_or(false))
    }

    fn write(&mut self, line: Line, level: bool) -> Result<(), GpioError> {
        let mut inner = self.inner.lock().unwrap();

        match inner.modes.get(&line) {
            None => return Err(GpioError::NotConfigured(line)),
            Some(PinMode::Input) => {
                return Err(GpioError::WrongDirection {
                    line,
                    mode: PinMode::Input,
                })
            }
            Some(PinMode::Output) => {}
        }

        if let Some(reason) = inner.fail_next_write.take() {
            return Err(GpioError::Io { line, reason });
        }

        inner.levels.insert(line, level);
        inner.writes.push((line, level));
        Ok(())
    }
}
