//! Raspberry Pi GPIO port.
//!
//! Uses `rppal` with BCM pin numbering. Pins are claimed in `configure()`
//! and released (reset to their previous mode) when the port is dropped.

use super::{GpioError, PinMap, PinMode, Port, Pull};
use repeater_core::Line;
use rppal::gpio::{Gpio, InputPin, OutputPin};
use std::collections::HashMap;

/// A claimed pin.
enum Claimed {
    Input(InputPin),
    Output(OutputPin),
}

/// Raspberry Pi header GPIO.
pub struct RpiPort {
    gpio: Gpio,
    pins: PinMap,
    claimed: HashMap<Line, Claimed>,
}

impl std::fmt::Debug for RpiPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpiPort")
            .field("pins", &self.pins)
            .field("claimed", &self.claimed.len())
            .finish_non_exhaustive()
    }
}

impl RpiPort {
    /// Open the GPIO peripheral.
    ///
    /// # Errors
    ///
    /// Returns [`GpioError::Unavailable`] if `/dev/gpiomem` cannot be opened
    /// (not a Pi, or missing permissions).
    pub fn new(pins: PinMap) -> Result<Self, GpioError> {
        let gpio = Gpio::new().map_err(|e| GpioError::Unavailable(e.to_string()))?;
        Ok(Self {
            gpio,
            pins,
            claimed: HashMap::new(),
        })
    }
}

impl Port for RpiPort {
    fn configure(
        &mut self,
        line: Line,
        mode: PinMode,
        pull: Pull,
        initial: bool,
    ) -> Result<(), GpioError> {
        let bcm = self.pins.pin(line);
        let pin = self.gpio.get(bcm).map_err(|e| GpioError::Claim {
            line,
            pin: bcm,
            reason: e.to_string(),
        })?;

        let claimed = match mode {
            PinMode::Input => Claimed::Input(match pull {
                Pull::Up => pin.into_input_pullup(),
                Pull::Down => pin.into_input_pulldown(),
                Pull::None => pin.into_input(),
            }),
            PinMode::Output => {
                if pull != Pull::None {
                    tracing::warn!("Ignoring pull {:?} on output {} (pin {})", pull, line, bcm);
                }
                Claimed::Output(if initial {
                    pin.into_output_high()
                } else {
                    pin.into_output_low()
                })
            }
        };

        tracing::debug!("Configured {} on BCM {} as {:?}", line, bcm, mode);
        self.claimed.insert(line, claimed);
        Ok(())
    }

    fn read(&self, line: Line) -> Result<bool, GpioError> {
        match self.claimed.get(&line) {
            Some(Claimed::Input(pin)) => Ok(pin.is_high()),
            Some(Claimed::Output(pin)) => Ok(pin.is_set_high()),
            None => Err(GpioError::NotConfigured(line)),
        }
    }

    fn write(&mut self, line: Line, level: bool) -> Result<(), GpioError> {
        match self.claimed.get_mut(&line) {
            Some(Claimed::Output(pin)) => {
                if level {
                    pin.set_high();
                } else {
                    pin.set_low();
                }
                Ok(())
            }
            Some(Claimed::Input(_)) => Err(GpioError::WrongDirection {
                line,
                mode: PinMode::Input,
            }),
            None => Err(GpioError::NotConfigured(line)),
        }
    }
}
