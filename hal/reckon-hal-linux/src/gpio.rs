//! GPIO outputs on the Raspberry Pi
//!
//! Pins are requested by BCM number from the config. Each number can be
//! claimed once per [`LinuxGpio`]; rppal additionally refuses a pin another
//! handle in the process still holds.
//!
//! Logical levels are mapped to physical ones here, so drivers above never
//! see active-low wiring.

use log::{debug, error, trace};
use reckon_core::config::PinConfig;
use reckon_hal::{OutputPin, PinError};
use rppal::gpio::{Gpio, Level};

/// Highest BCM number on the 40-pin header SoCs
pub const MAX_BCM_PIN: u8 = 53;

/// Physical level for a logical one
fn physical_level(high: bool, inverted: bool) -> Level {
    if high != inverted {
        Level::High
    } else {
        Level::Low
    }
}

fn map_error(pin: u8, e: rppal::gpio::Error) -> PinError {
    match e {
        rppal::gpio::Error::PinUsed(_) => PinError::InUse(pin),
        e => {
            error!("GPIO{}: {}", pin, e);
            PinError::Unavailable
        }
    }
}

/// Pin allocator over the GPIO peripheral
pub struct LinuxGpio {
    gpio: Gpio,
    /// Bit per BCM number handed out so far
    claimed: u64,
}

impl LinuxGpio {
    /// Open the GPIO peripheral
    pub fn new() -> Result<Self, PinError> {
        let gpio = Gpio::new().map_err(|e| {
            error!("Failed to open GPIO: {}", e);
            PinError::Unavailable
        })?;
        Ok(Self { gpio, claimed: 0 })
    }

    /// Claim a pin as an output
    ///
    /// With `reset_on_release` the pin returns to its previous mode when
    /// released (motor channels, so nothing is left driven). Without it the
    /// pin keeps its level after release and process exit (indicator). A
    /// resetting pin starts logically low; a keeping pin starts at whatever
    /// level the line already has.
    pub fn output(&mut self, config: PinConfig, reset_on_release: bool) -> Result<LinuxOutput, PinError> {
        let number = config.pin;
        if number > MAX_BCM_PIN {
            return Err(PinError::Unavailable);
        }
        let bit = 1u64 << number;
        if self.claimed & bit != 0 {
            return Err(PinError::InUse(number));
        }

        let pin = self.gpio.get(number).map_err(|e| map_error(number, e))?;
        let mut pin = if reset_on_release {
            match physical_level(false, config.inverted) {
                Level::High => pin.into_output_high(),
                Level::Low => pin.into_output_low(),
            }
        } else {
            pin.into_output()
        };
        pin.set_reset_on_drop(reset_on_release);

        let level = pin.is_set_high() != config.inverted;
        self.claimed |= bit;
        debug!(
            "GPIO{} claimed as output{}",
            number,
            if config.inverted { " (inverted)" } else { "" }
        );

        Ok(LinuxOutput {
            pin: Some(pin),
            number,
            inverted: config.inverted,
            high: level,
        })
    }
}

/// One claimed output line
pub struct LinuxOutput {
    pin: Option<rppal::gpio::OutputPin>,
    number: u8,
    inverted: bool,
    /// Logical level last written
    high: bool,
}

impl LinuxOutput {
    /// BCM number of this output
    pub fn number(&self) -> u8 {
        self.number
    }

    fn write(&mut self, high: bool) -> Result<(), PinError> {
        let pin = self.pin.as_mut().ok_or(PinError::Released(self.number))?;
        pin.write(physical_level(high, self.inverted));
        self.high = high;
        trace!("GPIO{} -> {}", self.number, if high { "high" } else { "low" });
        Ok(())
    }
}

impl OutputPin for LinuxOutput {
    fn set_high(&mut self) -> Result<(), PinError> {
        self.write(true)
    }

    fn set_low(&mut self) -> Result<(), PinError> {
        self.write(false)
    }

    fn release(&mut self) {
        if self.pin.take().is_some() {
            debug!("GPIO{} released", self.number);
        }
    }

    fn is_set_high(&self) -> bool {
        self.high
    }

    fn is_released(&self) -> bool {
        self.pin.is_none()
    }
}
