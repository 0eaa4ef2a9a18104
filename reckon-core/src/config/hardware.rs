//! Hardware configuration types
//!
//! Pin assignments for the motor driver channels and the indicator output.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// BCM GPIO number
    pub pin: u8,
    /// Pin is active-low (inverted)
    pub inverted: bool,
}

impl PinConfig {
    /// Create a new pin config
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
        }
    }

    /// Create an inverted (active-low) pin
    pub const fn inverted(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
        }
    }
}

/// The two channels of a dual-channel (H-bridge style) motor driver
///
/// Retract drives channel 1, extend drives channel 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotorPins {
    /// Channel 1 (high while retracting)
    pub channel1: PinConfig,
    /// Channel 2 (high while extending)
    pub channel2: PinConfig,
}

/// LED indicator output configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndicatorConfig {
    /// Switching output; MOSFET gates are typically active-low
    pub output: PinConfig,
}

/// Complete pin assignment for one device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HardwareConfig {
    /// Motor driver channels
    pub motor: MotorPins,
    /// Optional indicator output
    pub indicator: Option<IndicatorConfig>,
}

impl HardwareConfig {
    /// Validate that no GPIO is assigned twice
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pins = [
            Some(self.motor.channel1.pin),
            Some(self.motor.channel2.pin),
            self.indicator.map(|i| i.output.pin),
        ];

        for (i, pin) in pins.iter().enumerate() {
            let Some(pin) = pin else { continue };
            if pins[i + 1..].contains(&Some(*pin)) {
                return Err(ConfigError::DuplicatePin(*pin));
            }
        }

        Ok(())
    }
}
