//! GPIO output abstraction
//!
//! Provides the digital output capability consumed by the motor driver and
//! the indicator.
//!
//! # Contract
//!
//! - All calls are synchronous.
//! - `release()` is idempotent. After it, the output is handed back to the
//!   system and the wrapper no longer drives it.
//! - `set_high()` / `set_low()` on a released output fail with
//!   [`PinError::Released`] and have no side effect.
//!
//! "High" and "low" are logical levels. Bindings apply any configured
//! inversion (active-low wiring) before touching the hardware.

use thiserror::Error;

/// Errors from output pin operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PinError {
    /// The output was already released
    #[error("output pin {0} already released")]
    Released(u8),
    /// The pin is claimed by another owner
    #[error("output pin {0} is already in use")]
    InUse(u8),
    /// The GPIO peripheral could not be accessed
    #[error("GPIO peripheral unavailable")]
    Unavailable,
    /// The hardware rejected the level change
    #[error("output pin {0} failed to toggle")]
    Io(u8),
}

/// Digital output pin
///
/// Implementations own exactly one physical line. There is no way to clone
/// an output, so a line can never be driven by two owners.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self) -> Result<(), PinError>;

    /// Set the pin low (logic 0)
    fn set_low(&mut self) -> Result<(), PinError>;

    /// Release the underlying line
    fn release(&mut self);

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Check if the output has been released
    fn is_released(&self) -> bool;

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) -> Result<(), PinError> {
        if high {
            self.set_high()
        } else {
            self.set_low()
        }
    }

    /// Check if the pin is currently set low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}
