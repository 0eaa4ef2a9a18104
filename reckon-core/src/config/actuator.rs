//! Actuator configuration

use super::ConfigError;
use crate::motion::SafetyBounds;

/// Default overtravel allowance (10 % past the nominal stroke)
pub const DEFAULT_SAFETY_FACTOR_PCT: u16 = 110;

/// Linear actuator configuration
///
/// Immutable once the controller is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorConfig {
    /// Nominal linear speed in um/s
    pub speed_um_s: u32,
    /// Full stroke length in um
    pub stroke_um: u32,
    /// Per-command travel ceiling in percent of the stroke (> 100)
    pub safety_factor_pct: u16,
    /// Position estimate to start from, usually loaded from the store
    pub initial_position_um: u32,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            speed_um_s: 5_000,  // 5 mm/s
            stroke_um: 150_000, // 150 mm
            safety_factor_pct: DEFAULT_SAFETY_FACTOR_PCT,
            initial_position_um: 0,
        }
    }
}

impl ActuatorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.speed_um_s == 0 {
            return Err(ConfigError::ZeroSpeed);
        }
        if self.stroke_um == 0 {
            return Err(ConfigError::ZeroStroke);
        }
        if self.safety_factor_pct <= 100 {
            return Err(ConfigError::SafetyFactorTooLow);
        }
        Ok(())
    }

    /// Derive the per-command safety bounds
    pub fn bounds(&self) -> SafetyBounds {
        SafetyBounds::new(self.stroke_um, self.speed_um_s, self.safety_factor_pct)
    }

    /// Same configuration starting from another position
    pub fn with_initial_position(self, initial_position_um: u32) -> Self {
        Self {
            initial_position_um,
            ..self
        }
    }
}
