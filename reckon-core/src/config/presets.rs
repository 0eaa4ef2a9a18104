//! Named preset positions
//!
//! A small static table mapping a name to an actuator position and an
//! indicator state, e.g. `sit` → 0 mm / off, `stand` → 110 mm / on.

use heapless::{String, Vec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::state::IndicatorState;

/// Maximum preset name length in bytes
pub const MAX_PRESET_NAME_LEN: usize = 16;

/// Maximum presets per table
pub const MAX_PRESETS: usize = 8;

/// One named preset
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Preset {
    /// Lookup name
    pub name: String<MAX_PRESET_NAME_LEN>,
    /// Target actuator position in um
    pub position_um: u32,
    /// Indicator state to apply with the move
    pub indicator: IndicatorState,
}

impl Preset {
    /// Create a preset, validating the name length
    pub fn new(name: &str, position_um: u32, indicator: IndicatorState) -> Result<Self, ConfigError> {
        if name.is_empty() {
            return Err(ConfigError::InvalidPresetName);
        }
        let name = String::try_from(name).map_err(|_| ConfigError::InvalidPresetName)?;
        Ok(Self {
            name,
            position_um,
            indicator,
        })
    }
}

/// Table of presets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PresetTable {
    presets: Vec<Preset, MAX_PRESETS>,
}

impl PresetTable {
    /// Create an empty table
    pub const fn new() -> Self {
        Self { presets: Vec::new() }
    }

    /// Add a preset
    ///
    /// Names must be unique and positions must lie within `stroke_um`.
    pub fn insert(&mut self, preset: Preset, stroke_um: u32) -> Result<(), ConfigError> {
        if preset.position_um > stroke_um {
            return Err(ConfigError::PresetOutOfStroke);
        }
        if self.find(&preset.name).is_some() {
            return Err(ConfigError::DuplicatePreset);
        }
        self.presets
            .push(preset)
            .map_err(|_| ConfigError::TooManyPresets)
    }

    /// Look up a preset by name
    pub fn find(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name.as_str() == name)
    }

    /// Iterate over all presets in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    /// Number of presets
    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}
