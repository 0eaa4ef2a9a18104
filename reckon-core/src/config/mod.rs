//! Configuration types
//!
//! Board-agnostic configuration structures. They are built and validated
//! once at startup by the binary's config loader and passed into
//! constructors; nothing in the core reads configuration on its own.

pub mod actuator;
pub mod hardware;
pub mod presets;

pub use actuator::*;
pub use hardware::*;
pub use presets::*;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Actuator speed must be non-zero
    #[error("actuator speed must be greater than zero")]
    ZeroSpeed,
    /// Stroke length must be non-zero
    #[error("stroke length must be greater than zero")]
    ZeroStroke,
    /// Safety factor must allow some overtravel
    #[error("safety factor must be above 100 %")]
    SafetyFactorTooLow,
    /// Two outputs were assigned the same GPIO
    #[error("GPIO {0} is assigned more than once")]
    DuplicatePin(u8),
    /// More presets than the table can hold
    #[error("too many presets (max {})", MAX_PRESETS)]
    TooManyPresets,
    /// Preset name is empty or too long
    #[error("preset name must be 1 to {} bytes", MAX_PRESET_NAME_LEN)]
    InvalidPresetName,
    /// Two presets share a name
    #[error("duplicate preset name")]
    DuplicatePreset,
    /// Preset position lies outside the stroke
    #[error("preset position outside the stroke")]
    PresetOutOfStroke,
}
