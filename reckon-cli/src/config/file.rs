//! TOML file layout
//!
//! Lengths are written in millimetres as floats; they are converted and
//! validated by [`super::AppConfig::from_file`].
//!
//! ```toml
//! calibrate_on_start = false
//!
//! [actuator]
//! channel1 = 17
//! channel2 = { pin = 27, inverted = false }
//! speed_mm_s = 5.0
//! stroke_mm = 150.0
//! safety_factor = 110
//!
//! [indicator]
//! pin = 22
//! inverted = true
//!
//! [store]
//! path = "/var/lib/reckon"
//!
//! [presets.stand]
//! stroke_mm = 110.0
//! indicator = "on"
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use reckon_core::config::{PinConfig, DEFAULT_SAFETY_FACTOR_PCT};
use reckon_core::state::IndicatorState;
use serde::Deserialize;

/// Default record directory
pub const DEFAULT_STORE_PATH: &str = "/var/lib/reckon";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub calibrate_on_start: bool,
    pub actuator: ActuatorSection,
    pub indicator: Option<PinSection>,
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub presets: BTreeMap<String, PresetSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActuatorSection {
    pub channel1: PinSection,
    pub channel2: PinSection,
    pub speed_mm_s: f32,
    pub stroke_mm: f32,
    #[serde(default = "default_safety_factor")]
    pub safety_factor: u16,
}

fn default_safety_factor() -> u16 {
    DEFAULT_SAFETY_FACTOR_PCT
}

/// A pin as a bare BCM number or a table with inversion
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum PinSection {
    Number(u8),
    Table {
        pin: u8,
        #[serde(default)]
        inverted: bool,
    },
}

impl From<PinSection> for PinConfig {
    fn from(section: PinSection) -> Self {
        match section {
            PinSection::Number(pin) => PinConfig::new(pin),
            PinSection::Table { pin, inverted } => PinConfig { pin, inverted },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    pub path: PathBuf,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PresetSection {
    pub stroke_mm: f32,
    #[serde(default)]
    pub indicator: IndicatorState,
}
