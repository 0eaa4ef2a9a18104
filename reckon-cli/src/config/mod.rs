//! Configuration loading
//!
//! Reads the TOML file once at startup and turns it into the validated
//! reckon-core configuration types. Nothing else reads configuration.

mod file;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use reckon_core::config::{
    ActuatorConfig, HardwareConfig, IndicatorConfig, MotorPins, Preset, PresetTable,
};
use reckon_core::motion::{mm_s_to_um_s, mm_to_um, um_to_mm};
use tracing::{debug, info};

use file::ConfigFile;

/// Everything the binary needs to build a device
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub actuator: ActuatorConfig,
    pub hardware: HardwareConfig,
    pub presets: PresetTable,
    /// Directory holding the device record
    pub store_dir: PathBuf,
    /// Home before every hardware command
    pub calibrate_on_start: bool,
}

impl AppConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading configuration from {}", path.display());
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))?;
        log_config_summary(&config);
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn parse(text: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(text)?;
        Self::from_file(file)
    }

    fn from_file(file: ConfigFile) -> Result<Self> {
        let section = file.actuator;
        let actuator = ActuatorConfig {
            speed_um_s: mm_s_to_um_s(section.speed_mm_s)
                .ok_or_else(|| anyhow!("actuator.speed_mm_s must be a non-negative number"))?,
            stroke_um: length(section.stroke_mm, "actuator.stroke_mm")?,
            safety_factor_pct: section.safety_factor,
            initial_position_um: 0,
        };
        actuator.validate().context("actuator")?;

        let hardware = HardwareConfig {
            motor: MotorPins {
                channel1: section.channel1.into(),
                channel2: section.channel2.into(),
            },
            indicator: file.indicator.map(|pin| IndicatorConfig { output: pin.into() }),
        };
        hardware.validate()?;

        let mut presets = PresetTable::new();
        for (name, preset) in &file.presets {
            let position_um = length(preset.stroke_mm, "presets.*.stroke_mm")
                .with_context(|| format!("preset '{name}'"))?;
            let entry = Preset::new(name, position_um, preset.indicator)
                .with_context(|| format!("preset '{name}'"))?;
            presets
                .insert(entry, actuator.stroke_um)
                .with_context(|| format!("preset '{name}'"))?;
        }

        Ok(Self {
            actuator,
            hardware,
            presets,
            store_dir: file.store.path,
            calibrate_on_start: file.calibrate_on_start,
        })
    }
}

fn length(mm: f32, field: &str) -> Result<u32> {
    mm_to_um(mm).ok_or_else(|| anyhow!("{field} must be a non-negative length, got {mm}"))
}

fn log_config_summary(config: &AppConfig) {
    let bounds = config.actuator.bounds();
    info!(
        stroke_mm = um_to_mm(bounds.stroke_um),
        speed_mm_s = um_to_mm(bounds.speed_um_s),
        max_move_ms = bounds.max_duration_ms,
        "Actuator configured"
    );
    debug!(
        channel1 = config.hardware.motor.channel1.pin,
        channel2 = config.hardware.motor.channel2.pin,
        indicator = ?config.hardware.indicator.map(|i| i.output.pin),
        presets = config.presets.len(),
        store = %config.store_dir.display(),
        "Hardware configured"
    );
}
