//! Command-line interface
//!
//! One operation per invocation; the process exits non-zero when it fails.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reckon_core::motion::mm_to_um;
use reckon_core::state::IndicatorState;

#[derive(Debug, Parser)]
#[command(name = "reckon")]
#[command(version)]
#[command(about = "Open-loop control of a linear actuator", long_about = None)]
pub struct Cli {
    /// Configuration file
    #[arg(
        short,
        long,
        env = "RECKON_CONFIG",
        default_value = "reckon.toml",
        value_name = "FILE"
    )]
    pub config: PathBuf,

    /// Home against the retracted end-stop before running the command
    #[arg(long, global = true)]
    pub calibrate: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Move to an absolute position
    Position {
        /// Target position in millimetres from fully retracted
        #[arg(value_name = "MM", value_parser = parse_mm)]
        target_um: u32,
    },

    /// Move to a named preset and apply its indicator state
    Preset {
        /// Preset name from the configuration
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Switch the indicator on or off
    Indicator {
        #[arg(value_name = "on|off")]
        state: IndicatorState,
    },

    /// Print the persisted position and indicator state
    State,

    /// Home against the retracted end-stop and zero the position
    Calibrate,

    /// Extend to the end of the stroke
    Extend,

    /// Retract to the start of the stroke
    Retract,
}

impl Command {
    /// Check if the command needs GPIO access
    pub fn uses_hardware(&self) -> bool {
        !matches!(self, Command::State)
    }
}

fn parse_mm(value: &str) -> Result<u32, String> {
    let mm: f32 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    mm_to_um(mm).ok_or_else(|| format!("'{value}' is not a valid length"))
}
