//! Operator commands
//!
//! Each invocation builds the device from the config and the persisted
//! record, runs one command, then releases the outputs.

use std::cell::Cell;
use std::convert::Infallible;
use std::future::pending;

use anyhow::{bail, Context, Result};
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embassy_sync::signal::Signal;
use embedded_hal_async::delay::DelayNs;
use reckon_core::config::PresetTable;
use reckon_core::motion::um_to_mm;
use reckon_core::state::{DeviceRecord, IndicatorState};
use reckon_core::traits::{ChangeListener, MotorDriver};
use reckon_drivers::{DeviceUpdates, DualChannelMotor, Indicator, LinearActuator};
use reckon_hal::OutputPin;
use reckon_hal_linux::{LinuxGpio, LinuxOutput};
use tracing::{info, warn};

use crate::channels::DEVICE_UPDATES;
use crate::cli::Command;
use crate::config::AppConfig;
use crate::delay::TimerDelay;

type Updates = &'static DeviceUpdates<CriticalSectionRawMutex>;

/// The device as wired on the Pi
pub type PiDevice = Device<DualChannelMotor<LinuxOutput>, TimerDelay, LinuxOutput, Updates>;

/// Actuator plus optional indicator
pub struct Device<M, D, P, L> {
    pub actuator: LinearActuator<M, D, L>,
    pub indicator: Option<Indicator<P, L>>,
}

/// Claim the GPIO outputs and restore the persisted state
pub fn open_device(config: &AppConfig, record: &DeviceRecord) -> Result<PiDevice> {
    let mut gpio = LinuxGpio::new().context("failed to open GPIO")?;

    let pins = config.hardware.motor;
    let channel1 = gpio
        .output(pins.channel1, true)
        .context("failed to claim motor channel 1")?;
    let channel2 = gpio
        .output(pins.channel2, true)
        .context("failed to claim motor channel 2")?;
    let actuator = LinearActuator::new(
        DualChannelMotor::new(channel1, channel2),
        TimerDelay,
        config.actuator.with_initial_position(record.position_um),
        &DEVICE_UPDATES,
    )?;

    let indicator = match config.hardware.indicator {
        Some(indicator) => {
            // Kept lit across process exit
            let output = gpio
                .output(indicator.output, false)
                .context("failed to claim indicator output")?;
            Some(Indicator::new(output, record.indicator, &DEVICE_UPDATES)?)
        }
        None => None,
    };

    Ok(Device {
        actuator,
        indicator,
    })
}

impl<M, D, P, L> Device<M, D, P, L>
where
    M: MotorDriver,
    D: DelayNs + Clone,
    P: OutputPin,
    L: ChangeListener<u32> + ChangeListener<IndicatorState>,
{
    /// Run one command
    ///
    /// With `home_first` the actuator is calibrated before the command.
    /// Raising `interrupt` stops the actuator; the move in flight commits
    /// as usual and the command fails before its next step.
    pub async fn execute<R: RawMutex>(
        &mut self,
        command: &Command,
        presets: &PresetTable,
        home_first: bool,
        interrupt: &Signal<R, ()>,
    ) -> Result<()> {
        let actuator = &self.actuator;
        let interrupted = Cell::new(false);

        let steps = Steps {
            actuator,
            indicator: self.indicator.as_mut(),
            interrupted: &interrupted,
        };
        let watch = async {
            interrupt.wait().await;
            warn!("Interrupted, stopping actuator");
            interrupted.set(true);
            if let Err(e) = actuator.stop() {
                warn!(error = %e, "Failed to stop actuator");
            }
            pending::<Infallible>().await
        };

        match select(steps.run(command, presets, home_first), watch).await {
            Either::First(outcome) => outcome,
            Either::Second(never) => match never {},
        }
    }

    /// Stop the motor and hand back every output
    ///
    /// The indicator keeps its level.
    pub fn release(&mut self) -> Result<()> {
        if let Some(indicator) = self.indicator.as_mut() {
            indicator.release();
        }
        self.actuator
            .release()
            .context("failed to release motor outputs")
    }
}

/// One command's worth of borrowed device state
struct Steps<'a, M, D, P, L> {
    actuator: &'a LinearActuator<M, D, L>,
    indicator: Option<&'a mut Indicator<P, L>>,
    interrupted: &'a Cell<bool>,
}

impl<M, D, P, L> Steps<'_, M, D, P, L>
where
    M: MotorDriver,
    D: DelayNs + Clone,
    P: OutputPin,
    L: ChangeListener<u32> + ChangeListener<IndicatorState>,
{
    async fn run(mut self, command: &Command, presets: &PresetTable, home_first: bool) -> Result<()> {
        if home_first {
            info!("Homing before command");
            self.actuator.calibrate().await.context("calibration failed")?;
            self.checkpoint()?;
        }

        match command {
            Command::Position { target_um } => {
                self.move_to(*target_um).await?;
            }
            Command::Preset { name } => {
                let preset = presets
                    .find(name)
                    .with_context(|| format!("unknown preset '{name}'"))?;
                info!(preset = %name, "Applying preset");
                self.move_to(preset.position_um).await?;
                self.checkpoint()?;
                match self.indicator.as_mut() {
                    Some(indicator) => indicator
                        .set_state(preset.indicator)
                        .context("failed to switch indicator")?,
                    None => warn!("No indicator configured, ignoring preset indicator state"),
                }
            }
            Command::Indicator { state } => {
                self.indicator
                    .as_mut()
                    .context("no indicator configured")?
                    .set_state(*state)
                    .context("failed to switch indicator")?;
            }
            Command::Calibrate => {
                if !home_first {
                    self.actuator.calibrate().await.context("calibration failed")?;
                    self.checkpoint()?;
                }
                if let Some(indicator) = self.indicator.as_mut() {
                    indicator.calibrate().context("failed to reset indicator")?;
                }
            }
            Command::Extend => {
                self.actuator.fully_extend().await.context("failed to extend")?;
            }
            Command::Retract => {
                self.actuator.fully_retract().await.context("failed to retract")?;
            }
            // Answered from the store without touching the outputs
            Command::State => {}
        }

        self.checkpoint()?;
        info!(position_mm = self.actuator.position_mm(), "Command complete");
        Ok(())
    }

    async fn move_to(&self, target_um: u32) -> Result<()> {
        self.actuator
            .set_position(target_um)
            .await
            .with_context(|| format!("failed to move to {:.3} mm", um_to_mm(target_um)))
    }

    fn checkpoint(&self) -> Result<()> {
        if self.interrupted.get() {
            bail!(
                "interrupted at {:.3} mm; run `calibrate` if the rod stopped short",
                self.actuator.position_mm()
            );
        }
        Ok(())
    }
}
