//! Dual-channel motor driver
//!
//! Drives a DC linear actuator through two digital outputs feeding an
//! H-bridge or relay pair:
//!
//! | Direction | Channel 1 | Channel 2 |
//! |-----------|-----------|-----------|
//! | retract   | high      | low       |
//! | extend    | low       | high      |
//! | stopped   | low       | low       |
//!
//! Both channels high would short the bridge, so the inactive channel is
//! always lowered before the active one is raised. The driver does no timing;
//! the controller decides how long it stays engaged.

use log::{debug, warn};
use reckon_core::motion::Direction;
use reckon_core::traits::{MotorDriver, MotorError};
use reckon_hal::{OutputPin, PinError};

/// Motor driven by a pair of direction outputs
pub struct DualChannelMotor<P> {
    channel1: P,
    channel2: P,
    /// Direction currently driven, if any
    driving: Option<Direction>,
}

impl<P: OutputPin> DualChannelMotor<P> {
    /// Take ownership of both channels
    ///
    /// The outputs are not touched until the first `drive` or `stop`.
    pub fn new(channel1: P, channel2: P) -> Self {
        Self {
            channel1,
            channel2,
            driving: None,
        }
    }

    /// Direction currently driven
    pub fn direction(&self) -> Option<Direction> {
        self.driving
    }

    /// Borrow the channel outputs (channel 1, channel 2)
    pub fn channels(&self) -> (&P, &P) {
        (&self.channel1, &self.channel2)
    }

    fn engage(&mut self, direction: Direction) -> Result<(), PinError> {
        let (inactive, active) = match direction {
            Direction::Retract => (&mut self.channel2, &mut self.channel1),
            Direction::Extend => (&mut self.channel1, &mut self.channel2),
        };
        inactive.set_low()?;
        active.set_high()
    }

    /// Lower both channels, attempting the second even if the first fails
    fn disengage(&mut self) -> Result<(), PinError> {
        let first = self.channel1.set_low();
        let second = self.channel2.set_low();
        first.and(second)
    }
}

impl<P: OutputPin> MotorDriver for DualChannelMotor<P> {
    fn drive(&mut self, direction: Direction) -> Result<(), MotorError> {
        if self.driving.is_some() {
            return Err(MotorError::AlreadyMoving);
        }

        debug!("Motor: engaging {}", direction);
        match self.engage(direction) {
            Ok(()) => {
                self.driving = Some(direction);
                Ok(())
            }
            Err(e) => {
                warn!("Motor: failed to engage {}: {}", direction, e);
                // Best effort; the engage error is the one reported
                let _ = self.disengage();
                Err(MotorError::OutputFault)
            }
        }
    }

    fn stop(&mut self) -> Result<(), MotorError> {
        let Some(direction) = self.driving.take() else {
            return Ok(());
        };

        debug!("Motor: stopping {}", direction);
        self.disengage().map_err(|e| {
            warn!("Motor: failed to stop: {}", e);
            MotorError::OutputFault
        })
    }

    fn release(&mut self) -> Result<(), MotorError> {
        let stopped = self.stop();
        self.channel1.release();
        self.channel2.release();
        stopped
    }

    fn is_running(&self) -> bool {
        self.driving.is_some()
    }
}
