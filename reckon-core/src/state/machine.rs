//! Controller state machine
//!
//! `Idle` → `Moving` → `Idle`. There are no other states: every failure
//! path ends back in `Idle` once the motor has been stopped.

use crate::motion::MotionCommand;
use crate::Error;

/// Motion controller states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionState {
    /// Not moving; ready for a command
    #[default]
    Idle,
    /// Motor engaged, timer running
    Moving(MotionCommand),
}

impl MotionState {
    /// Check if a command is in flight
    pub fn is_moving(&self) -> bool {
        matches!(self, MotionState::Moving(_))
    }

    /// The in-flight command, if any
    pub fn command(&self) -> Option<MotionCommand> {
        match self {
            MotionState::Moving(cmd) => Some(*cmd),
            MotionState::Idle => None,
        }
    }

    /// Enter `Moving`
    ///
    /// Only legal from `Idle`; a second command while one is in flight is
    /// rejected, never queued.
    pub fn begin(self, command: MotionCommand) -> Result<Self, Error> {
        match self {
            MotionState::Idle => Ok(MotionState::Moving(command)),
            MotionState::Moving(_) => Err(Error::AlreadyMoving),
        }
    }

    /// Return to `Idle`
    pub fn finish(self) -> Self {
        MotionState::Idle
    }
}
