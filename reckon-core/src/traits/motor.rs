//! Motor driver trait
//!
//! A motor driver translates a direction into an output pattern. It does no
//! timing of its own; how long the motor stays engaged is the caller's
//! business.

use crate::motion::Direction;

/// Errors that can occur with motor operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MotorError {
    /// A previous `drive` has not been matched by `stop`
    #[error("motor is already moving")]
    AlreadyMoving,
    /// An output channel failed to toggle or was already released
    #[error("motor output fault")]
    OutputFault,
}

/// Base trait for timed DC motor drivers
pub trait MotorDriver {
    /// Start turning in the given direction
    ///
    /// Fails with [`MotorError::AlreadyMoving`] while a previous drive is
    /// still active.
    fn drive(&mut self, direction: Direction) -> Result<(), MotorError>;

    /// Stop the motor (no drive signal)
    ///
    /// Idempotent: a no-op when the motor is not moving.
    fn stop(&mut self) -> Result<(), MotorError>;

    /// Stop, then hand the outputs back to the system
    ///
    /// Idempotent; safe to call more than once.
    fn release(&mut self) -> Result<(), MotorError>;

    /// Check if the motor is currently driven
    fn is_running(&self) -> bool;

    /// Check if the motor is fully stopped
    fn is_stopped(&self) -> bool {
        !self.is_running()
    }
}
