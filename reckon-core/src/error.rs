//! Domain error kinds
//!
//! Every failure the controller or the position store can report collapses
//! into one of these. None of them are retried automatically.

use crate::traits::MotorError;

/// Errors surfaced to the direct caller of an actuator operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Out-of-range duration, distance or position (caller error)
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
    /// A motion command is already in flight
    #[error("actuator is already moving")]
    AlreadyMoving,
    /// An output channel failed to toggle; motion was aborted
    #[error("motor driver fault")]
    DriverFault,
    /// The persisted record could not be read, created or written
    #[error("position store unavailable")]
    StoreUnavailable,
}

impl From<MotorError> for Error {
    fn from(e: MotorError) -> Self {
        match e {
            MotorError::AlreadyMoving => Error::AlreadyMoving,
            MotorError::OutputFault => Error::DriverFault,
        }
    }
}
