//! Hardware abstraction traits
//!
//! These traits define the interface between the actuator logic and the
//! concrete drivers and persistence plumbing.

pub mod listener;
pub mod motor;

pub use listener::{ChangeListener, NotifyError};
pub use motor::{MotorDriver, MotorError};
