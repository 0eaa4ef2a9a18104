//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in reckon-core, built on the output and storage traits of reckon-hal:
//!
//! - Dual-channel motor driver (two digital outputs, no PWM)
//! - Linear actuator controller with open-loop position estimation
//! - LED indicator output
//! - Position store backed by keyed record storage

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod actuator;
pub mod indicator;
pub mod motor;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use actuator::LinearActuator;
pub use indicator::Indicator;
pub use motor::DualChannelMotor;
pub use store::{DeviceUpdates, PositionStore};
