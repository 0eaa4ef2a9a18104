//! Board-agnostic core logic for the open-loop actuator controller
//!
//! This crate contains all logic that does not depend on specific hardware
//! or runtime:
//!
//! - Hardware abstraction traits (motor driver, change listeners)
//! - Motion math: safety bounds, duration/distance conversion, clamping
//! - Persisted device record with integrity checking
//! - Configuration type definitions and validation
//! - The domain error kinds

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod motion;
pub mod state;
pub mod traits;

pub use error::Error;
