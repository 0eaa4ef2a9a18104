//! Raspberry Pi HAL for the actuator controller
//!
//! This crate provides Linux implementations of the shared `reckon-hal`
//! traits:
//!
//! - GPIO allocation by BCM number with active-low inversion
//! - File-backed record storage (implements `reckon_hal::RecordStorage`)

#![deny(unsafe_code)]

pub mod gpio;
pub mod storage;

pub use gpio::{LinuxGpio, LinuxOutput};
pub use storage::FileStorage;

// Re-export shared traits from reckon-hal for convenience
pub use reckon_hal::{OutputPin, RecordStorage, StorageKey};
