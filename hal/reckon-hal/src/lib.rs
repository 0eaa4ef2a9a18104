//! Reckon Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the actuator core consumes.
//! Board bindings (Raspberry Pi via `reckon-hal-linux`, host fakes in tests)
//! implement them, so the same driver code runs everywhere.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  reckon-cli / reckon-drivers            │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  reckon-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ reckon-hal-   │       │  test fakes   │
//! │    linux      │       │               │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Digital output with explicit release
//! - [`storage::RecordStorage`] - Persistent keyed record storage

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod storage;

// Re-export key traits at crate root for convenience
pub use gpio::{OutputPin, PinError};
pub use storage::{RecordStorage, StorageError, StorageKey};
