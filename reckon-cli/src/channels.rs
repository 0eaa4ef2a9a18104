//! Inter-task communication
//!
//! Drivers notify committed changes here and the persistence loop drains
//! them. The SIGINT watcher thread raises [`INTERRUPT`].

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use reckon_drivers::DeviceUpdates;

/// Latest position and indicator state waiting to be written to the store
pub static DEVICE_UPDATES: DeviceUpdates<CriticalSectionRawMutex> = DeviceUpdates::new();

/// Raised once when the operator interrupts the process (Ctrl-C)
pub static INTERRUPT: Signal<CriticalSectionRawMutex, ()> = Signal::new();
