//! Record storage abstraction
//!
//! Provides a small keyed record store. The actuator core keeps exactly one
//! record per device; bindings decide where the bytes live (a file on the
//! Pi, a buffer in tests).

use thiserror::Error;

/// Storage keys for persisted records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StorageKey {
    /// Last committed actuator position and indicator state
    DeviceState = 0,
}

impl StorageKey {
    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a key from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageKey::DeviceState),
            _ => None,
        }
    }

    /// Stable name used by bindings that store one file per key
    pub fn name(self) -> &'static str {
        match self {
            StorageKey::DeviceState => "device-state",
        }
    }
}

/// Errors from storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Key not found
    #[error("record not found")]
    NotFound,
    /// Buffer too small for the data
    #[error("record larger than buffer")]
    BufferTooSmall,
    /// Backing medium could not be read
    #[error("storage read failed")]
    Read,
    /// Backing medium could not be written or created
    #[error("storage write failed")]
    Write,
}

/// Record storage trait
///
/// Writes replace the whole record for a key. Implementations should make a
/// write atomic where the medium allows it, so a crash leaves either the old
/// or the new record.
pub trait RecordStorage {
    /// Read a record by key into the provided buffer
    ///
    /// # Returns
    /// The number of bytes read, or an error.
    fn read(
        &mut self,
        key: StorageKey,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, StorageError>>;

    /// Write a record by key
    fn write(
        &mut self,
        key: StorageKey,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<(), StorageError>>;

    /// Check if a record exists
    fn exists(&mut self, key: StorageKey) -> impl core::future::Future<Output = bool>;

    /// Remove a record
    fn erase(
        &mut self,
        key: StorageKey,
    ) -> impl core::future::Future<Output = Result<(), StorageError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trips_through_byte() {
        let key = StorageKey::DeviceState;
        assert_eq!(StorageKey::from_u8(key.as_u8()), Some(key));
        assert_eq!(StorageKey::from_u8(7), None);
    }
}
