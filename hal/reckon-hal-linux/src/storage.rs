//! File-backed record storage
//!
//! One file per key under a directory, e.g. `/var/lib/reckon/device-state.bin`.
//! Writes go to a temporary file that is renamed over the record, so a crash
//! leaves either the old or the new record, never a torn one.
//!
//! File I/O is blocking. Records are a few dozen bytes and the binary runs
//! on a single-threaded executor, so the stall is negligible.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use reckon_hal::{RecordStorage, StorageError, StorageKey};

/// Record storage in a directory
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Store records under `dir`, created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding a key's record
    pub fn path(&self, key: StorageKey) -> PathBuf {
        self.dir.join(format!("{}.bin", key.name()))
    }
}

impl RecordStorage for FileStorage {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError> {
        let path = self.path(key);
        let data = fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound,
            _ => {
                warn!("Failed to read {}: {}", path.display(), e);
                StorageError::Read
            }
        })?;

        if data.len() > buffer.len() {
            return Err(StorageError::BufferTooSmall);
        }
        buffer[..data.len()].copy_from_slice(&data);
        Ok(data.len())
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError> {
        let path = self.path(key);
        let tmp = path.with_extension("bin.tmp");

        let result = fs::create_dir_all(&self.dir)
            .and_then(|()| fs::write(&tmp, data))
            .and_then(|()| fs::rename(&tmp, &path));

        match result {
            Ok(()) => {
                debug!("Wrote {} bytes to {}", data.len(), path.display());
                Ok(())
            }
            Err(e) => {
                warn!("Failed to write {}: {}", path.display(), e);
                let _ = fs::remove_file(&tmp);
                Err(StorageError::Write)
            }
        }
    }

    async fn exists(&mut self, key: StorageKey) -> bool {
        self.path(key).is_file()
    }

    async fn erase(&mut self, key: StorageKey) -> Result<(), StorageError> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => {
                warn!("Failed to erase {}: {}", key.name(), e);
                Err(StorageError::Write)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_dir_and_reads_back() {
        let dir = TempDir::new().unwrap();
        let mut storage = FileStorage::new(dir.path().join("nested"));
        let key = StorageKey::DeviceState;

        assert!(!block_on(storage.exists(key)));
        block_on(storage.write(key, &[1, 2, 3])).unwrap();
        assert!(block_on(storage.exists(key)));
        assert!(storage.path(key).ends_with("device-state.bin"));

        let mut buffer = [0u8; 8];
        let len = block_on(storage.read(key, &mut buffer)).unwrap();
        assert_eq!(&buffer[..len], &[1, 2, 3]);

        // Replaced wholesale, no temporary left behind
        block_on(storage.write(key, &[9])).unwrap();
        let len = block_on(storage.read(key, &mut buffer)).unwrap();
        assert_eq!(&buffer[..len], &[9]);
        assert!(!storage.path(key).with_extension("bin.tmp").exists());
    }

    #[test]
    fn test_missing_record() {
        let dir = TempDir::new().unwrap();
        let mut storage = FileStorage::new(dir.path());
        let mut buffer = [0u8; 8];

        assert_eq!(
            block_on(storage.read(StorageKey::DeviceState, &mut buffer)),
            Err(StorageError::NotFound)
        );
        // Erasing nothing is fine
        assert_eq!(block_on(storage.erase(StorageKey::DeviceState)), Ok(()));
    }

    #[test]
    fn test_oversized_record() {
        let dir = TempDir::new().unwrap();
        let mut storage = FileStorage::new(dir.path());
        let key = StorageKey::DeviceState;
        block_on(storage.write(key, &[0; 16])).unwrap();

        let mut buffer = [0u8; 4];
        assert_eq!(
            block_on(storage.read(key, &mut buffer)),
            Err(StorageError::BufferTooSmall)
        );

        block_on(storage.erase(key)).unwrap();
        assert!(!block_on(storage.exists(key)));
    }

    #[test]
    fn test_unwritable_location() {
        let dir = TempDir::new().unwrap();
        // A plain file where the record directory should be
        let blocker = dir.path().join("store");
        fs::write(&blocker, b"x").unwrap();

        let mut storage = FileStorage::new(&blocker);
        assert_eq!(
            block_on(storage.write(StorageKey::DeviceState, &[1])),
            Err(StorageError::Write)
        );
    }
}
