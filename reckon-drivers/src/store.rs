//! Position store
//!
//! Loads and saves the [`DeviceRecord`] through a [`RecordStorage`] binding.
//! The record is postcard-encoded behind a magic number, version and CRC; a
//! record that fails any of those checks is replaced by defaults rather than
//! trusted.
//!
//! Drivers do not write the store directly. They notify a [`DeviceUpdates`]
//! listener, which only latches the latest value; the store drains it from
//! its own loop so a slow medium never holds up a motion.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::{NoopRawMutex, RawMutex};
use embassy_sync::signal::Signal;
use log::{debug, error, info, warn};

use reckon_core::state::{DeviceRecord, IndicatorState};
use reckon_core::traits::{ChangeListener, NotifyError};
use reckon_core::Error;
use reckon_hal::{RecordStorage, StorageError, StorageKey};

/// Maximum serialized record size
const MAX_RECORD_SIZE: usize = 32;

/// Why a stored record was not used
#[derive(Debug, Clone, Copy)]
enum RecordError {
    /// Storage operation failed
    Storage(StorageError),
    /// Deserialization failed
    Deserialize,
    /// CRC check failed
    CrcMismatch,
    /// Invalid magic or version
    InvalidFormat,
}

impl From<StorageError> for RecordError {
    fn from(e: StorageError) -> Self {
        RecordError::Storage(e)
    }
}

/// Latest committed changes waiting to be persisted
///
/// Implements [`ChangeListener`] for both the actuator position and the
/// indicator state. Each value is latched, so a burst of changes collapses
/// into one write of the most recent value.
pub struct DeviceUpdates<M: RawMutex = NoopRawMutex> {
    position: Signal<M, u32>,
    indicator: Signal<M, IndicatorState>,
}

impl<M: RawMutex> DeviceUpdates<M> {
    pub const fn new() -> Self {
        Self {
            position: Signal::new(),
            indicator: Signal::new(),
        }
    }

    /// Check if any change is waiting
    pub fn is_pending(&self) -> bool {
        self.position.signaled() || self.indicator.signaled()
    }
}

impl<M: RawMutex> Default for DeviceUpdates<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> ChangeListener<u32> for DeviceUpdates<M> {
    fn changed(&self, position_um: u32) -> Result<(), NotifyError> {
        self.position.signal(position_um);
        Ok(())
    }
}

impl<M: RawMutex> ChangeListener<IndicatorState> for DeviceUpdates<M> {
    fn changed(&self, state: IndicatorState) -> Result<(), NotifyError> {
        self.indicator.signal(state);
        Ok(())
    }
}

/// Persistent home of the device record
pub struct PositionStore<S> {
    storage: S,
    record: DeviceRecord,
    /// First write failure since the last flush
    failure: Option<Error>,
}

impl<S: RecordStorage> PositionStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            record: DeviceRecord::new(),
            failure: None,
        }
    }

    /// Last loaded or saved record
    pub fn record(&self) -> &DeviceRecord {
        &self.record
    }

    /// Give the storage binding back
    pub fn into_inner(self) -> S {
        self.storage
    }

    /// Load the device record
    ///
    /// A missing record is created with defaults. A corrupt one is logged
    /// and replaced by defaults. Fails with [`Error::StoreUnavailable`] only
    /// when the medium itself cannot be read or written.
    pub async fn load(&mut self) -> Result<DeviceRecord, Error> {
        if !self.storage.exists(StorageKey::DeviceState).await {
            info!("No device record, creating defaults");
            return self.reset().await;
        }

        match self.load_inner().await {
            Ok(record) => {
                info!("Loaded {}", record);
                self.record = record;
                Ok(record)
            }
            Err(RecordError::Storage(StorageError::NotFound)) => {
                debug!("Device record vanished, creating defaults");
                self.reset().await
            }
            Err(RecordError::Storage(StorageError::BufferTooSmall)) => {
                warn!("Device record oversized, using defaults");
                self.reset().await
            }
            Err(RecordError::Storage(e)) => {
                error!("Failed to read device record: {}", e);
                Err(Error::StoreUnavailable)
            }
            Err(e) => {
                warn!("Failed to load device record: {:?}, using defaults", e);
                self.reset().await
            }
        }
    }

    async fn load_inner(&mut self) -> Result<DeviceRecord, RecordError> {
        let mut buffer = [0u8; MAX_RECORD_SIZE];
        let len = self
            .storage
            .read(StorageKey::DeviceState, &mut buffer)
            .await?;

        debug!("Read {} bytes of device record", len);

        let record: DeviceRecord =
            postcard::from_bytes(&buffer[..len]).map_err(|_| RecordError::Deserialize)?;

        if !record.is_valid() {
            return Err(RecordError::InvalidFormat);
        }
        if !record.verify_crc() {
            return Err(RecordError::CrcMismatch);
        }

        Ok(record)
    }

    async fn reset(&mut self) -> Result<DeviceRecord, Error> {
        let record = DeviceRecord::new();
        self.save(record).await?;
        Ok(self.record)
    }

    /// Replace the stored record
    ///
    /// The CRC is recomputed before writing. The in-memory copy is updated
    /// even when the write fails.
    pub async fn save(&mut self, mut record: DeviceRecord) -> Result<(), Error> {
        record.update_crc();
        self.record = record;

        let mut buffer = [0u8; MAX_RECORD_SIZE];
        let bytes = postcard::to_slice(&record, &mut buffer).map_err(|_| {
            error!("Failed to encode device record");
            Error::StoreUnavailable
        })?;

        debug!("Saving {} bytes of device record", bytes.len());

        self.storage
            .write(StorageKey::DeviceState, bytes)
            .await
            .map_err(|e| {
                error!("Failed to save device record: {}", e);
                Error::StoreUnavailable
            })?;

        debug!("Saved {}", record);
        Ok(())
    }

    /// Store a new actuator position, keeping the other fields
    pub async fn update_position(&mut self, position_um: u32) -> Result<(), Error> {
        let record = DeviceRecord {
            position_um,
            ..self.record
        };
        self.save(record).await
    }

    /// Store a new indicator state, keeping the other fields
    pub async fn update_indicator(&mut self, indicator: IndicatorState) -> Result<(), Error> {
        let record = DeviceRecord {
            indicator,
            ..self.record
        };
        self.save(record).await
    }

    /// Persist updates as they arrive; never returns
    ///
    /// Meant to run alongside the command that produces the updates. Write
    /// failures are logged and reported by the next [`flush`](Self::flush).
    pub async fn run<M: RawMutex>(&mut self, updates: &DeviceUpdates<M>) {
        info!("Persistence loop started");

        loop {
            let result = match select(updates.position.wait(), updates.indicator.wait()).await {
                Either::First(position_um) => self.update_position(position_um).await,
                Either::Second(state) => self.update_indicator(state).await,
            };
            self.note(result);
        }
    }

    /// Persist whatever is still pending, then report any write failure
    /// seen since the last flush
    pub async fn flush<M: RawMutex>(&mut self, updates: &DeviceUpdates<M>) -> Result<(), Error> {
        let position = updates.position.try_take();
        let indicator = updates.indicator.try_take();

        if position.is_some() || indicator.is_some() {
            let record = DeviceRecord {
                position_um: position.unwrap_or(self.record.position_um),
                indicator: indicator.unwrap_or(self.record.indicator),
                ..self.record
            };
            let result = self.save(record).await;
            self.note(result);
        }

        match self.failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn note(&mut self, result: Result<(), Error>) {
        if let Err(e) = result {
            self.failure.get_or_insert(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::LinearActuator;
    use crate::motor::DualChannelMotor;
    use crate::testing::{FakeDelay, MemoryStorage, MockPin, PinLog};
    use embassy_futures::{block_on, yield_now};
    use reckon_core::config::ActuatorConfig;
    use reckon_core::motion::Direction;

    fn stored(storage: &MemoryStorage) -> Option<&[u8]> {
        storage
            .records
            .get(&StorageKey::DeviceState.as_u8())
            .map(|v| v.as_slice())
    }

    #[test]
    fn test_missing_record_created_with_defaults() {
        let mut store = PositionStore::new(MemoryStorage::new());

        let record = block_on(store.load()).unwrap();
        assert_eq!(record.position_um, 0);
        assert_eq!(record.indicator, IndicatorState::Off);
        assert!(record.verify_crc());

        let storage = store.into_inner();
        assert_eq!(storage.writes, 1);
        assert!(stored(&storage).is_some());
    }

    #[test]
    fn test_save_then_reload() {
        let mut store = PositionStore::new(MemoryStorage::new());
        block_on(store.load()).unwrap();
        block_on(store.update_position(100_000)).unwrap();
        block_on(store.update_indicator(IndicatorState::On)).unwrap();

        let mut reloaded = PositionStore::new(store.into_inner());
        let record = block_on(reloaded.load()).unwrap();
        assert_eq!(record.position_um, 100_000);
        assert_eq!(record.indicator, IndicatorState::On);
    }

    #[test]
    fn test_corrupt_record_replaced_by_defaults() {
        let mut storage = MemoryStorage::new();
        storage
            .records
            .insert(StorageKey::DeviceState.as_u8(), std::vec![0xFF; 4]);

        let mut store = PositionStore::new(storage);
        let record = block_on(store.load()).unwrap();
        assert_eq!(record, *store.record());
        assert_eq!(record.position_um, 0);
        assert_eq!(store.into_inner().writes, 1);
    }

    #[test]
    fn test_crc_mismatch_replaced_by_defaults() {
        let mut record = DeviceRecord::new();
        record.position_um = 42_000;
        record.update_crc();
        record.position_um = 43_000;

        let mut buffer = [0u8; MAX_RECORD_SIZE];
        let bytes = postcard::to_slice(&record, &mut buffer).unwrap().to_vec();
        let mut storage = MemoryStorage::new();
        storage.records.insert(StorageKey::DeviceState.as_u8(), bytes);

        let mut store = PositionStore::new(storage);
        assert_eq!(block_on(store.load()).unwrap().position_um, 0);
    }

    #[test]
    fn test_unreadable_medium_is_unavailable() {
        let mut storage = MemoryStorage::new();
        storage
            .records
            .insert(StorageKey::DeviceState.as_u8(), std::vec![0; 4]);
        storage.fail_reads = true;

        let mut store = PositionStore::new(storage);
        assert_eq!(block_on(store.load()), Err(Error::StoreUnavailable));
    }

    #[test]
    fn test_uncreatable_record_is_unavailable() {
        let mut storage = MemoryStorage::new();
        storage.fail_writes = true;

        let mut store = PositionStore::new(storage);
        assert_eq!(block_on(store.load()), Err(Error::StoreUnavailable));
    }

    #[test]
    fn test_failed_update_keeps_memory_copy() {
        let mut store = PositionStore::new(MemoryStorage::new());
        block_on(store.load()).unwrap();

        store.storage.fail_writes = true;
        assert_eq!(
            block_on(store.update_position(70_000)),
            Err(Error::StoreUnavailable)
        );
        assert_eq!(store.record().position_um, 70_000);
    }

    #[test]
    fn test_updates_collapse_to_latest() {
        let updates: DeviceUpdates = DeviceUpdates::new();
        let mut store = PositionStore::new(MemoryStorage::new());
        block_on(store.load()).unwrap();

        updates.changed(10_000u32).unwrap();
        updates.changed(20_000u32).unwrap();
        updates.changed(IndicatorState::On).unwrap();
        assert!(updates.is_pending());

        block_on(store.flush(&updates)).unwrap();
        assert!(!updates.is_pending());
        assert_eq!(store.record().position_um, 20_000);
        assert_eq!(store.record().indicator, IndicatorState::On);
        // Creation plus one flush
        assert_eq!(store.into_inner().writes, 2);
    }

    #[test]
    fn test_run_persists_while_command_runs() {
        let updates: DeviceUpdates = DeviceUpdates::new();
        let mut store = PositionStore::new(MemoryStorage::new());
        block_on(store.load()).unwrap();

        let outcome = block_on(select(store.run(&updates), async {
            updates.changed(30_000u32).unwrap();
            yield_now().await;
            yield_now().await;
        }));
        assert!(matches!(outcome, Either::Second(())));
        assert!(!updates.is_pending());
        assert_eq!(store.record().position_um, 30_000);
        block_on(store.flush(&updates)).unwrap();
    }

    #[test]
    fn test_flush_reports_failures_from_run() {
        let updates: DeviceUpdates = DeviceUpdates::new();
        let mut store = PositionStore::new(MemoryStorage::new());
        block_on(store.load()).unwrap();
        store.storage.fail_writes = true;

        block_on(select(store.run(&updates), async {
            updates.changed(IndicatorState::On).unwrap();
            yield_now().await;
            yield_now().await;
        }));

        assert_eq!(block_on(store.flush(&updates)), Err(Error::StoreUnavailable));
        // Reported once
        assert_eq!(block_on(store.flush(&updates)), Ok(()));
    }

    #[test]
    fn test_position_survives_restart() {
        let updates: DeviceUpdates = DeviceUpdates::new();
        let mut store = PositionStore::new(MemoryStorage::new());
        let initial = block_on(store.load()).unwrap();

        let log = PinLog::default();
        let motor = DualChannelMotor::new(MockPin::new(1, &log), MockPin::new(2, &log));
        let config = ActuatorConfig::default().with_initial_position(initial.position_um);
        let actuator = LinearActuator::new(motor, FakeDelay::new(), config, &updates).unwrap();

        block_on(actuator.move_by_distance(Direction::Extend, 42_000)).unwrap();
        block_on(store.flush(&updates)).unwrap();

        let mut restarted = PositionStore::new(store.into_inner());
        let record = block_on(restarted.load()).unwrap();
        assert_eq!(record.position_um, actuator.position_um());
        assert_eq!(record.position_um, 42_000);
    }
}
