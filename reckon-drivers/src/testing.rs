//! Host fakes shared by the driver tests

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal_async::delay::DelayNs;
use reckon_core::traits::{ChangeListener, NotifyError};
use reckon_hal::{OutputPin, PinError, RecordStorage, StorageError, StorageKey};

/// Level changes of every pin sharing the log, in call order
pub type PinLog = Rc<RefCell<Vec<(u8, bool)>>>;

/// Output pin that records every level change
pub struct MockPin {
    id: u8,
    high: bool,
    released: bool,
    release_count: Rc<Cell<u32>>,
    fail: Rc<Cell<bool>>,
    log: PinLog,
}

impl MockPin {
    pub fn new(id: u8, log: &PinLog) -> Self {
        Self {
            id,
            high: false,
            released: false,
            release_count: Rc::new(Cell::new(0)),
            fail: Rc::new(Cell::new(false)),
            log: log.clone(),
        }
    }

    /// Handle that makes the next `set_*` calls fail while true
    pub fn fail_handle(&self) -> Rc<Cell<bool>> {
        self.fail.clone()
    }

    /// Handle counting `release` calls
    pub fn release_handle(&self) -> Rc<Cell<u32>> {
        self.release_count.clone()
    }

    fn set(&mut self, high: bool) -> Result<(), PinError> {
        if self.released {
            return Err(PinError::Released(self.id));
        }
        if self.fail.get() {
            return Err(PinError::Io(self.id));
        }
        self.high = high;
        self.log.borrow_mut().push((self.id, high));
        Ok(())
    }
}

impl OutputPin for MockPin {
    fn set_high(&mut self) -> Result<(), PinError> {
        self.set(true)
    }

    fn set_low(&mut self) -> Result<(), PinError> {
        self.set(false)
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.release_count.set(self.release_count.get() + 1);
        }
    }

    fn is_set_high(&self) -> bool {
        self.high
    }

    fn is_released(&self) -> bool {
        self.released
    }
}

/// Replay a pin log and check the two pins were never high together
pub fn never_both_high(log: &PinLog, a: u8, b: u8) -> bool {
    let mut levels = BTreeMap::new();
    log.borrow().iter().all(|&(id, high)| {
        levels.insert(id, high);
        !(levels.get(&a) == Some(&true) && levels.get(&b) == Some(&true))
    })
}

/// Last level written to a pin
pub fn last_level(log: &PinLog, id: u8) -> Option<bool> {
    log.borrow()
        .iter()
        .rev()
        .find(|&&(pin, _)| pin == id)
        .map(|&(_, high)| high)
}

/// Delay that completes instantly and accounts the requested time
///
/// With `hold` set, the delay never completes, standing in for a motion
/// that is still running.
#[derive(Clone, Default)]
pub struct FakeDelay {
    elapsed_ns: Rc<Cell<u64>>,
    requests_ms: Rc<RefCell<Vec<u32>>>,
    hold: Rc<Cell<bool>>,
}

impl FakeDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn holding() -> Self {
        let delay = Self::default();
        delay.hold.set(true);
        delay
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns.get() / 1_000_000
    }

    pub fn requests_ms(&self) -> Vec<u32> {
        self.requests_ms.borrow().clone()
    }

    pub fn set_hold(&self, hold: bool) {
        self.hold.set(hold);
    }

    async fn wait(&self, ns: u64) {
        self.elapsed_ns.set(self.elapsed_ns.get() + ns);
        if self.hold.get() {
            core::future::pending::<()>().await;
        }
    }
}

impl DelayNs for FakeDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.wait(ns as u64).await;
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.requests_ms.borrow_mut().push(ms);
        self.wait(ms as u64 * 1_000_000).await;
    }
}

/// Listener that records every value, optionally refusing them
#[derive(Default)]
pub struct Recorder<T> {
    pub values: RefCell<Vec<T>>,
    pub fail: Cell<bool>,
}

impl<T> Recorder<T> {
    pub fn new() -> Self {
        Self {
            values: RefCell::new(Vec::new()),
            fail: Cell::new(false),
        }
    }

    pub fn failing() -> Self {
        let recorder = Self::new();
        recorder.fail.set(true);
        recorder
    }
}

impl<T: Copy> Recorder<T> {
    pub fn last(&self) -> Option<T> {
        self.values.borrow().last().copied()
    }
}

impl<T> ChangeListener<T> for Recorder<T> {
    fn changed(&self, value: T) -> Result<(), NotifyError> {
        self.values.borrow_mut().push(value);
        if self.fail.get() {
            Err(NotifyError)
        } else {
            Ok(())
        }
    }
}

/// Record storage held in memory
#[derive(Default)]
pub struct MemoryStorage {
    pub records: BTreeMap<u8, Vec<u8>>,
    pub fail_reads: bool,
    pub fail_writes: bool,
    pub writes: u32,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStorage for MemoryStorage {
    async fn read(&mut self, key: StorageKey, buf: &mut [u8]) -> Result<usize, StorageError> {
        if self.fail_reads {
            return Err(StorageError::Read);
        }
        let data = self
            .records
            .get(&key.as_u8())
            .ok_or(StorageError::NotFound)?;
        if data.len() > buf.len() {
            return Err(StorageError::BufferTooSmall);
        }
        buf[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Write);
        }
        self.writes += 1;
        self.records.insert(key.as_u8(), data.to_vec());
        Ok(())
    }

    async fn exists(&mut self, key: StorageKey) -> bool {
        self.records.contains_key(&key.as_u8())
    }

    async fn erase(&mut self, key: StorageKey) -> Result<(), StorageError> {
        self.records.remove(&key.as_u8());
        Ok(())
    }
}
