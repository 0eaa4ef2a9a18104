//! Change notification hooks
//!
//! Drivers report committed state changes (actuator position, indicator
//! state) through a [`ChangeListener`]. The listener decides whether the
//! work happens inline or is handed to another task; the driver only logs a
//! failure and carries on.

/// A listener refused or failed to take a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("change notification failed")]
pub struct NotifyError;

/// Receiver of committed state changes
pub trait ChangeListener<T> {
    /// Called after every committed change with the new value
    fn changed(&self, value: T) -> Result<(), NotifyError>;
}

/// No listener: notifications are dropped
impl<T> ChangeListener<T> for () {
    fn changed(&self, _value: T) -> Result<(), NotifyError> {
        Ok(())
    }
}

impl<T, L: ChangeListener<T> + ?Sized> ChangeListener<T> for &L {
    fn changed(&self, value: T) -> Result<(), NotifyError> {
        (**self).changed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct Recorder(Cell<Option<u32>>);

    impl ChangeListener<u32> for Recorder {
        fn changed(&self, value: u32) -> Result<(), NotifyError> {
            self.0.set(Some(value));
            Ok(())
        }
    }

    #[test]
    fn test_unit_listener_accepts_everything() {
        assert_eq!(().changed(42u32), Ok(()));
    }

    #[test]
    fn test_reference_forwards_to_listener() {
        let recorder = Recorder(Cell::new(None));
        let by_ref = &recorder;
        by_ref.changed(7).unwrap();
        assert_eq!(recorder.0.get(), Some(7));
    }
}
