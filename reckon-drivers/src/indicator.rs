//! LED indicator output
//!
//! A single switched output. Levels here are logical: "high" means lit, and
//! the pin binding applies any active-low inversion.

use log::{debug, info, warn};
use reckon_core::state::IndicatorState;
use reckon_core::traits::ChangeListener;
use reckon_core::Error;
use reckon_hal::OutputPin;

/// On/off indicator with change notification
pub struct Indicator<P, L = ()> {
    output: P,
    state: IndicatorState,
    listener: L,
}

impl<P: OutputPin, L: ChangeListener<IndicatorState>> Indicator<P, L> {
    /// Take the output and drive it to the restored state
    ///
    /// Restoring does not notify the listener.
    pub fn new(mut output: P, initial: IndicatorState, listener: L) -> Result<Self, Error> {
        output.set_state(initial.is_on()).map_err(|_| Error::DriverFault)?;
        debug!("Indicator restored {}", initial);

        Ok(Self {
            output,
            state: initial,
            listener,
        })
    }

    pub fn state(&self) -> IndicatorState {
        self.state
    }

    pub fn is_on(&self) -> bool {
        self.state.is_on()
    }

    pub fn on(&mut self) -> Result<(), Error> {
        self.set_state(IndicatorState::On)
    }

    pub fn off(&mut self) -> Result<(), Error> {
        self.set_state(IndicatorState::Off)
    }

    pub fn toggle(&mut self) -> Result<(), Error> {
        self.set_state(self.state.toggled())
    }

    /// Switch to a state; asking for the current state does nothing
    pub fn set_state(&mut self, state: IndicatorState) -> Result<(), Error> {
        if state == self.state {
            return Ok(());
        }

        self.output
            .set_state(state.is_on())
            .map_err(|_| Error::DriverFault)?;
        self.state = state;
        info!("Indicator {}", state);

        if let Err(e) = self.listener.changed(state) {
            warn!("Indicator change notification failed: {}", e);
        }
        Ok(())
    }

    /// Force the indicator into a known state (off)
    ///
    /// Writes the output even when the state already reads off, since the
    /// physical output may not match after a crash.
    pub fn calibrate(&mut self) -> Result<(), Error> {
        self.output.set_low().map_err(|_| Error::DriverFault)?;
        if self.state.is_on() {
            self.state = IndicatorState::Off;
            if let Err(e) = self.listener.changed(IndicatorState::Off) {
                warn!("Indicator change notification failed: {}", e);
            }
        }
        Ok(())
    }

    /// Hand the output back without switching it
    ///
    /// The indicator keeps its level after the process exits when the
    /// binding is configured not to reset on release. Idempotent.
    pub fn release(&mut self) {
        self.output.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{last_level, MockPin, PinLog, Recorder};

    #[test]
    fn test_restore_drives_output_without_notifying() {
        let log = PinLog::default();
        let recorder = Recorder::new();
        let indicator = Indicator::new(MockPin::new(7, &log), IndicatorState::On, &recorder).unwrap();

        assert!(indicator.is_on());
        assert_eq!(last_level(&log, 7), Some(true));
        assert!(recorder.values.borrow().is_empty());
    }

    #[test]
    fn test_on_off_toggle() {
        let log = PinLog::default();
        let recorder = Recorder::new();
        let mut indicator =
            Indicator::new(MockPin::new(7, &log), IndicatorState::Off, &recorder).unwrap();

        indicator.on().unwrap();
        assert_eq!(last_level(&log, 7), Some(true));
        indicator.toggle().unwrap();
        assert_eq!(indicator.state(), IndicatorState::Off);
        assert_eq!(last_level(&log, 7), Some(false));

        assert_eq!(
            *recorder.values.borrow(),
            [IndicatorState::On, IndicatorState::Off]
        );
    }

    #[test]
    fn test_redundant_request_is_noop() {
        let log = PinLog::default();
        let recorder = Recorder::new();
        let mut indicator =
            Indicator::new(MockPin::new(7, &log), IndicatorState::On, &recorder).unwrap();
        let writes = log.borrow().len();

        indicator.on().unwrap();
        assert_eq!(log.borrow().len(), writes);
        assert!(recorder.values.borrow().is_empty());
    }

    #[test]
    fn test_calibrate_forces_off() {
        let log = PinLog::default();
        let recorder = Recorder::new();
        let mut indicator =
            Indicator::new(MockPin::new(7, &log), IndicatorState::On, &recorder).unwrap();

        indicator.calibrate().unwrap();
        assert_eq!(indicator.state(), IndicatorState::Off);
        assert_eq!(last_level(&log, 7), Some(false));
        assert_eq!(recorder.last(), Some(IndicatorState::Off));

        // Already off: output rewritten, no second notification
        indicator.calibrate().unwrap();
        assert_eq!(recorder.values.borrow().len(), 1);
    }

    #[test]
    fn test_output_failure_keeps_state() {
        let log = PinLog::default();
        let pin = MockPin::new(7, &log);
        let fail = pin.fail_handle();
        let mut indicator = Indicator::new(pin, IndicatorState::Off, ()).unwrap();

        fail.set(true);
        assert_eq!(indicator.on(), Err(Error::DriverFault));
        assert_eq!(indicator.state(), IndicatorState::Off);
    }

    #[test]
    fn test_release_keeps_level() {
        let log = PinLog::default();
        let pin = MockPin::new(7, &log);
        let releases = pin.release_handle();
        let mut indicator = Indicator::new(pin, IndicatorState::On, ()).unwrap();

        indicator.release();
        indicator.release();
        assert_eq!(releases.get(), 1);
        assert_eq!(last_level(&log, 7), Some(true));
        assert_eq!(indicator.on(), Ok(()));
        assert_eq!(indicator.off(), Err(Error::DriverFault));
    }
}
