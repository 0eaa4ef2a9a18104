//! Linear actuator controller
//!
//! Open-loop control of a DC linear actuator: the motor is engaged for a
//! computed time and the position estimate advances by time × nominal speed.
//! There is no sensor, so drift accumulates until [`LinearActuator::calibrate`]
//! drives the rod against the retracted end-stop and zeroes the estimate.
//!
//! # Concurrency
//!
//! All methods take `&self`, so one task can await a move while another
//! calls [`LinearActuator::stop`]. The controller is not `Sync`; a single
//! executor thread drives it. A second motion command while one is in
//! flight is rejected with [`Error::AlreadyMoving`], never queued.
//!
//! Every in-flight move holds a guard that stops the motor when the move
//! ends for any reason, including the move future being dropped.

use core::cell::{Cell, RefCell};
use core::future::{poll_fn, Future};
use core::task::Poll;

use embassy_futures::select::{select, Either};
use embassy_sync::waitqueue::MultiWakerRegistration;
use embedded_hal_async::delay::DelayNs;
use log::{debug, info, warn};

use reckon_core::config::{ActuatorConfig, ConfigError};
use reckon_core::motion::{um_to_mm, Direction, MotionCommand, SafetyBounds};
use reckon_core::state::MotionState;
use reckon_core::traits::{ChangeListener, MotorDriver};
use reckon_core::Error;

/// Timed open-loop controller for one actuator
pub struct LinearActuator<M, D, L = ()> {
    motor: RefCell<M>,
    delay: D,
    listener: L,
    bounds: SafetyBounds,
    position_um: Cell<u32>,
    state: Cell<MotionState>,
    /// Bumped on every move so a stale guard never stops a newer move
    generation: Cell<u32>,
    /// Moves suspended in their delay; a stopped move and its successor
    /// can both be waiting
    waiters: RefCell<MultiWakerRegistration<2>>,
}

impl<M, D, L> LinearActuator<M, D, L>
where
    M: MotorDriver,
    D: DelayNs + Clone,
    L: ChangeListener<u32>,
{
    /// Create a controller that owns the motor driver
    ///
    /// An initial position outside the stroke is clamped; the estimate is
    /// only trusted after a calibration anyway.
    pub fn new(motor: M, delay: D, config: ActuatorConfig, listener: L) -> Result<Self, ConfigError> {
        config.validate()?;
        let bounds = config.bounds();

        let mut position_um = config.initial_position_um;
        if !bounds.is_in_bounds(position_um) {
            warn!(
                "Initial position {} um outside stroke {} um, clamping",
                position_um, bounds.stroke_um
            );
            position_um = bounds.clamp(position_um);
        }

        info!(
            "Actuator ready: stroke {} um, speed {} um/s, max move {} ms, at {} um",
            bounds.stroke_um, bounds.speed_um_s, bounds.max_duration_ms, position_um
        );

        Ok(Self {
            motor: RefCell::new(motor),
            delay,
            listener,
            bounds,
            position_um: Cell::new(position_um),
            state: Cell::new(MotionState::Idle),
            generation: Cell::new(0),
            waiters: RefCell::new(MultiWakerRegistration::new()),
        })
    }

    /// Travel limits derived from the configuration
    pub fn bounds(&self) -> &SafetyBounds {
        &self.bounds
    }

    /// Current position estimate in um
    pub fn position_um(&self) -> u32 {
        self.position_um.get()
    }

    /// Current position estimate in mm
    pub fn position_mm(&self) -> f32 {
        um_to_mm(self.position_um.get())
    }

    /// Check if a move is in flight
    pub fn is_moving(&self) -> bool {
        self.state.get().is_moving()
    }

    /// Controller state
    pub fn state(&self) -> MotionState {
        self.state.get()
    }

    /// Drive in one direction for a fixed time
    ///
    /// Suspends the calling task for `duration_ms`, then stops the motor and
    /// advances the estimate by `duration_ms × speed`, clamped to the stroke.
    /// A [`stop`](Self::stop) during the wait ends the move early, but the
    /// estimate still assumes the full duration elapsed.
    pub async fn move_actuator(&self, direction: Direction, duration_ms: u32) -> Result<(), Error> {
        self.bounds.check_duration(duration_ms)?;
        self.ensure_idle()?;
        if duration_ms == 0 {
            return Ok(());
        }

        let command = MotionCommand {
            direction,
            duration_ms,
        };
        self.state.set(self.state.get().begin(command)?);
        let generation = self.generation.get().wrapping_add(1);
        self.generation.set(generation);

        let guard = MotionGuard {
            motor: &self.motor,
            state: &self.state,
            generation: &self.generation,
            owned: generation,
            armed: true,
        };

        info!("Starting to {} actuator for {} ms", direction, duration_ms);
        let driven = self.motor.borrow_mut().drive(direction);
        if let Err(e) = driven {
            drop(guard);
            return Err(e.into());
        }

        let mut delay = self.delay.clone();
        let interrupted = match select(delay.delay_ms(duration_ms), self.halted(generation)).await {
            Either::First(()) => false,
            Either::Second(()) => true,
        };
        guard.finish()?;

        if interrupted {
            warn!(
                "{} interrupted by stop; estimate assumes the full {} ms",
                direction, duration_ms
            );
        }

        let distance_um = self.bounds.distance_for_duration_um(duration_ms);
        let position_um = self
            .bounds
            .advance(self.position_um.get(), direction, distance_um);
        info!("Finished {} ({} um)", direction, distance_um);
        self.commit(position_um);
        Ok(())
    }

    /// Move a distance in one direction
    ///
    /// The duration is rounded up to whole milliseconds.
    pub async fn move_by_distance(&self, direction: Direction, distance_um: u32) -> Result<(), Error> {
        self.bounds.check_distance(distance_um)?;
        self.ensure_idle()?;
        if distance_um == 0 {
            return Ok(());
        }

        let duration_ms = self.bounds.duration_for_distance_ms(distance_um);
        debug!("{} um {} -> {} ms", distance_um, direction, duration_ms);
        self.move_actuator(direction, duration_ms).await
    }

    /// Move to an absolute position within the stroke
    pub async fn set_position(&self, target_um: u32) -> Result<(), Error> {
        self.bounds.check_target(target_um)?;
        self.ensure_idle()?;

        let current_um = self.position_um.get();
        if target_um == current_um {
            debug!("Already at {} um", target_um);
            return Ok(());
        }

        info!(
            "Setting position {:.3} mm -> {:.3} mm",
            um_to_mm(current_um),
            um_to_mm(target_um)
        );
        let (direction, distance_um) = if target_um > current_um {
            (Direction::Extend, target_um - current_um)
        } else {
            (Direction::Retract, current_um - target_um)
        };
        self.move_by_distance(direction, distance_um).await
    }

    /// Extend to the end of the stroke
    pub async fn fully_extend(&self) -> Result<(), Error> {
        let distance_um = self.bounds.remaining(self.position_um.get(), Direction::Extend);
        self.move_by_distance(Direction::Extend, distance_um).await
    }

    /// Retract to the start of the stroke
    pub async fn fully_retract(&self) -> Result<(), Error> {
        let distance_um = self.bounds.remaining(self.position_um.get(), Direction::Retract);
        self.move_by_distance(Direction::Retract, distance_um).await
    }

    /// Home against the retracted end-stop and zero the estimate
    ///
    /// Always retracts for the full safe duration, whatever the estimate
    /// says, so the rod seats even after heavy drift.
    pub async fn calibrate(&self) -> Result<(), Error> {
        info!("Calibrating actuator...");
        self.move_actuator(Direction::Retract, self.bounds.max_duration_ms)
            .await?;

        if self.position_um.get() != 0 {
            self.commit(0);
        }
        info!("Actuator calibrated");
        Ok(())
    }

    /// Cut motor power now
    ///
    /// A no-op when idle. Never touches the position estimate; the
    /// interrupted move commits it when it wakes.
    pub fn stop(&self) -> Result<(), Error> {
        if !self.is_moving() {
            return Ok(());
        }

        info!("Stopping actuator");
        self.state.set(self.state.get().finish());
        let stopped = self.motor.borrow_mut().stop().map_err(Error::from);
        self.waiters.borrow_mut().wake();
        stopped
    }

    /// Stop if moving and hand the motor outputs back
    ///
    /// Idempotent.
    pub fn release(&self) -> Result<(), Error> {
        debug!("Releasing actuator outputs");
        let stopped = self.stop();
        let released = self.motor.borrow_mut().release().map_err(Error::from);
        stopped.and(released)
    }

    /// Resolves once the move tagged `generation` is no longer in flight
    ///
    /// Checked against the controller state on every poll, so a move
    /// started right after a `stop()` cannot swallow the older move's wakeup.
    fn halted(&self, generation: u32) -> impl Future<Output = ()> + '_ {
        poll_fn(move |cx| {
            if self.generation.get() != generation || !self.state.get().is_moving() {
                return Poll::Ready(());
            }
            self.waiters.borrow_mut().register(cx.waker());
            Poll::Pending
        })
    }

    fn ensure_idle(&self) -> Result<(), Error> {
        if self.is_moving() {
            return Err(Error::AlreadyMoving);
        }
        Ok(())
    }

    fn commit(&self, position_um: u32) {
        self.position_um.set(position_um);
        info!("Position now {:.3} mm", um_to_mm(position_um));

        if let Err(e) = self.listener.changed(position_um) {
            warn!("Position change notification failed: {}", e);
        }
    }
}

/// Returns the controller to `Idle` when a move ends
///
/// Dropping it (early return, cancelled future) stops the motor and logs any
/// failure; [`MotionGuard::finish`] reports it instead.
struct MotionGuard<'a, M: MotorDriver> {
    motor: &'a RefCell<M>,
    state: &'a Cell<MotionState>,
    generation: &'a Cell<u32>,
    owned: u32,
    armed: bool,
}

impl<M: MotorDriver> MotionGuard<'_, M> {
    fn finish(mut self) -> Result<(), Error> {
        self.armed = false;
        self.settle()
    }

    fn settle(&self) -> Result<(), Error> {
        // Already stopped, or a newer move owns the motor
        if self.generation.get() != self.owned || !self.state.get().is_moving() {
            return Ok(());
        }

        self.state.set(MotionState::Idle);
        self.motor.borrow_mut().stop().map_err(Error::from)
    }
}

impl<M: MotorDriver> Drop for MotionGuard<'_, M> {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = self.settle() {
                warn!("Failed to stop motor after aborted move: {}", e);
            }
        }
    }
}
