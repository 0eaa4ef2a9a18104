//! Safety bounds and position estimation
//!
//! The actuator has no sensor. Its position is the sum of commanded
//! durations times nominal speed, clamped to the stroke. The bounds here
//! cap any single command at the stroke times a safety factor, so a full
//! retract can always seat the rod against the end-stop even when the
//! estimate has drifted.

use super::Direction;
use crate::Error;

/// Derived travel limits for one actuator
///
/// Computed once from the actuator configuration and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetyBounds {
    /// Full stroke length in micrometres
    pub stroke_um: u32,
    /// Nominal speed in micrometres per second (non-zero)
    pub speed_um_s: u32,
    /// Longest distance a single command may request
    pub max_distance_um: u32,
    /// Longest duration a single command may request
    pub max_duration_ms: u32,
}

impl SafetyBounds {
    /// Derive the bounds from stroke, speed and safety factor
    ///
    /// `safety_factor_pct` is the overtravel allowance in percent of the
    /// stroke (110 = 10 % past the nominal ends).
    pub fn new(stroke_um: u32, speed_um_s: u32, safety_factor_pct: u16) -> Self {
        debug_assert!(speed_um_s > 0, "speed must be validated before use");

        let max_distance_um = saturate(stroke_um as u64 * safety_factor_pct as u64 / 100);
        let mut bounds = Self {
            stroke_um,
            speed_um_s,
            max_distance_um,
            max_duration_ms: 0,
        };
        bounds.max_duration_ms = bounds.duration_for_distance_ms(max_distance_um);
        bounds
    }

    /// Motor time needed to cover a distance, rounded up
    pub fn duration_for_distance_ms(&self, distance_um: u32) -> u32 {
        saturate((distance_um as u64 * 1000).div_ceil(self.speed_um_s as u64))
    }

    /// Distance covered in a duration at nominal speed, rounded down
    pub fn distance_for_duration_um(&self, duration_ms: u32) -> u32 {
        saturate(duration_ms as u64 * self.speed_um_s as u64 / 1000)
    }

    /// Check a duration against the per-command ceiling
    pub fn check_duration(&self, duration_ms: u32) -> Result<(), Error> {
        if duration_ms > self.max_duration_ms {
            return Err(Error::InvalidParameter("duration exceeds the safe maximum"));
        }
        Ok(())
    }

    /// Check a distance against the per-command ceiling
    pub fn check_distance(&self, distance_um: u32) -> Result<(), Error> {
        if distance_um > self.max_distance_um {
            return Err(Error::InvalidParameter("distance exceeds the safe maximum"));
        }
        Ok(())
    }

    /// Check an absolute target against the stroke
    pub fn check_target(&self, target_um: u32) -> Result<(), Error> {
        if target_um > self.stroke_um {
            return Err(Error::InvalidParameter("target position outside the stroke"));
        }
        Ok(())
    }

    /// Check if a position lies within the stroke
    pub fn is_in_bounds(&self, position_um: u32) -> bool {
        position_um <= self.stroke_um
    }

    /// Clamp a position to the stroke
    pub fn clamp(&self, position_um: u32) -> u32 {
        position_um.min(self.stroke_um)
    }

    /// Apply a signed travel to a position estimate
    ///
    /// Overshoot past either end is clamped, never reported: the rod has
    /// physically stopped at the end-stop.
    pub fn advance(&self, position_um: u32, direction: Direction, distance_um: u32) -> u32 {
        match direction {
            Direction::Extend => self.clamp(position_um.saturating_add(distance_um)),
            Direction::Retract => self.clamp(position_um.saturating_sub(distance_um)),
        }
    }

    /// Distance left to the end of travel in a direction
    pub fn remaining(&self, position_um: u32, direction: Direction) -> u32 {
        match direction {
            Direction::Extend => self.stroke_um.saturating_sub(position_um),
            Direction::Retract => self.clamp(position_um),
        }
    }
}

fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
