//! Motion command types

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Error;

/// Actuator travel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    /// Rod moves out, position grows
    Extend,
    /// Rod moves in, position shrinks
    Retract,
}

impl Direction {
    /// Get the opposite direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Extend => Direction::Retract,
            Direction::Retract => Direction::Extend,
        }
    }

    /// Lowercase name, as accepted by [`FromStr`]
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Extend => "extend",
            Direction::Retract => "retract",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "extend" => Ok(Direction::Extend),
            "retract" => Ok(Direction::Retract),
            _ => Err(Error::InvalidParameter("direction must be extend or retract")),
        }
    }
}

/// A single timed drive of the motor
///
/// Exists only for the span of one motion call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionCommand {
    /// Travel direction
    pub direction: Direction,
    /// How long the motor stays engaged
    pub duration_ms: u32,
}

impl MotionCommand {
    /// Create an extend command
    pub fn extend(duration_ms: u32) -> Self {
        Self {
            direction: Direction::Extend,
            duration_ms,
        }
    }

    /// Create a retract command
    pub fn retract(duration_ms: u32) -> Self {
        Self {
            direction: Direction::Retract,
            duration_ms,
        }
    }
}
