//! Open-loop motion math
//!
//! Directions, motion commands, safety bounds and the duration/distance
//! conversions the position estimate is built on.

pub mod command;
pub mod position;
pub mod units;

pub use command::{Direction, MotionCommand};
pub use position::SafetyBounds;
pub use units::{mm_s_to_um_s, mm_to_um, um_to_mm};
