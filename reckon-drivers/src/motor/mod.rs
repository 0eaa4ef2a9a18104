//! Motor driver implementations
//!
//! Only the dual-channel driver exists: two digital outputs, one per
//! direction, with no speed control.

pub mod dual;

pub use dual::DualChannelMotor;
