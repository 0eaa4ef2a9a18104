//! Controller state and the persisted device record

pub mod machine;
pub mod record;

pub use machine::MotionState;
pub use record::{DeviceRecord, IndicatorState, RECORD_MAGIC, RECORD_VERSION};
