//! Millimetre/micrometre conversions
//!
//! Operators think in millimetres; the estimate is kept in integer
//! micrometres so repeated moves do not accumulate float error.

/// Convert millimetres to micrometres, rounding to nearest
///
/// Returns `None` for negative, non-finite or out-of-range input.
pub fn mm_to_um(mm: f32) -> Option<u32> {
    if !mm.is_finite() || mm < 0.0 {
        return None;
    }
    let um = mm * 1000.0 + 0.5;
    if um >= u32::MAX as f32 {
        return None;
    }
    Some(um as u32)
}

/// Convert a speed in mm/s to um/s
pub fn mm_s_to_um_s(mm_s: f32) -> Option<u32> {
    mm_to_um(mm_s)
}

/// Convert micrometres to millimetres
pub fn um_to_mm(um: u32) -> f32 {
    um as f32 / 1000.0
}
