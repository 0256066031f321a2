//! Aging offset conversions.
//!
//! The aging offset register (0x10) trims the crystal load capacitance. One
//! register step moves the frequency by about 0.12 ppm at 25 °C; positive
//! values slow the clock down.

/// ppm per register step.
pub const AGING_OFFSET_STEP: f32 = 0.12;

/// Converts a trim in ppm to the register value.
///
/// Truncates toward zero and saturates at the `i8` range.
#[must_use]
pub fn aging_offset_convert_to_register(offset: f32) -> i8 {
    (offset / AGING_OFFSET_STEP) as i8
}

/// Converts a register value to a trim in ppm.
#[must_use]
pub fn aging_offset_convert_to_data(reg: i8) -> f32 {
    f32::from(reg) * AGING_OFFSET_STEP
}
