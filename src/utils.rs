//! Utility functions for value re-ranging and numeric conversions.

pub mod safe_cast;

use crate::constants::EPSILON;

/// Linearly re-range `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// Values outside the input range extrapolate; nothing is clamped. A
/// degenerate input range returns `out_min`.
#[must_use]
pub fn map_range(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    if (in_max - in_min).abs() < EPSILON {
        return out_min;
    }
    out_min + (value - in_min) / (in_max - in_min) * (out_max - out_min)
}

/// Same as [`map_range`] but the result is clamped to the output range.
///
/// Reversed output ranges are handled.
#[must_use]
pub fn map_range_clamped(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    let mapped = map_range(value, in_min, in_max, out_min, out_max);
    let (lo, hi) = if out_min <= out_max { (out_min, out_max) } else { (out_max, out_min) };
    mapped.clamp(lo, hi)
}
