//! Binarization threshold defaults and range recovery.

use std::ops::RangeInclusive;

/// Threshold a new session starts with.
pub const DEFAULT_THRESHOLD: f64 = 18.0;

/// Value substituted when the user supplies a threshold outside
/// [`VALID_RANGE`].
///
/// Deliberately different from [`DEFAULT_THRESHOLD`]; both values are
/// long-standing behaviour users rely on.
pub const RECOVERY_THRESHOLD: f64 = 25.0;

/// Inclusive range of usable thresholds.
pub const VALID_RANGE: RangeInclusive<f64> = 0.0..=255.0;

/// Return `value` if it lies in [`VALID_RANGE`], otherwise
/// [`RECOVERY_THRESHOLD`]. NaN is treated as out of range.
#[must_use]
pub fn clamp_threshold(value: f64) -> f64 {
    if VALID_RANGE.contains(&value) {
        value
    } else {
        RECOVERY_THRESHOLD
    }
}
