//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Clamp a weight into the unit interval, mapping non-finite input to 0.0.
#[must_use]
pub fn clamp_unit(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Convert milliseconds to f64 while allowing precision loss in a single location.
#[must_use]
pub fn ms_to_f64(ms: u64) -> f64 {
    cast::<u64, f64>(ms).unwrap_or(f64::MAX)
}

/// Fraction of a duration elapsed, clamped to `[0, 1]`.
/// A zero duration counts as already complete.
#[must_use]
pub fn elapsed_fraction(elapsed_ms: u64, duration_ms: u64) -> f64 {
    if duration_ms == 0 {
        return 1.0;
    }
    (ms_to_f64(elapsed_ms) / ms_to_f64(duration_ms)).clamp(0.0, 1.0)
}
