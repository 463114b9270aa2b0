//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Convert a loosely-typed payload value to an integer amount.
///
/// Returns `None` for non-finite values, values with a fractional part,
/// and values outside the i64 range. Validation of sign and magnitude is
/// left to the applier.
#[must_use]
pub fn int_amount_from_f64(value: f64) -> Option<i64> {
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    cast::<f64, i64>(value)
}

/// Clamp a u64 to the u32 range instead of wrapping.
#[must_use]
pub fn clamp_u64_to_u32(value: u64) -> u32 {
    cast::<u64, u32>(value).unwrap_or(u32::MAX)
}

/// Convert i64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn i64_to_f64(value: i64) -> f64 {
    cast::<i64, f64>(value).unwrap_or(0.0)
}
