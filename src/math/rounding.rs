//! Precision reduction applied to fitted coefficients before they are printed.
//!
//! Least-squares coefficients carry a lot of digits that are pure noise for a
//! temperature log sampled at whole degrees. We keep a fixed number of
//! significant digits (4 by default, which is what a half-precision float can
//! represent) instead of narrowing through a smaller float type.

/// Round `value` to `digits` significant decimal digits.
///
/// Zero, non-finite values and `digits == 0` are returned unchanged.
pub fn round_significant(value: f64, digits: u32) -> f64 {
    if digits == 0 || value == 0.0 || !value.is_finite() {
        return value;
    }

    let magnitude = value.abs().log10().floor() as i32;
    let decimals = digits as i32 - 1 - magnitude;

    if decimals >= 0 {
        let factor = 10f64.powi(decimals);
        (value * factor).round() / factor
    } else {
        let factor = 10f64.powi(-decimals);
        (value / factor).round() * factor
    }
}
