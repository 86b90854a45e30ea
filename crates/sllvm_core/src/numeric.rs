//! Guarded arithmetic shared by every ratio and logarithm in the crate
//!
//! Degenerate inputs (zero denominators, log of zero) resolve to 0 instead of
//! NaN or infinity, so aggregated arrays never carry non-finite values.

/// Replace NaN and infinities with 0
#[inline]
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// `numerator / denominator`, or 0 when the denominator is 0 or the quotient
/// is not finite.
#[inline]
pub fn guarded_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    finite_or_zero(numerator / denominator)
}

/// `p * ln(p)` with the convention `0 * ln(0) = 0`.
///
/// Non-positive shares contribute nothing.
#[inline]
pub fn xlogx(p: f64) -> f64 {
    if p > 0.0 {
        finite_or_zero(p * p.ln())
    } else {
        0.0
    }
}

/// `base.powf(exponent)`, or 0 when the result is not finite
#[inline]
pub fn guarded_pow(base: f64, exponent: f64) -> f64 {
    finite_or_zero(base.powf(exponent))
}
