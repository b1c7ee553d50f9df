//! Convenience wrappers around methods from the approx crate for comparing floats.

use approx::AbsDiffEq;

/// Tolerance used when checking that population shares sum to one.
pub const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Compares if two floats are close via `approx::abs_diff_eq` using a maximum absolute difference
/// (epsilon) of `acc`.
#[must_use]
pub fn almost_eq(a: f64, b: f64, acc: f64) -> bool {
    if a.is_infinite() && b.is_infinite() {
        return a == b;
    }
    a.abs_diff_eq(&b, acc)
}

/// Returns true when `weights` sum to one within [`WEIGHT_TOLERANCE`].
#[must_use]
pub fn sums_to_one<I: IntoIterator<Item = f64>>(weights: I) -> bool {
    almost_eq(weights.into_iter().sum(), 1.0, WEIGHT_TOLERANCE)
}

/// Returns true when `value` lies in the closed unit interval.
#[must_use]
pub fn is_probability(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}
