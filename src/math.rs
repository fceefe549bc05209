//! Mathematical utilities for solar geometry.

/// Normalizes an angle in degrees to the range [0, 360).
pub fn normalize_degrees_0_to_360(degrees: f64) -> f64 {
    let normalized = degrees % 360.0;
    if normalized < 0.0 {
        normalized + 360.0
    } else {
        normalized
    }
}

/// Computes a polynomial using Horner's method for numerical stability.
///
/// Coefficients are ordered [a₀, a₁, a₂, ...] for a₀ + a₁x + a₂x² + ...
pub fn polynomial(coeffs: &[f64], x: f64) -> f64 {
    let Some(&last) = coeffs.last() else {
        return 0.0;
    };

    let mut result = last;
    for &coeff in coeffs.iter().rev().skip(1) {
        result = result.mul_add(x, coeff);
    }
    result
}

/// Seconds between two instants as a float, with microsecond resolution.
pub fn seconds_between(
    start: chrono::DateTime<chrono::Utc>,
    end: chrono::DateTime<chrono::Utc>,
) -> f64 {
    let delta = end.signed_duration_since(start);
    delta
        .num_microseconds()
        .map_or_else(|| delta.num_milliseconds() as f64 / 1e3, |us| us as f64 / 1e6)
}

/// Shifts an instant by a floating number of seconds, rounded to the microsecond.
pub fn add_seconds(
    instant: chrono::DateTime<chrono::Utc>,
    seconds: f64,
) -> chrono::DateTime<chrono::Utc> {
    instant + chrono::TimeDelta::microseconds((seconds * 1e6).round() as i64)
}
