//! Closed-form Legendre polynomials for windowed shape descriptors.
//!
//! Motion segments are summarized by projecting each feature dimension onto
//! the Legendre basis over a time window rescaled to [-1, 1]. Only degrees
//! 0..=6 are supported; these are the closed forms, not the recurrence, so
//! each evaluation is a handful of multiplications.

/// Highest supported polynomial degree.
pub const MAX_LEGENDRE_DEGREE: usize = 6;

/// Evaluate the Legendre polynomial of the given degree at x.
///
/// Degrees above [`MAX_LEGENDRE_DEGREE`] evaluate to 0.0; configuration
/// validation rejects such orders before any pipeline runs.
pub fn legendre_eval(degree: usize, x: f64) -> f64 {
    let x2 = x * x;
    match degree {
        0 => 1.0,
        1 => x,
        2 => (3.0 * x2 - 1.0) / 2.0,
        3 => (5.0 * x2 - 3.0) * x / 2.0,
        4 => ((35.0 * x2 - 30.0) * x2 + 3.0) / 8.0,
        5 => ((63.0 * x2 - 70.0) * x2 + 15.0) * x / 8.0,
        6 => (((231.0 * x2 - 315.0) * x2 + 105.0) * x2 - 5.0) / 16.0,
        _ => 0.0,
    }
}

/// Trapezoidal integration of sampled values over sampled abscissae.
///
/// The abscissae must be non-decreasing; a single sample (or none)
/// integrates to 0.0.
pub fn trapezoid(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    let mut total = 0.0;
    for i in 1..n {
        total += 0.5 * (ys[i] + ys[i - 1]) * (xs[i] - xs[i - 1]);
    }
    total
}
