//! Numerically stable primitives for log-domain sequence math.

/// Natural log guarded against non-positive input.
///
/// Returns NEG_INFINITY for x <= 0 instead of NaN, so a zero probability
/// propagates as an impossible path rather than poisoning a whole trellis.
pub fn guarded_ln(x: f64) -> f64 {
    if x > 0.0 {
        x.ln()
    } else {
        f64::NEG_INFINITY
    }
}

/// Stable log(sum(exp(values))).
///
/// Returns NEG_INFINITY for empty input or all -inf inputs.
pub fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    let sum: f64 = values.iter().map(|v| (v - max).exp()).sum();
    max + sum.ln()
}

/// Normalize a row of non-negative weights to a probability distribution.
///
/// A row with zero (or non-finite) total mass becomes the uniform
/// distribution, so callers never observe a row that fails to sum to 1.
pub fn normalize_or_uniform(row: &mut [f64]) {
    if row.is_empty() {
        return;
    }
    let sum: f64 = row.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        for v in row.iter_mut() {
            *v /= sum;
        }
    } else {
        let uniform = 1.0 / row.len() as f64;
        for v in row.iter_mut() {
            *v = uniform;
        }
    }
}

/// Index of the largest value, ties resolved to the earliest index.
///
/// Returns None only for an empty slice.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
