//! Transform kernels shared by the batch and streaming containers.
//!
//! Every windowed signal transform is written once here, over a plain
//! record slice. [`TimeSeries`](super::TimeSeries) applies a kernel at
//! every index; [`StreamingSeries`](super::StreamingSeries) applies the
//! same kernel at the newest index of its retained window. Keeping one
//! implementation is what makes the batch-vs-streaming agreement property
//! testable instead of aspirational.

use crate::matrix::LabeledMatrix;
use crate::series::record::TimeRecord;
use kinseg_math::{legendre_eval, MAX_LEGENDRE_DEGREE};

/// Causal smoothing stops scanning once the normalized time distance
/// exceeds this many standard deviations. Weights beyond it are below
/// exp(-12.5); the truncation is a cost bound, not a semantic change.
pub const GAUSSIAN_CUTOFF_SIGMAS: f64 = 5.0;

/// Gaussian kernel weight for a time offset, `exp(-0.5 (dt/width)^2)`.
pub fn gaussian_weight(dt: f64, width: f64) -> f64 {
    let z = dt / width;
    (-0.5 * z * z).exp()
}

/// Per-dimension mean over a record slice. Empty input yields an empty
/// vector.
pub fn mean_of(records: &[TimeRecord]) -> Vec<f64> {
    let Some(first) = records.first() else {
        return Vec::new();
    };
    let mut acc = vec![0.0; first.dim()];
    for rec in records {
        for (a, v) in acc.iter_mut().zip(&rec.values) {
            *a += v;
        }
    }
    let n = records.len() as f64;
    for a in acc.iter_mut() {
        *a /= n;
    }
    acc
}

/// Two-sided Gaussian-weighted average of every record's values at the
/// timestamp of `records[index]`, normalized by the weight sum so it
/// behaves correctly under irregular sampling. Caller guarantees
/// `width > 0` and a valid index.
pub fn smooth_at(records: &[TimeRecord], index: usize, width: f64) -> Vec<f64> {
    let center = records[index].time;
    let dim = records[index].dim();
    let mut acc = vec![0.0; dim];
    let mut total = 0.0;
    for rec in records {
        let w = gaussian_weight(rec.time - center, width);
        total += w;
        for (a, v) in acc.iter_mut().zip(&rec.values) {
            *a += w * v;
        }
    }
    if total > 0.0 {
        for a in acc.iter_mut() {
            *a /= total;
        }
    }
    acc
}

/// Causal half-kernel smoothing at the newest record: scans backward from
/// the end and truncates once the normalized time distance passes
/// [`GAUSSIAN_CUTOFF_SIGMAS`]. This is intentionally the one-sided kernel,
/// not an approximation of the two-sided batch result.
pub fn smooth_causal(records: &[TimeRecord], width: f64) -> Option<Vec<f64>> {
    let newest = records.last()?;
    if width <= 0.0 {
        return Some(newest.values.clone());
    }
    let mut acc = vec![0.0; newest.dim()];
    let mut total = 0.0;
    for rec in records.iter().rev() {
        let dt = newest.time - rec.time;
        if dt / width > GAUSSIAN_CUTOFF_SIGMAS {
            break;
        }
        let w = gaussian_weight(dt, width);
        total += w;
        for (a, v) in acc.iter_mut().zip(&rec.values) {
            *a += w * v;
        }
    }
    if total > 0.0 {
        for a in acc.iter_mut() {
            *a /= total;
        }
    }
    Some(acc)
}

/// One order-1 finite-difference pass: forward difference at the first
/// sample, backward at the last, central elsewhere, each divided by the
/// actual timestamp gap between the neighbors involved. Fewer than two
/// samples yield a defined zero derivative. A zero timestamp gap also
/// yields zeros for that sample.
pub fn differentiate(records: &[TimeRecord]) -> Vec<TimeRecord> {
    let n = records.len();
    if n < 2 {
        return records
            .iter()
            .map(|r| TimeRecord::new(r.time, r.label, vec![0.0; r.dim()]))
            .collect();
    }
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let (lo, hi) = if i == 0 {
            (0, 1)
        } else if i == n - 1 {
            (n - 2, n - 1)
        } else {
            (i - 1, i + 1)
        };
        let dt = records[hi].time - records[lo].time;
        let values = if dt > 0.0 {
            records[hi]
                .values
                .iter()
                .zip(&records[lo].values)
                .map(|(h, l)| (h - l) / dt)
                .collect()
        } else {
            vec![0.0; records[i].dim()]
        };
        out.push(TimeRecord::new(records[i].time, records[i].label, values));
    }
    out
}

/// Synthetic leading samples extrapolating the first record's value
/// backward at the series' mean inter-sample spacing. The caller
/// concatenates them; nothing is auto-prepended. A single-sample series
/// has no defined spacing and falls back to 1.0.
pub fn pad_start(records: &[TimeRecord], window: usize) -> Vec<TimeRecord> {
    let Some(first) = records.first() else {
        return Vec::new();
    };
    let n = records.len();
    let mut spacing = if n >= 2 {
        (records[n - 1].time - first.time) / (n - 1) as f64
    } else {
        1.0
    };
    if spacing <= 0.0 {
        spacing = 1.0;
    }
    (0..window)
        .map(|k| {
            let steps = (window - k) as f64;
            TimeRecord::new(
                first.time - steps * spacing,
                first.label,
                first.values.clone(),
            )
        })
        .collect()
}

/// Project a record window onto the Legendre basis.
///
/// The window's time axis is rescaled onto [-1, 1]; each degree row is the
/// trapezoidal integral of `P_d(tau) * x(tau)` over the window. Degrees run
/// 0..=order (capped at [`MAX_LEGENDRE_DEGREE`]); a window with no time
/// extent integrates to zero rows.
pub fn legendre_window(records: &[TimeRecord], order: usize) -> LabeledMatrix {
    let order = order.min(MAX_LEGENDRE_DEGREE);
    let mut out = LabeledMatrix::new();
    let Some(first) = records.first() else {
        return out;
    };
    let dim = first.dim();
    let n = records.len();
    let span = records[n - 1].time - first.time;
    if span <= 0.0 {
        for degree in 0..=order {
            out.push_row(degree as u32, vec![0.0; dim]);
        }
        return out;
    }

    let taus: Vec<f64> = records
        .iter()
        .map(|r| -1.0 + 2.0 * (r.time - first.time) / span)
        .collect();
    for degree in 0..=order {
        let basis: Vec<f64> = taus.iter().map(|&t| legendre_eval(degree, t)).collect();
        let mut row = vec![0.0; dim];
        for i in 1..n {
            let dt = taus[i] - taus[i - 1];
            for (d, slot) in row.iter_mut().enumerate() {
                let hi = basis[i] * records[i].values[d];
                let lo = basis[i - 1] * records[i - 1].values[d];
                *slot += 0.5 * (hi + lo) * dt;
            }
        }
        out.push_row(degree as u32, row);
    }
    out
}

/// Flatten a coefficient matrix into one feature vector, degree-major.
pub fn flatten_coefficients(matrix: &LabeledMatrix) -> Vec<f64> {
    let mut out = Vec::with_capacity(matrix.len() * matrix.width());
    for row in matrix.rows() {
        out.extend_from_slice(&row.values);
    }
    out
}

/// Squared Euclidean distance.
///
/// This is the one distance scale used everywhere in the crate; every
/// consumer compares by arg-min, so the omitted square root is a
/// documented invariant, not an inconsistency between call sites.
/// Mismatched widths compare as infinitely far apart.
pub fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return f64::INFINITY;
    }
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
