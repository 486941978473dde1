//! Batch time-series container and its transforms.
//!
//! A [`TimeSeries`] owns a whole recorded procedure: an ordered list of
//! [`TimeRecord`]s with a uniform feature width and non-decreasing
//! timestamps. Transforms return new series; shape mismatches return a
//! defined fallback (an unmodified copy or an empty/zero result) rather
//! than panicking, and callers that care compare sizes.

use crate::matrix::LabeledMatrix;
use crate::series::kernels;
use crate::series::record::TimeRecord;
use kinseg_math::symmetric_eigen;
use serde::{Deserialize, Serialize};

/// Ordered collection of timestamped, labeled feature vectors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    records: Vec<TimeRecord>,
}

impl TimeSeries {
    /// Create an empty series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty series with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    /// Build from records, accepting them one by one so the width and
    /// timestamp invariants hold. Violating records are dropped.
    pub fn from_records(records: Vec<TimeRecord>) -> Self {
        let mut series = Self::with_capacity(records.len());
        for rec in records {
            series.add_record(rec);
        }
        series
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Feature width, fixed once the first record is added. 0 while empty.
    pub fn dim(&self) -> usize {
        self.records.first().map_or(0, |r| r.dim())
    }

    pub fn records(&self) -> &[TimeRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&TimeRecord> {
        self.records.get(index)
    }

    /// Append a record. Returns false (series unchanged) when the feature
    /// width does not match or the timestamp regresses.
    pub fn add_record(&mut self, record: TimeRecord) -> bool {
        if let Some(last) = self.records.last() {
            if record.dim() != last.dim() || record.time < last.time {
                return false;
            }
        }
        self.records.push(record);
        true
    }

    /// Replace the record at an index, keeping the width invariant and the
    /// timestamp ordering against both neighbors. Returns false when the
    /// replacement would violate either.
    pub fn set_record_at(&mut self, index: usize, record: TimeRecord) -> bool {
        if index >= self.records.len() || record.dim() != self.dim() {
            return false;
        }
        if index > 0 && record.time < self.records[index - 1].time {
            return false;
        }
        if index + 1 < self.records.len() && record.time > self.records[index + 1].time {
            return false;
        }
        self.records[index] = record;
        true
    }

    /// Arithmetic mean across all samples, per dimension. Empty series
    /// yields an empty vector; callers must not rely on it as data.
    pub fn mean(&self) -> Vec<f64> {
        kernels::mean_of(&self.records)
    }

    /// Finite-difference derivative of the given order, computed by
    /// repeated order-1 passes. A series of fewer than 2 samples yields a
    /// defined zero derivative. Order 0 is the identity.
    pub fn derivative(&self, order: usize) -> TimeSeries {
        let mut records = self.records.clone();
        for _ in 0..order {
            records = kernels::differentiate(&records);
        }
        TimeSeries { records }
    }

    /// Gaussian-kernel smoothing over time distance, normalized by the
    /// weight sum. A non-positive width returns the series unchanged (the
    /// width -> 0 limit of the kernel).
    pub fn gaussian_filter(&self, width: f64) -> TimeSeries {
        if width <= 0.0 {
            return self.clone();
        }
        let records = self
            .records
            .iter()
            .enumerate()
            .map(|(i, rec)| {
                TimeRecord::new(rec.time, rec.label, kernels::smooth_at(&self.records, i, width))
            })
            .collect();
        TimeSeries { records }
    }

    /// Synthetic leading samples for windowed transforms; see
    /// [`kernels::pad_start`]. The caller concatenates the result.
    pub fn pad_start(&self, window: usize) -> TimeSeries {
        TimeSeries {
            records: kernels::pad_start(&self.records, window),
        }
    }

    /// Append `other` in time. On a feature-width mismatch the result is
    /// an unmodified copy of self.
    pub fn concatenate(&self, other: &TimeSeries) -> TimeSeries {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        if self.dim() != other.dim() {
            return self.clone();
        }
        let mut records = self.records.clone();
        records.extend(other.records.iter().cloned());
        TimeSeries { records }
    }

    /// Append `other` in the feature dimension, sample by sample. Requires
    /// equal sample counts; otherwise the result is an unmodified copy of
    /// self. Timestamps and labels come from self.
    pub fn concatenate_values(&self, other: &TimeSeries) -> TimeSeries {
        if self.len() != other.len() {
            return self.clone();
        }
        let records = self
            .records
            .iter()
            .zip(&other.records)
            .map(|(a, b)| {
                let mut values = a.values.clone();
                values.extend_from_slice(&b.values);
                TimeRecord::new(a.time, a.label, values)
            })
            .collect();
        TimeSeries { records }
    }

    /// Inclusive sub-range copy. Indices are clamped to the series bounds;
    /// an inverted range yields an empty series.
    pub fn trim(&self, start: usize, end: usize) -> TimeSeries {
        if start > end || start >= self.records.len() {
            return TimeSeries::new();
        }
        let end = end.min(self.records.len() - 1);
        TimeSeries {
            records: self.records[start..=end].to_vec(),
        }
    }

    /// Project the whole series onto the Legendre basis; one labeled row
    /// per degree 0..=order. See [`kernels::legendre_window`].
    pub fn legendre_transformation(&self, order: usize) -> LabeledMatrix {
        kernels::legendre_window(&self.records, order)
    }

    /// Windowed orthogonal expansion: for every sample, the trailing
    /// `window`+1 sub-window (history padded as needed) is projected onto
    /// the Legendre basis and the coefficient matrix is flattened into one
    /// feature vector of width dim x (order+1). Timestamps and labels are
    /// preserved.
    pub fn orthogonal_transformation(&self, window: usize, order: usize) -> TimeSeries {
        if self.is_empty() {
            return TimeSeries::new();
        }
        let mut padded = kernels::pad_start(&self.records, window);
        padded.extend(self.records.iter().cloned());
        let records = self
            .records
            .iter()
            .enumerate()
            .map(|(i, rec)| {
                let end = i + window;
                let sub = &padded[end - window..=end];
                let coeffs = kernels::legendre_window(sub, order);
                TimeRecord::new(rec.time, rec.label, kernels::flatten_coefficients(&coeffs))
            })
            .collect();
        TimeSeries { records }
    }

    /// Population covariance matrix (1/N normalizer), dim x dim. Empty
    /// series yields an empty matrix.
    pub fn covariance_matrix(&self) -> Vec<Vec<f64>> {
        if self.is_empty() {
            return Vec::new();
        }
        let dim = self.dim();
        let mean = self.mean();
        let mut cov = vec![vec![0.0; dim]; dim];
        for rec in &self.records {
            for a in 0..dim {
                let da = rec.values[a] - mean[a];
                for b in a..dim {
                    cov[a][b] += da * (rec.values[b] - mean[b]);
                }
            }
        }
        let n = self.len() as f64;
        for a in 0..dim {
            for b in a..dim {
                cov[a][b] /= n;
                cov[b][a] = cov[a][b];
            }
        }
        cov
    }

    /// Principal components of the series: the top `k` unit eigenvectors
    /// of the covariance matrix, row-labeled 0..k-1 in descending
    /// eigenvalue order. `k` is clamped to the feature dimension. Empty
    /// series yields an empty matrix.
    pub fn calculate_pca(&self, k: usize) -> LabeledMatrix {
        let mut components = LabeledMatrix::new();
        let cov = self.covariance_matrix();
        let Some(eigen) = symmetric_eigen(&cov) else {
            return components;
        };
        for (i, vector) in eigen.vectors.into_iter().take(k).enumerate() {
            components.push_row(i as u32, vector);
        }
        components
    }

    /// Project every sample's mean-centered values onto each component
    /// row. On a width mismatch between the series and the components or
    /// mean, the result is an unmodified copy of self.
    pub fn transform_pca(&self, components: &LabeledMatrix, mean: &[f64]) -> TimeSeries {
        if self.is_empty() {
            return TimeSeries::new();
        }
        if components.width() != self.dim() || mean.len() != self.dim() {
            return self.clone();
        }
        let records = self
            .records
            .iter()
            .map(|rec| {
                let centered: Vec<f64> = rec
                    .values
                    .iter()
                    .zip(mean)
                    .map(|(v, m)| v - m)
                    .collect();
                let values = components
                    .rows()
                    .iter()
                    .map(|row| row.values.iter().zip(&centered).map(|(c, x)| c * x).sum())
                    .collect();
                TimeRecord::new(rec.time, rec.label, values)
            })
            .collect();
        TimeSeries { records }
    }

    /// Squared Euclidean distance from every sample to every row of
    /// `others`: one output row per sample (keeping the sample's label),
    /// one column per `others` row. Width mismatches surface as infinite
    /// distances; see [`kernels::squared_distance`].
    pub fn distances(&self, others: &LabeledMatrix) -> LabeledMatrix {
        let mut out = LabeledMatrix::new();
        for rec in &self.records {
            let row: Vec<f64> = others
                .rows()
                .iter()
                .map(|other| kernels::squared_distance(&rec.values, &other.values))
                .collect();
            out.push_row(rec.label, row);
        }
        out
    }
}
