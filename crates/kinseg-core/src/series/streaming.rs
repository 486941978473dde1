//! Streaming time-series container: causal, windowed transform variants.
//!
//! A [`StreamingSeries`] honors the same transform contracts as
//! [`TimeSeries`](super::TimeSeries) restricted to the newest sample and a
//! bounded look-back window. Each variant runs the shared kernel from
//! [`kernels`](super::kernels) over the retained records only, which is
//! what keeps a per-tick update bounded regardless of session length.
//!
//! Outputs at the very start of a stream pad history the same way the
//! batch path does, so a session produces output from the first tick; the
//! padded outputs converge to the batch values once the retained window
//! holds enough real samples.

use crate::series::kernels;
use crate::series::record::TimeRecord;
use crate::series::window::SampleWindow;

/// Trailing-window time series for the real-time path.
#[derive(Debug, Clone)]
pub struct StreamingSeries {
    window: SampleWindow,
}

impl StreamingSeries {
    /// Create with a count bound and a time-span bound; see
    /// [`SampleWindow`] for the retention rule.
    pub fn new(max_len: usize, max_span: f64) -> Self {
        Self {
            window: SampleWindow::new(max_len, max_span),
        }
    }

    /// Append the newest sample. Returns false (window unchanged) on a
    /// feature-width mismatch or a regressing timestamp.
    pub fn push(&mut self, record: TimeRecord) -> bool {
        if let Some(last) = self.window.latest() {
            if record.dim() != last.dim() || record.time < last.time {
                return false;
            }
        }
        self.window.push(record);
        true
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.window.latest().map_or(0, |r| r.dim())
    }

    pub fn latest(&self) -> Option<&TimeRecord> {
        self.window.latest()
    }

    pub fn records(&self) -> &[TimeRecord] {
        self.window.records()
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }

    /// Mean over the retained window.
    pub fn mean(&self) -> Vec<f64> {
        kernels::mean_of(self.records())
    }

    /// Causal Gaussian smoothing at the newest sample: the one-sided
    /// half-kernel, truncated at the cutoff. None while empty.
    pub fn smoothed_latest(&self, width: f64) -> Option<TimeRecord> {
        let newest = self.latest()?;
        let values = kernels::smooth_causal(self.records(), width)?;
        Some(TimeRecord::new(newest.time, newest.label, values))
    }

    /// Derivative at the newest sample. Order 1 uses only the two most
    /// recent samples (backward difference); higher orders delegate to the
    /// batch kernel over the retained window and take its last output.
    /// Fewer than 2 samples yield a defined zero derivative.
    pub fn derivative_latest(&self, order: usize) -> Option<TimeRecord> {
        let newest = self.latest()?;
        if order == 0 {
            return Some(newest.clone());
        }
        let records = self.records();
        let n = records.len();
        if n < 2 {
            return Some(TimeRecord::new(
                newest.time,
                newest.label,
                vec![0.0; newest.dim()],
            ));
        }
        if order == 1 {
            let prev = &records[n - 2];
            let dt = newest.time - prev.time;
            let values = if dt > 0.0 {
                newest
                    .values
                    .iter()
                    .zip(&prev.values)
                    .map(|(a, b)| (a - b) / dt)
                    .collect()
            } else {
                vec![0.0; newest.dim()]
            };
            return Some(TimeRecord::new(newest.time, newest.label, values));
        }
        let mut work = records.to_vec();
        for _ in 0..order {
            work = kernels::differentiate(&work);
        }
        work.pop()
    }

    /// Windowed orthogonal expansion of the newest sample only: the
    /// trailing `window`+1 retained samples (history padded when fewer are
    /// held) projected onto the Legendre basis and flattened. Prior
    /// outputs are never recomputed.
    pub fn orthogonal_latest(&self, window: usize, order: usize) -> Option<TimeRecord> {
        let newest = self.latest()?;
        let records = self.records();
        let needed = window + 1;
        let coeffs = if records.len() >= needed {
            kernels::legendre_window(&records[records.len() - needed..], order)
        } else {
            let mut padded = kernels::pad_start(records, needed - records.len());
            padded.extend(records.iter().cloned());
            kernels::legendre_window(&padded, order)
        };
        Some(TimeRecord::new(
            newest.time,
            newest.label,
            kernels::flatten_coefficients(&coeffs),
        ))
    }

    /// Squared distance from the newest sample to every row of `others`.
    pub fn distances_latest(&self, others: &crate::matrix::LabeledMatrix) -> Option<Vec<f64>> {
        let newest = self.latest()?;
        Some(
            others
                .rows()
                .iter()
                .map(|row| kernels::squared_distance(&newest.values, &row.values))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::batch::TimeSeries;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    fn feed(series: &mut StreamingSeries, records: &[TimeRecord]) {
        for rec in records {
            assert!(series.push(rec.clone()));
        }
    }

    fn wave(n: usize) -> Vec<TimeRecord> {
        (0..n)
            .map(|i| {
                let t = i as f64 * 0.1;
                TimeRecord::new(t, 0, vec![t.sin(), t * t])
            })
            .collect()
    }

    #[test]
    fn push_rejects_mismatch() {
        let mut series = StreamingSeries::new(8, 10.0);
        assert!(series.push(TimeRecord::new(0.0, 0, vec![1.0, 2.0])));
        assert!(!series.push(TimeRecord::new(1.0, 0, vec![1.0])));
        assert!(!series.push(TimeRecord::new(-1.0, 0, vec![1.0, 2.0])));
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn smoothed_latest_matches_batch_last_sample() {
        let records = wave(30);
        let batch = TimeSeries::from_records(records.clone()).gaussian_filter(0.4);
        let mut streaming = StreamingSeries::new(8, 0.4 * kernels::GAUSSIAN_CUTOFF_SIGMAS);
        feed(&mut streaming, &records);
        let latest = streaming.smoothed_latest(0.4).unwrap();
        let expected = batch.records().last().unwrap();
        // The causal path truncates at the cutoff; weights out there are
        // below exp(-12.5), so agreement is tight but not bitwise.
        for (a, b) in latest.values.iter().zip(&expected.values) {
            assert!(approx_eq(*a, *b, 1e-4));
        }
    }

    #[test]
    fn derivative_latest_matches_batch_last_sample() {
        let records = wave(20);
        let batch1 = TimeSeries::from_records(records.clone()).derivative(1);
        let batch2 = TimeSeries::from_records(records.clone()).derivative(2);
        let mut streaming = StreamingSeries::new(12, 0.0);
        feed(&mut streaming, &records);

        let d1 = streaming.derivative_latest(1).unwrap();
        for (a, b) in d1.values.iter().zip(&batch1.records().last().unwrap().values) {
            assert!(approx_eq(*a, *b, 1e-9));
        }
        let d2 = streaming.derivative_latest(2).unwrap();
        for (a, b) in d2.values.iter().zip(&batch2.records().last().unwrap().values) {
            assert!(approx_eq(*a, *b, 1e-9));
        }
    }

    #[test]
    fn derivative_latest_short_history_is_zero() {
        let mut streaming = StreamingSeries::new(4, 0.0);
        streaming.push(TimeRecord::new(0.0, 0, vec![5.0]));
        let d = streaming.derivative_latest(1).unwrap();
        assert_eq!(d.values, vec![0.0]);
    }

    #[test]
    fn orthogonal_latest_matches_batch_last_sample() {
        let records = wave(25);
        let batch = TimeSeries::from_records(records.clone()).orthogonal_transformation(6, 3);
        let mut streaming = StreamingSeries::new(7, 0.0);
        feed(&mut streaming, &records);
        let latest = streaming.orthogonal_latest(6, 3).unwrap();
        let expected = batch.records().last().unwrap();
        assert_eq!(latest.values.len(), expected.values.len());
        for (a, b) in latest.values.iter().zip(&expected.values) {
            assert!(approx_eq(*a, *b, 1e-9));
        }
    }

    #[test]
    fn mean_and_distances_cover_retained_window() {
        let mut streaming = StreamingSeries::new(3, 0.0);
        for i in 0..5 {
            streaming.push(TimeRecord::new(i as f64, 0, vec![i as f64, 0.0]));
        }
        // Only the trailing three samples (2, 3, 4) remain.
        assert!(approx_eq(streaming.mean()[0], 3.0, 1e-12));

        let mut centroids = crate::matrix::LabeledMatrix::new();
        centroids.push_row(0, vec![4.0, 0.0]);
        centroids.push_row(1, vec![0.0, 3.0]);
        let d = streaming.distances_latest(&centroids).unwrap();
        assert!(approx_eq(d[0], 0.0, 1e-12));
        assert!(approx_eq(d[1], 25.0, 1e-12));
    }

    #[test]
    fn orthogonal_latest_pads_before_window_fills() {
        let mut streaming = StreamingSeries::new(6, 0.0);
        streaming.push(TimeRecord::new(0.0, 0, vec![1.0]));
        let out = streaming.orthogonal_latest(4, 2).unwrap();
        // Output exists from the first tick and has the full flattened width.
        assert_eq!(out.values.len(), 3);
    }
}
