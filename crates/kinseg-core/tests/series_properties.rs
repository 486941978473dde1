//! Property-based tests for the series transforms and the quantizer.
//!
//! Uses proptest to verify the pipeline's contract properties across many
//! random inputs: smoothing limits, derivative/integral round trips, PCA
//! reconstruction, and quantizer coverage.

use kinseg_core::quantizer::{assign, build_centroids};
use kinseg_core::series::{squared_distance, TimeRecord, TimeSeries};
use proptest::prelude::*;

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol.max(tol * a.abs().max(b.abs()))
}

fn series_1d(values: &[f64], dt: f64) -> TimeSeries {
    TimeSeries::from_records(
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| TimeRecord::new(i as f64 * dt, 0, vec![v]))
            .collect(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Smoothing with an enormous width converges to the series mean in
    /// every dimension.
    #[test]
    fn gaussian_wide_limit_is_mean(values in prop::collection::vec(-100.0..100.0f64, 3..40)) {
        let series = series_1d(&values, 0.1);
        let mean = series.mean()[0];
        let filtered = series.gaussian_filter(1e9);
        for rec in filtered.records() {
            prop_assert!(approx_eq(rec.values[0], mean, 1e-6));
        }
    }

    /// Smoothing with a vanishing width converges to the original series.
    #[test]
    fn gaussian_narrow_limit_is_identity(values in prop::collection::vec(-100.0..100.0f64, 3..40)) {
        let series = series_1d(&values, 1.0);
        let filtered = series.gaussian_filter(1e-6);
        for (f, o) in filtered.records().iter().zip(series.records()) {
            prop_assert!(approx_eq(f.values[0], o.values[0], 1e-9));
        }
    }

    /// Trapezoidal integration of the order-1 derivative reconstructs the
    /// net change exactly for a linear ramp, for any slope and spacing.
    #[test]
    fn derivative_integral_round_trip(
        slope in -50.0..50.0f64,
        intercept in -10.0..10.0f64,
        dt in 0.01..2.0f64,
        n in 3usize..60,
    ) {
        let values: Vec<f64> = (0..n).map(|i| slope * (i as f64 * dt) + intercept).collect();
        let series = series_1d(&values, dt);
        let deriv = series.derivative(1);
        let recs = deriv.records();
        let mut integral = 0.0;
        for i in 1..recs.len() {
            let step = recs[i].time - recs[i - 1].time;
            integral += 0.5 * (recs[i].values[0] + recs[i - 1].values[0]) * step;
        }
        let net = values[n - 1] - values[0];
        prop_assert!(approx_eq(integral, net, 1e-8), "integral {integral} vs net {net}");
    }

    /// Full-rank PCA round trip: projecting through all components and
    /// reconstructing via the transpose recovers the mean-centered data.
    #[test]
    fn pca_full_rank_round_trip(
        raw in prop::collection::vec(prop::collection::vec(-10.0..10.0f64, 3), 4..30),
    ) {
        let series = TimeSeries::from_records(
            raw.iter()
                .enumerate()
                .map(|(i, v)| TimeRecord::new(i as f64, 0, v.clone()))
                .collect(),
        );
        let mean = series.mean();
        let components = series.calculate_pca(3);
        prop_assert_eq!(components.len(), 3);
        let projected = series.transform_pca(&components, &mean);
        for (orig, proj) in series.records().iter().zip(projected.records()) {
            for d in 0..3 {
                let rebuilt: f64 = components
                    .rows()
                    .iter()
                    .zip(&proj.values)
                    .map(|(row, p)| row.values[d] * p)
                    .sum();
                prop_assert!(
                    approx_eq(rebuilt, orig.values[d] - mean[d], 1e-6),
                    "dim {} rebuilt {} vs centered {}",
                    d, rebuilt, orig.values[d] - mean[d]
                );
            }
        }
    }

    /// Quantizer coverage: no empty cluster, and every sample's assigned
    /// cluster is its minimum-distance centroid.
    #[test]
    fn quantizer_coverage(
        raw in prop::collection::vec(prop::collection::vec(-50.0..50.0f64, 2), 6..40),
        clusters in 1usize..5,
    ) {
        let mut distinct = raw.clone();
        distinct.sort_by(|a, b| a.partial_cmp(b).unwrap());
        distinct.dedup();
        prop_assume!(distinct.len() >= clusters);

        let series = TimeSeries::from_records(
            raw.iter()
                .enumerate()
                .map(|(i, v)| TimeRecord::new(i as f64, 0, v.clone()))
                .collect(),
        );
        let centroids = build_centroids(&series, clusters).unwrap();
        prop_assert_eq!(centroids.len(), clusters);

        let mut counts = vec![0usize; clusters];
        for rec in series.records() {
            let id = assign(&rec.values, &centroids).unwrap() as usize;
            counts[id] += 1;
            let assigned = squared_distance(&rec.values, &centroids.row(id).unwrap().values);
            for row in centroids.rows() {
                prop_assert!(assigned <= squared_distance(&rec.values, &row.values) + 1e-12);
            }
        }
        prop_assert!(counts.iter().all(|&c| c > 0), "empty cluster: {:?}", counts);
    }

    /// Concatenation in time preserves order and length; a width mismatch
    /// falls back to an unmodified copy.
    #[test]
    fn concatenate_shape_contract(
        a in prop::collection::vec(-10.0..10.0f64, 1..20),
        b in prop::collection::vec(-10.0..10.0f64, 1..20),
    ) {
        let sa = series_1d(&a, 1.0);
        let offset: Vec<TimeRecord> = b
            .iter()
            .enumerate()
            .map(|(i, &v)| TimeRecord::new(a.len() as f64 + i as f64, 0, vec![v, v]))
            .collect();
        let sb_wide = TimeSeries::from_records(offset);
        prop_assert_eq!(sa.concatenate(&sb_wide), sa.clone());

        let sb: TimeSeries = TimeSeries::from_records(
            b.iter()
                .enumerate()
                .map(|(i, &v)| TimeRecord::new(a.len() as f64 + i as f64, 0, vec![v]))
                .collect(),
        );
        let joined = sa.concatenate(&sb);
        prop_assert_eq!(joined.len(), a.len() + b.len());
    }
}
