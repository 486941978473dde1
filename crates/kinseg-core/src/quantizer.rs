//! Vector quantization of feature streams into a discrete symbol alphabet.
//!
//! Centroid sets are built by greedy farthest-point seeding with a k-means
//! style refinement loop, and a per-label budget allocator splits a total
//! cluster count across task labels in proportion to their sample share.
//! Assignment is a nearest-centroid lookup over the one squared-Euclidean
//! distance used everywhere in the crate.

use crate::matrix::LabeledMatrix;
use crate::series::{squared_distance, TimeSeries};
use thiserror::Error;
use tracing::debug;

/// Refinement loop safety bound. Membership almost always stabilizes in a
/// handful of iterations; the bound caps pathological oscillation.
const MAX_REFINE_ITERATIONS: usize = 128;

/// Errors raised during centroid construction and budget allocation.
#[derive(Debug, Error)]
pub enum QuantizerError {
    #[error("not enough samples for {want} clusters: have {have}")]
    NotEnoughSamples { have: usize, want: usize },
    #[error("cannot allocate clusters over an empty corpus")]
    EmptyCorpus,
    #[error("label {label} was allocated zero clusters")]
    ZeroClusterLabel { label: u32 },
}

/// Build `clusters` centroids for the series by greedy farthest-point
/// seeding.
///
/// The first centroid is the series mean. Each subsequent centroid is the
/// sample whose minimum distance to the existing centroid set is largest.
/// After every addition the memberships are refined: reassign all samples,
/// replace any empty centroid by the same farthest-point rule (no empty
/// cluster survives into recomputation), recompute each centroid as its
/// members' mean, until membership stops changing.
///
/// Rows of the result are labeled 0..clusters-1.
pub fn build_centroids(
    series: &TimeSeries,
    clusters: usize,
) -> Result<LabeledMatrix, QuantizerError> {
    if clusters == 0 {
        return Ok(LabeledMatrix::new());
    }
    let distinct = distinct_samples(series);
    if distinct < clusters {
        return Err(QuantizerError::NotEnoughSamples {
            have: distinct,
            want: clusters,
        });
    }

    let mut centroids: Vec<Vec<f64>> = vec![series.mean()];
    refine(series, &mut centroids);
    while centroids.len() < clusters {
        let idx = farthest_sample(series, &centroids);
        centroids.push(series.records()[idx].values.clone());
        refine(series, &mut centroids);
    }
    debug!(
        clusters = centroids.len(),
        samples = series.len(),
        "centroid set built"
    );

    let mut out = LabeledMatrix::new();
    for (i, centroid) in centroids.into_iter().enumerate() {
        out.push_row(i as u32, centroid);
    }
    Ok(out)
}

/// Split `total_clusters` across labels in proportion to their sample
/// counts.
///
/// Each label's share is pulled toward the mean share by `equalization`
/// (0 = purely proportional, 1 = equal split) before rounding. Floors are
/// handed out first; the remainder goes to the labels with the largest
/// fractional parts. Every label must receive at least one cluster or the
/// allocation fails.
pub fn allocate_centroids_by_label(
    label_counts: &[(u32, usize)],
    total_clusters: usize,
    equalization: f64,
) -> Result<Vec<(u32, usize)>, QuantizerError> {
    let total_samples: usize = label_counts.iter().map(|(_, n)| n).sum();
    if label_counts.is_empty() || total_samples == 0 {
        return Err(QuantizerError::EmptyCorpus);
    }
    let mean_share = 1.0 / label_counts.len() as f64;

    let mut allocation: Vec<(u32, usize)> = Vec::with_capacity(label_counts.len());
    let mut fractions: Vec<(usize, f64)> = Vec::with_capacity(label_counts.len());
    let mut assigned = 0usize;
    for (i, &(label, count)) in label_counts.iter().enumerate() {
        let share = count as f64 / total_samples as f64;
        let adjusted = share + equalization * (mean_share - share);
        let raw = adjusted * total_clusters as f64;
        let base = raw.floor() as usize;
        allocation.push((label, base));
        fractions.push((i, raw - base as f64));
        assigned += base;
    }

    // Largest fractional part first; ties resolve to the earlier label.
    fractions.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    let mut remainder = total_clusters.saturating_sub(assigned);
    for &(i, _) in &fractions {
        if remainder == 0 {
            break;
        }
        allocation[i].1 += 1;
        remainder -= 1;
    }

    for &(label, count) in &allocation {
        if count == 0 {
            return Err(QuantizerError::ZeroClusterLabel { label });
        }
    }
    Ok(allocation)
}

/// Nearest-centroid lookup. Returns the row label of the closest centroid,
/// or None when the centroid set is empty (width mismatches lose every
/// arg-min comparison and can never win).
pub fn assign(vector: &[f64], centroids: &LabeledMatrix) -> Option<u32> {
    let mut best: Option<(u32, f64)> = None;
    for row in centroids.rows() {
        let d = squared_distance(vector, &row.values);
        match best {
            Some((_, bd)) if d >= bd => {}
            _ => best = Some((row.label, d)),
        }
    }
    best.map(|(label, _)| label)
}

/// Number of distinct sample vectors. `clusters` populated clusters can
/// only exist when at least that many distinct samples do.
fn distinct_samples(series: &TimeSeries) -> usize {
    let mut values: Vec<&[f64]> = series
        .records()
        .iter()
        .map(|r| r.values.as_slice())
        .collect();
    values.sort_by(|a, b| {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| x.total_cmp(y))
            .find(|o| o.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    values.dedup();
    values.len()
}

/// Index of the sample farthest (by minimum distance to any centroid) from
/// the current centroid set.
fn farthest_sample(series: &TimeSeries, centroids: &[Vec<f64>]) -> usize {
    let mut best = (0usize, f64::NEG_INFINITY);
    for (i, rec) in series.records().iter().enumerate() {
        let nearest = centroids
            .iter()
            .map(|c| squared_distance(&rec.values, c))
            .fold(f64::INFINITY, f64::min);
        if nearest > best.1 {
            best = (i, nearest);
        }
    }
    best.0
}

fn assign_all(series: &TimeSeries, centroids: &[Vec<f64>]) -> Vec<usize> {
    series
        .records()
        .iter()
        .map(|rec| {
            let mut best = (0usize, f64::INFINITY);
            for (c, centroid) in centroids.iter().enumerate() {
                let d = squared_distance(&rec.values, centroid);
                if d < best.1 {
                    best = (c, d);
                }
            }
            best.0
        })
        .collect()
}

/// Reassign-repair-recompute until membership is stable.
fn refine(series: &TimeSeries, centroids: &mut Vec<Vec<f64>>) -> Vec<usize> {
    let mut members = assign_all(series, centroids);
    for _ in 0..MAX_REFINE_ITERATIONS {
        // Repair empty clusters before recomputing any centroid.
        loop {
            let mut counts = vec![0usize; centroids.len()];
            for &m in &members {
                counts[m] += 1;
            }
            let Some(empty) = counts.iter().position(|&c| c == 0) else {
                break;
            };
            let idx = farthest_sample(series, centroids);
            centroids[empty] = series.records()[idx].values.clone();
            members = assign_all(series, centroids);
            // A duplicate sample can tie toward an earlier centroid; the
            // chosen sample anchors the repaired cluster regardless.
            members[idx] = empty;
        }

        let dim = centroids[0].len();
        let mut sums = vec![vec![0.0; dim]; centroids.len()];
        let mut counts = vec![0usize; centroids.len()];
        for (rec, &m) in series.records().iter().zip(&members) {
            counts[m] += 1;
            for (s, v) in sums[m].iter_mut().zip(&rec.values) {
                *s += v;
            }
        }
        for (c, (sum, count)) in sums.into_iter().zip(counts).enumerate() {
            if count > 0 {
                centroids[c] = sum.into_iter().map(|s| s / count as f64).collect();
            }
        }

        let next = assign_all(series, centroids);
        if next == members {
            break;
        }
        members = next;
    }
    members
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::TimeRecord;

    fn series_from(points: &[[f64; 2]]) -> TimeSeries {
        TimeSeries::from_records(
            points
                .iter()
                .enumerate()
                .map(|(i, p)| TimeRecord::new(i as f64, 0, p.to_vec()))
                .collect(),
        )
    }

    fn two_blob_series() -> TimeSeries {
        series_from(&[
            [0.0, 0.0],
            [0.1, 0.0],
            [0.0, 0.1],
            [0.1, 0.1],
            [5.0, 5.0],
            [5.1, 5.0],
            [5.0, 5.1],
            [5.1, 5.1],
        ])
    }

    #[test]
    fn build_centroids_separates_blobs() {
        let series = two_blob_series();
        let centroids = build_centroids(&series, 2).unwrap();
        assert_eq!(centroids.len(), 2);

        // All samples of a blob land on the same centroid, and the two
        // blobs land on different ones.
        let ids: Vec<u32> = series
            .records()
            .iter()
            .map(|r| assign(&r.values, &centroids).unwrap())
            .collect();
        assert!(ids[..4].iter().all(|&c| c == ids[0]));
        assert!(ids[4..].iter().all(|&c| c == ids[4]));
        assert_ne!(ids[0], ids[4]);
    }

    #[test]
    fn no_empty_cluster_after_build() {
        let series = two_blob_series();
        for clusters in 1..=4 {
            let centroids = build_centroids(&series, clusters).unwrap();
            let mut counts = vec![0usize; clusters];
            for rec in series.records() {
                counts[assign(&rec.values, &centroids).unwrap() as usize] += 1;
            }
            assert!(counts.iter().all(|&c| c > 0), "clusters={clusters}");
        }
    }

    #[test]
    fn assigned_cluster_is_always_nearest() {
        let series = two_blob_series();
        let centroids = build_centroids(&series, 3).unwrap();
        for rec in series.records() {
            let got = assign(&rec.values, &centroids).unwrap();
            let best = centroids
                .rows()
                .iter()
                .min_by(|a, b| {
                    squared_distance(&rec.values, &a.values)
                        .total_cmp(&squared_distance(&rec.values, &b.values))
                })
                .unwrap()
                .label;
            assert_eq!(got, best);
        }
    }

    #[test]
    fn build_centroids_needs_enough_samples() {
        let series = series_from(&[[0.0, 0.0], [1.0, 1.0]]);
        assert!(matches!(
            build_centroids(&series, 3),
            Err(QuantizerError::NotEnoughSamples { have: 2, want: 3 })
        ));
    }

    #[test]
    fn allocation_is_proportional_without_equalization() {
        let allocation =
            allocate_centroids_by_label(&[(0, 75), (1, 25)], 8, 0.0).unwrap();
        assert_eq!(allocation, vec![(0, 6), (1, 2)]);
    }

    #[test]
    fn allocation_equalization_pulls_toward_even_split() {
        let allocation =
            allocate_centroids_by_label(&[(0, 75), (1, 25)], 8, 1.0).unwrap();
        assert_eq!(allocation, vec![(0, 4), (1, 4)]);
    }

    #[test]
    fn allocation_distributes_remainder_by_fraction() {
        // Shares 0.5/0.3/0.2 of 7 clusters: floors 3/2/1, remainder 1 goes
        // to the largest fractional part (0.5 -> 3.5).
        let allocation =
            allocate_centroids_by_label(&[(0, 50), (1, 30), (2, 20)], 7, 0.0).unwrap();
        let total: usize = allocation.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 7);
        assert_eq!(allocation[0], (0, 4));
        assert_eq!(allocation[1], (1, 2));
        assert_eq!(allocation[2], (2, 1));
    }

    #[test]
    fn allocation_fails_on_zero_cluster_label() {
        let result = allocate_centroids_by_label(&[(0, 1000), (1, 0)], 4, 0.0);
        assert!(matches!(
            result,
            Err(QuantizerError::ZeroClusterLabel { label: 1 })
        ));
    }

    #[test]
    fn allocation_fails_on_empty_corpus() {
        assert!(matches!(
            allocate_centroids_by_label(&[], 4, 0.0),
            Err(QuantizerError::EmptyCorpus)
        ));
        assert!(matches!(
            allocate_centroids_by_label(&[(0, 0)], 4, 0.0),
            Err(QuantizerError::EmptyCorpus)
        ));
    }

    #[test]
    fn assign_on_empty_centroids_is_none() {
        assert_eq!(assign(&[1.0], &LabeledMatrix::new()), None);
    }
}
