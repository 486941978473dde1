//! Training orchestration over a corpus of labeled procedures.
//!
//! Drives the full offline pipeline: per-procedure feature extraction,
//! corpus-wide PCA fitting, per-task centroid construction with globally
//! unique cluster ids, quantization, and HMM estimation. Training is
//! all-or-nothing: every failure path returns before a snapshot exists, so
//! previously fitted parameters are never partially overwritten.
//!
//! A long corpus can be cancelled cooperatively; the flag is polled
//! between corpus entries, not within a single procedure's transform.

use crate::config::SegmentationConfig;
use crate::error::{Error, Result};
use crate::hmm::WorkflowHmm;
use crate::matrix::LabeledMatrix;
use crate::model::ModelSnapshot;
use crate::pipeline::extract_features;
use crate::quantizer::{allocate_centroids_by_label, assign, build_centroids};
use crate::series::{TimeSeries, TimeRecord};
use tracing::{debug, info};

/// Train a segmentation model over labeled procedures.
pub fn train(corpus: &[TimeSeries], config: &SegmentationConfig) -> Result<ModelSnapshot> {
    train_cancellable(corpus, config, || false)
}

/// Train with a cooperative cancellation check, polled between corpus
/// entries.
pub fn train_cancellable(
    corpus: &[TimeSeries],
    config: &SegmentationConfig,
    should_cancel: impl Fn() -> bool,
) -> Result<ModelSnapshot> {
    config.validate()?;
    let procedures: Vec<&TimeSeries> = corpus.iter().filter(|s| !s.is_empty()).collect();
    if procedures.is_empty() {
        return Err(Error::EmptyCorpus);
    }
    let num_tasks = config.task_names.len();
    for series in &procedures {
        for rec in series.records() {
            if rec.label as usize >= num_tasks {
                return Err(Error::Config(format!(
                    "sample label {} outside the {} configured tasks",
                    rec.label, num_tasks
                )));
            }
        }
    }
    info!(procedures = procedures.len(), "training started");

    // Per-procedure features, raw until corpus-wide statistics are known.
    let mut features = Vec::with_capacity(procedures.len());
    for (i, series) in procedures.iter().enumerate() {
        if should_cancel() {
            return Err(Error::Cancelled);
        }
        let f = extract_features(series, config);
        debug!(procedure = i, samples = f.len(), width = f.dim(), "features extracted");
        features.push(f);
    }

    // Fit PCA on the concatenated corpus, then project every procedure.
    let mut corpus_features = TimeSeries::new();
    for f in &features {
        corpus_features = corpus_features.concatenate(f);
    }
    let pca_mean = corpus_features.mean();
    let k = config.pca_components.min(corpus_features.dim());
    let components = corpus_features.calculate_pca(k);
    let projected: Vec<TimeSeries> = features
        .iter()
        .map(|f| f.transform_pca(&components, &pca_mean))
        .collect();
    let mut corpus_projected = TimeSeries::new();
    for p in &projected {
        corpus_projected = corpus_projected.concatenate(p);
    }
    info!(components = components.len(), "PCA fitted");

    // Per-task cluster budget over every configured task, so a task that
    // never appears fails the allocation instead of silently vanishing.
    let mut counts: Vec<(u32, usize)> = (0..num_tasks as u32).map(|l| (l, 0)).collect();
    for rec in corpus_projected.records() {
        counts[rec.label as usize].1 += 1;
    }
    let allocation =
        allocate_centroids_by_label(&counts, config.total_clusters, config.equalization)?;

    // Build centroids task by task; a running offset keeps every cluster
    // id globally unique.
    let mut centroids = LabeledMatrix::new();
    let mut offset = 0u32;
    for &(label, cluster_count) in &allocation {
        if should_cancel() {
            return Err(Error::Cancelled);
        }
        let members: Vec<TimeRecord> = corpus_projected
            .records()
            .iter()
            .filter(|r| r.label == label)
            .cloned()
            .collect();
        let task_series = TimeSeries::from_records(members);
        let built = build_centroids(&task_series, cluster_count)?;
        for row in built.rows() {
            centroids.push_row(row.label + offset, row.values.clone());
        }
        debug!(task = label, clusters = cluster_count, offset, "task centroids built");
        offset += cluster_count as u32;
    }

    // Quantize every procedure and fit the HMM over all sequences.
    let symbol_names: Vec<String> = (0..centroids.len()).map(|i| i.to_string()).collect();
    let mut hmm = WorkflowHmm::new(config.task_names.clone(), symbol_names);
    hmm.add_pseudo_data(
        config.pi_pseudo_scale,
        config.a_pseudo_scale,
        config.b_pseudo_scale,
    );
    for series in &projected {
        let mut sequence = Vec::with_capacity(series.len());
        for rec in series.records() {
            let symbol = assign(&rec.values, &centroids)
                .ok_or_else(|| Error::Model("empty centroid set".into()))?;
            sequence.push((rec.label as usize, symbol as usize));
        }
        hmm.add_estimation_data(&sequence)?;
    }
    hmm.estimate_parameters();
    info!(
        states = hmm.num_states(),
        symbols = hmm.num_symbols(),
        "training complete"
    );

    Ok(ModelSnapshot::new(
        config.clone(),
        pca_mean,
        components,
        centroids,
        hmm,
    ))
}
