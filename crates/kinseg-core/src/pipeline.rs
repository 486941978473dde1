//! Feature pipeline: smoothing -> derivatives -> orthogonal expansion ->
//! PCA -> quantization -> decode.
//!
//! The batch path runs each stage over a whole procedure; a
//! [`StreamingSession`] runs the same stages once per arriving sample over
//! bounded trailing windows, finishing a full pass before the next tick.
//! Both paths read the same immutable [`ModelSnapshot`].

use crate::config::SegmentationConfig;
use crate::error::{Error, Result};
use crate::hmm::OnlineDecoder;
use crate::model::ModelSnapshot;
use crate::quantizer;
use crate::series::{
    StreamingSeries, TimeRecord, TimeSeries, GAUSSIAN_CUTOFF_SIGMAS,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Count bound on the raw window; the causal Gaussian is really governed
/// by its time-span bound, this just floors the retained history.
const RAW_WINDOW_FLOOR: usize = 8;

/// Batch feature extraction: Gaussian smoothing, derivatives 1..=order
/// appended in the feature dimension, then the windowed orthogonal
/// expansion. Labels and timestamps ride through unchanged.
pub fn extract_features(series: &TimeSeries, config: &SegmentationConfig) -> TimeSeries {
    let filtered = series.gaussian_filter(config.smoothing_width);
    let mut combined = filtered.clone();
    for order in 1..=config.derivative_order {
        combined = combined.concatenate_values(&filtered.derivative(order));
    }
    combined.orthogonal_transformation(config.orthogonal_window, config.orthogonal_order)
}

/// Quantize a PCA-projected series into symbol ids.
pub fn quantize_series(projected: &TimeSeries, model: &ModelSnapshot) -> Result<Vec<usize>> {
    projected
        .records()
        .iter()
        .map(|rec| {
            quantizer::assign(&rec.values, &model.centroids)
                .map(|id| id as usize)
                .ok_or_else(|| Error::Model("empty centroid set".into()))
        })
        .collect()
}

/// Batch segmentation: the full most-likely task-label sequence for a
/// recorded procedure, one label per input sample.
pub fn segment_procedure(model: &ModelSnapshot, series: &TimeSeries) -> Result<Vec<String>> {
    if series.is_empty() {
        return Err(Error::EmptyProcedure);
    }
    let features = extract_features(series, &model.config);
    let projected = features.transform_pca(&model.pca_components, &model.pca_mean);
    let symbols = quantize_series(&projected, model)?;
    let states = model.hmm.decode(&symbols)?;
    debug!(samples = states.len(), "batch segmentation complete");
    states
        .iter()
        .map(|&s| {
            model
                .task_name(s)
                .map(str::to_owned)
                .ok_or_else(|| Error::Model(format!("state {s} has no task name")))
        })
        .collect()
}

/// A live segmentation session over one tracked tool.
///
/// Each call to [`push`](Self::push) runs the whole streaming pipeline for
/// that tick and returns the current best-estimate task label. The model
/// snapshot is shared read-only; a session owns no mutable copy of it.
#[derive(Debug)]
pub struct StreamingSession {
    model: Arc<ModelSnapshot>,
    raw: StreamingSeries,
    smoothed: StreamingSeries,
    features: StreamingSeries,
    decoder: OnlineDecoder,
    ticks: u64,
}

impl StreamingSession {
    pub fn new(model: Arc<ModelSnapshot>) -> Result<Self> {
        model.validate()?;
        let config = &model.config;
        let raw_span = GAUSSIAN_CUTOFF_SIGMAS * config.smoothing_width;
        // Enough retained history that the delegated batch derivative
        // kernel sees no boundary effect at the newest index.
        let smoothed_len = (2 * config.derivative_order + 4).max(4);
        let decoder = model.hmm.online_decoder()?;
        Ok(Self {
            raw: StreamingSeries::new(RAW_WINDOW_FLOOR, raw_span),
            smoothed: StreamingSeries::new(smoothed_len, 0.0),
            features: StreamingSeries::new(config.orthogonal_window + 1, 0.0),
            decoder,
            ticks: 0,
            model,
        })
    }

    /// Number of samples pushed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn model(&self) -> &ModelSnapshot {
        &self.model
    }

    /// Feed one pose sample; returns the current best-estimate task label.
    ///
    /// A tick that cannot produce a valid label (mis-shaped sample,
    /// regressing timestamp) withholds its output and leaves the session
    /// running.
    pub fn push(&mut self, time: f64, values: Vec<f64>) -> Option<String> {
        self.ticks += 1;
        let config = &self.model.config;

        if !self.raw.push(TimeRecord::new(time, 0, values)) {
            warn!(tick = self.ticks, "sample rejected; withholding output");
            return None;
        }
        let smoothed = self.raw.smoothed_latest(config.smoothing_width)?;
        if !self.smoothed.push(smoothed.clone()) {
            return None;
        }

        let mut feature_values = smoothed.values;
        for order in 1..=config.derivative_order {
            feature_values.extend(self.smoothed.derivative_latest(order)?.values);
        }
        if !self
            .features
            .push(TimeRecord::new(time, 0, feature_values))
        {
            return None;
        }

        let expanded = self
            .features
            .orthogonal_latest(config.orthogonal_window, config.orthogonal_order)?;
        let projected = project(&expanded.values, &self.model);
        let symbol = quantizer::assign(&projected, &self.model.centroids)?;
        let state = match self.decoder.step(symbol as usize) {
            Ok(state) => state,
            Err(err) => {
                warn!(tick = self.ticks, %err, "decode step failed; withholding output");
                return None;
            }
        };
        self.model.task_name(state).map(str::to_owned)
    }

    /// Drop all per-session state, keeping the shared model.
    pub fn reset(&mut self) {
        self.raw.clear();
        self.smoothed.clear();
        self.features.clear();
        self.decoder.reset();
        self.ticks = 0;
    }
}

/// Project one feature vector through the model's PCA basis.
fn project(values: &[f64], model: &ModelSnapshot) -> Vec<f64> {
    let centered: Vec<f64> = values
        .iter()
        .zip(&model.pca_mean)
        .map(|(v, m)| v - m)
        .collect();
    model
        .pca_components
        .rows()
        .iter()
        .map(|row| row.values.iter().zip(&centered).map(|(c, x)| c * x).sum())
        .collect()
}
