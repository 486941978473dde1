//! Segmentation pipeline configuration.
//!
//! One config drives both training and live sessions; every numeric knob
//! is validated against its bounds before any pipeline runs, so transform
//! code never re-checks them.

use crate::error::{Error, Result};
use kinseg_math::MAX_LEGENDRE_DEGREE;
use serde::{Deserialize, Serialize};

/// Configuration for the feature pipeline and model fitting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Workflow task names, in state-index order. Fixed at training time;
    /// the trained model carries a copy.
    pub task_names: Vec<String>,

    /// Gaussian smoothing width in time units (standard deviation of the
    /// kernel). 0 disables smoothing.
    pub smoothing_width: f64,

    /// Highest derivative order appended to the feature vector.
    /// 0 keeps only the smoothed signal.
    pub derivative_order: usize,

    /// Trailing window length (in samples, excluding the sample itself)
    /// for the orthogonal expansion.
    pub orthogonal_window: usize,

    /// Highest Legendre degree of the orthogonal expansion (0..=6).
    pub orthogonal_order: usize,

    /// Number of principal components kept after the expansion.
    pub pca_components: usize,

    /// Total quantizer clusters, split across task labels.
    pub total_clusters: usize,

    /// Pseudo-count scale for the initial-state distribution.
    pub pi_pseudo_scale: f64,

    /// Pseudo-count scale for the transition matrix.
    pub a_pseudo_scale: f64,

    /// Pseudo-count scale for the emission matrix.
    pub b_pseudo_scale: f64,

    /// Pull of the per-label cluster budget toward an even split
    /// (0 = purely proportional, 1 = equal shares).
    pub equalization: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            task_names: Vec::new(),
            smoothing_width: 0.5,
            derivative_order: 1,
            orthogonal_window: 8,
            orthogonal_order: 3,
            pca_components: 4,
            total_clusters: 12,
            pi_pseudo_scale: 0.1,
            a_pseudo_scale: 0.1,
            b_pseudo_scale: 0.1,
            equalization: 0.5,
        }
    }
}

impl SegmentationConfig {
    /// Preset for fast, short procedures: tighter smoothing and windows so
    /// state changes show up with less lag.
    pub fn low_latency() -> Self {
        Self {
            smoothing_width: 0.2,
            orthogonal_window: 4,
            orthogonal_order: 2,
            ..Default::default()
        }
    }

    /// Validate every numeric bound. Called once by training and session
    /// construction.
    pub fn validate(&self) -> Result<()> {
        if self.task_names.is_empty() {
            return Err(Error::Config("task_names must not be empty".into()));
        }
        if !self.smoothing_width.is_finite() || self.smoothing_width < 0.0 {
            return Err(Error::Config(format!(
                "smoothing_width must be finite and >= 0, got {}",
                self.smoothing_width
            )));
        }
        if self.orthogonal_window == 0 {
            return Err(Error::Config("orthogonal_window must be >= 1".into()));
        }
        if self.orthogonal_order > MAX_LEGENDRE_DEGREE {
            return Err(Error::Config(format!(
                "orthogonal_order must be <= {MAX_LEGENDRE_DEGREE}, got {}",
                self.orthogonal_order
            )));
        }
        if self.pca_components == 0 {
            return Err(Error::Config("pca_components must be >= 1".into()));
        }
        if self.total_clusters < self.task_names.len() {
            return Err(Error::Config(format!(
                "total_clusters ({}) must cover every task ({})",
                self.total_clusters,
                self.task_names.len()
            )));
        }
        for (name, scale) in [
            ("pi_pseudo_scale", self.pi_pseudo_scale),
            ("a_pseudo_scale", self.a_pseudo_scale),
            ("b_pseudo_scale", self.b_pseudo_scale),
        ] {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(Error::Config(format!(
                    "{name} must be finite and > 0, got {scale}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.equalization) {
            return Err(Error::Config(format!(
                "equalization must be in [0, 1], got {}",
                self.equalization
            )));
        }
        Ok(())
    }

    /// Index of a task name; None is a lookup failure the caller checks.
    pub fn task_index(&self, name: &str) -> Option<usize> {
        self.task_names.iter().position(|n| n == name)
    }
}
