//! Trained model artifact.
//!
//! A [`ModelSnapshot`] holds everything the streaming path needs: the
//! fitted PCA mean and components, the centroid set, the estimated HMM,
//! and the configuration it was trained with. Snapshots are immutable
//! after training; sessions share one through `Arc`, and re-training
//! produces a new snapshot rather than mutating the old one, so a live
//! session can never observe a half-updated model.

use crate::config::SegmentationConfig;
use crate::error::{Error, Result};
use crate::hmm::WorkflowHmm;
use crate::matrix::LabeledMatrix;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Immutable trained segmentation model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSnapshot {
    /// Identifier of the training run that produced this snapshot.
    pub id: Uuid,
    /// Creation time of the snapshot.
    pub created_at: DateTime<Utc>,
    /// Configuration the model was trained with.
    pub config: SegmentationConfig,
    /// PCA mean vector (feature-space width).
    pub pca_mean: Vec<f64>,
    /// PCA component rows, labeled 0..k-1 in descending eigenvalue order.
    pub pca_components: LabeledMatrix,
    /// Centroid rows labeled by globally unique cluster id.
    pub centroids: LabeledMatrix,
    /// Estimated HMM over task states and cluster symbols.
    pub hmm: WorkflowHmm,
}

impl ModelSnapshot {
    pub fn new(
        config: SegmentationConfig,
        pca_mean: Vec<f64>,
        pca_components: LabeledMatrix,
        centroids: LabeledMatrix,
        hmm: WorkflowHmm,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            config,
            pca_mean,
            pca_components,
            centroids,
            hmm,
        }
    }

    /// Task name for a state index, for external output.
    pub fn task_name(&self, state: usize) -> Option<&str> {
        self.hmm.state_name(state)
    }

    /// Consistency checks between the fitted pieces. Run on every load so
    /// a hand-edited artifact fails before a session starts.
    pub fn validate(&self) -> Result<()> {
        self.config.validate()?;
        if !self.hmm.is_estimated() {
            return Err(Error::Model("HMM parameters are not estimated".into()));
        }
        if self.hmm.num_states() != self.config.task_names.len() {
            return Err(Error::Model(format!(
                "HMM has {} states but config names {} tasks",
                self.hmm.num_states(),
                self.config.task_names.len()
            )));
        }
        if self.hmm.num_symbols() != self.centroids.len() {
            return Err(Error::Model(format!(
                "HMM has {} symbols but {} centroids exist",
                self.hmm.num_symbols(),
                self.centroids.len()
            )));
        }
        if self.centroids.width() != self.pca_components.len() {
            return Err(Error::Model(format!(
                "centroid width {} does not match {} PCA components",
                self.centroids.width(),
                self.pca_components.len()
            )));
        }
        if self.pca_components.width() != self.pca_mean.len() {
            return Err(Error::Model(format!(
                "PCA component width {} does not match mean length {}",
                self.pca_components.width(),
                self.pca_mean.len()
            )));
        }
        Ok(())
    }

    /// Persist as JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load and validate a JSON artifact.
    pub fn load_json(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let snapshot: ModelSnapshot = serde_json::from_str(&text)?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}
