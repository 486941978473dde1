//! A single timestamped, labeled feature vector.

use serde::{Deserialize, Serialize};

/// One sample of a time series: a timestamp, a task/symbol label, and a
/// feature vector. Records are copied, never aliased, when they move
/// between pipeline stages, so downstream stages never observe mutation of
/// upstream state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRecord {
    /// Sample timestamp in seconds. Non-decreasing within one series.
    pub time: f64,
    /// Task id during training, symbol id after quantization. Context
    /// dependent; inference is purely by integer index.
    pub label: u32,
    /// Feature values. Fixed width within one series.
    pub values: Vec<f64>,
}

impl TimeRecord {
    pub fn new(time: f64, label: u32, values: Vec<f64>) -> Self {
        Self {
            time,
            label,
            values,
        }
    }

    /// Feature dimension of this record.
    pub fn dim(&self) -> usize {
        self.values.len()
    }
}
