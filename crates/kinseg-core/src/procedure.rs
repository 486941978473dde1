//! Recorded procedure ingestion.
//!
//! A recorded procedure is an ordered list of timestamped pose samples
//! plus, for training data, an ordered list of task markers. Labeling
//! assigns each sample the task of the nearest preceding marker; samples
//! before the first marker are discarded. Wire formats beyond this JSON
//! shape are owned by the host application.

use crate::config::SegmentationConfig;
use crate::error::{Error, Result};
use crate::series::{TimeRecord, TimeSeries};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One tracked pose sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseSample {
    pub time: f64,
    pub pose: Vec<f64>,
}

/// A task annotation: from this timestamp on, the named task is active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskMarker {
    pub time: f64,
    pub task: String,
}

/// A recorded procedure as persisted by the host application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordedProcedure {
    pub samples: Vec<PoseSample>,
    #[serde(default)]
    pub markers: Vec<TaskMarker>,
}

impl RecordedProcedure {
    pub fn load_json(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Pose samples as an unlabeled series (label 0 throughout), for
    /// segmentation of an unannotated recording.
    pub fn to_series(&self) -> TimeSeries {
        TimeSeries::from_records(
            self.samples
                .iter()
                .map(|s| TimeRecord::new(s.time, 0, s.pose.clone()))
                .collect(),
        )
    }

    /// Pose samples labeled by the nearest preceding marker, with marker
    /// task names resolved against the configured task list.
    ///
    /// Samples before the first marker are discarded. An unknown task name
    /// is a lookup failure surfaced as an error, not a sentinel index.
    pub fn to_labeled_series(&self, config: &SegmentationConfig) -> Result<TimeSeries> {
        let mut markers: Vec<(f64, usize)> = Vec::with_capacity(self.markers.len());
        for marker in &self.markers {
            let index = config
                .task_index(&marker.task)
                .ok_or_else(|| Error::UnknownTask(marker.task.clone()))?;
            markers.push((marker.time, index));
        }
        markers.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut series = TimeSeries::with_capacity(self.samples.len());
        let mut current: Option<usize> = None;
        let mut next_marker = 0usize;
        for sample in &self.samples {
            while next_marker < markers.len() && markers[next_marker].0 <= sample.time {
                current = Some(markers[next_marker].1);
                next_marker += 1;
            }
            if let Some(task) = current {
                series.add_record(TimeRecord::new(sample.time, task as u32, sample.pose.clone()));
            }
        }
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SegmentationConfig {
        SegmentationConfig {
            task_names: vec!["approach".into(), "insert".into()],
            ..Default::default()
        }
    }

    fn procedure() -> RecordedProcedure {
        RecordedProcedure {
            samples: (0..10)
                .map(|i| PoseSample {
                    time: i as f64,
                    pose: vec![i as f64, 0.0],
                })
                .collect(),
            markers: vec![
                TaskMarker { time: 2.0, task: "approach".into() },
                TaskMarker { time: 6.5, task: "insert".into() },
            ],
        }
    }

    #[test]
    fn labels_follow_nearest_preceding_marker() {
        let series = procedure().to_labeled_series(&config()).unwrap();
        // Samples at t=0,1 precede the first marker and are discarded.
        assert_eq!(series.len(), 8);
        assert_eq!(series.records()[0].time, 2.0);
        assert_eq!(series.records()[0].label, 0);
        assert_eq!(series.records()[4].time, 6.0);
        assert_eq!(series.records()[4].label, 0);
        assert_eq!(series.records()[5].time, 7.0);
        assert_eq!(series.records()[5].label, 1);
        assert_eq!(series.records().last().unwrap().label, 1);
    }

    #[test]
    fn unknown_task_is_an_error() {
        let mut proc = procedure();
        proc.markers.push(TaskMarker { time: 8.0, task: "drill".into() });
        assert!(matches!(
            proc.to_labeled_series(&config()),
            Err(Error::UnknownTask(name)) if name == "drill"
        ));
    }

    #[test]
    fn unsorted_markers_are_handled() {
        let mut proc = procedure();
        proc.markers.reverse();
        let series = proc.to_labeled_series(&config()).unwrap();
        assert_eq!(series.records()[0].label, 0);
        assert_eq!(series.records().last().unwrap().label, 1);
    }

    #[test]
    fn no_markers_discards_everything() {
        let proc = RecordedProcedure {
            samples: procedure().samples,
            markers: Vec::new(),
        };
        assert!(proc.to_labeled_series(&config()).unwrap().is_empty());
    }

    #[test]
    fn to_series_keeps_all_samples() {
        let series = procedure().to_series();
        assert_eq!(series.len(), 10);
        assert!(series.records().iter().all(|r| r.label == 0));
    }
}
