//! Labeled numeric matrices.
//!
//! A [`LabeledMatrix`] is an ordered list of rows, each tagged with an
//! integer label and holding a fixed-width vector of doubles. It is the
//! carrier for HMM parameter rows (Pi/A/B), PCA component sets, and
//! quantizer centroid sets. The first populated row fixes the width;
//! mismatched rows are rejected rather than panicking, and callers that
//! care check the boolean result.

use serde::{Deserialize, Serialize};

/// One labeled row of a [`LabeledMatrix`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledRow {
    pub label: u32,
    pub values: Vec<f64>,
}

/// An ordered collection of labeled, uniform-width rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabeledMatrix {
    rows: Vec<LabeledRow>,
}

impl LabeledMatrix {
    /// Create an empty matrix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row width, fixed by the first populated row. 0 while empty.
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, |r| r.values.len())
    }

    /// Append a row. Returns false (and leaves the matrix unchanged) when
    /// the row width does not match the established width.
    pub fn push_row(&mut self, label: u32, values: Vec<f64>) -> bool {
        if !self.rows.is_empty() && values.len() != self.width() {
            return false;
        }
        self.rows.push(LabeledRow { label, values });
        true
    }

    pub fn rows(&self) -> &[LabeledRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&LabeledRow> {
        self.rows.get(index)
    }

    /// First row carrying the given label.
    pub fn row_by_label(&self, label: u32) -> Option<&LabeledRow> {
        self.rows.iter().find(|r| r.label == label)
    }

    /// Append all rows of `other`, keeping their labels. Rows whose width
    /// does not match are skipped; returns the number appended.
    pub fn extend_from(&mut self, other: &LabeledMatrix) -> usize {
        let mut appended = 0;
        for row in &other.rows {
            if self.push_row(row.label, row.values.clone()) {
                appended += 1;
            }
        }
        appended
    }

    /// Serialize as whitespace-separated numeric rows tagged with the row
    /// label, one row per line. This is the interchange text form for
    /// trained parameter matrices.
    pub fn to_rows_text(&self) -> String {
        let mut out = String::new();
        for row in &self.rows {
            out.push_str(&row.label.to_string());
            for v in &row.values {
                out.push(' ');
                out.push_str(&format!("{v}"));
            }
            out.push('\n');
        }
        out
    }

    /// Parse the text form produced by [`to_rows_text`](Self::to_rows_text).
    ///
    /// Returns None on any malformed line or on a width mismatch between
    /// rows.
    pub fn from_rows_text(text: &str) -> Option<Self> {
        let mut matrix = LabeledMatrix::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut fields = line.split_whitespace();
            let label: u32 = fields.next()?.parse().ok()?;
            let values: Option<Vec<f64>> = fields.map(|f| f.parse().ok()).collect();
            if !matrix.push_row(label, values?) {
                return None;
            }
        }
        Some(matrix)
    }
}
