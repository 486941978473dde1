//! Error types for kinseg.
//!
//! Transform-level shape mismatches keep their defined-fallback semantics
//! (an unmodified copy or a zero result) and never surface here; this
//! module covers the fallible surfaces: configuration, corpus ingestion,
//! training, decoding, and artifact I/O.

use crate::hmm::HmmError;
use crate::quantizer::QuantizerError;
use thiserror::Error;

/// Result type alias for kinseg operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for kinseg.
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("empty training corpus")]
    EmptyCorpus,

    #[error("unknown task name: {0}")]
    UnknownTask(String),

    #[error("procedure has no samples after marker labeling")]
    EmptyProcedure,

    #[error("training cancelled")]
    Cancelled,

    #[error("model artifact error: {0}")]
    Model(String),

    #[error("quantizer error: {0}")]
    Quantizer(#[from] QuantizerError),

    #[error("decode error: {0}")]
    Hmm(#[from] HmmError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
