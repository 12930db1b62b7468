//! Engine-specific error types.
//!
//! Only fatal conditions are errors: missing input files, documents
//! that cannot be parsed, and registries that cannot be decoded.
//! Degraded data inside an otherwise well-formed document (a stale
//! measurement, an unparseable value, an unknown metric) is not an
//! error — it surfaces as a row state in the output table instead.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building a state table.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A required input file does not exist.
    #[error("required file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// JSON parsing failed.
    #[error("failed to parse JSON at {path}: {source}")]
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The observable registry could not be decoded.
    #[error("invalid observable registry: {detail}")]
    InvalidRegistry { detail: String },

    /// The snapshot document has the wrong top-level shape.
    #[error("invalid snapshot: {detail}")]
    InvalidSnapshot { detail: String },

    /// The theory document has the wrong top-level shape.
    #[error("invalid theory document: {detail}")]
    InvalidTheory { detail: String },

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
