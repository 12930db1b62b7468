//! Schema-layer error types.
//!
//! Only load and compile failures are errors: a missing input file, a
//! file that is not valid JSON, or a record schema that cannot be
//! compiled. A record that merely fails its checks is not an error — it
//! produces a [`RecordReport`](crate::record::RecordReport) with
//! `valid = false` and the failure lines inside.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or compiling validation inputs.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A required input file does not exist.
    #[error("required file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// JSON parsing failed.
    #[error("failed to parse JSON at {path}: {source}")]
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The record schema is not a usable JSON Schema document.
    #[error("failed to compile record schema: {reason}")]
    SchemaCompile { reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;
