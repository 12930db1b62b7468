//! Ingest error types.
//!
//! Everything here is fatal to the fetch in progress: a registry that
//! does not declare the requested endpoint, a request that cannot be
//! built or executed, or a record that cannot be sealed. There is no
//! degraded tier — an ingest either produces a complete raw file plus
//! sealed record, or nothing.

use thiserror::Error;

use etalon_core::error::CanonicalizationError;

/// Errors raised while fetching and recording raw data.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The source registry or the fetch parameters are unusable.
    #[error("ingest configuration error: {detail}")]
    Config { detail: String },

    /// The request URL could not be constructed.
    #[error("failed to build request URL from {base}: {source}")]
    Url {
        base: String,
        source: url::ParseError,
    },

    /// The HTTP fetch failed.
    #[error("fetch from {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },

    /// Record canonicalization failed while sealing.
    #[error("failed to seal record: {0}")]
    Seal(#[from] CanonicalizationError),

    /// Digesting the persisted raw file failed.
    #[error("failed to digest raw file: {0}")]
    Digest(#[from] etalon_core::EtalonError),

    /// Record serialization failed.
    #[error("failed to serialize record: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    /// Shorthand for a configuration failure.
    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }
}

/// Result type alias for ingest operations.
pub type IngestResult<T> = Result<T, IngestError>;
