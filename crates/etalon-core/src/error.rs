//! # Error Types — Shared Error Hierarchy
//!
//! Defines the error types shared across the Etalon stack. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Canonicalization and integrity failures carry full context.
//! - Timestamp errors quote the offending input; callers that treat an
//!   unparseable timestamp as a degraded (non-fatal) condition discard the
//!   error and record the degradation in their own output.

use thiserror::Error;

/// Top-level error type for the Etalon stack.
#[derive(Error, Debug)]
pub enum EtalonError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// Content integrity violation (digest mismatch, malformed digest).
    #[error("integrity error: {0}")]
    Integrity(String),

    /// Timestamp could not be parsed as a UTC instant.
    #[error("timestamp error: {0}")]
    Timestamp(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// JSON or JCS serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
