//! Pack error types.
//!
//! A structural-validation failure of the snapshot is not an error — it
//! is an outcome, recorded in the status document. Errors here are the
//! conditions under which no package (or no verification verdict) can
//! be produced at all.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building or verifying a derived package.
#[derive(Debug, Error)]
pub enum PackError {
    /// A required input file does not exist.
    #[error("required file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// A file exists but does not parse as JSON.
    #[error("failed to parse JSON at {path}: {source}")]
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A package document could not be serialized.
    #[error("failed to serialize package document: {0}")]
    Json(#[from] serde_json::Error),

    /// Hashing a package file failed.
    #[error("failed to digest {path}: {source}")]
    Digest {
        path: PathBuf,
        source: etalon_core::EtalonError,
    },

    /// The manifest itself is unusable.
    #[error("manifest error: {detail}")]
    Manifest { detail: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for pack operations.
pub type PackResult<T> = Result<T, PackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_not_found_names_the_path() {
        let err = PackError::FileNotFound {
            path: PathBuf::from("/tmp/snapshot.json"),
        };
        assert!(format!("{err}").contains("/tmp/snapshot.json"));
    }

    #[test]
    fn manifest_error_display() {
        let err = PackError::Manifest {
            detail: "bad digest for input-snapshot.json".to_string(),
        };
        assert!(format!("{err}").starts_with("manifest error:"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = PackError::from(io_err);
        assert!(matches!(err, PackError::Io(_)));
    }
}
