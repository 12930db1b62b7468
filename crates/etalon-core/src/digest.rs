//! # Content Digests — Record and Raw-File Hashing
//!
//! Defines `ContentDigest` and the two digest paths the stack uses:
//!
//! 1. **Canonical-object hashing** — [`sha256_digest()`] accepts only
//!    `&CanonicalBytes`, so every record digest in the system is provably
//!    computed over RFC 8785 canonical bytes. This is the path for
//!    `record_sha256` and any other digest embedded in a document.
//!
//! 2. **Raw-content hashing** — [`sha256_hex_file()`] and
//!    [`sha256_hex_bytes()`] hash verbatim content: raw service responses
//!    stored on disk, package output files listed in a manifest. These are
//!    deliberately named so a reviewer can tell at the call site which kind
//!    of bytes is being hashed.
//!
//! SHA-256 is the only algorithm in the stack; the tag exists so manifests
//! and status documents can name it explicitly.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::EtalonError;

/// The hash algorithm used to produce a content digest.
///
/// SHA-256 only. MD5 and SHA-1 are never used anywhere in the stack, and
/// the single-variant enum keeps that decision visible in every document
/// that carries an algorithm tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestAlgorithm {
    /// SHA-256 — the stack-wide content addressing algorithm.
    #[serde(rename = "sha256")]
    Sha256,
}

impl DigestAlgorithm {
    /// Returns the algorithm identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A content digest with its algorithm tag.
///
/// Produced from `CanonicalBytes` via [`sha256_digest()`] for record
/// hashing, or parsed back from a stored hex string via
/// [`ContentDigest::from_hex()`] for verification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest {
    /// The hash algorithm that produced this digest.
    pub algorithm: DigestAlgorithm,
    /// The raw 32-byte digest value.
    pub bytes: [u8; 32],
}

impl ContentDigest {
    /// Create a new content digest from raw bytes and algorithm.
    ///
    /// Prefer [`sha256_digest()`] for constructing digests from
    /// `CanonicalBytes`.
    pub fn new(algorithm: DigestAlgorithm, bytes: [u8; 32]) -> Self {
        Self { algorithm, bytes }
    }

    /// Parse a digest from a 64-character lowercase hex string.
    ///
    /// # Errors
    ///
    /// Returns `EtalonError::Integrity` if the string is not exactly 64
    /// lowercase hex characters.
    pub fn from_hex(algorithm: DigestAlgorithm, hex: &str) -> Result<Self, EtalonError> {
        if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
        {
            return Err(EtalonError::Integrity(format!(
                "digest must be 64 lowercase hex characters, got: {hex:?}"
            )));
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let s = std::str::from_utf8(chunk)
                .map_err(|e| EtalonError::Integrity(format!("digest hex not UTF-8: {e}")))?;
            bytes[i] = u8::from_str_radix(s, 16)
                .map_err(|e| EtalonError::Integrity(format!("digest hex parse failed: {e}")))?;
        }
        Ok(Self { algorithm, bytes })
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}

/// Compute a SHA-256 content digest from canonical bytes.
///
/// The function signature enforces that only `CanonicalBytes` (produced
/// through the JCS pipeline) can be hashed on this path, preventing any
/// code from embedding a digest over non-canonical serialization.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    let hash = Sha256::digest(data.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ContentDigest::new(DigestAlgorithm::Sha256, bytes)
}

/// Compute a SHA-256 hex string from canonical bytes.
///
/// Convenience wrapper around [`sha256_digest()`] for contexts that embed
/// the digest as a hex string (e.g., a record's `record_sha256` field).
pub fn sha256_hex(data: &CanonicalBytes) -> String {
    sha256_digest(data).to_hex()
}

/// Compute the SHA-256 hex digest of raw bytes.
///
/// Raw-content path: for verbatim service responses and package files, not
/// for anything that was serialized from a document (use
/// [`sha256_hex()`] with `CanonicalBytes` there).
pub fn sha256_hex_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let result = hasher.finalize();
    result.iter().map(|b| format!("{b:02x}")).collect()
}

/// Compute the SHA-256 hex digest of a file's verbatim content.
pub fn sha256_hex_file(path: &Path) -> Result<String, EtalonError> {
    let bytes = std::fs::read(path)?;
    Ok(sha256_hex_bytes(&bytes))
}

/// Compute a SHA-256 [`ContentDigest`] of a file's verbatim content.
///
/// Same raw-content path as [`sha256_hex_file()`], returning the typed
/// digest for callers that compare digests rather than embed them.
pub fn sha256_digest_file(path: &Path) -> Result<ContentDigest, EtalonError> {
    let bytes = std::fs::read(path)?;
    let hash = Sha256::digest(&bytes);
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&hash);
    Ok(ContentDigest::new(DigestAlgorithm::Sha256, digest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn sha256_digest_deterministic() {
        let mut data = BTreeMap::new();
        data.insert("a", 1);
        data.insert("b", 2);
        let cb = CanonicalBytes::new(&data).unwrap();
        let d1 = sha256_digest(&cb);
        let d2 = sha256_digest(&cb);
        assert_eq!(d1, d2);
        assert_eq!(d1.algorithm, DigestAlgorithm::Sha256);
    }

    #[test]
    fn sha256_hex_format() {
        let data = serde_json::json!({"key": "value"});
        let cb = CanonicalBytes::new(&data).unwrap();
        let hex = sha256_hex(&cb);
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn content_digest_display() {
        let data = serde_json::json!({"a": 1});
        let cb = CanonicalBytes::new(&data).unwrap();
        let digest = sha256_digest(&cb);
        let s = format!("{digest}");
        assert!(s.starts_with("sha256:"));
        assert_eq!(s.len(), 7 + 64); // "sha256:" + 64 hex chars
    }

    #[test]
    fn different_inputs_different_digests() {
        let cb1 = CanonicalBytes::new(&serde_json::json!({"a": 1})).unwrap();
        let cb2 = CanonicalBytes::new(&serde_json::json!({"a": 2})).unwrap();
        assert_ne!(sha256_digest(&cb1), sha256_digest(&cb2));
    }

    #[test]
    fn known_sha256_vector_empty_object() {
        // SHA256 of the empty JSON object "{}" is a known value.
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        assert_eq!(cb.as_bytes(), b"{}");
        let digest = sha256_digest(&cb);
        assert_eq!(
            digest.to_hex(),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }

    #[test]
    fn known_sha256_vector_empty_bytes() {
        assert_eq!(
            sha256_hex_bytes(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn sha256_hex_file_matches_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("raw.json");
        std::fs::write(&file_path, b"{\"result\": \"ok\"}").unwrap();
        let from_file = sha256_hex_file(&file_path).unwrap();
        assert_eq!(from_file, sha256_hex_bytes(b"{\"result\": \"ok\"}"));
    }

    #[test]
    fn sha256_hex_file_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = sha256_hex_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, EtalonError::Io(_)));
    }

    #[test]
    fn sha256_digest_file_agrees_with_hex_file() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("raw.json");
        std::fs::write(&file_path, b"payload").unwrap();
        let digest = sha256_digest_file(&file_path).unwrap();
        assert_eq!(digest.to_hex(), sha256_hex_file(&file_path).unwrap());
    }

    // ── from_hex ────────────────────────────────────────────────────────

    #[test]
    fn from_hex_roundtrip() {
        let cb = CanonicalBytes::new(&serde_json::json!({"x": 1})).unwrap();
        let digest = sha256_digest(&cb);
        let parsed = ContentDigest::from_hex(DigestAlgorithm::Sha256, &digest.to_hex()).unwrap();
        assert_eq!(parsed, digest);
    }

    #[test]
    fn from_hex_rejects_short() {
        assert!(ContentDigest::from_hex(DigestAlgorithm::Sha256, "abc123").is_err());
    }

    #[test]
    fn from_hex_rejects_uppercase() {
        let hex = "E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855";
        assert!(ContentDigest::from_hex(DigestAlgorithm::Sha256, hex).is_err());
    }

    #[test]
    fn from_hex_rejects_non_hex() {
        let hex = "zz".repeat(32);
        assert!(ContentDigest::from_hex(DigestAlgorithm::Sha256, &hex).is_err());
    }

    #[test]
    fn digest_algorithm_display() {
        assert_eq!(DigestAlgorithm::Sha256.to_string(), "sha256");
    }

    #[test]
    fn digest_algorithm_serde_tag() {
        let s = serde_json::to_string(&DigestAlgorithm::Sha256).unwrap();
        assert_eq!(s, "\"sha256\"");
    }
}
