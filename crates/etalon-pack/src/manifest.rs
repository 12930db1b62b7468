//! The SHA-256 output manifest (`derived-manifest.json`) and its
//! verification.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use subtle::ConstantTimeEq;

use etalon_core::{sha256_digest_file, ContentDigest, DigestAlgorithm};

use crate::error::{PackError, PackResult};
use crate::package::MANIFEST_FILENAME;

/// Digests every regular file in `dir` except the manifest itself.
///
/// Keys are bare file names; the `BTreeMap` keeps the serialized
/// document sorted regardless of directory iteration order.
pub fn package_manifest(dir: &Path) -> PackResult<BTreeMap<String, String>> {
    let mut manifest = BTreeMap::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == MANIFEST_FILENAME {
            continue;
        }
        let digest = sha256_digest_file(&path).map_err(|source| PackError::Digest {
            path: path.clone(),
            source,
        })?;
        manifest.insert(name, digest.to_hex());
    }
    Ok(manifest)
}

/// Result of verifying a package directory against its manifest.
#[derive(Debug, Clone, Default)]
pub struct VerifyOutcome {
    /// Manifest entries whose on-disk digest matched.
    pub verified: Vec<String>,
    /// Manifest entries whose on-disk digest did not match.
    pub mismatched: Vec<String>,
    /// Manifest entries with no file on disk.
    pub missing: Vec<String>,
    /// Files on disk (other than the manifest) the manifest does not
    /// list.
    pub unlisted: Vec<String>,
}

impl VerifyOutcome {
    /// True when every entry verified and nothing is missing or extra.
    pub fn is_intact(&self) -> bool {
        self.mismatched.is_empty() && self.missing.is_empty() && self.unlisted.is_empty()
    }
}

/// Re-hashes a package directory and compares it against its manifest.
///
/// # Errors
///
/// Errors only when no verdict can be reached: the manifest is absent,
/// unreadable, or carries a malformed digest string. Mismatched,
/// missing, and unlisted files are outcomes, not errors.
pub fn verify_package(dir: &Path) -> PackResult<VerifyOutcome> {
    let manifest_path = dir.join(MANIFEST_FILENAME);
    if !manifest_path.exists() {
        return Err(PackError::FileNotFound {
            path: manifest_path,
        });
    }
    let text = fs::read_to_string(&manifest_path)?;
    let manifest: BTreeMap<String, String> =
        serde_json::from_str(&text).map_err(|source| PackError::JsonParse {
            path: manifest_path.clone(),
            source,
        })?;

    let mut outcome = VerifyOutcome::default();
    for (name, expected_hex) in &manifest {
        let path = dir.join(name);
        if !path.is_file() {
            outcome.missing.push(name.clone());
            continue;
        }
        let expected =
            ContentDigest::from_hex(DigestAlgorithm::Sha256, expected_hex).map_err(|e| {
                PackError::Manifest {
                    detail: format!("unusable digest for {name}: {e}"),
                }
            })?;
        let actual = sha256_digest_file(&path).map_err(|source| PackError::Digest {
            path: path.clone(),
            source,
        })?;
        // Constant-time comparison over the raw 32-byte digests.
        if bool::from(expected.bytes.as_slice().ct_eq(actual.bytes.as_slice())) {
            outcome.verified.push(name.clone());
        } else {
            outcome.mismatched.push(name.clone());
        }
    }

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.path().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name != MANIFEST_FILENAME && !manifest.contains_key(&name) {
            outcome.unlisted.push(name);
        }
    }
    outcome.unlisted.sort();

    Ok(outcome)
}
