//! # Canonical Serialization — JCS-Compatible Byte Production
//!
//! This module defines `CanonicalBytes`, the sole construction path for bytes
//! used in record-digest computation across the Etalon stack.
//!
//! ## Integrity Invariant
//!
//! The `CanonicalBytes` newtype has a private inner field. The only way to
//! construct it is through `CanonicalBytes::new()`, which serializes the
//! value under RFC 8785 (JSON Canonicalization Scheme): sorted keys, compact
//! separators, shortest round-trip number rendering, deterministic byte
//! sequence.
//!
//! This makes the "wrong serialization path" defect class structurally
//! impossible: any function requiring canonical bytes for digest computation
//! must accept `&CanonicalBytes`, and the only way to produce one is through
//! the correct pipeline.
//!
//! ## Floats
//!
//! Unlike ledger-style systems that ban floats from canonical documents,
//! measurement records legitimately carry floating-point values (orbital
//! elements, tolerances, ranges). RFC 8785 fixes their serialization to the
//! ECMAScript shortest round-trip form, which `serde_jcs` implements.
//! Non-finite floats have no JSON representation; `serde_json` value
//! conversion maps them to `null`, and no upstream stage lets one reach a
//! sealed record in the first place.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by RFC 8785 canonicalization.
///
/// # Invariants
///
/// - The only constructor is `CanonicalBytes::new()`.
/// - Object keys are sorted; separators are compact; output is UTF-8.
/// - Numbers render in ECMAScript shortest round-trip form.
///
/// These invariants are enforced by the constructor and cannot be violated
/// by downstream code because the inner `Vec<u8>` is private.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// This is the ONLY way to construct `CanonicalBytes`. All record-digest
    /// computation in the stack must flow through this constructor.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::SerializationFailed` if the value
    /// cannot be converted to JSON or if JCS serialization fails. Note that
    /// non-finite floats do not error: JSON value conversion renders them
    /// as `null`.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        let bytes = serialize_canonical(&value)?;
        Ok(Self(bytes))
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Serialize a JSON value in JCS-canonical form (RFC 8785).
///
/// Uses `serde_jcs` for deterministic output: sorted keys, compact
/// separators, no trailing whitespace. The output is UTF-8 encoded bytes
/// matching `json.dumps(obj, sort_keys=True, separators=(",", ":"),
/// ensure_ascii=False).encode("utf-8")` for documents without floats, and
/// the RFC 8785 number rendering for documents with them.
fn serialize_canonical(value: &Value) -> Result<Vec<u8>, CanonicalizationError> {
    let s = serde_jcs::to_string(value)?;
    Ok(s.into_bytes())
}
