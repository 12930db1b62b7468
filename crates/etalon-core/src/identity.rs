//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the identifier namespaces in the Etalon stack.
//! These prevent accidental identifier confusion — you cannot pass a
//! `SourceId` where an `ObservableId` is expected.
//!
//! Observable, source, and endpoint identifiers are data-supplied strings
//! (they come from registry and snapshot documents, which decide them), so
//! the newtypes carry the text verbatim. Record identifiers are generated
//! locally and embed a UUID component for uniqueness across repeated
//! fetches of the same target on the same day.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a tracked observable (e.g., `ecc`, `q_au`, `tp_jd`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObservableId(pub String);

/// Identifier of a measurement source (e.g., `JPL_HORIZONS`, `MPC`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceId(pub String);

/// Identifier of one endpoint under a source in the source registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointId(pub String);

/// Identifier of one ingest record: `<target>__<source>__<date>__<uuid>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl ObservableId {
    /// Wrap an observable identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Access the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl SourceId {
    /// Wrap a source identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Access the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl EndpointId {
    /// Wrap an endpoint identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Access the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl RecordId {
    /// Generate a fresh record identifier for one fetch of `target_id`
    /// from `source_id` on `date_str` (a `YYYY-MM-DD` folder date).
    pub fn generate(target_id: &str, source_id: &SourceId, date_str: &str) -> Self {
        Self(format!(
            "{target_id}__{}__{date_str}__{}",
            source_id.as_str(),
            Uuid::new_v4().simple()
        ))
    }

    /// Access the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ObservableId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ObservableId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SourceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SourceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for ObservableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for EndpointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observable_id_roundtrip() {
        let id = ObservableId::new("ecc");
        assert_eq!(id.as_str(), "ecc");
        assert_eq!(id.to_string(), "ecc");
        assert_eq!(id, ObservableId::from("ecc"));
    }

    #[test]
    fn source_id_equality_is_textual() {
        assert_eq!(SourceId::new("JPL_HORIZONS"), SourceId::from("JPL_HORIZONS"));
        assert_ne!(SourceId::new("JPL_HORIZONS"), SourceId::new("MPC"));
    }

    #[test]
    fn record_id_embeds_components() {
        let rid = RecordId::generate("3I_ATLAS", &SourceId::new("JPL_HORIZONS"), "2025-12-20");
        let s = rid.as_str();
        assert!(s.starts_with("3I_ATLAS__JPL_HORIZONS__2025-12-20__"));
        // 32-char simple UUID suffix
        let suffix = s.rsplit("__").next().unwrap();
        assert_eq!(suffix.len(), 32);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn record_ids_are_unique() {
        let src = SourceId::new("JPL_HORIZONS");
        let a = RecordId::generate("3I_ATLAS", &src, "2025-12-20");
        let b = RecordId::generate("3I_ATLAS", &src, "2025-12-20");
        assert_ne!(a, b);
    }

    #[test]
    fn serde_is_transparent_string() {
        let id = ObservableId::new("ecc");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"ecc\"");
        let back: ObservableId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
