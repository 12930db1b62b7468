//! The `derived-status.json` document.

use serde::{Deserialize, Serialize};

use etalon_core::Timestamp;

use crate::validate::ValidationState;

/// Kind tag carried by every package built by this tool.
pub const PACKAGE_KIND: &str = "derived-snapshot";
/// Data-layer classification of the package contents.
pub const CLASSIFICATION_DERIVED: &str = "DERIVED";
/// Scope tag: the only validation performed here is structural.
pub const VALIDATION_SCOPE_STRUCTURAL: &str = "STRUCTURAL_ONLY";
/// Non-interpretation statement embedded verbatim in every status
/// document.
pub const STATEMENT: &str =
    "NO INTERPRETATION. NO SCIENTIFIC CLAIMS. PACKAGING + STRUCTURAL VALIDATION ONLY.";

/// Where the packaged input came from: a pinned path in a pinned commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputProvenance {
    pub source_repo: String,
    pub source_commit: String,
    pub source_path: String,
    pub retrieved_utc: String,
}

/// Integrity block: the input digest and where the output digests live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusIntegrity {
    pub algorithm: String,
    pub input_sha256: String,
    pub outputs_manifest: String,
}

/// Status and provenance of one derived package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedStatus {
    pub package_kind: String,
    pub classification: String,
    pub as_of_utc: String,
    pub input_provenance: InputProvenance,
    pub integrity: StatusIntegrity,
    pub validation_state: ValidationState,
    pub validation_scope: String,
    pub statement: String,
}

impl DerivedStatus {
    /// Assembles the status document for one packaging run.
    pub fn new(
        as_of: &Timestamp,
        provenance: InputProvenance,
        input_sha256: &str,
        validation_state: ValidationState,
    ) -> Self {
        Self {
            package_kind: PACKAGE_KIND.to_string(),
            classification: CLASSIFICATION_DERIVED.to_string(),
            as_of_utc: as_of.to_iso8601(),
            input_provenance: provenance,
            integrity: StatusIntegrity {
                algorithm: "sha256".to_string(),
                input_sha256: input_sha256.to_string(),
                outputs_manifest: crate::package::MANIFEST_FILENAME.to_string(),
            },
            validation_state,
            validation_scope: VALIDATION_SCOPE_STRUCTURAL.to_string(),
            statement: STATEMENT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_status() -> DerivedStatus {
        let as_of = Timestamp::parse_lenient("2026-01-10T06:30:00Z").unwrap();
        DerivedStatus::new(
            &as_of,
            InputProvenance {
                source_repo: "etalon-obs/atlas-snapshots".to_string(),
                source_commit: "0123456789abcdef0123456789abcdef01234567".to_string(),
                source_path: "snapshots/2026-01-10.json".to_string(),
                retrieved_utc: "2026-01-10T06:30:00Z".to_string(),
            },
            &"b".repeat(64),
            ValidationState::Valid,
        )
    }

    #[test]
    fn status_carries_the_fixed_vocabulary() {
        let status = sample_status();
        assert_eq!(status.package_kind, "derived-snapshot");
        assert_eq!(status.classification, "DERIVED");
        assert_eq!(status.validation_scope, "STRUCTURAL_ONLY");
        assert_eq!(status.integrity.algorithm, "sha256");
        assert_eq!(status.integrity.outputs_manifest, "derived-manifest.json");
        assert!(status.statement.starts_with("NO INTERPRETATION."));
    }

    #[test]
    fn status_serializes_with_screaming_state() {
        let status = sample_status();
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["validation_state"], "VALID");
        assert_eq!(value["as_of_utc"], "2026-01-10T06:30:00Z");
        assert_eq!(value["input_provenance"]["source_path"], "snapshots/2026-01-10.json");
    }

    #[test]
    fn status_round_trips() {
        let status = sample_status();
        let text = serde_json::to_string(&status).unwrap();
        let back: DerivedStatus = serde_json::from_str(&text).unwrap();
        assert_eq!(back.integrity.input_sha256, status.integrity.input_sha256);
        assert_eq!(back.validation_state, ValidationState::Valid);
    }
}
