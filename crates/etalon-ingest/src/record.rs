//! Raw-record construction and sealing.
//!
//! A [`RawRecord`] describes one acquisition: what was fetched, from
//! which registered source and endpoint, when, and the checksums that
//! pin both the raw file and the record itself. The record digest is
//! computed over the RFC 8785 canonical form of the record with the
//! digest field set to all zeros, then patched in — so any reader can
//! re-zero the field and verify.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use etalon_core::{sha256_hex, CanonicalBytes, EndpointId, SourceId};

use crate::error::IngestResult;

/// Placeholder digest value present while the record digest is being
/// computed.
pub const ZERO_DIGEST: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// What was observed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub target_id: String,
    pub target_type: String,
    pub aliases: Vec<String>,
}

/// Where the data came from, as declared in the source registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSource {
    pub source_id: SourceId,
    pub source_type: String,
    pub authority_rank: i64,
    pub endpoint_id: EndpointId,
    pub url: String,
    pub license: String,
    pub citation: String,
}

/// Time span a raw file covers. For a point-in-time ephemeris fetch,
/// start and end both equal the retrieval instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeCoverage {
    pub start_utc: String,
    pub end_utc: String,
}

/// The facility or program behind the acquisition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Facility {
    pub facility_id: String,
    pub instrument: String,
    pub program_id: String,
}

/// When and how the data was acquired.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Acquisition {
    pub retrieved_utc: String,
    pub time_coverage: TimeCoverage,
    pub facility: Facility,
}

/// One file stored on disk for this record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    /// Repo-relative path with forward slashes.
    pub path: String,
    pub media_type: String,
    pub role: String,
    pub size_bytes: u64,
    /// SHA-256 of the file's verbatim content.
    pub sha256: String,
}

/// How the data was requested upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provenance {
    /// The full request, e.g. `GET <url> (endpoint_id=<id>)`.
    pub source_query: String,
    /// Upstream request parameters, keyed by parameter name.
    pub upstream_ids: BTreeMap<String, String>,
}

/// The record's own digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Integrity {
    pub record_sha256: String,
}

/// A complete raw acquisition record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    pub record_id: String,
    pub target: Target,
    pub dataset_role: String,
    pub priority_profile: String,
    pub source: RecordSource,
    pub acquisition: Acquisition,
    pub files: Vec<FileEntry>,
    pub provenance: Provenance,
    pub integrity: Integrity,
    pub notes: String,
}

impl RawRecord {
    /// Computes and embeds the record digest.
    ///
    /// The digest covers the canonical JSON form of the whole record
    /// with `integrity.record_sha256` zeroed, so sealing is idempotent:
    /// sealing an already-sealed record reproduces the same digest.
    pub fn seal(&mut self) -> IngestResult<String> {
        self.integrity.record_sha256 = ZERO_DIGEST.to_string();
        let bytes = CanonicalBytes::new(self)?;
        let digest = sha256_hex(&bytes);
        self.integrity.record_sha256 = digest.clone();
        Ok(digest)
    }

    /// Renders the record the way it is stored on disk: pretty-printed
    /// JSON with a trailing newline.
    pub fn to_pretty_json(&self) -> IngestResult<String> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }
}

#[cfg(test)]
fn sample_record() -> RawRecord {
    RawRecord {
        record_id: "3I_ATLAS__JPL_HORIZONS__2026-01-10__00112233445566778899aabbccddeeff"
            .to_string(),
        target: Target {
            target_id: "3I_ATLAS".to_string(),
            target_type: "object".to_string(),
            aliases: vec!["3I/ATLAS".to_string(), "C/2025 N1 (ATLAS)".to_string()],
        },
        dataset_role: "ephemeris".to_string(),
        priority_profile: "3I_ATLAS_DEFAULT".to_string(),
        source: RecordSource {
            source_id: SourceId::new("JPL_HORIZONS"),
            source_type: "ephemeris_service".to_string(),
            authority_rank: 1,
            endpoint_id: EndpointId::new("horizons_api"),
            url: "https://ssd.jpl.nasa.gov/api/horizons.api".to_string(),
            license: "Public Domain".to_string(),
            citation: "NASA/JPL Horizons API (ephemeris service)".to_string(),
        },
        acquisition: Acquisition {
            retrieved_utc: "2026-01-10T00:00:00Z".to_string(),
            time_coverage: TimeCoverage {
                start_utc: "2026-01-10T00:00:00Z".to_string(),
                end_utc: "2026-01-10T00:00:00Z".to_string(),
            },
            facility: Facility {
                facility_id: "JPL".to_string(),
                instrument: String::new(),
                program_id: String::new(),
            },
        },
        files: vec![FileEntry {
            path:
                "data/raw/JPL_HORIZONS/2026-01-10/3I_ATLAS__JPL_HORIZONS__horizons_api__2026-01-10.json"
                    .to_string(),
            media_type: "application/json".to_string(),
            role: "primary".to_string(),
            size_bytes: 2048,
            sha256: "a".repeat(64),
        }],
        provenance: Provenance {
            source_query:
                "GET https://ssd.jpl.nasa.gov/api/horizons.api?format=json (endpoint_id=horizons_api)"
                    .to_string(),
            upstream_ids: BTreeMap::from([
                ("COMMAND".to_string(), "DES=C/2025 N1".to_string()),
                ("EPHEM_TYPE".to_string(), "V".to_string()),
                ("CENTER".to_string(), "500@0".to_string()),
                ("format".to_string(), "json".to_string()),
            ]),
        },
        integrity: Integrity {
            record_sha256: ZERO_DIGEST.to_string(),
        },
        notes: "Canonical JPL Horizons ephemeris record.".to_string(),
    }
}


#[cfg(test)]
mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any change to the notes field changes the sealed digest.
        #[test]
        fn digest_is_sensitive_to_content(suffix in "[a-zA-Z0-9 ]{1,40}") {
            let mut record = sample_record();
            let baseline = record.seal().unwrap();
            record.notes = format!("{} {suffix}", record.notes);
            let reseal = record.seal().unwrap();
            prop_assert_ne!(baseline, reseal);
        }
    }
}
