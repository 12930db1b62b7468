//! Research-object metadata (`ro-crate-metadata.json`).
//!
//! A minimal RO-Crate 1.1 descriptor: the metadata file entity, the
//! root dataset listing the package members, and one `File` entity per
//! member. Built as a JSON value because RO-Crate's `@graph` mixes
//! entity shapes that a single struct would not model cleanly.

use serde_json::{json, Value};

use crate::package::{
    MANIFEST_FILENAME, RO_CRATE_FILENAME, SNAPSHOT_FILENAME, STATUS_FILENAME, TRACE_FILENAME,
};

/// JSON-LD context for RO-Crate 1.1.
pub const RO_CRATE_CONTEXT: &str = "https://w3id.org/ro/crate/1.1/context";
/// Specification the descriptor conforms to.
pub const RO_CRATE_CONFORMS_TO: &str = "https://w3id.org/ro/crate/1.1";

/// Builds the RO-Crate descriptor for one derived package.
pub fn ro_crate_metadata(
    as_of_utc: &str,
    input_filename: &str,
    source_repo: &str,
    source_commit: &str,
) -> Value {
    json!({
        "@context": RO_CRATE_CONTEXT,
        "@graph": [
            {
                "@id": RO_CRATE_FILENAME,
                "@type": "CreativeWork",
                "conformsTo": { "@id": RO_CRATE_CONFORMS_TO },
                "about": { "@id": "./" }
            },
            {
                "@id": "./",
                "@type": "Dataset",
                "name": "Etalon Derived Snapshot Package",
                "description": "Deterministic snapshot packaging (structural validation only, non-interpretive)",
                "datePublished": as_of_utc,
                "hasPart": [
                    { "@id": STATUS_FILENAME },
                    { "@id": MANIFEST_FILENAME },
                    { "@id": TRACE_FILENAME },
                    { "@id": SNAPSHOT_FILENAME }
                ]
            },
            {
                "@id": SNAPSHOT_FILENAME,
                "@type": "File",
                "name": input_filename,
                "description": "Verbatim copy of the pinned input snapshot",
                "source": format!("{source_repo}@{source_commit}")
            },
            {
                "@id": STATUS_FILENAME,
                "@type": "File",
                "description": "Package status and provenance"
            },
            {
                "@id": MANIFEST_FILENAME,
                "@type": "File",
                "description": "SHA-256 checksums of all output files"
            },
            {
                "@id": TRACE_FILENAME,
                "@type": "File",
                "description": "Plain text trace of validation steps performed"
            }
        ]
    })
}
