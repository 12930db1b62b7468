//! Package assembly: one run of the packer end to end.
//!
//! Fatal conditions (missing input, unparseable input) abort before
//! anything is written. A structurally INVALID snapshot is not fatal:
//! the package is still built and documents the failure, which is the
//! whole point of the trace.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use etalon_core::{sha256_hex_file, Timestamp};

use crate::error::{PackError, PackResult};
use crate::manifest::package_manifest;
use crate::rocrate::ro_crate_metadata;
use crate::status::{DerivedStatus, InputProvenance};
use crate::trace::render_validation_trace;
use crate::validate::{validate_snapshot_structure, ValidationState};

/// Verbatim copy of the input snapshot.
pub const SNAPSHOT_FILENAME: &str = "input-snapshot.json";
/// Status and provenance document.
pub const STATUS_FILENAME: &str = "derived-status.json";
/// Plain-text validation trace.
pub const TRACE_FILENAME: &str = "validation-trace.txt";
/// Research-object metadata descriptor.
pub const RO_CRATE_FILENAME: &str = "ro-crate-metadata.json";
/// SHA-256 manifest of every other package file.
pub const MANIFEST_FILENAME: &str = "derived-manifest.json";

/// One packaging request: what to package and where it came from.
#[derive(Debug, Clone)]
pub struct PackRequest {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub source_repo: String,
    pub source_commit: String,
    pub source_path: String,
}

/// What one packaging run produced.
#[derive(Debug, Clone)]
pub struct PackOutcome {
    pub output_dir: PathBuf,
    pub validation_state: ValidationState,
    pub validation_messages: Vec<String>,
    pub input_sha256: String,
    pub as_of_utc: String,
    /// Sorted names of every package file, manifest included.
    pub files: Vec<String>,
}

/// Builds a derived package stamped with the current UTC time.
pub fn run_pack(request: &PackRequest) -> PackResult<PackOutcome> {
    run_pack_at(request, &Timestamp::now())
}

/// Builds a derived package stamped with an explicit run time.
///
/// The run time is the only non-deterministic input: with `as_of`
/// fixed, identical input bytes produce byte-identical packages.
pub fn run_pack_at(request: &PackRequest, as_of: &Timestamp) -> PackResult<PackOutcome> {
    if !request.input.exists() {
        return Err(PackError::FileNotFound {
            path: request.input.clone(),
        });
    }

    let input_sha256 = sha256_hex_file(&request.input).map_err(|source| PackError::Digest {
        path: request.input.clone(),
        source,
    })?;

    let text = fs::read_to_string(&request.input)?;
    let snapshot: Value = serde_json::from_str(&text).map_err(|source| PackError::JsonParse {
        path: request.input.clone(),
        source,
    })?;

    let (validation_state, validation_messages) = validate_snapshot_structure(&snapshot);
    tracing::info!(state = %validation_state, "structural validation complete");

    fs::create_dir_all(&request.output_dir)?;
    fs::copy(&request.input, request.output_dir.join(SNAPSHOT_FILENAME))?;

    let as_of_utc = as_of.to_iso8601();
    let provenance = InputProvenance {
        source_repo: request.source_repo.clone(),
        source_commit: request.source_commit.clone(),
        source_path: request.source_path.clone(),
        retrieved_utc: as_of_utc.clone(),
    };

    let status = DerivedStatus::new(as_of, provenance.clone(), &input_sha256, validation_state);
    write_json_document(&request.output_dir.join(STATUS_FILENAME), &status)?;

    let trace = render_validation_trace(
        &as_of_utc,
        &provenance,
        &input_sha256,
        &validation_messages,
        validation_state,
    );
    fs::write(request.output_dir.join(TRACE_FILENAME), trace)?;

    let input_filename = request
        .input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| SNAPSHOT_FILENAME.to_string());
    let descriptor = ro_crate_metadata(
        &as_of_utc,
        &input_filename,
        &request.source_repo,
        &request.source_commit,
    );
    write_json_document(&request.output_dir.join(RO_CRATE_FILENAME), &descriptor)?;

    // The manifest digests everything written above, so it goes last.
    let manifest = package_manifest(&request.output_dir)?;
    write_json_document(&request.output_dir.join(MANIFEST_FILENAME), &manifest)?;

    let mut files = Vec::new();
    for entry in fs::read_dir(&request.output_dir)? {
        let entry = entry?;
        if entry.path().is_file() {
            files.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    files.sort();

    tracing::info!(
        dir = %request.output_dir.display(),
        state = %validation_state,
        files = files.len(),
        "derived package written"
    );

    Ok(PackOutcome {
        output_dir: request.output_dir.clone(),
        validation_state,
        validation_messages,
        input_sha256,
        as_of_utc,
        files,
    })
}

/// Pretty-printed JSON with a trailing newline, the storage form of
/// every JSON artifact in a package.
fn write_json_document<T: Serialize>(path: &Path, document: &T) -> PackResult<()> {
    let mut text = serde_json::to_string_pretty(document)?;
    text.push('\n');
    fs::write(path, text)?;
    Ok(())
}
