//! # etalon-pack — Derived Package Builder
//!
//! Bundles a pinned snapshot into a fixed five-file archive layout:
//!
//! - `input-snapshot.json` — verbatim copy of the input
//! - `derived-status.json` — provenance, integrity, validation verdict
//! - `validation-trace.txt` — plain-text trace of the checks performed
//! - `ro-crate-metadata.json` — minimal RO-Crate 1.1 descriptor
//! - `derived-manifest.json` — SHA-256 of every other package file
//!
//! ## Non-negotiable constraints
//!
//! - No scientific interpretation or inference.
//! - No orbital computation of any kind.
//! - Structural validation only; an INVALID snapshot still packages,
//!   and the package documents the failure.
//! - Deterministic: same input bytes and run time give byte-identical
//!   packages, checksums included. SHA-256 only.
//!
//! [`run_pack`] builds a package; [`verify_package`] re-hashes one and
//! compares against its manifest in constant time.

pub mod error;
pub mod manifest;
pub mod package;
pub mod rocrate;
pub mod status;
pub mod trace;
pub mod validate;

pub use error::{PackError, PackResult};
pub use manifest::{package_manifest, verify_package, VerifyOutcome};
pub use package::{
    run_pack, run_pack_at, PackOutcome, PackRequest, MANIFEST_FILENAME, RO_CRATE_FILENAME,
    SNAPSHOT_FILENAME, STATUS_FILENAME, TRACE_FILENAME,
};
pub use status::{DerivedStatus, InputProvenance};
pub use validate::{validate_snapshot_structure, ValidationState};
