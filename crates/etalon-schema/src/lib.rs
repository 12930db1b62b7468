//! # etalon-schema — Record Validation
//!
//! Validates raw observation records against the record JSON Schema
//! (draft 2020-12 via [`jsonschema`]) and the authoritative source
//! registry shipped in `config/sources.json`. A record is valid when it
//! satisfies the schema, names a registered source, names an endpoint
//! declared under that source, and carries an authority rank consistent
//! with the registry (when it carries one at all).
//!
//! The registry model ([`SourceRegistry`]) is shared with ingest, which
//! resolves endpoint URLs through it before fetching.
//!
//! ## Verdict vs error
//!
//! Check outcomes are data: [`RecordValidator::validate_value`] returns
//! a [`RecordReport`] whether the record passes or not, and the caller
//! decides what a failed verdict means (the CLI maps it to exit code 1).
//! `Err` is reserved for inputs that could not be loaded or compiled at
//! all.

pub mod document;
pub mod error;
pub mod record;
pub mod sources;

pub use document::read_json;
pub use error::{SchemaError, SchemaResult};
pub use record::{RecordReport, RecordValidator, Violation};
pub use sources::{SourceEndpoint, SourceEntry, SourceRegistry};
