//! Raw-record validation.
//!
//! A record passes when it validates against the record JSON Schema
//! (draft 2020-12) and its `source` block is consistent with the source
//! registry: the source exists, the endpoint exists under that source,
//! and any authority rank embedded in the record matches the one the
//! registry declares. The outcome is a [`RecordReport`] carrying
//! printable check-by-check lines; only load and compile failures are
//! `Err`.

use std::fmt;
use std::path::Path;

use serde_json::Value;

use crate::document::read_json;
use crate::error::{SchemaError, SchemaResult};
use crate::sources::SourceRegistry;

/// One schema violation, located by a `$`-rooted path into the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Path to the violating field, e.g. `$.source.source_id` or
    /// `$.files[0].sha256`.
    pub path: String,
    /// Human-readable description from the schema engine.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Outcome of validating one record: the verdict plus the lines a
/// caller can print verbatim.
///
/// Failure lines start with `✘`, passed checks with `✔`, and a fully
/// valid record ends with `RESULT: RECORD IS VALID`. A failed check
/// replaces the accumulated lines with its own diagnostics, so the
/// report for an invalid record describes exactly the first check that
/// failed.
#[derive(Debug, Clone)]
pub struct RecordReport {
    pub valid: bool,
    pub messages: Vec<String>,
}

impl RecordReport {
    fn fail(messages: Vec<String>) -> Self {
        Self {
            valid: false,
            messages,
        }
    }
}

/// Validates records against the record schema and the source registry.
pub struct RecordValidator {
    validator: jsonschema::Validator,
    registry: SourceRegistry,
}

impl fmt::Debug for RecordValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordValidator")
            .field("registry_sources", &self.registry.len())
            .finish()
    }
}

impl RecordValidator {
    /// Loads the schema and the source registry from JSON files and
    /// compiles the schema.
    pub fn new(schema_path: &Path, sources_path: &Path) -> SchemaResult<Self> {
        let schema = read_json(schema_path)?;
        let registry = SourceRegistry::load(sources_path)?;
        Self::from_parts(&schema, registry)
    }

    /// Compiles an already-parsed schema against a decoded registry.
    pub fn from_parts(schema: &Value, registry: SourceRegistry) -> SchemaResult<Self> {
        let validator = jsonschema::options()
            .with_draft(jsonschema::Draft::Draft202012)
            .build(schema)
            .map_err(|e| SchemaError::SchemaCompile {
                reason: e.to_string(),
            })?;
        Ok(Self {
            validator,
            registry,
        })
    }

    /// Schema violations for a record, sorted by path.
    pub fn schema_violations(&self, record: &Value) -> Vec<Violation> {
        let mut violations: Vec<Violation> = self
            .validator
            .iter_errors(record)
            .map(|err| Violation {
                path: dollar_path(&err.instance_path.to_string()),
                message: err.to_string(),
            })
            .collect();
        violations.sort_by(|a, b| a.path.cmp(&b.path));
        violations
    }

    /// Validates a record file. Load failures are `Err`; check failures
    /// land in the report.
    pub fn validate_file(&self, record_path: &Path) -> SchemaResult<RecordReport> {
        let record = read_json(record_path)?;
        Ok(self.validate_value(&record))
    }

    /// Runs every check against an already-parsed record.
    pub fn validate_value(&self, record: &Value) -> RecordReport {
        let mut messages = Vec::new();

        let violations = self.schema_violations(record);
        if !violations.is_empty() {
            messages.push("✘ Schema validation: FAILED".to_string());
            messages.extend(violations.iter().map(|v| format!("  - {v}")));
            return RecordReport::fail(messages);
        }
        messages.push("✔ Schema validation: OK".to_string());

        let Some(record_map) = record.as_object() else {
            return RecordReport::fail(vec!["✘ Record root must be a JSON object".to_string()]);
        };

        let Some(source_value) = record_map.get("source") else {
            return RecordReport::fail(vec![
                "✘ Missing required field: record.source".to_string()
            ]);
        };
        let Some(source_map) = source_value.as_object() else {
            return RecordReport::fail(vec!["✘ record.source must be an object".to_string()]);
        };

        let Some(source_id_value) = source_map.get("source_id") else {
            return RecordReport::fail(vec![
                "✘ Missing required field: record.source.source_id".to_string(),
            ]);
        };
        let source_id = match source_id_value.as_str() {
            Some(s) if !s.trim().is_empty() => s,
            _ => {
                return RecordReport::fail(vec![
                    "✘ record.source.source_id must be a non-empty string".to_string(),
                ]);
            }
        };

        let endpoint_id = match source_map.get("endpoint_id") {
            None | Some(Value::Null) => {
                return RecordReport::fail(vec![
                    "✘ record.source.endpoint_id is required (must match sources.json endpoints[].endpoint_id)"
                        .to_string(),
                ]);
            }
            Some(value) => match value.as_str() {
                Some(s) if !s.trim().is_empty() => s,
                _ => {
                    return RecordReport::fail(vec![
                        "✘ record.source.endpoint_id must be a non-empty string".to_string(),
                    ]);
                }
            },
        };

        let Some(source) = self.registry.find_source(source_id) else {
            return RecordReport::fail(vec![format!(
                "✘ source_id not found in sources.json: {source_id}"
            )]);
        };
        messages.push(format!("✔ source_id: {source_id} (found)"));

        if source.find_endpoint(endpoint_id).is_none() {
            let available = source.endpoint_ids();
            return RecordReport::fail(vec![
                format!("✘ endpoint_id not found for source_id={source_id}: {endpoint_id}"),
                format!("  Available endpoint_id: {available:?}"),
            ]);
        }
        messages.push(format!("✔ endpoint_id: {endpoint_id} (valid)"));

        // The rank check only runs when the record carries a non-null
        // rank. A registry entry without an integer rank cannot
        // contradict the record, so the check still passes.
        if let Some(record_rank) = source_map.get("authority_rank") {
            if !record_rank.is_null() {
                let Some(record_rank) = record_rank.as_i64() else {
                    return RecordReport::fail(vec![
                        "✘ record.source.authority_rank must be integer if present".to_string(),
                    ]);
                };
                if let Some(registry_rank) = source.authority_rank {
                    if record_rank != registry_rank {
                        return RecordReport::fail(vec![
                            "✘ authority_rank mismatch".to_string(),
                            format!("  record.source.authority_rank = {record_rank}"),
                            format!(
                                "  sources.json authority_rank     = {registry_rank} (for source_id={source_id})"
                            ),
                        ]);
                    }
                }
                messages.push("✔ authority_rank: consistent".to_string());
            }
        }

        messages.push("RESULT: RECORD IS VALID".to_string());
        RecordReport {
            valid: true,
            messages,
        }
    }
}

/// Converts a JSON Pointer (`/files/0/sha256`) into the `$`-rooted form
/// used in violation output (`$.files[0].sha256`).
///
/// Purely numeric segments render as indexes; everything else renders
/// as a dotted key. A map key that happens to be all digits is
/// indistinguishable from an index here.
fn dollar_path(pointer: &str) -> String {
    let mut out = String::from("$");
    for raw in pointer.split('/').skip(1) {
        let segment = raw.replace("~1", "/").replace("~0", "~");
        if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
            out.push('[');
            out.push_str(&segment);
            out.push(']');
        } else {
            out.push('.');
            out.push_str(&segment);
        }
    }
    out
}
