//! The state table: one row per registry observable, fixed columns.
//!
//! The table is the tool's single output and the thing downstream
//! diffing keys on, so rendering is part of the determinism contract:
//! rows follow registry order, the column set never varies, missing
//! fields render as empty strings (never `null` or `nan` tokens), and
//! the whole file is rendered in memory and written in one call with
//! `\n` line endings.

use std::fs;
use std::path::Path;

use serde_json::Value;

use etalon_core::{ObservableId, SourceId};

use crate::classify::{classify, Classification, ComparisonState};
use crate::error::{EngineError, EngineResult};
use crate::registry::ObservableRegistry;
use crate::select::{select_with_policy, SelectionPolicy};
use crate::snapshot::Snapshot;
use crate::theory::TheorySet;

/// Output column order. Fixed; consumers diff these files byte for
/// byte.
pub const TABLE_COLUMNS: [&str; 11] = [
    "observable_id",
    "unit",
    "state",
    "distance",
    "theory_value",
    "empirical_value",
    "empirical_source_id",
    "empirical_retrieved_utc",
    "empirical_epoch_utc",
    "snapshot_sha256",
    "snapshot_date",
];

/// One reconciliation row.
#[derive(Debug, Clone, PartialEq)]
pub struct StateRow {
    pub observable_id: ObservableId,
    pub unit: String,
    pub state: ComparisonState,
    pub distance: Option<f64>,
    pub theory_value: Option<Value>,
    pub empirical_value: Option<Value>,
    pub empirical_source_id: Option<SourceId>,
    pub empirical_retrieved_utc: Option<String>,
    pub empirical_epoch_utc: Option<String>,
    pub snapshot_sha256: Option<String>,
    pub snapshot_date: Option<String>,
}

/// Builds one row per registry observable, in registry order.
///
/// Observables with no candidates still get a row; their empirical
/// side is absent and the classifier decides the state from the theory
/// side alone.
pub fn build_rows(
    registry: &ObservableRegistry,
    snapshot: &Snapshot,
    theory: &TheorySet,
    policy: SelectionPolicy,
) -> Vec<StateRow> {
    let reference = snapshot.reference_time.as_ref();
    registry
        .iter()
        .map(|spec| {
            let candidates = snapshot.index.candidates(&spec.id);
            let chosen = select_with_policy(spec, candidates, reference, policy);

            let theory_value = theory.get(&spec.id).cloned();
            // A selected measurement whose value field was null is a
            // record without a value, not a value.
            let empirical_value = chosen
                .map(|m| m.value.clone())
                .filter(|v| !v.is_null());

            let Classification { state, distance } =
                classify(spec, theory_value.as_ref(), empirical_value.as_ref());

            StateRow {
                observable_id: spec.id.clone(),
                unit: spec.unit.clone(),
                state,
                distance,
                theory_value,
                empirical_value,
                empirical_source_id: chosen.and_then(|m| m.source_id.clone()),
                empirical_retrieved_utc: chosen.and_then(|m| m.retrieved_utc.clone()),
                empirical_epoch_utc: chosen.and_then(|m| m.epoch_utc.clone()),
                snapshot_sha256: snapshot.provenance.snapshot_sha256.clone(),
                snapshot_date: snapshot.provenance.snapshot_date.clone(),
            }
        })
        .collect()
}

/// Renders rows to CSV bytes: header, then one record per row.
pub fn render_csv(rows: &[StateRow]) -> EngineResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(TABLE_COLUMNS)?;
    for row in rows {
        writer.write_record([
            row.observable_id.as_str().to_string(),
            row.unit.clone(),
            row.state.as_str().to_string(),
            render_distance(row.distance),
            render_value(row.theory_value.as_ref()),
            render_value(row.empirical_value.as_ref()),
            row.empirical_source_id
                .as_ref()
                .map(|s| s.as_str().to_string())
                .unwrap_or_default(),
            row.empirical_retrieved_utc.clone().unwrap_or_default(),
            row.empirical_epoch_utc.clone().unwrap_or_default(),
            row.snapshot_sha256.clone().unwrap_or_default(),
            row.snapshot_date.clone().unwrap_or_default(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|err| EngineError::Io(err.into_error()))
}

/// Renders the table and writes it to `path` in a single call,
/// creating parent directories as needed.
pub fn write_table(path: &Path, rows: &[StateRow]) -> EngineResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let bytes = render_csv(rows)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Distances render via float `Display`: the shortest digits that
/// round-trip. Absent renders empty.
fn render_distance(distance: Option<f64>) -> String {
    match distance {
        Some(d) => format!("{d}"),
        None => String::new(),
    }
}

/// Raw JSON values rendered into cells: strings verbatim, numbers and
/// booleans as their JSON text, composites as compact JSON, absent and
/// null as empty.
fn render_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(composite) => serde_json::to_string(composite).unwrap_or_default(),
    }
}
