//! Snapshot decoding and the per-observable measurement index.
//!
//! Snapshots come from more than one generation of collection tooling,
//! so two shapes are accepted: an `observables` object keyed by
//! identifier, and a `measurements` array of records that each carry
//! their own identifier. Field names drifted across generations too;
//! each logical field is read through a short alias chain, first
//! non-empty string wins.
//!
//! Decoding is tolerant where the registry is strict: a record that
//! cannot be associated with an observable is dropped, a field that is
//! missing stays unset, and the row-level machinery downstream decides
//! what that means for the comparison.

use std::collections::HashMap;
use std::path::Path;

use serde_json::{Map, Value};

use etalon_core::{ObservableId, SourceId, Timestamp};

use crate::document::read_json;
use crate::error::{EngineError, EngineResult};

/// One empirical measurement extracted from a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub observable_id: ObservableId,
    /// The raw value as it appeared in the snapshot. `Null` when the
    /// record had no value field.
    pub value: Value,
    pub unit: Option<String>,
    pub source_id: Option<SourceId>,
    pub retrieved_utc: Option<String>,
    pub raw_path: Option<String>,
    pub measurement_sha256: Option<String>,
    pub epoch_utc: Option<String>,
}

/// Document-level provenance echoed into every output row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotProvenance {
    pub snapshot_sha256: Option<String>,
    pub snapshot_date: Option<String>,
}

/// Measurements grouped by observable. Within one observable the
/// document order of the records is preserved.
#[derive(Debug, Clone, Default)]
pub struct MeasurementIndex {
    by_observable: HashMap<ObservableId, Vec<Measurement>>,
}

impl MeasurementIndex {
    /// All candidates for one observable, empty when none were seen.
    pub fn candidates(&self, id: &ObservableId) -> &[Measurement] {
        self.by_observable
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct observables that have at least one candidate.
    pub fn observable_count(&self) -> usize {
        self.by_observable.len()
    }

    /// Total number of indexed measurements.
    pub fn measurement_count(&self) -> usize {
        self.by_observable.values().map(Vec::len).sum()
    }
}

/// A decoded snapshot: the measurement index, document provenance, and
/// the reference time used for recency scoring.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub index: MeasurementIndex,
    pub provenance: SnapshotProvenance,
    /// Parsed from `snapshot_utc` (and aliases), falling back to
    /// `snapshot_date`. `None` when the snapshot carries no usable
    /// time; temporal scoring then treats every candidate alike.
    pub reference_time: Option<Timestamp>,
}

impl Snapshot {
    /// Decodes a snapshot from a parsed JSON document.
    pub fn from_value(doc: &Value) -> EngineResult<Self> {
        let root = doc.as_object().ok_or_else(|| EngineError::InvalidSnapshot {
            detail: "snapshot document must be a JSON object".to_string(),
        })?;

        let provenance = SnapshotProvenance {
            snapshot_sha256: first_string(root, &["snapshot_sha256", "sha256", "checksum"]),
            snapshot_date: first_string(root, &["snapshot_date", "date", "as_of_date"]),
        };
        let reference_time = reference_time(root, &provenance);

        let mut by_observable: HashMap<ObservableId, Vec<Measurement>> = HashMap::new();
        if let Some(Value::Object(observables)) = root.get("observables") {
            for (key, record) in observables {
                let id = ObservableId::new(key.clone());
                by_observable
                    .entry(id.clone())
                    .or_default()
                    .push(measurement_from_record(id, record));
            }
        } else if let Some(Value::Array(records)) = root.get("measurements") {
            for record in records {
                let Some(map) = record.as_object() else {
                    continue;
                };
                let Some(raw_id) = record_observable_id(map) else {
                    continue;
                };
                let id = ObservableId::new(raw_id);
                by_observable
                    .entry(id.clone())
                    .or_default()
                    .push(measurement_from_record(id, record));
            }
        }

        Ok(Self {
            index: MeasurementIndex { by_observable },
            provenance,
            reference_time,
        })
    }

    /// Loads and decodes a snapshot file.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let doc = read_json(path)?;
        let snapshot = Self::from_value(&doc)?;
        tracing::debug!(
            path = %path.display(),
            observables = snapshot.index.observable_count(),
            measurements = snapshot.index.measurement_count(),
            has_reference_time = snapshot.reference_time.is_some(),
            "loaded snapshot"
        );
        Ok(snapshot)
    }
}

/// First alias whose value is a non-empty string. Empty strings fall
/// through to the next alias, matching how older snapshots left
/// superseded fields blank instead of removing them.
fn first_string(map: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    for key in aliases {
        if let Some(Value::String(s)) = map.get(*key) {
            if !s.is_empty() {
                return Some(s.clone());
            }
        }
    }
    None
}

/// Identifier for a list-shaped record. Blank and zero identifiers
/// fall through to the next alias; a record with no usable identifier
/// is dropped by the caller.
fn record_observable_id(map: &Map<String, Value>) -> Option<String> {
    for key in ["id", "observable_id", "name"] {
        match map.get(key) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Number(n)) if n.as_f64() != Some(0.0) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

fn measurement_from_record(id: ObservableId, record: &Value) -> Measurement {
    let Some(map) = record.as_object() else {
        // A bare scalar is a value with no provenance.
        return Measurement {
            observable_id: id,
            value: record.clone(),
            unit: None,
            source_id: None,
            retrieved_utc: None,
            raw_path: None,
            measurement_sha256: None,
            epoch_utc: None,
        };
    };
    Measurement {
        observable_id: id,
        value: map.get("value").cloned().unwrap_or(Value::Null),
        unit: map
            .get("unit")
            .and_then(Value::as_str)
            .map(str::to_string),
        source_id: first_string(map, &["source_id", "source"]).map(SourceId::new),
        retrieved_utc: first_string(map, &["retrieved_utc", "retrieved"]),
        raw_path: first_string(map, &["raw_path", "path"]),
        measurement_sha256: first_string(map, &["measurement_sha256", "sha256"]),
        epoch_utc: first_string(map, &["epoch_utc", "epoch"]),
    }
}

/// The reference time for recency scoring: the first non-empty
/// timestamp alias if it parses, else the snapshot date.
fn reference_time(root: &Map<String, Value>, provenance: &SnapshotProvenance) -> Option<Timestamp> {
    let explicit = first_string(root, &["snapshot_utc", "snapshot_time_utc", "snapshot_time"])
        .and_then(|s| Timestamp::parse_lenient(&s).ok());
    if explicit.is_some() {
        return explicit;
    }
    provenance
        .snapshot_date
        .as_deref()
        .and_then(|s| Timestamp::parse_lenient(s).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn id(s: &str) -> ObservableId {
        ObservableId::from(s)
    }

    #[test]
    fn keyed_shape_indexes_by_object_key() {
        let doc = json!({
            "snapshot_utc": "2025-12-20T00:00:00Z",
            "observables": {
                "ecc": {"value": 0.58, "source_id": "JPL_HORIZONS", "unit": "dimensionless"},
                "q_au": {"value": "0.95", "source": "MPC"}
            }
        });
        let snapshot = Snapshot::from_value(&doc).unwrap();

        let ecc = snapshot.index.candidates(&id("ecc"));
        assert_eq!(ecc.len(), 1);
        assert_eq!(ecc[0].value, json!(0.58));
        assert_eq!(ecc[0].source_id, Some(SourceId::from("JPL_HORIZONS")));
        assert_eq!(ecc[0].unit.as_deref(), Some("dimensionless"));

        // `source` is an accepted alias for `source_id`.
        let q = snapshot.index.candidates(&id("q_au"));
        assert_eq!(q[0].source_id, Some(SourceId::from("MPC")));
    }

    #[test]
    fn keyed_shape_wraps_bare_scalars() {
        let doc = json!({"observables": {"ecc": 0.61}});
        let snapshot = Snapshot::from_value(&doc).unwrap();
        let ecc = snapshot.index.candidates(&id("ecc"));
        assert_eq!(ecc[0].value, json!(0.61));
        assert_eq!(ecc[0].source_id, None);
    }

    #[test]
    fn list_shape_groups_by_identifier() {
        let doc = json!({
            "measurements": [
                {"id": "ecc", "value": 0.57, "source_id": "MPC"},
                {"observable_id": "ecc", "value": 0.58, "source_id": "JPL_HORIZONS"},
                {"name": "q_au", "value": 0.95}
            ]
        });
        let snapshot = Snapshot::from_value(&doc).unwrap();
        assert_eq!(snapshot.index.candidates(&id("ecc")).len(), 2);
        assert_eq!(snapshot.index.candidates(&id("q_au")).len(), 1);
        assert_eq!(snapshot.index.observable_count(), 2);
        assert_eq!(snapshot.index.measurement_count(), 3);
    }

    #[test]
    fn list_shape_preserves_document_order_within_observable() {
        let doc = json!({
            "measurements": [
                {"id": "ecc", "value": 1},
                {"id": "ecc", "value": 2},
                {"id": "ecc", "value": 3}
            ]
        });
        let snapshot = Snapshot::from_value(&doc).unwrap();
        let values: Vec<i64> = snapshot
            .index
            .candidates(&id("ecc"))
            .iter()
            .map(|m| m.value.as_i64().unwrap())
            .collect();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn records_without_identifier_are_dropped() {
        let doc = json!({
            "measurements": [
                {"value": 0.5},
                {"id": "", "value": 0.6},
                "not even an object",
                {"id": "ecc", "value": 0.7}
            ]
        });
        let snapshot = Snapshot::from_value(&doc).unwrap();
        assert_eq!(snapshot.index.measurement_count(), 1);
        assert_eq!(snapshot.index.candidates(&id("ecc"))[0].value, json!(0.7));
    }

    #[test]
    fn numeric_identifier_is_stringified() {
        let doc = json!({"measurements": [{"id": 42, "value": 1.0}]});
        let snapshot = Snapshot::from_value(&doc).unwrap();
        assert_eq!(snapshot.index.candidates(&id("42")).len(), 1);
    }

    #[test]
    fn blank_identifier_falls_through_to_alias() {
        let doc = json!({"measurements": [{"id": "", "name": "ecc", "value": 1.0}]});
        let snapshot = Snapshot::from_value(&doc).unwrap();
        assert_eq!(snapshot.index.candidates(&id("ecc")).len(), 1);
    }

    #[test]
    fn blank_source_falls_through_to_alias() {
        let doc = json!({
            "observables": {"ecc": {"value": 1.0, "source_id": "", "source": "MPC"}}
        });
        let snapshot = Snapshot::from_value(&doc).unwrap();
        assert_eq!(
            snapshot.index.candidates(&id("ecc"))[0].source_id,
            Some(SourceId::from("MPC"))
        );
    }

    #[test]
    fn missing_value_field_is_null() {
        let doc = json!({"observables": {"ecc": {"source_id": "MPC"}}});
        let snapshot = Snapshot::from_value(&doc).unwrap();
        assert_eq!(snapshot.index.candidates(&id("ecc"))[0].value, Value::Null);
    }

    #[test]
    fn keyed_shape_wins_over_list_shape() {
        let doc = json!({
            "observables": {"ecc": {"value": 1.0}},
            "measurements": [{"id": "q_au", "value": 2.0}]
        });
        let snapshot = Snapshot::from_value(&doc).unwrap();
        assert_eq!(snapshot.index.candidates(&id("ecc")).len(), 1);
        assert!(snapshot.index.candidates(&id("q_au")).is_empty());
    }

    #[test]
    fn neither_shape_means_empty_index() {
        let snapshot = Snapshot::from_value(&json!({"snapshot_date": "2025-12-20"})).unwrap();
        assert_eq!(snapshot.index.observable_count(), 0);
    }

    #[test]
    fn provenance_alias_chains() {
        let doc = json!({
            "sha256": "ab".repeat(32),
            "as_of_date": "2025-12-20"
        });
        let snapshot = Snapshot::from_value(&doc).unwrap();
        assert_eq!(
            snapshot.provenance.snapshot_sha256.as_deref(),
            Some("ab".repeat(32).as_str())
        );
        assert_eq!(
            snapshot.provenance.snapshot_date.as_deref(),
            Some("2025-12-20")
        );
    }

    #[test]
    fn empty_checksum_falls_through() {
        let doc = json!({"snapshot_sha256": "", "checksum": "deadbeef"});
        let snapshot = Snapshot::from_value(&doc).unwrap();
        assert_eq!(
            snapshot.provenance.snapshot_sha256.as_deref(),
            Some("deadbeef")
        );
    }

    #[test]
    fn reference_time_from_explicit_field() {
        let doc = json!({"snapshot_utc": "2025-12-20T12:00:00Z"});
        let snapshot = Snapshot::from_value(&doc).unwrap();
        assert_eq!(
            snapshot.reference_time.unwrap().to_iso8601(),
            "2025-12-20T12:00:00Z"
        );
    }

    #[test]
    fn reference_time_falls_back_to_date() {
        let doc = json!({"snapshot_date": "2025-12-20"});
        let snapshot = Snapshot::from_value(&doc).unwrap();
        assert_eq!(
            snapshot.reference_time.unwrap().to_iso8601(),
            "2025-12-20T00:00:00Z"
        );
    }

    #[test]
    fn unparseable_explicit_time_falls_back_to_date() {
        let doc = json!({
            "snapshot_utc": "not a timestamp",
            "snapshot_date": "2025-12-20"
        });
        let snapshot = Snapshot::from_value(&doc).unwrap();
        assert_eq!(
            snapshot.reference_time.unwrap().to_iso8601(),
            "2025-12-20T00:00:00Z"
        );
    }

    #[test]
    fn no_usable_time_is_none() {
        let snapshot = Snapshot::from_value(&json!({"observables": {}})).unwrap();
        assert!(snapshot.reference_time.is_none());
    }

    #[test]
    fn non_object_snapshot_is_rejected() {
        let err = Snapshot::from_value(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSnapshot { .. }));
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(
            &path,
            json!({"observables": {"ecc": {"value": 0.5}}}).to_string(),
        )
        .unwrap();

        let snapshot = Snapshot::load(&path).unwrap();
        assert_eq!(snapshot.index.measurement_count(), 1);
    }
}
