//! The observable registry.
//!
//! The registry is the comparison contract. It fixes which observables
//! are tracked, which sources may supply measurements for each, how
//! those sources are ranked, and the tolerance envelope under which
//! theory and measurement are compared. Because every downstream stage
//! keys off it, decoding is strict: a malformed entry fails the whole
//! load rather than producing a partially trusted registry.

use std::path::Path;

use serde_json::{Map, Value};

use etalon_core::{ObservableId, SourceId};

use crate::distance::DistanceMetric;
use crate::document::read_json;
use crate::error::{EngineError, EngineResult};

/// Tolerances governing one observable's comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Tolerances {
    /// Agreement threshold: distances at or below epsilon are agreement.
    pub epsilon: f64,
    /// Divergence threshold: distances above delta are divergence.
    pub delta: f64,
    /// Maximum age, in days, of the selected measurement relative to
    /// the snapshot reference time.
    pub time_window_days: f64,
    /// Metric name exactly as the registry wrote it. Unknown names are
    /// tolerated here and degrade at comparison time.
    pub distance_metric: String,
}

impl Tolerances {
    /// The metric, when the registry named a recognized one.
    pub fn metric(&self) -> Option<DistanceMetric> {
        DistanceMetric::parse(&self.distance_metric)
    }
}

/// One tracked observable and its comparison contract.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservableSpec {
    pub id: ObservableId,
    pub unit: String,
    /// Sources permitted to supply measurements. Empty means any
    /// source is acceptable.
    pub sources_allowed: Vec<SourceId>,
    /// Preference order for tie-breaking; position is rank. Defaults
    /// to `sources_allowed` when the registry omits it.
    pub authority_rank: Vec<SourceId>,
    pub tolerances: Tolerances,
    pub description: String,
}

/// The decoded registry: ordered, with document order preserved.
///
/// Output tables iterate this order, so it is part of the byte-level
/// determinism contract.
#[derive(Debug, Clone, Default)]
pub struct ObservableRegistry {
    specs: Vec<ObservableSpec>,
}

impl ObservableRegistry {
    /// Decodes a registry from a parsed JSON document.
    pub fn from_value(doc: &Value) -> EngineResult<Self> {
        let root = doc
            .as_object()
            .ok_or_else(|| invalid("registry document must be a JSON object"))?;

        let entries = match root.get("observables") {
            None => return Ok(Self::default()),
            Some(Value::Array(entries)) => entries,
            Some(_) => return Err(invalid("observables must be an array")),
        };

        let mut specs = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            specs.push(decode_spec(index, entry)?);
        }
        Ok(Self { specs })
    }

    /// Loads and decodes a registry file.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let doc = read_json(path)?;
        let registry = Self::from_value(&doc)?;
        tracing::debug!(
            path = %path.display(),
            observables = registry.len(),
            "loaded observable registry"
        );
        Ok(registry)
    }

    pub fn specs(&self) -> &[ObservableSpec] {
        &self.specs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ObservableSpec> {
        self.specs.iter()
    }

    /// Lookup by id. Registries are small; a linear scan keeps
    /// document order as the only ordering in play.
    pub fn get(&self, id: &ObservableId) -> Option<&ObservableSpec> {
        self.specs.iter().find(|s| &s.id == id)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl<'a> IntoIterator for &'a ObservableRegistry {
    type Item = &'a ObservableSpec;
    type IntoIter = std::slice::Iter<'a, ObservableSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.specs.iter()
    }
}

fn invalid(detail: impl Into<String>) -> EngineError {
    EngineError::InvalidRegistry {
        detail: detail.into(),
    }
}

fn decode_spec(index: usize, entry: &Value) -> EngineResult<ObservableSpec> {
    let entry = entry
        .as_object()
        .ok_or_else(|| invalid(format!("observable[{index}]: entry must be an object")))?;

    let id = required_string(entry, index, "id")?;
    let unit = entry
        .get("unit")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(format!("observable[{index}] ({id}): missing unit")))?
        .to_string();

    let sources_allowed = source_list(entry, index, "sources_allowed")?;
    let authority_rank = match entry.get("authority_rank") {
        Some(_) => source_list(entry, index, "authority_rank")?,
        None => sources_allowed.clone(),
    };

    let tolerances = decode_tolerances(entry, index, &id)?;
    let description = entry
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let spec = ObservableSpec {
        id: ObservableId::new(id),
        unit,
        sources_allowed,
        authority_rank,
        tolerances,
        description,
    };
    warn_on_degenerate_tolerances(&spec);
    Ok(spec)
}

fn required_string(entry: &Map<String, Value>, index: usize, field: &str) -> EngineResult<String> {
    match entry.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(invalid(format!("observable[{index}]: empty {field}"))),
        Some(_) => Err(invalid(format!(
            "observable[{index}]: {field} must be a string"
        ))),
        None => Err(invalid(format!("observable[{index}]: missing {field}"))),
    }
}

fn source_list(
    entry: &Map<String, Value>,
    index: usize,
    field: &str,
) -> EngineResult<Vec<SourceId>> {
    let Some(value) = entry.get(field) else {
        return Ok(Vec::new());
    };
    let items = value
        .as_array()
        .ok_or_else(|| invalid(format!("observable[{index}]: {field} must be an array")))?;
    items
        .iter()
        .map(|item| {
            item.as_str().map(SourceId::from).ok_or_else(|| {
                invalid(format!(
                    "observable[{index}]: {field} entries must be strings"
                ))
            })
        })
        .collect()
}

fn decode_tolerances(
    entry: &Map<String, Value>,
    index: usize,
    id: &str,
) -> EngineResult<Tolerances> {
    let empty = Map::new();
    let tol = match entry.get("tolerances") {
        None => &empty,
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(invalid(format!(
                "observable[{index}] ({id}): tolerances must be an object"
            )))
        }
    };

    let epsilon = tolerance_number(tol, index, id, "epsilon")?;
    let delta = tolerance_number(tol, index, id, "delta")?;
    let time_window_days = tolerance_number(tol, index, id, "time_window_days")?;
    let distance_metric = match tol.get("distance_metric") {
        Some(Value::String(s)) => s.clone(),
        Some(_) => {
            return Err(invalid(format!(
                "observable[{index}] ({id}): distance_metric must be a string"
            )))
        }
        None => {
            return Err(invalid(format!(
                "observable[{index}] ({id}): missing distance_metric"
            )))
        }
    };

    Ok(Tolerances {
        epsilon,
        delta,
        time_window_days,
        distance_metric,
    })
}

/// Tolerance values are numbers, but registries written by hand often
/// quote them; numeric strings are accepted.
fn tolerance_number(
    tol: &Map<String, Value>,
    index: usize,
    id: &str,
    field: &str,
) -> EngineResult<f64> {
    match tol.get(field) {
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| {
            invalid(format!(
                "observable[{index}] ({id}): {field} is out of range"
            ))
        }),
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| {
            invalid(format!(
                "observable[{index}] ({id}): {field} is not numeric: {s:?}"
            ))
        }),
        Some(_) => Err(invalid(format!(
            "observable[{index}] ({id}): {field} must be a number"
        ))),
        None => Err(invalid(format!(
            "observable[{index}] ({id}): missing {field}"
        ))),
    }
}

/// Degenerate tolerance configurations load fine but deserve a warning
/// at decode time rather than a silent surprise in the output table.
fn warn_on_degenerate_tolerances(spec: &ObservableSpec) {
    let tol = &spec.tolerances;
    if tol.epsilon > tol.delta {
        tracing::warn!(
            observable = %spec.id,
            epsilon = tol.epsilon,
            delta = tol.delta,
            "epsilon exceeds delta; no distance can land in the tension band"
        );
    }
    if tol.metric().is_none() {
        tracing::warn!(
            observable = %spec.id,
            metric = %tol.distance_metric,
            "unrecognized distance metric; rows will classify as NON_COMPARABLE"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn sample_doc() -> Value {
        json!({
            "observables": [
                {
                    "id": "ecc",
                    "unit": "dimensionless",
                    "sources_allowed": ["JPL_HORIZONS", "MPC"],
                    "authority_rank": ["MPC", "JPL_HORIZONS"],
                    "tolerances": {
                        "epsilon": 0.05,
                        "delta": 0.2,
                        "time_window_days": 30,
                        "distance_metric": "abs"
                    },
                    "description": "Orbital eccentricity."
                },
                {
                    "id": "q_au",
                    "unit": "au",
                    "sources_allowed": ["JPL_HORIZONS"],
                    "tolerances": {
                        "epsilon": "0.01",
                        "delta": "0.1",
                        "time_window_days": "45",
                        "distance_metric": "relative"
                    }
                }
            ]
        })
    }

    #[test]
    fn decodes_full_registry_in_document_order() {
        let registry = ObservableRegistry::from_value(&sample_doc()).unwrap();
        assert_eq!(registry.len(), 2);

        let ecc = &registry.specs()[0];
        assert_eq!(ecc.id.as_str(), "ecc");
        assert_eq!(ecc.unit, "dimensionless");
        assert_eq!(ecc.tolerances.epsilon, 0.05);
        assert_eq!(ecc.tolerances.delta, 0.2);
        assert_eq!(ecc.tolerances.time_window_days, 30.0);
        assert_eq!(ecc.tolerances.metric(), Some(DistanceMetric::Abs));
        assert_eq!(
            ecc.authority_rank,
            vec![SourceId::from("MPC"), SourceId::from("JPL_HORIZONS")]
        );

        let q = &registry.specs()[1];
        assert_eq!(q.id.as_str(), "q_au");
        assert_eq!(q.description, "");
    }

    #[test]
    fn numeric_strings_coerce_to_tolerances() {
        let registry = ObservableRegistry::from_value(&sample_doc()).unwrap();
        let q = &registry.specs()[1];
        assert_eq!(q.tolerances.epsilon, 0.01);
        assert_eq!(q.tolerances.delta, 0.1);
        assert_eq!(q.tolerances.time_window_days, 45.0);
    }

    #[test]
    fn authority_rank_defaults_to_sources_allowed() {
        let registry = ObservableRegistry::from_value(&sample_doc()).unwrap();
        let q = &registry.specs()[1];
        assert_eq!(q.authority_rank, q.sources_allowed);
        assert_eq!(q.authority_rank, vec![SourceId::from("JPL_HORIZONS")]);
    }

    #[test]
    fn lookup_by_id() {
        let registry = ObservableRegistry::from_value(&sample_doc()).unwrap();
        assert!(registry.get(&ObservableId::from("ecc")).is_some());
        assert!(registry.get(&ObservableId::from("nope")).is_none());
    }

    #[test]
    fn missing_observables_key_is_empty_registry() {
        let registry = ObservableRegistry::from_value(&json!({})).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn empty_observables_array_is_empty_registry() {
        let registry = ObservableRegistry::from_value(&json!({"observables": []})).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn non_object_document_is_rejected() {
        let err = ObservableRegistry::from_value(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, EngineError::InvalidRegistry { .. }));
    }

    #[test]
    fn non_array_observables_is_rejected() {
        let err = ObservableRegistry::from_value(&json!({"observables": {}})).unwrap_err();
        assert!(format!("{err}").contains("must be an array"));
    }

    #[test]
    fn missing_id_is_rejected() {
        let doc = json!({"observables": [{"unit": "au", "tolerances": {
            "epsilon": 1, "delta": 2, "time_window_days": 3, "distance_metric": "abs"
        }}]});
        let err = ObservableRegistry::from_value(&doc).unwrap_err();
        assert!(format!("{err}").contains("observable[0]: missing id"));
    }

    #[test]
    fn missing_unit_is_rejected() {
        let doc = json!({"observables": [{"id": "ecc", "tolerances": {
            "epsilon": 1, "delta": 2, "time_window_days": 3, "distance_metric": "abs"
        }}]});
        let err = ObservableRegistry::from_value(&doc).unwrap_err();
        assert!(format!("{err}").contains("missing unit"));
    }

    #[test]
    fn missing_tolerance_field_is_rejected() {
        let doc = json!({"observables": [{"id": "ecc", "unit": "x", "tolerances": {
            "epsilon": 1, "delta": 2, "distance_metric": "abs"
        }}]});
        let err = ObservableRegistry::from_value(&doc).unwrap_err();
        assert!(format!("{err}").contains("missing time_window_days"));
    }

    #[test]
    fn missing_tolerances_object_is_rejected() {
        let doc = json!({"observables": [{"id": "ecc", "unit": "x"}]});
        let err = ObservableRegistry::from_value(&doc).unwrap_err();
        assert!(format!("{err}").contains("missing epsilon"));
    }

    #[test]
    fn non_numeric_tolerance_is_rejected() {
        let doc = json!({"observables": [{"id": "ecc", "unit": "x", "tolerances": {
            "epsilon": "wide", "delta": 2, "time_window_days": 3, "distance_metric": "abs"
        }}]});
        let err = ObservableRegistry::from_value(&doc).unwrap_err();
        assert!(format!("{err}").contains("not numeric"));
    }

    #[test]
    fn boolean_tolerance_is_rejected() {
        let doc = json!({"observables": [{"id": "ecc", "unit": "x", "tolerances": {
            "epsilon": true, "delta": 2, "time_window_days": 3, "distance_metric": "abs"
        }}]});
        let err = ObservableRegistry::from_value(&doc).unwrap_err();
        assert!(format!("{err}").contains("must be a number"));
    }

    #[test]
    fn non_string_source_entry_is_rejected() {
        let doc = json!({"observables": [{
            "id": "ecc", "unit": "x",
            "sources_allowed": ["MPC", 7],
            "tolerances": {"epsilon": 1, "delta": 2, "time_window_days": 3, "distance_metric": "abs"}
        }]});
        let err = ObservableRegistry::from_value(&doc).unwrap_err();
        assert!(format!("{err}").contains("entries must be strings"));
    }

    #[test]
    fn non_object_entry_is_rejected() {
        let doc = json!({"observables": ["ecc"]});
        let err = ObservableRegistry::from_value(&doc).unwrap_err();
        assert!(format!("{err}").contains("entry must be an object"));
    }

    #[test]
    fn unknown_metric_loads_but_does_not_parse() {
        let doc = json!({"observables": [{"id": "ecc", "unit": "x", "tolerances": {
            "epsilon": 1, "delta": 2, "time_window_days": 3, "distance_metric": "chebyshev"
        }}]});
        let registry = ObservableRegistry::from_value(&doc).unwrap();
        assert_eq!(registry.specs()[0].tolerances.metric(), None);
        assert_eq!(registry.specs()[0].tolerances.distance_metric, "chebyshev");
    }

    #[test]
    fn inverted_thresholds_still_load() {
        // epsilon > delta is suspicious but not fatal; the classifier
        // simply never produces the tension state for this observable.
        let doc = json!({"observables": [{"id": "ecc", "unit": "x", "tolerances": {
            "epsilon": 0.5, "delta": 0.1, "time_window_days": 3, "distance_metric": "abs"
        }}]});
        let registry = ObservableRegistry::from_value(&doc).unwrap();
        assert_eq!(registry.specs()[0].tolerances.epsilon, 0.5);
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("observables.json");
        std::fs::write(&path, sample_doc().to_string()).unwrap();

        let registry = ObservableRegistry::load(&path).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn load_missing_file_is_fatal() {
        let err = ObservableRegistry::load(Path::new("/nonexistent/observables.json")).unwrap_err();
        assert!(matches!(err, EngineError::FileNotFound { .. }));
    }
}
