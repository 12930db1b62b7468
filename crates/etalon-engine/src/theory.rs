//! Theory-side predictions.
//!
//! A theory document is a JSON object carrying predicted values keyed
//! by observable identifier, either under a top-level `predictions`
//! object or as the whole document. The theory input is optional:
//! without one, every row's theory side is simply absent.

use std::path::Path;

use serde_json::{Map, Value};

use etalon_core::ObservableId;

use crate::document::read_json;
use crate::error::{EngineError, EngineResult};

/// Predicted values keyed by observable identifier.
#[derive(Debug, Clone, Default)]
pub struct TheorySet {
    predictions: Map<String, Value>,
}

impl TheorySet {
    /// The empty set: every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Decodes a theory document. When a `predictions` object is
    /// present it is used alone; otherwise the whole document is the
    /// prediction map.
    pub fn from_value(doc: &Value) -> EngineResult<Self> {
        let root = doc.as_object().ok_or_else(|| EngineError::InvalidTheory {
            detail: "theory document must be a JSON object".to_string(),
        })?;
        let predictions = match root.get("predictions") {
            Some(Value::Object(map)) => map.clone(),
            _ => root.clone(),
        };
        Ok(Self { predictions })
    }

    /// Loads and decodes a theory file.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let doc = read_json(path)?;
        let theory = Self::from_value(&doc)?;
        tracing::debug!(
            path = %path.display(),
            predictions = theory.len(),
            "loaded theory predictions"
        );
        Ok(theory)
    }

    /// The predicted value for one observable. `None` when absent or
    /// JSON `null` — a null prediction means no prediction.
    pub fn get(&self, id: &ObservableId) -> Option<&Value> {
        self.predictions.get(id.as_str()).filter(|v| !v.is_null())
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }
}
