//! Structural snapshot validation.
//!
//! Checks the shape of a snapshot document and nothing else: is it an
//! object, does it carry a measurement payload under one of the two
//! accepted keys, is a checksum field present. Values are never
//! inspected and no orbital quantity is computed or interpreted; the
//! message list says so explicitly so the trace documents the scope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level keys under which a snapshot carries its measurements.
const MEASUREMENT_KEYS: &[&str] = &["observables", "measurements"];

/// Top-level checksum aliases a snapshot may carry. Preserved verbatim,
/// never recomputed here.
const CHECKSUM_KEYS: &[&str] = &["snapshot_sha256", "sha256", "checksum"];

/// Verdict of structural validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationState {
    Valid,
    Invalid,
    /// Reserved for checks that can neither pass nor fail; no current
    /// check produces it, but packages may carry it from other tools.
    Inconclusive,
}

impl ValidationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationState::Valid => "VALID",
            ValidationState::Invalid => "INVALID",
            ValidationState::Inconclusive => "INCONCLUSIVE",
        }
    }
}

impl std::fmt::Display for ValidationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs the structural checks over a parsed snapshot document.
///
/// Returns the verdict plus the plain-text messages that go into the
/// validation trace, in check order.
pub fn validate_snapshot_structure(snapshot: &Value) -> (ValidationState, Vec<String>) {
    let mut messages = Vec::new();
    let mut state = ValidationState::Valid;

    let Some(map) = snapshot.as_object() else {
        messages.push("FAIL: Snapshot is not a JSON object".to_string());
        return (ValidationState::Invalid, messages);
    };
    messages.push("PASS: Snapshot is a valid JSON object".to_string());

    match MEASUREMENT_KEYS.iter().find(|key| map.contains_key(**key)) {
        Some(key) => messages.push(format!("PASS: Field '{key}' exists")),
        None => {
            messages.push(
                "FAIL: Missing measurement payload (expected 'observables' or 'measurements')"
                    .to_string(),
            );
            state = ValidationState::Invalid;
        }
    }

    if CHECKSUM_KEYS.iter().any(|key| map.contains_key(*key)) {
        messages
            .push("INFO: Checksum field present - preserving verbatim (not validating)".to_string());
    }

    messages.push("INFO: No orbital computation performed (out of scope)".to_string());
    messages.push("INFO: No scientific interpretation performed (prohibited)".to_string());

    (state, messages)
}
