//! Comparison-state classification.
//!
//! Every observable lands in exactly one of five states. The first two
//! describe missing data; the last three partition the distance axis
//! under the observable's epsilon/delta thresholds, both inclusive on
//! their upper edge.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::distance::compute_distance;
use crate::registry::ObservableSpec;

/// The five comparison states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonState {
    /// Exactly one side has a value, or both sides exist but no
    /// meaningful distance could be produced (vectorization failed,
    /// dimensions differ, the metric is unknown, or the distance is
    /// non-finite).
    #[serde(rename = "NON_COMPARABLE")]
    NonComparable,
    /// Neither side has a value.
    #[serde(rename = "INFTY_OVER_INFTY")]
    InftyOverInfty,
    /// Distance at or below epsilon: agreement.
    #[serde(rename = "ZERO_OVER_ZERO")]
    ZeroOverZero,
    /// Distance above epsilon but at or below delta: tension.
    #[serde(rename = "D0_OVER_DZ")]
    D0OverDz,
    /// Distance above delta: divergence.
    #[serde(rename = "DZ")]
    Dz,
}

impl ComparisonState {
    /// The wire name, exactly as written into the state table.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NonComparable => "NON_COMPARABLE",
            Self::InftyOverInfty => "INFTY_OVER_INFTY",
            Self::ZeroOverZero => "ZERO_OVER_ZERO",
            Self::D0OverDz => "D0_OVER_DZ",
            Self::Dz => "DZ",
        }
    }
}

impl std::fmt::Display for ComparisonState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified comparison. The distance is present exactly when one
/// of the three measured states was produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub state: ComparisonState,
    pub distance: Option<f64>,
}

impl Classification {
    fn without_distance(state: ComparisonState) -> Self {
        Self {
            state,
            distance: None,
        }
    }
}

/// Classifies one observable from its raw theory and empirical values.
///
/// JSON `null` counts as absent on either side. Threshold checks are
/// inclusive: a distance equal to epsilon is agreement, equal to delta
/// is tension.
pub fn classify(
    spec: &ObservableSpec,
    theory: Option<&Value>,
    empirical: Option<&Value>,
) -> Classification {
    let theory = theory.filter(|v| !v.is_null());
    let empirical = empirical.filter(|v| !v.is_null());

    let (theory, empirical) = match (theory, empirical) {
        (None, None) => {
            return Classification::without_distance(ComparisonState::InftyOverInfty);
        }
        (Some(t), Some(e)) => (t, e),
        _ => {
            return Classification::without_distance(ComparisonState::NonComparable);
        }
    };

    match compute_distance(&spec.tolerances.distance_metric, theory, empirical) {
        Some(d) if d.is_finite() => {
            let state = if d <= spec.tolerances.epsilon {
                ComparisonState::ZeroOverZero
            } else if d <= spec.tolerances.delta {
                ComparisonState::D0OverDz
            } else {
                ComparisonState::Dz
            };
            Classification {
                state,
                distance: Some(d),
            }
        }
        _ => Classification::without_distance(ComparisonState::NonComparable),
    }
}
