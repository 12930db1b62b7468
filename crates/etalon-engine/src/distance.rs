//! Distance metrics over numeric vectors.
//!
//! Three metrics cover the registry's needs: worst-case absolute
//! deviation, worst-case relative deviation, and the Euclidean norm of
//! the difference. Dimension mismatches are never errors — they return
//! infinity, which downstream classification reports as non-comparable.

use serde_json::Value;

use crate::vectorize::vectorize;

/// Denominator floor for the relative metric. Guards components whose
/// empirical value is zero or arbitrarily close to it.
pub const RELATIVE_FLOOR: f64 = 1e-12;

/// A recognized distance metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistanceMetric {
    /// Maximum component-wise absolute difference.
    Abs,
    /// Maximum component-wise relative difference.
    Relative,
    /// Euclidean norm of the component-wise differences.
    L2,
}

impl DistanceMetric {
    /// Parses a registry metric name. Names are exact and
    /// case-sensitive: `abs`, `relative`, `L2`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "abs" => Some(Self::Abs),
            "relative" => Some(Self::Relative),
            "L2" => Some(Self::L2),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Abs => "abs",
            Self::Relative => "relative",
            Self::L2 => "L2",
        }
    }
}

impl std::fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Worst-case absolute deviation between two vectors.
pub fn distance_abs(theory: &[f64], empirical: &[f64]) -> f64 {
    if theory.len() != empirical.len() {
        return f64::INFINITY;
    }
    theory
        .iter()
        .zip(empirical)
        .map(|(t, e)| (t - e).abs())
        .fold(0.0, f64::max)
}

/// Worst-case relative deviation, with each component's denominator
/// floored at [`RELATIVE_FLOOR`].
pub fn distance_relative(theory: &[f64], empirical: &[f64]) -> f64 {
    if theory.len() != empirical.len() || theory.is_empty() {
        return f64::INFINITY;
    }
    theory
        .iter()
        .zip(empirical)
        .map(|(t, e)| (t - e).abs() / e.abs().max(RELATIVE_FLOOR))
        .fold(0.0, f64::max)
}

/// Euclidean norm of the component-wise differences.
pub fn distance_l2(theory: &[f64], empirical: &[f64]) -> f64 {
    if theory.len() != empirical.len() {
        return f64::INFINITY;
    }
    theory
        .iter()
        .zip(empirical)
        .map(|(t, e)| (t - e).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Applies a metric to two already-vectorized values.
pub fn distance_between(metric: DistanceMetric, theory: &[f64], empirical: &[f64]) -> f64 {
    match metric {
        DistanceMetric::Abs => distance_abs(theory, empirical),
        DistanceMetric::Relative => distance_relative(theory, empirical),
        DistanceMetric::L2 => distance_l2(theory, empirical),
    }
}

/// Vectorizes both raw values and applies the named metric.
///
/// Returns `None` when either value fails to vectorize or the metric
/// name is unrecognized, leaving the comparability verdict to the
/// classifier.
pub fn compute_distance(metric_name: &str, theory: &Value, empirical: &Value) -> Option<f64> {
    let tv = vectorize(theory)?;
    let ev = vectorize(empirical)?;
    let metric = DistanceMetric::parse(metric_name)?;
    Some(distance_between(metric, &tv, &ev))
}
