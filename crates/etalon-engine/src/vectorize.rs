//! Reduction of raw observable values to numeric vectors.
//!
//! Values arrive from snapshots and theory documents as arbitrary JSON:
//! bare numbers, numeric strings, element arrays, bounds objects.
//! Comparison happens component-wise over R^n, so every value must
//! first reduce to a finite numeric vector. The rules are conservative:
//! a value that cannot be fully reduced yields no vector at all, and
//! the affected observable is classified as non-comparable rather than
//! contributing a skewed distance.

use serde_json::Value;

/// Coerces one JSON scalar to `f64`.
///
/// Numbers pass through; strings are trimmed and parsed. Booleans and
/// everything else are rejected — `true` is never a measurement. No
/// finiteness check happens here; callers decide what survives.
fn coerce_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()
        }
        _ => None,
    }
}

/// Reduces a JSON value to a finite numeric vector.
///
/// - Numbers and numeric strings become one-element vectors.
/// - Arrays vectorize element-wise; every element must coerce.
/// - Objects carrying both `min_km`/`max_km` (or, failing that, both
///   `min`/`max`) become `[lower, upper]` bounds pairs.
/// - Any other object flattens in sorted key order, so the result
///   never depends on key insertion order.
/// - Booleans, nulls, empty containers, and anything containing a
///   non-numeric or non-finite component yield `None`.
pub fn vectorize(value: &Value) -> Option<Vec<f64>> {
    match value {
        Value::Number(_) | Value::String(_) => {
            let f = coerce_float(value)?;
            f.is_finite().then(|| vec![f])
        }
        Value::Array(items) => {
            if items.is_empty() {
                return None;
            }
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let f = coerce_float(item)?;
                if !f.is_finite() {
                    return None;
                }
                out.push(f);
            }
            Some(out)
        }
        Value::Object(map) => {
            // A recognized bounds form claims the object even when its
            // components fail to coerce; there is no fallthrough to the
            // generic flattening.
            if let (Some(lo), Some(hi)) = (map.get("min_km"), map.get("max_km")) {
                return bounds_pair(lo, hi);
            }
            if let (Some(lo), Some(hi)) = (map.get("min"), map.get("max")) {
                return bounds_pair(lo, hi);
            }
            flatten_sorted(map)
        }
        _ => None,
    }
}

/// Interval values compare as `[lower, upper]` pairs.
fn bounds_pair(lower: &Value, upper: &Value) -> Option<Vec<f64>> {
    let lo = coerce_float(lower)?;
    let hi = coerce_float(upper)?;
    (lo.is_finite() && hi.is_finite()).then(|| vec![lo, hi])
}

/// Flattens an arbitrary mapping by sorted key, so two documents
/// listing the same fields in different order vectorize identically.
fn flatten_sorted(map: &serde_json::Map<String, Value>) -> Option<Vec<f64>> {
    if map.is_empty() {
        return None;
    }
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();
    let mut out = Vec::with_capacity(keys.len());
    for key in keys {
        let f = coerce_float(&map[key.as_str()])?;
        if !f.is_finite() {
            return None;
        }
        out.push(f);
    }
    Some(out)
}
