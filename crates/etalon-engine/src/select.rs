//! Deterministic measurement selection.
//!
//! When a snapshot carries several candidates for one observable,
//! exactly one must win, and re-running the tool over the same inputs
//! must pick the same one. Selection first filters by the observable's
//! source allow-list, then orders the survivors by a composite key:
//!
//! 1. authority rank (position in `authority_rank`; unranked sources
//!    and then sourceless candidates sort after every ranked one),
//! 2. temporal distance to the snapshot reference time,
//! 3. retrieval timestamp text,
//! 4. raw path text.
//!
//! The sort is stable, so candidates tied on the whole key keep their
//! snapshot document order. The freshness window is enforced on the
//! winner only: a stale best candidate yields no selection rather than
//! silently promoting a lower-authority one.

use std::cmp::Ordering;
use std::collections::HashMap;

use etalon_core::Timestamp;

use crate::registry::ObservableSpec;
use crate::snapshot::Measurement;

/// Rank for candidates whose source is absent from `authority_rank`.
pub const RANK_UNRANKED: usize = 9_999;

/// Rank for candidates carrying no source at all. Sorts after every
/// ranked and unranked source.
pub const RANK_NO_SOURCE: usize = 10_000;

/// Selection knobs.
///
/// The default enforces the freshness window on the top-ranked
/// candidate only. `window_fallback` instead walks the ordered pool
/// until a candidate passes the window, trading the "stale authority
/// means no answer" guarantee for coverage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionPolicy {
    pub window_fallback: bool,
}

/// Selects the winning measurement under the default policy.
pub fn select_measurement<'a>(
    spec: &ObservableSpec,
    candidates: &'a [Measurement],
    reference: Option<&Timestamp>,
) -> Option<&'a Measurement> {
    select_with_policy(spec, candidates, reference, SelectionPolicy::default())
}

/// Selects the winning measurement under an explicit policy.
pub fn select_with_policy<'a>(
    spec: &ObservableSpec,
    candidates: &'a [Measurement],
    reference: Option<&Timestamp>,
    policy: SelectionPolicy,
) -> Option<&'a Measurement> {
    let rank_index = rank_index(spec);
    let mut pool: Vec<Candidate<'a>> = candidates
        .iter()
        .filter(|m| allowed(spec, m))
        .map(|m| Candidate {
            rank: rank_of(&rank_index, m),
            delta_days: time_delta_days(reference, m),
            measurement: m,
        })
        .collect();
    if pool.is_empty() {
        return None;
    }

    // Stable sort: full-key ties keep document order.
    pool.sort_by(Candidate::order);

    if policy.window_fallback {
        pool.iter()
            .find(|c| within_window(spec, reference, c.measurement))
            .map(|c| c.measurement)
    } else {
        let chosen = pool[0].measurement;
        within_window(spec, reference, chosen).then_some(chosen)
    }
}

/// A pool entry with its precomputed sort key.
struct Candidate<'a> {
    rank: usize,
    delta_days: f64,
    measurement: &'a Measurement,
}

impl Candidate<'_> {
    fn order(&self, other: &Self) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then_with(|| self.delta_days.total_cmp(&other.delta_days))
            .then_with(|| {
                text_key(&self.measurement.retrieved_utc)
                    .cmp(text_key(&other.measurement.retrieved_utc))
            })
            .then_with(|| {
                text_key(&self.measurement.raw_path).cmp(text_key(&other.measurement.raw_path))
            })
    }
}

fn text_key(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or("")
}

/// Allow-list filter. An empty list admits everything; a sourceless
/// candidate is admitted and left to the rank key to demote.
fn allowed(spec: &ObservableSpec, m: &Measurement) -> bool {
    if spec.sources_allowed.is_empty() {
        return true;
    }
    match &m.source_id {
        None => true,
        Some(source) => spec.sources_allowed.contains(source),
    }
}

/// Rank positions from the authority list. If a source appears more
/// than once, its last position wins.
fn rank_index(spec: &ObservableSpec) -> HashMap<&str, usize> {
    let mut index = HashMap::new();
    for (position, source) in spec.authority_rank.iter().enumerate() {
        index.insert(source.as_str(), position);
    }
    index
}

fn rank_of(index: &HashMap<&str, usize>, m: &Measurement) -> usize {
    match &m.source_id {
        None => RANK_NO_SOURCE,
        Some(source) => index.get(source.as_str()).copied().unwrap_or(RANK_UNRANKED),
    }
}

/// Effective candidate time: the epoch when it parses, else the
/// retrieval time.
fn effective_time(m: &Measurement) -> Option<Timestamp> {
    m.epoch_utc
        .as_deref()
        .and_then(|s| Timestamp::parse_lenient(s).ok())
        .or_else(|| {
            m.retrieved_utc
                .as_deref()
                .and_then(|s| Timestamp::parse_lenient(s).ok())
        })
}

/// Days between candidate and reference. Candidates that cannot be
/// placed in time — and every candidate when the snapshot has no
/// reference time — score infinity and sort after datable ones.
fn time_delta_days(reference: Option<&Timestamp>, m: &Measurement) -> f64 {
    match (reference, effective_time(m)) {
        (Some(reference), Some(time)) => time.days_between(reference),
        _ => f64::INFINITY,
    }
}

/// The freshness gate. A candidate fails only when a reference time
/// exists, the candidate itself can be placed in time, and the gap
/// exceeds the observable's window. Undatable candidates pass.
fn within_window(spec: &ObservableSpec, reference: Option<&Timestamp>, m: &Measurement) -> bool {
    let Some(reference) = reference else {
        return true;
    };
    let Some(time) = effective_time(m) else {
        return true;
    };
    time.days_between(reference) <= spec.tolerances.time_window_days
}
