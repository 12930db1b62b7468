//! # Temporal Types — UTC Instants with Lenient Ingest Parsing
//!
//! Defines `Timestamp`, the UTC instant type used for reference times,
//! measurement epochs, and record acquisition times.
//!
//! ## Invariants
//!
//! - Every `Timestamp` is UTC. Inputs with an explicit offset are converted;
//!   naive datetimes and bare dates are read as UTC (there is no local-time
//!   interpretation anywhere in the stack).
//! - Rendering is always `YYYY-MM-DDTHH:MM:SSZ` — no sub-seconds, no
//!   `+00:00`, always `Z`.
//! - Parsing preserves sub-second precision internally so that day-delta
//!   arithmetic is faithful to the input; only rendering truncates.
//!
//! ## Lenient parsing
//!
//! Snapshot and measurement documents carry timestamps in whatever shape the
//! upstream pipeline produced: RFC 3339 with `Z` or an offset, a naive
//! datetime with `T` or space separator, minute precision, or a bare date.
//! [`Timestamp::parse_lenient()`] accepts all of these. Callers for which an
//! unparseable timestamp is a degraded (per-row) condition rather than an
//! error discard the `Err` with `.ok()`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EtalonError;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Naive datetime layouts accepted by the lenient parser, tried in order.
/// `%.f` matches an optional fractional-second part, including none.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A UTC instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to seconds.
    ///
    /// Generated timestamps (record acquisition times, package run times)
    /// are second-precision by policy, so truncation happens at the source.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Wrap a `chrono::DateTime<Utc>` without altering its precision.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Parse a timestamp from any of the accepted ingest layouts.
    ///
    /// Tried in order, on the whitespace-trimmed input:
    ///
    /// 1. RFC 3339 (`Z` or explicit offset; offset converted to UTC).
    /// 2. Naive datetime, `T` or space separator, optional fractional
    ///    seconds or minute precision — read as UTC.
    /// 3. Bare date (`YYYY-MM-DD`) — midnight UTC.
    ///
    /// # Errors
    ///
    /// Returns `EtalonError::Timestamp` when no layout matches.
    pub fn parse_lenient(s: &str) -> Result<Self, EtalonError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EtalonError::Timestamp("empty timestamp string".into()));
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self(dt.with_timezone(&Utc)));
        }

        for fmt in NAIVE_DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
                return Ok(Self(naive.and_utc()));
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                return Ok(Self(midnight.and_utc()));
            }
        }

        Err(EtalonError::Timestamp(format!(
            "unparseable timestamp: {s:?}"
        )))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Absolute distance between two instants, in fractional days.
    pub fn days_between(&self, other: &Timestamp) -> f64 {
        let delta = self.0.signed_duration_since(other.0);
        let seconds = delta
            .num_microseconds()
            .map(|us| us as f64 / 1e6)
            .unwrap_or_else(|| delta.num_seconds() as f64);
        (seconds / SECONDS_PER_DAY).abs()
    }

    /// Render as ISO8601 with Z suffix (e.g., `2025-12-20T12:00:00Z`),
    /// truncated to seconds.
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }

    /// Render the UTC calendar date only (`YYYY-MM-DD`). Used for
    /// date-partitioned storage paths and record identifiers.
    pub fn to_date_string(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

/// Truncate a `DateTime<Utc>` to seconds precision (discard nanoseconds).
fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}
