//! # etalon-ingest — Raw Acquisition Pipeline
//!
//! Fetches upstream data (currently the JPL Horizons ephemeris API) and
//! persists it under the repository data layout: the response bytes
//! verbatim, plus a sealed acquisition record that pins the file digest,
//! the registry endpoint used, and the exact request.
//!
//! ## Hard guarantees
//!
//! - Responses are stored verbatim. Nothing here parses, reformats, or
//!   interprets upstream payloads.
//! - Every record names a `source_id`/`endpoint_id` pair that exists in
//!   the source registry, so a fetch can be re-executed from the record
//!   alone.
//! - `integrity.record_sha256` is computed over the canonical form of
//!   the record with the digest field zeroed, then patched in. Any
//!   reader can re-zero and verify.
//!
//! ## Pipeline
//!
//! [`fetch_horizons`] runs resolve → query → persist in one call. The
//! pieces are public so the network step can be skipped: build a
//! [`HorizonsQuery`], resolve a [`ResolvedEndpoint`] against the
//! registry, and hand [`persist_fetch`] the response body.

pub mod error;
pub mod fetch;
pub mod query;
pub mod record;

pub use error::{IngestError, IngestResult};
pub use fetch::{
    fetch_horizons, http_get, parse_aliases, persist_fetch, resolve_endpoint, DataLayout,
    FetchOutcome, FetchPlan, ResolvedEndpoint, DEFAULT_ALIASES, DEFAULT_PRIORITY_PROFILE,
    DEFAULT_TARGET_ID, DEFAULT_TIMEOUT_SECS, HORIZONS_ENDPOINT_ID, HORIZONS_SOURCE_ID,
};
pub use query::{HorizonsQuery, DEFAULT_CENTER, DEFAULT_EPHEM_TYPE};
pub use record::{RawRecord, ZERO_DIGEST};
