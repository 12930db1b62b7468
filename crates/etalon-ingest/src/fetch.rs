//! Fetch execution and persistence.
//!
//! The pipeline runs in three steps that are deliberately separable:
//! resolve the endpoint against the source registry, execute the HTTP
//! query, and persist the verbatim response next to a sealed
//! acquisition record. Persistence takes the response body as an
//! argument, so everything below the network call is testable without
//! touching it.
//!
//! Storage layout under the repository root:
//!
//! ```text
//! data/raw/<SOURCE_ID>/<YYYY-MM-DD>/<target>__<source>__<endpoint>__<date>.json
//! data/records/<target>__<source>__<endpoint>__<date>.record.json
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use etalon_core::{sha256_hex_file, RecordId, Timestamp};
use etalon_schema::{SourceEndpoint, SourceEntry, SourceRegistry};

use crate::error::{IngestError, IngestResult};
use crate::query::HorizonsQuery;
use crate::record::{
    Acquisition, Facility, FileEntry, Integrity, Provenance, RawRecord, RecordSource, Target,
    TimeCoverage, ZERO_DIGEST,
};

/// Registry identity of the Horizons ephemeris source.
pub const HORIZONS_SOURCE_ID: &str = "JPL_HORIZONS";
/// Registry identity of the Horizons API endpoint.
pub const HORIZONS_ENDPOINT_ID: &str = "horizons_api";
/// Canonical target identity for the 3I/ATLAS campaign.
pub const DEFAULT_TARGET_ID: &str = "3I_ATLAS";
/// Human designations stored in `target.aliases[]` by default,
/// comma-separated the way the command line takes them.
pub const DEFAULT_ALIASES: &str = "3I/ATLAS,3I ATLAS,C/2025 N1 (ATLAS)";
/// Default priority profile recorded on fetched records.
pub const DEFAULT_PRIORITY_PROFILE: &str = "3I_ATLAS_DEFAULT";
/// Default HTTP timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// User agent sent with every upstream request.
pub const USER_AGENT: &str = concat!("etalon/", env!("CARGO_PKG_VERSION"));

/// Facility recorded on Horizons acquisitions.
const HORIZONS_FACILITY_ID: &str = "JPL";

/// Filesystem layout for ingest outputs under a repository root.
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding verbatim responses from one source on one date.
    pub fn raw_dir(&self, source_id: &str, date: &str) -> PathBuf {
        self.root.join("data").join("raw").join(source_id).join(date)
    }

    /// Directory holding sealed acquisition records.
    pub fn records_dir(&self) -> PathBuf {
        self.root.join("data").join("records")
    }
}

/// A source/endpoint pair resolved against the registry, with the
/// authority rank already checked.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedEndpoint<'a> {
    pub source: &'a SourceEntry,
    pub endpoint: &'a SourceEndpoint,
    pub authority_rank: i64,
}

/// Looks up a source/endpoint pair and verifies the registry entry is
/// usable: non-empty URL, integer authority rank of at least 1.
pub fn resolve_endpoint<'a>(
    registry: &'a SourceRegistry,
    source_id: &str,
    endpoint_id: &str,
) -> IngestResult<ResolvedEndpoint<'a>> {
    let source = registry.find_source(source_id).ok_or_else(|| {
        IngestError::config(format!("source_id not found in sources.json: {source_id}"))
    })?;

    let endpoint = source.find_endpoint(endpoint_id).ok_or_else(|| {
        IngestError::config(format!(
            "endpoint_id not found for source_id={source_id}: {endpoint_id} (available: {:?})",
            source.endpoint_ids()
        ))
    })?;

    if endpoint.url.trim().is_empty() {
        return Err(IngestError::config(format!(
            "invalid endpoint url in sources.json for {source_id}.{endpoint_id}"
        )));
    }

    let authority_rank = match source.authority_rank {
        Some(rank) if rank >= 1 => rank,
        _ => {
            return Err(IngestError::config(format!(
                "invalid authority_rank in sources.json for source_id={source_id}"
            )))
        }
    };

    Ok(ResolvedEndpoint {
        source,
        endpoint,
        authority_rank,
    })
}

/// Splits a comma-separated alias list, trimming entries and dropping
/// empty ones.
pub fn parse_aliases(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|alias| !alias.is_empty())
        .map(str::to_string)
        .collect()
}

/// One planned ingest run: the target identity, the query to send, and
/// the run parameters not derived from the registry.
#[derive(Debug, Clone)]
pub struct FetchPlan {
    pub target_id: String,
    pub aliases: Vec<String>,
    pub priority_profile: String,
    pub query: HorizonsQuery,
    /// UTC date partition (`YYYY-MM-DD`) the artifacts are filed under.
    pub date: String,
    pub timeout: Duration,
}

impl FetchPlan {
    /// Builds a plan for today's UTC date with default aliases, profile,
    /// and timeout.
    pub fn new(target_id: &str, query: HorizonsQuery) -> IngestResult<Self> {
        let target_id = target_id.trim();
        if target_id.is_empty() {
            return Err(IngestError::config("target-id must be non-empty"));
        }
        Ok(Self {
            target_id: target_id.to_string(),
            aliases: parse_aliases(DEFAULT_ALIASES),
            priority_profile: DEFAULT_PRIORITY_PROFILE.to_string(),
            query,
            date: Timestamp::now().to_date_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_priority_profile(mut self, profile: &str) -> Self {
        self.priority_profile = profile.to_string();
        self
    }

    pub fn with_date(mut self, date: &str) -> Self {
        self.date = date.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Paths and digests produced by one completed ingest.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub raw_path: PathBuf,
    pub raw_sha256: String,
    pub record_path: PathBuf,
    pub record_sha256: String,
    pub request_url: String,
}

/// Executes a GET against a fully-built request URL and returns the
/// response body verbatim. Non-2xx statuses are errors.
pub fn http_get(url: &Url, timeout: Duration) -> IngestResult<Vec<u8>> {
    let http_err = |source| IngestError::Http {
        url: url.to_string(),
        source,
    };
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(http_err)?;
    let response = client
        .get(url.clone())
        .send()
        .and_then(|resp| resp.error_for_status())
        .map_err(http_err)?;
    let body = response.bytes().map_err(http_err)?;
    Ok(body.to_vec())
}

/// Writes the raw response and its sealed record for one completed
/// fetch.
///
/// The body and retrieval instant are arguments rather than side
/// effects, so the full persistence path (paths, digests, record
/// content) runs in tests against canned bytes.
pub fn persist_fetch(
    layout: &DataLayout,
    resolved: &ResolvedEndpoint<'_>,
    plan: &FetchPlan,
    request_url: &str,
    body: &[u8],
    retrieved: &Timestamp,
) -> IngestResult<FetchOutcome> {
    let source_id = resolved.source.source_id.as_str();
    let endpoint_id = resolved.endpoint.endpoint_id.as_str();
    let stem = artifact_stem(&plan.target_id, source_id, endpoint_id, &plan.date);

    let raw_dir = layout.raw_dir(source_id, &plan.date);
    fs::create_dir_all(&raw_dir)?;
    let raw_path = raw_dir.join(format!("{stem}.json"));
    fs::write(&raw_path, body)?;

    let raw_sha256 = sha256_hex_file(&raw_path)?;
    let size_bytes = fs::metadata(&raw_path)?.len();

    let record_id = RecordId::generate(&plan.target_id, &resolved.source.source_id, &plan.date);
    let retrieved_utc = retrieved.to_iso8601();
    let upstream_ids: BTreeMap<String, String> = plan
        .query
        .params()
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect();

    let mut record = RawRecord {
        record_id: record_id.as_str().to_string(),
        target: Target {
            target_id: plan.target_id.clone(),
            target_type: "object".to_string(),
            aliases: plan.aliases.clone(),
        },
        dataset_role: "ephemeris".to_string(),
        priority_profile: plan.priority_profile.clone(),
        source: RecordSource {
            source_id: resolved.source.source_id.clone(),
            source_type: resolved.source.source_type.clone(),
            authority_rank: resolved.authority_rank,
            endpoint_id: resolved.endpoint.endpoint_id.clone(),
            url: resolved.endpoint.url.clone(),
            license: resolved.source.license.clone(),
            citation: resolved.source.citation.clone(),
        },
        acquisition: Acquisition {
            retrieved_utc: retrieved_utc.clone(),
            time_coverage: TimeCoverage {
                start_utc: retrieved_utc.clone(),
                end_utc: retrieved_utc,
            },
            facility: Facility {
                facility_id: HORIZONS_FACILITY_ID.to_string(),
                instrument: String::new(),
                program_id: String::new(),
            },
        },
        files: vec![FileEntry {
            path: repo_relative(layout.root(), &raw_path),
            media_type: "application/json".to_string(),
            role: "primary".to_string(),
            size_bytes,
            sha256: raw_sha256.clone(),
        }],
        provenance: Provenance {
            source_query: format!("GET {request_url} (endpoint_id={endpoint_id})"),
            upstream_ids,
        },
        integrity: Integrity {
            record_sha256: ZERO_DIGEST.to_string(),
        },
        notes: "Canonical JPL Horizons ephemeris record. Response stored verbatim; \
                no interpretation applied."
            .to_string(),
    };

    let record_sha256 = record.seal()?;

    let records_dir = layout.records_dir();
    fs::create_dir_all(&records_dir)?;
    let record_path = records_dir.join(format!("{stem}.record.json"));
    fs::write(&record_path, record.to_pretty_json()?)?;

    tracing::info!(
        raw = %raw_path.display(),
        record = %record_path.display(),
        "persisted fetch artifacts"
    );

    Ok(FetchOutcome {
        raw_path,
        raw_sha256,
        record_path,
        record_sha256,
        request_url: request_url.to_string(),
    })
}

/// Runs the whole pipeline: resolve the Horizons endpoint, execute the
/// query, persist the raw response plus its sealed record.
pub fn fetch_horizons(
    layout: &DataLayout,
    registry: &SourceRegistry,
    plan: &FetchPlan,
) -> IngestResult<FetchOutcome> {
    let resolved = resolve_endpoint(registry, HORIZONS_SOURCE_ID, HORIZONS_ENDPOINT_ID)?;
    if resolved.endpoint.method != "GET" {
        return Err(IngestError::config(format!(
            "unsupported method for {HORIZONS_ENDPOINT_ID}: {} (expected GET)",
            resolved.endpoint.method
        )));
    }

    let url = plan.query.request_url(&resolved.endpoint.url)?;
    tracing::debug!(url = %url, timeout_secs = plan.timeout.as_secs(), "executing Horizons fetch");
    let body = http_get(&url, plan.timeout)?;
    let retrieved = Timestamp::now();
    persist_fetch(layout, &resolved, plan, url.as_str(), &body, &retrieved)
}

/// Shared basename for the raw file and record of one fetch.
fn artifact_stem(target_id: &str, source_id: &str, endpoint_id: &str, date: &str) -> String {
    format!("{target_id}__{source_id}__{endpoint_id}__{date}")
}

/// Renders `path` relative to `root` with forward slashes, the way
/// `files[].path` entries are stored in records.
fn repo_relative(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use etalon_core::sha256_hex_bytes;
    use serde_json::json;

    fn test_registry() -> SourceRegistry {
        SourceRegistry::from_value(&json!({
            "sources": [
                {
                    "source_id": "JPL_HORIZONS",
                    "source_type": "ephemeris_service",
                    "authority_rank": 1,
                    "license": "Public Domain",
                    "citation": "NASA/JPL Horizons API (ephemeris service)",
                    "endpoints": [
                        {
                            "endpoint_id": "horizons_api",
                            "url": "https://ssd.jpl.nasa.gov/api/horizons.api",
                            "retrieval": { "method": "GET" }
                        }
                    ]
                }
            ]
        }))
    }

    fn test_plan() -> FetchPlan {
        FetchPlan::new("3I_ATLAS", HorizonsQuery::new("DES=C/2025 N1").unwrap())
            .unwrap()
            .with_date("2026-01-10")
    }

    #[test]
    fn resolve_finds_the_registered_endpoint() {
        let registry = test_registry();
        let resolved = resolve_endpoint(&registry, "JPL_HORIZONS", "horizons_api").unwrap();
        assert_eq!(resolved.authority_rank, 1);
        assert_eq!(
            resolved.endpoint.url,
            "https://ssd.jpl.nasa.gov/api/horizons.api"
        );
    }

    #[test]
    fn resolve_unknown_source_is_a_config_error() {
        let registry = test_registry();
        let err = resolve_endpoint(&registry, "SBDB", "horizons_api").unwrap_err();
        assert!(format!("{err}").contains("source_id not found in sources.json: SBDB"));
    }

    #[test]
    fn resolve_unknown_endpoint_lists_alternatives() {
        let registry = test_registry();
        let err = resolve_endpoint(&registry, "JPL_HORIZONS", "sbdb_api").unwrap_err();
        let rendered = format!("{err}");
        assert!(rendered.contains("endpoint_id not found for source_id=JPL_HORIZONS: sbdb_api"));
        assert!(rendered.contains("horizons_api"));
    }

    #[test]
    fn resolve_rejects_missing_rank() {
        let registry = SourceRegistry::from_value(&json!({
            "sources": [
                {
                    "source_id": "JPL_HORIZONS",
                    "endpoints": [
                        { "endpoint_id": "horizons_api", "url": "https://example.com" }
                    ]
                }
            ]
        }));
        let err = resolve_endpoint(&registry, "JPL_HORIZONS", "horizons_api").unwrap_err();
        assert!(format!("{err}").contains("invalid authority_rank"));
    }

    #[test]
    fn resolve_rejects_rank_below_one() {
        let registry = SourceRegistry::from_value(&json!({
            "sources": [
                {
                    "source_id": "JPL_HORIZONS",
                    "authority_rank": 0,
                    "endpoints": [
                        { "endpoint_id": "horizons_api", "url": "https://example.com" }
                    ]
                }
            ]
        }));
        assert!(resolve_endpoint(&registry, "JPL_HORIZONS", "horizons_api").is_err());
    }

    #[test]
    fn resolve_rejects_blank_url() {
        let registry = SourceRegistry::from_value(&json!({
            "sources": [
                {
                    "source_id": "JPL_HORIZONS",
                    "authority_rank": 1,
                    "endpoints": [
                        { "endpoint_id": "horizons_api", "url": "   " }
                    ]
                }
            ]
        }));
        let err = resolve_endpoint(&registry, "JPL_HORIZONS", "horizons_api").unwrap_err();
        assert!(format!("{err}").contains("invalid endpoint url"));
    }

    #[test]
    fn parse_aliases_trims_and_drops_empties() {
        assert_eq!(
            parse_aliases(" 3I/ATLAS , ,3I ATLAS,,C/2025 N1 (ATLAS) "),
            vec!["3I/ATLAS", "3I ATLAS", "C/2025 N1 (ATLAS)"]
        );
        assert!(parse_aliases("  ,  ").is_empty());
    }

    #[test]
    fn plan_rejects_blank_target() {
        let query = HorizonsQuery::new("3I/ATLAS").unwrap();
        assert!(FetchPlan::new("   ", query).is_err());
    }

    #[test]
    fn plan_defaults_cover_the_campaign() {
        let plan = test_plan();
        assert_eq!(plan.priority_profile, "3I_ATLAS_DEFAULT");
        assert_eq!(plan.aliases.len(), 3);
        assert_eq!(plan.timeout, Duration::from_secs(60));
    }

    #[test]
    fn repo_relative_uses_forward_slashes() {
        let root = Path::new("/repo");
        let nested = Path::new("/repo/data/raw/JPL_HORIZONS/2026-01-10/a.json");
        assert_eq!(
            repo_relative(root, nested),
            "data/raw/JPL_HORIZONS/2026-01-10/a.json"
        );
    }

    #[test]
    fn repo_relative_falls_back_to_the_full_path_outside_root() {
        let rendered = repo_relative(Path::new("/repo"), Path::new("/elsewhere/a.json"));
        assert!(rendered.ends_with("elsewhere/a.json"));
    }

    #[test]
    fn persist_writes_raw_and_record_with_matching_digests() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        let registry = test_registry();
        let resolved = resolve_endpoint(&registry, "JPL_HORIZONS", "horizons_api").unwrap();
        let plan = test_plan();
        let retrieved = Timestamp::parse_lenient("2026-01-10T06:30:00Z").unwrap();
        let body = br#"{"result": "ephemeris text"}"#;

        let outcome = persist_fetch(
            &layout,
            &resolved,
            &plan,
            "https://ssd.jpl.nasa.gov/api/horizons.api?format=json&COMMAND=DES%3DC%2F2025+N1",
            body,
            &retrieved,
        )
        .unwrap();

        assert_eq!(
            outcome.raw_path,
            dir.path()
                .join("data/raw/JPL_HORIZONS/2026-01-10")
                .join("3I_ATLAS__JPL_HORIZONS__horizons_api__2026-01-10.json")
        );
        assert_eq!(
            outcome.record_path,
            dir.path()
                .join("data/records")
                .join("3I_ATLAS__JPL_HORIZONS__horizons_api__2026-01-10.record.json")
        );
        assert_eq!(fs::read(&outcome.raw_path).unwrap(), body.to_vec());
        assert_eq!(outcome.raw_sha256, sha256_hex_bytes(body));
    }

    #[test]
    fn persisted_record_content_matches_the_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        let registry = test_registry();
        let resolved = resolve_endpoint(&registry, "JPL_HORIZONS", "horizons_api").unwrap();
        let plan = test_plan();
        let retrieved = Timestamp::parse_lenient("2026-01-10T06:30:00Z").unwrap();
        let request_url = "https://ssd.jpl.nasa.gov/api/horizons.api?format=json";

        let outcome =
            persist_fetch(&layout, &resolved, &plan, request_url, b"payload", &retrieved).unwrap();

        let text = fs::read_to_string(&outcome.record_path).unwrap();
        assert!(text.ends_with('\n'));
        let record: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(record["target"]["target_id"], "3I_ATLAS");
        assert_eq!(record["dataset_role"], "ephemeris");
        assert_eq!(record["source"]["authority_rank"], 1);
        assert_eq!(record["source"]["license"], "Public Domain");
        assert_eq!(record["acquisition"]["retrieved_utc"], "2026-01-10T06:30:00Z");
        assert_eq!(
            record["files"][0]["path"],
            "data/raw/JPL_HORIZONS/2026-01-10/3I_ATLAS__JPL_HORIZONS__horizons_api__2026-01-10.json"
        );
        assert_eq!(record["files"][0]["size_bytes"], 7);
        assert_eq!(
            record["provenance"]["source_query"],
            format!("GET {request_url} (endpoint_id=horizons_api)")
        );
        assert_eq!(record["provenance"]["upstream_ids"]["COMMAND"], "DES=C/2025 N1");
        assert_eq!(record["integrity"]["record_sha256"], outcome.record_sha256);
    }

    #[test]
    fn persisted_record_digest_verifies_after_rezeroing() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        let registry = test_registry();
        let resolved = resolve_endpoint(&registry, "JPL_HORIZONS", "horizons_api").unwrap();
        let plan = test_plan();
        let retrieved = Timestamp::parse_lenient("2026-01-10T06:30:00Z").unwrap();

        let outcome = persist_fetch(
            &layout,
            &resolved,
            &plan,
            "https://example.com/?format=json",
            b"payload",
            &retrieved,
        )
        .unwrap();

        let text = fs::read_to_string(&outcome.record_path).unwrap();
        let mut reread: RawRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(reread.seal().unwrap(), outcome.record_sha256);
    }
}
