//! `etalon fetch` — ephemeris ingest against the configured endpoint.
//!
//! Resolves the `JPL_HORIZONS` / `horizons_api` endpoint from
//! `config/sources.json`, executes the query, and persists the raw
//! response plus a sealed provenance record under `data/`. With
//! `--validate` the sealed record is immediately checked against the
//! shipped schema and registry.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use etalon_ingest::{
    fetch_horizons, parse_aliases, DataLayout, FetchPlan, HorizonsQuery, DEFAULT_ALIASES,
    DEFAULT_CENTER, DEFAULT_EPHEM_TYPE, DEFAULT_TARGET_ID, DEFAULT_TIMEOUT_SECS,
};
use etalon_schema::{RecordValidator, SourceRegistry};

/// Arguments for the `fetch` subcommand.
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Horizons COMMAND designation (e.g. "DES=C/2025 N1" or "1004083").
    #[arg(long)]
    pub command: String,

    /// Canonical target identifier used in artifact names and the record.
    #[arg(long, default_value = DEFAULT_TARGET_ID)]
    pub target_id: String,

    /// Comma-separated designation aliases recorded alongside the target.
    #[arg(long, default_value = DEFAULT_ALIASES)]
    pub aliases: String,

    /// UTC date partition (YYYY-MM-DD) for the artifacts. Defaults to today.
    #[arg(long)]
    pub date: Option<String>,

    /// Horizons CENTER parameter.
    #[arg(long, default_value = DEFAULT_CENTER)]
    pub center: String,

    /// Horizons EPHEM_TYPE parameter.
    #[arg(long, default_value = DEFAULT_EPHEM_TYPE)]
    pub ephem_type: String,

    /// HTTP timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Validate the sealed record against the shipped schema and registry.
    #[arg(long)]
    pub validate: bool,
}

/// Execute the `fetch` subcommand.
///
/// Returns exit code 0 on success, 1 when `--validate` rejects the
/// produced record. Configuration and transport failures propagate as
/// errors (exit code 2).
pub fn run_fetch(args: &FetchArgs, repo_root: &Path) -> Result<u8> {
    let sources_path = repo_root.join("config/sources.json");
    let registry =
        SourceRegistry::load(&sources_path).context("failed to load the source registry")?;

    let plan = fetch_plan(args)?;
    let layout = DataLayout::new(repo_root);
    let outcome = fetch_horizons(&layout, &registry, &plan).context("ephemeris fetch failed")?;

    println!("FETCH: OK");
    println!("  Raw saved:    {}", display_path(&outcome.raw_path, repo_root));
    println!("  Raw sha256:   {}", outcome.raw_sha256);
    println!(
        "  Record saved: {}",
        display_path(&outcome.record_path, repo_root)
    );
    println!("  Record sha256:{}", outcome.record_sha256);
    println!("  Request URL:  {}", outcome.request_url);

    if args.validate {
        let schema_path = repo_root.join("schemas/record.schema.json");
        let validator = RecordValidator::new(&schema_path, &sources_path)
            .context("failed to load the record schema or source registry")?;
        let report = validator
            .validate_file(&outcome.record_path)
            .context("failed to read back the sealed record")?;

        println!();
        println!("VALIDATION:");
        for message in &report.messages {
            println!("{message}");
        }
        return Ok(if report.valid { 0 } else { 1 });
    }

    Ok(0)
}

/// Builds the ingest plan from parsed arguments.
fn fetch_plan(args: &FetchArgs) -> Result<FetchPlan> {
    let query = HorizonsQuery::new(&args.command)?
        .with_center(&args.center)
        .with_ephem_type(&args.ephem_type);
    let mut plan = FetchPlan::new(&args.target_id, query)?
        .with_aliases(parse_aliases(&args.aliases))
        .with_timeout(Duration::from_secs(args.timeout));
    if let Some(date) = &args.date {
        plan = plan.with_date(date);
    }
    Ok(plan)
}

/// Renders a path relative to the repository root when possible.
fn display_path(path: &Path, repo_root: &Path) -> String {
    path.strip_prefix(repo_root)
        .unwrap_or(path)
        .display()
        .to_string()
}
