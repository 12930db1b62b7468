//! `etalon validate` — raw-record validation.
//!
//! Checks a sealed record against the JSON Schema and the source
//! registry, printing each check line and the final verdict exactly as
//! the validator reports them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use etalon_schema::RecordValidator;

/// Arguments for the `validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the sealed raw-record JSON document.
    pub record: PathBuf,

    /// Override the record schema (defaults to schemas/record.schema.json).
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Override the source registry (defaults to config/sources.json).
    #[arg(long)]
    pub sources: Option<PathBuf>,
}

/// Execute the `validate` subcommand.
///
/// Returns exit code 0 for a valid record, 1 for an invalid one.
/// Unreadable schema, registry, or record files propagate as errors
/// (exit code 2).
pub fn run_validate(args: &ValidateArgs, repo_root: &Path) -> Result<u8> {
    let schema_path = match &args.schema {
        Some(path) => crate::resolve_path(path, repo_root),
        None => repo_root.join("schemas/record.schema.json"),
    };
    let sources_path = match &args.sources {
        Some(path) => crate::resolve_path(path, repo_root),
        None => repo_root.join("config/sources.json"),
    };
    let record_path = crate::resolve_path(&args.record, repo_root);

    let validator = RecordValidator::new(&schema_path, &sources_path)
        .context("failed to load the record schema or source registry")?;
    let report = validator
        .validate_file(&record_path)
        .with_context(|| format!("failed to read record {}", record_path.display()))?;

    for message in &report.messages {
        println!("{message}");
    }
    Ok(if report.valid { 0 } else { 1 })
}
