//! `etalon pack` — derived package construction.
//!
//! Wraps the packaging pipeline: verbatim snapshot copy, status
//! document, validation trace, research-object metadata, and the
//! SHA-256 manifest. A structurally INVALID snapshot still packages
//! and still exits 0; the package itself documents the failure.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use etalon_pack::{PackRequest, ValidationState};

/// Arguments for the `pack` subcommand.
#[derive(Args, Debug)]
pub struct PackArgs {
    /// Path to the input snapshot JSON document.
    #[arg(long)]
    pub input: PathBuf,

    /// Directory the package is written into (created if absent).
    #[arg(long)]
    pub output_dir: PathBuf,

    /// Repository the input snapshot was taken from.
    #[arg(long)]
    pub source_repo: String,

    /// Commit pinning the input in its source repository.
    #[arg(long)]
    pub source_commit: String,

    /// Path of the input inside its source repository.
    #[arg(long)]
    pub source_path: String,
}

/// Execute the `pack` subcommand.
///
/// Returns exit code 0 whenever a package was written, whatever the
/// recorded validation state. Missing or unparseable input propagates
/// as an error (exit code 2) before any output exists.
pub fn run_pack(args: &PackArgs, repo_root: &Path) -> Result<u8> {
    let request = PackRequest {
        input: crate::resolve_path(&args.input, repo_root),
        output_dir: args.output_dir.clone(),
        source_repo: args.source_repo.clone(),
        source_commit: args.source_commit.clone(),
        source_path: args.source_path.clone(),
    };
    let outcome = etalon_pack::run_pack(&request).context("packaging failed")?;

    println!("Derived Package Builder");
    println!("=======================");
    println!("Input: {}", request.input.display());
    println!("Input SHA-256: {}", outcome.input_sha256);
    println!("As of UTC: {}", outcome.as_of_utc);
    println!();
    println!("Validation State: {}", outcome.validation_state);
    for message in &outcome.validation_messages {
        println!("  {message}");
    }
    println!();
    println!("Output Directory: {}", outcome.output_dir.display());
    println!("Files Created:");
    for name in &outcome.files {
        println!("  - {name}");
    }

    if outcome.validation_state == ValidationState::Invalid {
        println!();
        println!("WARNING: Validation state is INVALID");
        println!("This package documents structural validation failure.");
    }

    println!();
    println!("SUCCESS: DERIVED package created successfully");
    Ok(0)
}
