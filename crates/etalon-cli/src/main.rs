//! # etalon CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! Verbosity flags map to a tracing filter; `RUST_LOG` is honored when no
//! `-v` flag is given.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use etalon_cli::fetch::{run_fetch, FetchArgs};
use etalon_cli::pack::{run_pack, PackArgs};
use etalon_cli::table::{run_table, TableArgs};
use etalon_cli::validate::{run_validate, ValidateArgs};

/// Etalon — theory/empirics reconciliation toolchain.
///
/// Builds deterministic state tables from measurement snapshots, ingests
/// ephemeris data from configured sources, validates raw records against
/// the repository schema, and packages snapshots into derived archives.
#[derive(Parser, Debug)]
#[command(name = "etalon", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the observable state table (CSV) from a measurement snapshot.
    Table(TableArgs),

    /// Fetch ephemeris data from the configured endpoint and seal a record.
    Fetch(FetchArgs),

    /// Validate a raw record against the schema and source registry.
    Validate(ValidateArgs),

    /// Package a snapshot into a manifest-sealed derived directory.
    Pack(PackArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // -v flags override RUST_LOG; without them RUST_LOG wins when set.
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    tracing::debug!("etalon CLI starting");

    // Resolve the repository root: walk up from CWD looking for `schemas/`
    // and `config/`.
    let repo_root = resolve_repo_root().unwrap_or_else(|| {
        tracing::warn!("Could not locate repository root; using current directory");
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    });

    tracing::debug!(repo_root = %repo_root.display(), "resolved repository root");

    let result = match cli.command {
        Commands::Table(args) => run_table(&args, &repo_root),
        Commands::Fetch(args) => run_fetch(&args, &repo_root),
        Commands::Validate(args) => run_validate(&args, &repo_root),
        Commands::Pack(args) => run_pack(&args, &repo_root),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}

/// Walk up from the current directory to find the repository root.
///
/// The repo root is identified by the presence of both `schemas/` and
/// `config/` directories, matching the Etalon repository layout.
fn resolve_repo_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let mut dir = cwd.as_path();
    loop {
        if dir.join("schemas").is_dir() && dir.join("config").is_dir() {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}
