//! `etalon table` — observable state table construction.
//!
//! Loads the observable registry, a measurement snapshot, and an optional
//! theory prediction document; classifies every registry observable; and
//! writes the fixed-column CSV.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use etalon_engine::{
    build_rows, write_table, ObservableRegistry, SelectionPolicy, Snapshot, TheorySet,
};

/// Arguments for the `table` subcommand.
#[derive(Args, Debug)]
pub struct TableArgs {
    /// Path to the measurement snapshot JSON document.
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Path to the observable registry (config/observables.json).
    #[arg(long)]
    pub observables: PathBuf,

    /// Output CSV path. Parent directories are created as needed.
    #[arg(long)]
    pub out: PathBuf,

    /// Optional theory prediction document: {id: value} or
    /// {"predictions": {id: value}}.
    #[arg(long)]
    pub theory: Option<PathBuf>,
}

/// Execute the `table` subcommand.
///
/// Returns exit code 0 after a successful write. Missing inputs and
/// malformed documents propagate as errors (exit code 2).
pub fn run_table(args: &TableArgs, repo_root: &Path) -> Result<u8> {
    let observables_path = crate::resolve_path(&args.observables, repo_root);
    let snapshot_path = crate::resolve_path(&args.snapshot, repo_root);

    let registry = ObservableRegistry::load(&observables_path)
        .context("failed to load the observable registry")?;
    let snapshot =
        Snapshot::load(&snapshot_path).context("failed to load the measurement snapshot")?;
    let theory = match &args.theory {
        Some(path) => {
            let theory_path = crate::resolve_path(path, repo_root);
            TheorySet::load(&theory_path).context("failed to load the theory document")?
        }
        None => TheorySet::empty(),
    };

    let rows = build_rows(&registry, &snapshot, &theory, SelectionPolicy::default());
    write_table(&args.out, &rows).context("failed to write the state table")?;

    println!("State table written: {}", args.out.display());
    Ok(0)
}
