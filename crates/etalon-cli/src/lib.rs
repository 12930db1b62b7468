//! # etalon-cli — CLI Tool for the Etalon Stack
//!
//! Provides the `etalon` command-line interface over the library crates:
//! deterministic state-table construction, ephemeris ingest, raw-record
//! validation, and derived packaging.
//!
//! ## Subcommands
//!
//! - `etalon table` — Theory/empirics state table (CSV) from a snapshot.
//! - `etalon fetch` — Query the configured ephemeris endpoint, persist the
//!   raw response verbatim, and seal a provenance record.
//! - `etalon validate` — Schema and registry validation of a raw record.
//! - `etalon pack` — Package a snapshot into a manifest-sealed derived
//!   directory.
//!
//! ## Exit codes
//!
//! All subcommands share one contract: `0` success, `1` a validation
//! verdict against the checked artifact, `2` fatal input or configuration
//! error. Packaging a structurally INVALID snapshot exits `0`; the package
//! itself documents the failure.
//!
//! ```bash
//! etalon table --snapshot snapshot.json --observables config/observables.json --out out/state_table.csv
//! etalon fetch --command "DES=C/2025 N1" --validate
//! etalon validate data/records/3I_ATLAS__JPL_HORIZONS__horizons_api__2026-01-10.record.json
//! etalon pack --input snapshot.json --output-dir out/pkg \
//!     --source-repo daily-snapshots --source-commit 0f3a9c1 --source-path data/snapshot.json
//! ```

pub mod fetch;
pub mod pack;
pub mod table;
pub mod validate;

use std::path::{Path, PathBuf};

/// Resolve a path that may be relative to the repository root.
///
/// Absolute paths pass through. A relative path that exists under
/// `repo_root` resolves there; otherwise it stays relative to the current
/// directory, which is what output paths that do not exist yet need.
pub fn resolve_path(path: &Path, repo_root: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let repo_relative = repo_root.join(path);
    if repo_relative.exists() {
        repo_relative
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_paths_pass_through() {
        let root = Path::new("/somewhere/repo");
        let absolute = Path::new("/etc/hosts");
        assert_eq!(resolve_path(absolute, root), absolute.to_path_buf());
    }

    #[test]
    fn relative_paths_prefer_the_repo_root_when_present() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("config")).unwrap();
        std::fs::write(dir.path().join("config/sources.json"), "{}").unwrap();

        let resolved = resolve_path(Path::new("config/sources.json"), dir.path());
        assert_eq!(resolved, dir.path().join("config/sources.json"));
    }

    #[test]
    fn relative_paths_fall_back_to_the_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = Path::new("no/such/file.json");
        assert_eq!(resolve_path(missing, dir.path()), missing.to_path_buf());
    }
}
