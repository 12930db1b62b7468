//! Input document loading.
//!
//! All three engine inputs (registry, snapshot, theory) arrive as JSON
//! files. Loading distinguishes a missing file from unreadable or
//! malformed content so the CLI can report each with the right
//! diagnostic.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{EngineError, EngineResult};

/// Reads and parses one JSON document.
pub fn read_json(path: &Path) -> EngineResult<Value> {
    if !path.exists() {
        return Err(EngineError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|source| EngineError::JsonParse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    #[test]
    fn reads_valid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        fs::write(&path, br#"{"observables": []}"#).unwrap();

        let doc = read_json(&path).unwrap();
        assert!(doc.get("observables").unwrap().is_array());
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let err = read_json(&path).unwrap_err();
        assert!(matches!(err, EngineError::FileNotFound { .. }));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(b"{\"observables\": [").unwrap();

        let err = read_json(&path).unwrap_err();
        assert!(matches!(err, EngineError::JsonParse { .. }));
        assert!(format!("{err}").contains("broken.json"));
    }
}
