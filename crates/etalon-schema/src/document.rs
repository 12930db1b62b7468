//! JSON document loading with path-carrying diagnostics.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{SchemaError, SchemaResult};

/// Reads and parses one JSON document.
///
/// A missing file and a file that is not valid JSON are distinct
/// failures so the caller can report each precisely.
pub fn read_json(path: &Path) -> SchemaResult<Value> {
    if !path.exists() {
        return Err(SchemaError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|source| SchemaError::JsonParse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_valid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sources.json");
        fs::write(&path, br#"{"sources": []}"#).unwrap();

        let doc = read_json(&path).unwrap();
        assert!(doc.get("sources").unwrap().is_array());
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_json(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, SchemaError::FileNotFound { .. }));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, b"{\"sources\": [").unwrap();

        let err = read_json(&path).unwrap_err();
        assert!(matches!(err, SchemaError::JsonParse { .. }));
        assert!(format!("{err}").contains("broken.json"));
    }
}
