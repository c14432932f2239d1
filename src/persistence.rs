//! Saving and loading retrieval runs.
//!
//! Supports both JSON (human-readable) and bincode (efficient binary) formats.

use crate::corpus::Results;
use crate::error::{CoveoError, Result};
use std::fs;
use std::path::Path;

/// Default filename for a retrieval run.
pub const DEFAULT_RESULTS_FILENAME: &str = "results.json";

/// Save format for retrieval runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    /// JSON format (human-readable, larger).
    Json,
    /// Bincode format (binary, compact).
    Bincode,
}

impl SaveFormat {
    /// Determine format from file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("bin") | Some("bincode") => SaveFormat::Bincode,
            _ => SaveFormat::Json,
        }
    }
}

/// Save a run to a file, picking the format from the extension.
pub fn save_results(results: &Results, path: &Path) -> Result<()> {
    save_results_with_format(results, path, SaveFormat::from_path(path))
}

/// Save a run with a specific format.
pub fn save_results_with_format(results: &Results, path: &Path, format: SaveFormat) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| CoveoError::io(parent, e))?;
        }
    }

    let data = match format {
        SaveFormat::Json => serde_json::to_string_pretty(results)?.into_bytes(),
        SaveFormat::Bincode => bincode::encode_to_vec(results, bincode::config::standard())
            .map_err(|e| CoveoError::Serialization(e.to_string()))?,
    };

    fs::write(path, &data).map_err(|e| CoveoError::io(path, e))
}

/// Load a run from a file, picking the format from the extension.
pub fn load_results(path: &Path) -> Result<Results> {
    let data = fs::read(path).map_err(|e| CoveoError::io(path, e))?;

    match SaveFormat::from_path(path) {
        SaveFormat::Json => Ok(serde_json::from_slice(&data)?),
        SaveFormat::Bincode => {
            let (results, _): (Results, usize) =
                bincode::decode_from_slice(&data, bincode::config::standard())
                    .map_err(|e| CoveoError::Serialization(e.to_string()))?;
            Ok(results)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn sample_run() -> Results {
        let mut run = Results::new();
        run.insert(
            "q1".to_string(),
            BTreeMap::from([("d1".to_string(), 3.5), ("d2".to_string(), 1.25)]),
        );
        run.insert("q2".to_string(), BTreeMap::new());
        run
    }

    #[test]
    fn test_save_and_load_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("runs/results.json");

        save_results(&sample_run(), &path).unwrap();
        assert_eq!(load_results(&path).unwrap(), sample_run());

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"q1\""));
        assert!(content.contains("3.5"));
    }

    #[test]
    fn test_save_and_load_bincode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.bin");

        save_results(&sample_run(), &path).unwrap();
        assert_eq!(load_results(&path).unwrap(), sample_run());
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(SaveFormat::from_path(Path::new("run.json")), SaveFormat::Json);
        assert_eq!(SaveFormat::from_path(Path::new("run.bin")), SaveFormat::Bincode);
        assert_eq!(SaveFormat::from_path(Path::new("run.bincode")), SaveFormat::Bincode);
        assert_eq!(SaveFormat::from_path(Path::new("run")), SaveFormat::Json);
    }

    #[test]
    fn test_default_filename_is_json() {
        assert_eq!(
            SaveFormat::from_path(Path::new(DEFAULT_RESULTS_FILENAME)),
            SaveFormat::Json
        );
    }

    #[test]
    fn test_load_nonexistent() {
        let result = load_results(Path::new("/nonexistent/results.json"));
        assert!(matches!(result, Err(CoveoError::Io { .. })));
    }
}
