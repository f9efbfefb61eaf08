use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::BackendError;

use super::MemoryBackend;

impl MemoryBackend {
    /// Loads a catalog directory.
    ///
    /// Collections are loaded before items so collection properties can be
    /// merged into their items. Files that are not valid JSON, or documents
    /// without ids, are skipped with a warning; an unreadable directory is an
    /// error.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, BackendError> {
        let dir = dir.as_ref();
        info!("Loading catalog from {:?}", dir);
        let backend = MemoryBackend::new();

        for path in json_files(&dir.join("collections"))? {
            let Some(doc) = read_json(&path) else {
                continue;
            };
            match backend.insert_collection(doc) {
                Ok(()) => debug!("Loaded collection from {:?}", path),
                Err(e) => warn!("Skipping collection {:?}: {}", path, e),
            }
        }

        for path in json_files(&dir.join("items"))? {
            let Some(doc) = read_json(&path) else {
                continue;
            };
            let features = match doc {
                Value::Object(mut o)
                    if o.get("type").and_then(Value::as_str) == Some("FeatureCollection") =>
                {
                    match o.remove("features") {
                        Some(Value::Array(features)) => features,
                        _ => Vec::new(),
                    }
                }
                other => vec![other],
            };
            for feature in features {
                if let Err(e) = backend.insert_item(feature) {
                    warn!("Skipping item in {:?}: {}", path, e);
                }
            }
        }

        info!(
            collections = backend.collection_count(),
            items = backend.len(),
            "Catalog loaded"
        );
        Ok(backend)
    }
}

/// `*.json` files of a directory in name order; a missing directory is empty.
fn json_files(dir: &Path) -> Result<Vec<PathBuf>, BackendError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(dir).map_err(|e| io_error(dir, e))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| io_error(dir, e))?.path();
        if path.extension().is_some_and(|e| e == "json") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn read_json(path: &Path) -> Option<Value> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to read {:?}: {}", path, e);
            return None;
        }
    };
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Failed to parse {:?}: {}", path, e);
            None
        }
    }
}

fn io_error(dir: &Path, err: std::io::Error) -> BackendError {
    BackendError::Internal {
        backend_name: "memory".to_string(),
        message: format!("failed to read catalog directory {:?}", dir),
        source: Some(Box::new(err)),
    }
}
