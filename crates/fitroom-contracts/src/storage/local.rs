use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::errors::PersistenceError;

/// Keyed JSON values in a single file, the on-disk counterpart of a browser
/// key-value store.
///
/// Every write re-reads the file, replaces one key and rewrites the whole
/// object through a temporary file and a rename.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_item(&self, key: &str) -> Result<Option<Value>, PersistenceError> {
        let Some(payload) = self.read_object(key)? else {
            return Ok(None);
        };
        Ok(payload.get(key).cloned())
    }

    pub fn set_item(&self, key: &str, value: Value) -> Result<(), PersistenceError> {
        let mut payload = self.read_object_or_reset(key);
        if payload.get(key) == Some(&value) {
            return Ok(());
        }
        payload.insert(key.to_string(), value);
        self.write_object(key, &payload)
    }

    fn read_object(&self, key: &str) -> Result<Option<Map<String, Value>>, PersistenceError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(PersistenceError::Io {
                    path: self.path.display().to_string(),
                    source,
                })
            }
        };
        let parsed: Value =
            serde_json::from_str(&raw).map_err(|source| PersistenceError::Serialize {
                key: key.to_string(),
                source,
            })?;
        Ok(parsed.as_object().cloned())
    }

    // A corrupt file is replaced rather than blocking every later write.
    fn read_object_or_reset(&self, key: &str) -> Map<String, Value> {
        match self.read_object(key) {
            Ok(payload) => payload.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "discarding unreadable storage file");
                Map::new()
            }
        }
    }

    fn write_object(&self, key: &str, payload: &Map<String, Value>) -> Result<(), PersistenceError> {
        let io_err = |source| PersistenceError::Io {
            path: self.path.display().to_string(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let body = serde_json::to_string_pretty(payload).map_err(|source| {
            PersistenceError::Serialize {
                key: key.to_string(),
                source,
            }
        })?;
        let staging = self.path.with_extension("json.tmp");
        std::fs::write(&staging, body).map_err(io_err)?;
        std::fs::rename(&staging, &self.path).map_err(io_err)?;
        Ok(())
    }
}
