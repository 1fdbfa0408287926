//! Client-local key-value storage
//!
//! Stands in for the browser's `localStorage`: the capture hook and the
//! dashboard receive a store explicitly instead of reaching for a global.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::errors::{Result, UtmLoggerError};

/// Capped list of locally mirrored records
pub const UTM_LOGS_KEY: &str = "utm_logs";
/// Latest UTM mapping seen by the capture hook
pub const UTM_PARAMS_KEY: &str = "utm_params";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Decode a JSON value; malformed entries read as absent
pub fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring malformed local value for '{}': {}", key, e);
            None
        }
    }
}

pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<()> {
    store.set(key, serde_json::to_string(value)?)
}

#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// JSON object on disk, rewritten on every change
pub struct FileKeyValueStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileKeyValueStore {
    /// Open `path`; a missing file starts empty
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => HashMap::new(),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                UtmLoggerError::serialization(format!(
                    "Failed to parse local store {}: {}",
                    path.display(),
                    e
                ))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        let mut entries = self.entries.write();
        entries.insert(key.to_string(), value);
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write();
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_get_set_remove() {
        let store = MemoryKeyValueStore::new();
        assert!(store.get("a").is_none());
        store.set("a", "1".into()).unwrap();
        assert_eq!(store.get("a").as_deref(), Some("1"));
        store.remove("a").unwrap();
        assert!(store.get("a").is_none());
    }

    #[test]
    fn test_read_json_ignores_garbage() {
        let store = MemoryKeyValueStore::new();
        store.set(UTM_PARAMS_KEY, "{not json".into()).unwrap();
        let value: Option<HashMap<String, String>> = read_json(&store, UTM_PARAMS_KEY);
        assert!(value.is_none());
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("local.json");

        {
            let store = FileKeyValueStore::open(&path).unwrap();
            write_json(&store, UTM_PARAMS_KEY, &vec!["x"]).unwrap();
        }

        let reopened = FileKeyValueStore::open(&path).unwrap();
        let value: Option<Vec<String>> = read_json(&reopened, UTM_PARAMS_KEY);
        assert_eq!(value, Some(vec!["x".to_string()]));

        reopened.remove(UTM_PARAMS_KEY).unwrap();
        let again = FileKeyValueStore::open(&path).unwrap();
        assert!(again.get(UTM_PARAMS_KEY).is_none());
    }
}
