//! Persisted key/value state that survives between runs.
//!
//! Access is treated as always available: reads of a missing or corrupt file
//! yield an empty store and write failures are logged, never returned.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::json;

use crate::constants::STORAGE_FILE_NAME;
use crate::logging;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
    fn clear(&mut self);
}

/// Volatile store used by tests and one-off runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// JSON object file, written through on every mutation.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: IndexMap<String, String>,
}

impl FileStore {
    /// Open the store inside `dir`, creating nothing until the first write.
    pub fn open(dir: impl AsRef<Path>) -> Self {
        let path = dir.as_ref().join(STORAGE_FILE_NAME);
        let entries = load_entries(&path);
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) {
        if let Err(err) = self.try_persist() {
            logging::warn(
                "storage.write_failed",
                "Failed to persist local state",
                json!({ "path": self.path.display().to_string(), "error": err.to_string() }),
            );
        }
    }

    fn try_persist(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_vec_pretty(&self.entries)?;
        fs::write(&self.path, payload)
    }
}

fn load_entries(path: &Path) -> IndexMap<String, String> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(_) => return IndexMap::new(),
    };

    match serde_json::from_slice(&bytes) {
        Ok(entries) => entries,
        Err(err) => {
            logging::warn(
                "storage.corrupt",
                "Ignoring unreadable local state file",
                json!({ "path": path.display().to_string(), "error": err.to_string() }),
            );
            IndexMap::new()
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist();
    }

    fn remove(&mut self, key: &str) {
        if self.entries.shift_remove(key).is_some() {
            self.persist();
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips_values() {
        let mut store = MemoryStore::new();
        store.set("a", "1");
        store.set("b", "2");
        assert_eq!(store.get("a").as_deref(), Some("1"));
        assert_eq!(store.len(), 2);
        store.remove("a");
        assert!(store.get("a").is_none());
        assert_eq!(store.len(), 1);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = FileStore::open(dir.path());
            store.set("encoded_token", "abc");
        }
        let store = FileStore::open(dir.path());
        assert_eq!(store.get("encoded_token").as_deref(), Some("abc"));
    }

    #[test]
    fn corrupt_file_yields_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(STORAGE_FILE_NAME), b"not json").unwrap();
        let store = FileStore::open(dir.path());
        assert!(store.get("encoded_token").is_none());
    }

    #[test]
    fn clear_removes_everything_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path());
        store.set("encoded_token", "abc");
        store.set("chartData", "[]");
        store.clear();

        let reopened = FileStore::open(dir.path());
        assert!(reopened.get("encoded_token").is_none());
        assert!(reopened.get("chartData").is_none());
    }
}
