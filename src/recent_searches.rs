//! Recent searches
//!
//! Most-recent-first list of committed search queries, persisted through a
//! small key-value store so it survives restarts.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::error::{NewsError, Result};

/// Storage key for the list
pub const RECENT_SEARCHES_KEY: &str = "recent-searches";

/// Shown when nothing has been stored yet
pub const DEFAULT_RECENT_SEARCHES: [&str; 3] = ["climate change", "technology news", "stock market"];

pub const DEFAULT_MAX_RECENT: usize = 5;

/// Persistent string-list storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<String>>>;
    fn set(&self, key: &str, value: &[String]) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// JSON file store: one object mapping keys to string lists
pub struct FileStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    fn read_all(&self) -> Result<HashMap<String, Vec<String>>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(HashMap::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_all(&self, data: &HashMap<String, Vec<String>>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(data)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<String>>> {
        let _guard = self.lock.read();
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &[String]) -> Result<()> {
        let _guard = self.lock.write();
        let mut data = self.read_all()?;
        data.insert(key.to_string(), value.to_vec());
        self.write_all(&data)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.write();
        let mut data = self.read_all()?;
        if data.remove(key).is_some() {
            self.write_all(&data)?;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, Vec<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<String>>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[String]) -> Result<()> {
        self.data.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.data.write().remove(key);
        Ok(())
    }
}

/// Bounded most-recent-first query history
pub struct RecentSearches<S: KeyValueStore> {
    store: S,
    items: Vec<String>,
    max_items: usize,
}

impl<S: KeyValueStore> RecentSearches<S> {
    /// Loads the stored list, falling back to the defaults when the store is
    /// empty or unreadable.
    pub fn load(store: S, max_items: usize) -> Self {
        let max_items = max_items.max(1);
        let items = match store.get(RECENT_SEARCHES_KEY) {
            Ok(Some(items)) => items,
            Ok(None) => default_items(),
            Err(e) => {
                warn!(error = %e, "Failed to read recent searches, using defaults");
                default_items()
            }
        };

        let mut recent = Self {
            store,
            items,
            max_items,
        };
        recent.items.truncate(max_items);
        recent
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Records a committed query. Blank queries are ignored; an existing
    /// entry moves to the front instead of being duplicated.
    pub fn record(&mut self, query: &str) -> Result<bool> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(false);
        }

        self.items.retain(|item| item != query);
        self.items.insert(0, query.to_string());
        self.items.truncate(self.max_items);

        debug!(query = %query, count = self.items.len(), "Recorded recent search");
        self.persist()?;
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.items.clear();
        self.persist()
    }

    /// Entries containing `prefix`, case-insensitively. An empty prefix
    /// returns everything.
    pub fn suggestions(&self, prefix: &str) -> Vec<&str> {
        let needle = prefix.trim().to_lowercase();
        self.items
            .iter()
            .filter(|item| item.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect()
    }

    fn persist(&self) -> Result<()> {
        self.store
            .set(RECENT_SEARCHES_KEY, &self.items)
            .map_err(|e| NewsError::StorageError(format!("failed to save recent searches: {}", e)))
    }
}

fn default_items() -> Vec<String> {
    DEFAULT_RECENT_SEARCHES.iter().map(|s| s.to_string()).collect()
}
