//! Key/value persistence behind the session store.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode stored value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// String key/value storage that outlives a single request.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Volatile storage, used in tests and when no data directory is available.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: DashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).map(|v| v.clone())
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.remove(key);
        Ok(())
    }
}

/// One persisted value and when it was last written.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    value: String,
    updated_at: DateTime<Utc>,
}

/// Storage backed by a single JSON object on disk. Every write rewrites the
/// file through a temporary sibling and a rename, holding the lock for the
/// duration, so callers on the async runtime go through `spawn_blocking`.
///
/// Browsers that never log out leave their entry behind; entries not
/// written for `max_age` are dropped when the file is opened.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    values: Mutex<BTreeMap<String, Entry>>,
}

impl FileStorage {
    /// Open `path`, starting empty if it does not exist or cannot be parsed.
    pub fn open(path: impl Into<PathBuf>, max_age: Option<Duration>) -> Result<Self, StorageError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let mut values: BTreeMap<String, Entry> = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(values) => values,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "Session storage unreadable, starting empty"
                    );
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StorageError::Io { path, source }),
        };

        let storage = Self {
            path,
            values: Mutex::new(BTreeMap::new()),
        };

        let cutoff = max_age
            .and_then(|age| chrono::Duration::from_std(age).ok())
            .map(|age| Utc::now() - age);
        if let Some(cutoff) = cutoff {
            let before = values.len();
            values.retain(|_, entry| entry.updated_at >= cutoff);
            let pruned = before - values.len();
            if pruned > 0 {
                info!(pruned, "Pruned expired sessions");
                storage.flush(&values)?;
            }
        }

        info!(path = %storage.path.display(), entries = values.len(), "Session storage opened");
        *storage.values.lock() = values;
        Ok(storage)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn flush(&self, values: &BTreeMap<String, Entry>) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(values)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content).map_err(|source| StorageError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).map(|entry| entry.value.clone())
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut values = self.values.lock();
        values.insert(
            key.to_string(),
            Entry {
                value,
                updated_at: Utc::now(),
            },
        );
        self.flush(&values)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock();
        if values.remove(key).is_some() {
            self.flush(&values)?;
        }
        Ok(())
    }
}
