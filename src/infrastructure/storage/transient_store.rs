//! Expiring key/value stores.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::domain::errors::StoreError;
use crate::domain::ports::{StoreScope, TransientStorePort, prefixed};

/// A stored value with its expiration time.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TransientEntry {
    value: serde_json::Value,
    expires_at: DateTime<Utc>,
}

impl TransientEntry {
    fn new(value: serde_json::Value, ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { value, expires_at }
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// In-process store, lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryTransientStore {
    scope: StoreScope,
    entries: Mutex<HashMap<String, TransientEntry>>,
}

impl MemoryTransientStore {
    /// Creates an empty store for `scope`.
    #[must_use]
    pub fn new(scope: StoreScope) -> Self {
        Self {
            scope,
            entries: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl TransientStorePort for MemoryTransientStore {
    fn scope(&self) -> StoreScope {
        self.scope
    }

    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let mut entries = self.entries.lock();
        let key = prefixed(key);
        match entries.get(&key) {
            Some(entry) if entry.is_expired(Utc::now()) => {
                entries.remove(&key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        self.entries
            .lock()
            .insert(prefixed(key), TransientEntry::new(value, ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().remove(&prefixed(key));
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<_> = self.entries.lock().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

/// Store persisted as one JSON file per scope.
///
/// Every mutation rewrites the file atomically. Expired entries are dropped
/// on the next write.
///
/// Mutations are load-modify-save cycles serialized by an in-process lock
/// held per instance. Separate processes (or separate instances on the same
/// file) writing at once can lose each other's entries; a lost entry only
/// costs another remote lookup.
#[derive(Debug)]
pub struct FileTransientStore {
    scope: StoreScope,
    path: PathBuf,
    lock: tokio::sync::Mutex<()>,
}

impl FileTransientStore {
    /// Opens the store for `scope` inside `dir`.
    #[must_use]
    pub fn new(dir: &Path, scope: StoreScope) -> Self {
        Self {
            scope,
            path: dir.join(format!("transients-{scope}.json")),
            lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<HashMap<String, TransientEntry>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(entries) => Ok(entries),
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "Corrupt transient store, starting empty");
                    Ok(HashMap::new())
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, entries: &HashMap<String, TransientEntry>) -> Result<(), StoreError> {
        let content = serde_json::to_vec_pretty(entries)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            let parent = path
                .parent()
                .ok_or_else(|| std::io::Error::other("Invalid path"))?;
            std::fs::create_dir_all(parent)?;
            let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
            temp_file.write_all(&content)?;
            temp_file.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| StoreError::Io(format!("store task panicked: {e}")))?
    }
}

#[async_trait]
impl TransientStorePort for FileTransientStore {
    fn scope(&self) -> StoreScope {
        self.scope
    }

    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let entries = self.load().await?;
        let value = entries
            .get(&prefixed(key))
            .filter(|entry| !entry.is_expired(Utc::now()))
            .map(|entry| entry.value.clone());

        trace!(key = key, scope = %self.scope, hit = value.is_some(), "Transient lookup");
        Ok(value)
    }

    async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        let now = Utc::now();
        entries.retain(|_, entry| !entry.is_expired(now));
        entries.insert(prefixed(key), TransientEntry::new(value, ttl));
        self.save(&entries).await?;

        debug!(key = key, scope = %self.scope, ttl_secs = ttl.as_secs(), "Stored transient");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        if entries.remove(&prefixed(key)).is_some() {
            self.save(&entries).await?;
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<_> = self.load().await?.into_keys().collect();
        keys.sort();
        Ok(keys)
    }
}
