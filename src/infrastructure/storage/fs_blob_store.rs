//! Filesystem blob store with atomic publish.

use std::io::Write;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, trace, warn};

use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::ports::{BlobEntry, BlobStorePort};

/// Prefix used by `tempfile` for in-flight writes.
const TEMP_PREFIX: &str = ".tmp";

/// Blob store rooted in a directory.
///
/// Writes go to a temporary file in the destination directory and are then
/// renamed into place, so readers never observe a partial file.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Creates a store rooted at `root`. The directory is created lazily.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a relative path below the root, rejecting anything that
    /// could escape it.
    fn resolve(&self, path: &Path) -> CacheResult<PathBuf> {
        if path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(CacheError::InvalidKey(path.display().to_string()));
        }
        Ok(self.root.join(path))
    }

    fn is_temp(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(TEMP_PREFIX))
    }

    fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| std::io::Error::other("Invalid path"))?;
        std::fs::create_dir_all(parent)?;

        let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
        temp_file.write_all(bytes)?;
        temp_file.as_file().sync_all()?;
        temp_file.persist(path).map_err(|e| e.error)?;

        Ok(())
    }
}

#[async_trait]
impl BlobStorePort for FsBlobStore {
    async fn exists(&self, path: &Path) -> bool {
        match self.resolve(path) {
            Ok(full) => fs::try_exists(&full).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    async fn read(&self, path: &Path) -> CacheResult<Option<Vec<u8>>> {
        let full = self.resolve(path)?;
        match fs::read(&full).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::io("Failed to read cached file", &e)),
        }
    }

    async fn write(&self, path: &Path, bytes: Vec<u8>) -> CacheResult<()> {
        let full = self.resolve(path)?;
        let target = full.clone();

        tokio::task::spawn_blocking(move || Self::write_atomic(&target, &bytes))
            .await
            .map_err(|e| CacheError::Io(format!("write task panicked: {e}")))?
            .map_err(|e| CacheError::io("Failed to write cache file", &e))?;

        trace!(path = %full.display(), "Published blob");
        Ok(())
    }

    async fn list(&self, prefix: &Path) -> CacheResult<Vec<BlobEntry>> {
        let start = self.resolve(prefix)?;
        let mut pending = vec![start];
        let mut entries = Vec::new();

        while let Some(dir) = pending.pop() {
            let mut reader = match fs::read_dir(&dir).await {
                Ok(reader) => reader,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(CacheError::io("Failed to read cache dir", &e)),
            };

            while let Some(entry) = reader
                .next_entry()
                .await
                .map_err(|e| CacheError::io("Failed to read entry", &e))?
            {
                let path = entry.path();
                let Ok(meta) = entry.metadata().await else {
                    continue;
                };

                if meta.is_dir() {
                    pending.push(path);
                } else if !Self::is_temp(&path) {
                    let Ok(relative) = path.strip_prefix(&self.root) else {
                        continue;
                    };
                    entries.push(BlobEntry {
                        path: relative.to_path_buf(),
                        modified: meta.modified().unwrap_or(std::time::SystemTime::UNIX_EPOCH),
                        len: meta.len(),
                    });
                }
            }
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    async fn delete(&self, path: &Path) -> CacheResult<()> {
        let full = self.resolve(path)?;
        match fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::io("Failed to remove cached file", &e)),
        }
    }

    async fn delete_tree(&self, prefix: &Path) -> CacheResult<()> {
        let full = self.resolve(prefix)?;

        if full == self.root {
            let mut reader = match fs::read_dir(&full).await {
                Ok(reader) => reader,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
                Err(e) => return Err(CacheError::io("Failed to read cache dir", &e)),
            };

            while let Some(entry) = reader
                .next_entry()
                .await
                .map_err(|e| CacheError::io("Failed to read entry", &e))?
            {
                let path = entry.path();
                let result = if entry.file_type().await.is_ok_and(|t| t.is_dir()) {
                    fs::remove_dir_all(&path).await
                } else {
                    fs::remove_file(&path).await
                };
                if let Err(e) = result {
                    warn!(path = %path.display(), error = %e, "Failed to remove cache entry");
                }
            }
        } else {
            match fs::remove_dir_all(&full).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(CacheError::io("Failed to remove cache dir", &e)),
            }
        }

        debug!(path = %full.display(), "Removed blob tree");
        Ok(())
    }
}
