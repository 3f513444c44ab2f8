//! Content-addressed cache for generated icons.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use regex::Regex;
use tracing::{debug, trace, warn};

use crate::domain::entities::IconRequest;
use crate::domain::errors::{CacheError, CacheResult, GenerationError};
use crate::domain::ports::BlobStorePort;

/// Maps icon requests to stored files, generating them on a miss.
///
/// Generation is deterministic, so two requests racing on the same key write
/// identical bytes and the last writer wins.
pub struct FileCache {
    store: Arc<dyn BlobStorePort>,
    base_url: String,
}

impl FileCache {
    /// Creates a cache on top of `store`, publishing files below `base_url`.
    #[must_use]
    pub fn new(store: Arc<dyn BlobStorePort>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { store, base_url }
    }

    /// Returns the public URL of a cache-relative path.
    #[must_use]
    pub fn url(&self, relative: &Path) -> String {
        let path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{path}", self.base_url)
    }

    /// Returns the cache-relative path for a request.
    #[must_use]
    pub fn path_for(request: &IconRequest, extension: &str) -> PathBuf {
        request.relative_path(extension)
    }

    /// Checks whether a cached entry exists.
    pub async fn contains(&self, request: &IconRequest, extension: &str) -> bool {
        self.store.exists(&Self::path_for(request, extension)).await
    }

    /// Returns the cached bytes for `request`, generating and storing them on
    /// a miss (or always, when `force` is set).
    ///
    /// # Errors
    /// Returns [`CacheError::Generation`] if the generator fails (nothing is
    /// written) or [`CacheError::Io`] if the store cannot be read or written.
    pub async fn get_or_create<F>(
        &self,
        request: &IconRequest,
        extension: &str,
        force: bool,
        generate: F,
    ) -> CacheResult<Vec<u8>>
    where
        F: FnOnce() -> Result<Vec<u8>, GenerationError> + Send + 'static,
    {
        let path = Self::path_for(request, extension);

        if !force {
            if let Some(bytes) = self.store.read(&path).await? {
                trace!(request = %request, "File cache hit");
                return Ok(bytes);
            }
            trace!(request = %request, "File cache miss");
        }

        let bytes = tokio::task::spawn_blocking(generate)
            .await
            .map_err(|e| CacheError::Io(format!("generation task panicked: {e}")))??;

        self.store.write(&path, bytes.clone()).await?;
        debug!(request = %request, path = %path.display(), size = bytes.len(), "Stored generated icon");

        Ok(bytes)
    }

    /// Recursively removes every entry below `prefix` (empty for everything).
    ///
    /// # Errors
    /// Returns error if the store cannot be modified.
    pub async fn invalidate(&self, prefix: &str) -> CacheResult<()> {
        self.store.delete_tree(Path::new(prefix)).await?;
        debug!(prefix = prefix, "Invalidated file cache");
        Ok(())
    }

    /// Removes entries below `prefix` whose file name matches `pattern`.
    ///
    /// Returns the number of removed files.
    ///
    /// # Errors
    /// Returns error if the pattern is invalid or the store cannot be listed.
    pub async fn invalidate_matching(&self, prefix: &str, pattern: &str) -> CacheResult<usize> {
        let regex = Regex::new(pattern)
            .map_err(|e| CacheError::InvalidKey(format!("invalid pattern {pattern}: {e}")))?;

        self.remove_where(prefix, |path, _| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| regex.is_match(name))
        })
        .await
    }

    /// Removes entries below `prefix` last modified more than `max_age` ago.
    ///
    /// Returns the number of removed files.
    ///
    /// # Errors
    /// Returns error if the store cannot be listed.
    pub async fn invalidate_older_than(&self, prefix: &str, max_age: Duration) -> CacheResult<usize> {
        let cutoff = SystemTime::now()
            .checked_sub(max_age)
            .unwrap_or(SystemTime::UNIX_EPOCH);

        self.remove_where(prefix, |_, modified| modified < cutoff).await
    }

    async fn remove_where<P>(&self, prefix: &str, predicate: P) -> CacheResult<usize>
    where
        P: Fn(&Path, SystemTime) -> bool,
    {
        let entries = self.store.list(Path::new(prefix)).await?;

        let mut removed = 0usize;
        for entry in entries.iter().filter(|e| predicate(&e.path, e.modified)) {
            if let Err(e) = self.store.delete(&entry.path).await {
                warn!(path = %entry.path.display(), error = %e, "Failed to remove cached file");
            } else {
                removed += 1;
            }
        }

        debug!(prefix = prefix, removed = removed, "Pruned file cache");
        Ok(removed)
    }
}

impl std::fmt::Debug for FileCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileCache")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
