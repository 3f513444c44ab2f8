//! Full cache reset.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::errors::CacheResult;
use crate::domain::ports::{TransientStorePort, strip_prefix};
use crate::infrastructure::image::FileCache;

/// Counts of what a purge removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
    /// Transient keys deleted across all stores.
    pub keys_deleted: usize,
}

/// Removes every generated icon and every stored validation result.
///
/// Used on uninstall and for a manual reset.
#[derive(Clone)]
pub struct PurgeCachesUseCase {
    file_cache: Arc<FileCache>,
    stores: Vec<Arc<dyn TransientStorePort>>,
}

impl PurgeCachesUseCase {
    /// Creates the use case for the file cache and the given stores,
    /// normally one per scope.
    #[must_use]
    pub fn new(file_cache: Arc<FileCache>, stores: Vec<Arc<dyn TransientStorePort>>) -> Self {
        Self { file_cache, stores }
    }

    /// Executes the purge.
    ///
    /// Key deletion failures are logged and skipped.
    ///
    /// # Errors
    /// Returns error if the file cache cannot be cleared.
    pub async fn execute(&self) -> CacheResult<PurgeReport> {
        self.file_cache.invalidate("").await?;

        let mut report = PurgeReport::default();
        for store in &self.stores {
            let keys = match store.keys().await {
                Ok(keys) => keys,
                Err(e) => {
                    warn!(scope = %store.scope(), error = %e, "Failed to list transient keys");
                    continue;
                }
            };

            for key in keys.iter().filter_map(|k| strip_prefix(k)) {
                match store.delete(key).await {
                    Ok(()) => report.keys_deleted += 1,
                    Err(e) => warn!(scope = %store.scope(), key = key, error = %e, "Failed to delete transient"),
                }
            }
        }

        info!(keys_deleted = report.keys_deleted, "Purged caches");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::StoreScope;
    use crate::infrastructure::storage::{FsBlobStore, MemoryTransientStore};
    use serde_json::json;
    use std::time::Duration;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_purge_clears_everything() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("monsterid/a/b")).unwrap();
        std::fs::write(temp.path().join("monsterid/a/b/ab-80.png"), b"icon").unwrap();
        let file_cache = Arc::new(FileCache::new(
            Arc::new(FsBlobStore::new(temp.path())),
            "https://example.org/cache",
        ));

        let site = Arc::new(MemoryTransientStore::new(StoreScope::Site));
        let network = Arc::new(MemoryTransientStore::new(StoreScope::Network));
        let hour = Duration::from_secs(3600);
        site.set("check_a", json!(0), hour).await.unwrap();
        site.set("check_b", json!(0), hour).await.unwrap();
        network.set("check_c", json!(0), hour).await.unwrap();

        let stores: Vec<Arc<dyn TransientStorePort>> = vec![
            site.clone() as Arc<dyn TransientStorePort>,
            network.clone() as Arc<dyn TransientStorePort>,
        ];
        let use_case = PurgeCachesUseCase::new(file_cache, stores);
        let report = use_case.execute().await.unwrap();

        assert_eq!(report.keys_deleted, 3);
        assert!(site.keys().await.unwrap().is_empty());
        assert!(network.keys().await.unwrap().is_empty());
        assert!(!temp.path().join("monsterid").exists());
        assert!(temp.path().exists());
    }
}
