//! Providers backed by an icon generator and the file cache.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{trace, warn};

use crate::domain::entities::{IconRequest, IdentityHash};
use crate::domain::errors::CacheError;
use crate::domain::ports::{IconGenerator, IconProvider};
use crate::infrastructure::image::FileCache;

/// Serves generated icons out of the file cache, generating on a miss.
pub struct GeneratingIconProvider {
    generator: Arc<dyn IconGenerator>,
    cache: Arc<FileCache>,
    types: Vec<String>,
    name: String,
}

impl GeneratingIconProvider {
    /// Creates a provider for `types`. The first type is also the cache
    /// sub-directory and option value.
    #[must_use]
    pub fn new(
        generator: Arc<dyn IconGenerator>,
        cache: Arc<FileCache>,
        types: &[&str],
        name: impl Into<String>,
    ) -> Self {
        Self {
            generator,
            cache,
            types: types.iter().map(|t| (*t).to_string()).collect(),
            name: name.into(),
        }
    }
}

#[async_trait]
impl IconProvider for GeneratingIconProvider {
    fn provided_types(&self) -> &[String] {
        &self.types
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn icon_url(&self, hash: &IdentityHash, size: u32, force: bool) -> Option<String> {
        let request = IconRequest::new(self.option_value(), hash.clone(), size);
        let extension = self.generator.extension();

        let generator = Arc::clone(&self.generator);
        let seed = hash.as_str().to_string();
        let result = self
            .cache
            .get_or_create(&request, extension, force, move || {
                generator.build(&seed, size)
            })
            .await;

        match result {
            Ok(_) => {
                let url = self.cache.url(&FileCache::path_for(&request, extension));
                trace!(request = %request, "Resolved generated icon");
                Some(url)
            }
            Err(e) => {
                warn!(request = %request, error = %e, cause = failure_cause(&e), "Could not produce icon");
                None
            }
        }
    }
}

/// Coarse failure class for logs, separating a broken asset bundle from
/// one-off generation or storage trouble.
fn failure_cause(error: &CacheError) -> &'static str {
    match error {
        CacheError::Generation(e) if e.is_asset_error() => "assets",
        CacheError::Generation(_) => "generation",
        CacheError::Io(_) | CacheError::InvalidKey(_) => "storage",
    }
}

impl std::fmt::Debug for GeneratingIconProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratingIconProvider")
            .field("types", &self.types)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
