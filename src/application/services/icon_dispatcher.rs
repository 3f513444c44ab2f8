//! Icon type resolution and URL lookup.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::domain::entities::{IconArgs, IconOption, IdentityHash};
use crate::domain::ports::IconProvider;

/// Option value of the remote service's own default image.
pub const REMOTE_DEFAULT_OPTION: &str = "gravatar_default";

/// Maps icon type identifiers to the provider declaring them.
///
/// Built once at startup. When two providers declare the same type, the
/// first registration wins.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn IconProvider>>,
    by_type: HashMap<String, usize>,
}

impl ProviderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a provider.
    ///
    /// # Panics
    /// Panics if the provider declares no type identifiers.
    pub fn register(&mut self, provider: Arc<dyn IconProvider>) -> &mut Self {
        assert!(
            !provider.provided_types().is_empty(),
            "icon provider '{}' declares no types",
            provider.name()
        );

        let index = self.providers.len();
        for icon_type in provider.provided_types() {
            if self.by_type.contains_key(icon_type) {
                debug!(icon_type = %icon_type, provider = provider.name(), "Icon type already registered, ignoring");
                continue;
            }
            self.by_type.insert(icon_type.clone(), index);
        }
        self.providers.push(provider);

        self
    }

    /// Registers a provider, builder style.
    #[must_use]
    pub fn with(mut self, provider: Arc<dyn IconProvider>) -> Self {
        self.register(provider);
        self
    }

    /// Returns the provider for `icon_type`.
    #[must_use]
    pub fn resolve(&self, icon_type: &str) -> Option<&Arc<dyn IconProvider>> {
        self.by_type.get(icon_type).map(|&i| &self.providers[i])
    }

    /// Providers in registration order.
    #[must_use]
    pub fn providers(&self) -> &[Arc<dyn IconProvider>] {
        &self.providers
    }

    /// Option values and names of all providers, in registration order.
    #[must_use]
    pub fn options(&self) -> Vec<IconOption> {
        self.providers
            .iter()
            .map(|p| IconOption {
                value: p.option_value().to_string(),
                name: p.name().to_string(),
            })
            .collect()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<_> = self.by_type.keys().collect();
        types.sort();
        f.debug_struct("ProviderRegistry")
            .field("types", &types)
            .finish_non_exhaustive()
    }
}

/// Resolves icon URLs through the registered providers.
#[derive(Debug, Clone)]
pub struct IconDispatcher {
    registry: Arc<ProviderRegistry>,
}

impl IconDispatcher {
    /// Creates a dispatcher over `registry`.
    #[must_use]
    pub const fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Returns the icon URL for `hash`, or `fallback` when the type is
    /// unknown or the icon cannot be produced.
    pub async fn get_url(
        &self,
        fallback: &str,
        hash: &IdentityHash,
        size: u32,
        args: &IconArgs,
    ) -> String {
        let Some(provider) = args
            .icon_type
            .as_deref()
            .and_then(|t| self.registry.resolve(t))
        else {
            trace!(icon_type = ?args.icon_type, "No provider for icon type");
            return fallback.to_string();
        };

        provider
            .icon_url(hash, size, args.force)
            .await
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Makes sure the icon for `(icon_type, hash, size)` exists. Returns
    /// false if the type is unknown or generation failed.
    pub async fn cache_image(&self, icon_type: &str, hash: &IdentityHash, size: u32) -> bool {
        !self
            .get_url("", hash, size, &IconArgs::with_type(icon_type))
            .await
            .is_empty()
    }

    /// Removes the remote service's default from `defaults` and appends every
    /// registered provider not already listed.
    #[must_use]
    pub fn avatar_defaults(&self, mut defaults: Vec<IconOption>) -> Vec<IconOption> {
        defaults.retain(|option| option.value != REMOTE_DEFAULT_OPTION);

        for option in self.registry.options() {
            if !defaults.iter().any(|o| o.value == option.value) {
                defaults.push(option);
            }
        }

        defaults
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::GenerationError;
    use crate::domain::ports::IconGenerator;
    use crate::domain::ports::mocks::CountingGenerator;
    use crate::infrastructure::icons::{GeneratingIconProvider, StaticIconProvider};
    use crate::infrastructure::image::{FileCache, ImageCompositor, MonsterIdGenerator, PartCatalog};
    use crate::infrastructure::storage::FsBlobStore;
    use image::{Rgba, RgbaImage};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    const FALLBACK: &str = "https://example.org/default.png";

    struct Fixture {
        dispatcher: IconDispatcher,
        generator: Arc<CountingGenerator>,
        _temp: TempDir,
    }

    fn fixture(generator: CountingGenerator) -> Fixture {
        let temp = TempDir::new().unwrap();
        let cache = Arc::new(FileCache::new(
            Arc::new(FsBlobStore::new(temp.path())),
            "https://example.org/cache",
        ));
        let generator = Arc::new(generator);

        let registry = ProviderRegistry::new()
            .with(Arc::new(GeneratingIconProvider::new(
                generator.clone(),
                cache,
                &["monsterid", "monster"],
                "Monster",
            )))
            .with(Arc::new(StaticIconProvider::silhouette("https://example.org/assets")))
            .with(Arc::new(StaticIconProvider::new(
                &["monster", "bubble"],
                "Imposter",
                "https://example.org/assets",
                "imposter.png",
            )));

        Fixture {
            dispatcher: IconDispatcher::new(Arc::new(registry)),
            generator,
            _temp: temp,
        }
    }

    fn hash() -> IdentityHash {
        IdentityHash::new("0bc83cb571cd1c50ba6f3e8a78ef1346")
    }

    #[tokio::test]
    async fn test_generated_icon_is_cached() {
        let f = fixture(CountingGenerator::new());
        let args = IconArgs::with_type("monsterid");

        let first = f.dispatcher.get_url(FALLBACK, &hash(), 80, &args).await;
        let second = f.dispatcher.get_url(FALLBACK, &hash(), 80, &args).await;

        assert_eq!(
            first,
            "https://example.org/cache/monsterid/0/b/0bc83cb571cd1c50ba6f3e8a78ef1346-80.png"
        );
        assert_eq!(first, second);
        assert_eq!(f.generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_type_returns_fallback() {
        let f = fixture(CountingGenerator::new());

        let url = f
            .dispatcher
            .get_url(FALLBACK, &hash(), 80, &IconArgs::with_type("identicon"))
            .await;
        let untyped = f.dispatcher.get_url(FALLBACK, &hash(), 80, &IconArgs::default()).await;

        assert_eq!(url, FALLBACK);
        assert_eq!(untyped, FALLBACK);
        assert_eq!(f.generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_generation_failure_returns_fallback() {
        let f = fixture(CountingGenerator::failing());

        let url = f
            .dispatcher
            .get_url(FALLBACK, &hash(), 80, &IconArgs::with_type("monsterid"))
            .await;

        assert_eq!(url, FALLBACK);
    }

    #[tokio::test]
    async fn test_first_registration_wins() {
        let f = fixture(CountingGenerator::new());

        let url = f
            .dispatcher
            .get_url(FALLBACK, &hash(), 64, &IconArgs::with_type("monster"))
            .await;
        let bubble = f
            .dispatcher
            .get_url(FALLBACK, &hash(), 64, &IconArgs::with_type("bubble"))
            .await;

        assert!(url.starts_with("https://example.org/cache/monsterid/"));
        assert_eq!(bubble, "https://example.org/assets/imposter.png");
    }

    #[tokio::test]
    async fn test_forced_lookup_regenerates() {
        let f = fixture(CountingGenerator::new());

        f.dispatcher
            .get_url(FALLBACK, &hash(), 80, &IconArgs::with_type("monsterid"))
            .await;
        f.dispatcher
            .get_url(FALLBACK, &hash(), 80, &IconArgs::with_type("monsterid").forced())
            .await;

        assert_eq!(f.generator.calls(), 2);
    }

    #[tokio::test]
    async fn test_cache_image() {
        assert!(fixture(CountingGenerator::new()).dispatcher.cache_image("monsterid", &hash(), 80).await);
        assert!(!fixture(CountingGenerator::failing()).dispatcher.cache_image("monsterid", &hash(), 80).await);
        assert!(!fixture(CountingGenerator::new()).dispatcher.cache_image("nope", &hash(), 80).await);
    }

    #[test]
    fn test_avatar_defaults() {
        let f = fixture(CountingGenerator::new());
        let option = |value: &str, name: &str| IconOption {
            value: value.to_string(),
            name: name.to_string(),
        };

        let defaults = f.dispatcher.avatar_defaults(vec![
            option("gravatar_default", "Gravatar Logo"),
            option("mystery", "Mystery Person"),
            option("blank", "Blank"),
        ]);

        assert_eq!(
            defaults,
            vec![
                option("mystery", "Mystery Person"),
                option("blank", "Blank"),
                option("monsterid", "Monster"),
                option("monster", "Imposter"),
            ]
        );
    }

    /// Generator decorator counting invocations.
    struct Counted<G> {
        inner: G,
        calls: AtomicUsize,
    }

    impl<G: IconGenerator> IconGenerator for Counted<G> {
        fn build(&self, seed: &str, size: u32) -> Result<Vec<u8>, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.build(seed, size)
        }
    }

    fn write_monster_bundle(dir: &std::path::Path) {
        for (i, file) in ["back.png", "body_1.png", "arms_S8.png", "legs_1.png", "mouth_6.png"]
            .iter()
            .enumerate()
        {
            let shade = u8::try_from(50 * i).unwrap();
            let mut img = RgbaImage::new(120, 120);
            for y in 20..100 {
                for x in 10..110 {
                    img.put_pixel(x, y, Rgba([shade, 255 - shade, shade, 255]));
                }
            }
            img.save(dir.join(file)).unwrap();
        }
    }

    #[tokio::test]
    async fn test_monster_icon_end_to_end() {
        let assets = TempDir::new().unwrap();
        let cache_dir = TempDir::new().unwrap();
        write_monster_bundle(assets.path());

        let known = PartCatalog::monster_id();
        let catalog =
            PartCatalog::discover(assets.path(), &["body", "arms", "legs", "mouth"], &known).unwrap();
        let generator = Arc::new(Counted {
            inner: MonsterIdGenerator::with_catalog(assets.path(), catalog, ImageCompositor::new()),
            calls: AtomicUsize::new(0),
        });
        let cache = Arc::new(FileCache::new(
            Arc::new(FsBlobStore::new(cache_dir.path())),
            "https://example.org/cache",
        ));
        let registry = ProviderRegistry::new().with(Arc::new(GeneratingIconProvider::new(
            generator.clone(),
            cache,
            &["monsterid"],
            "Monsters",
        )));
        let dispatcher = IconDispatcher::new(Arc::new(registry));
        let args = IconArgs::with_type("monsterid");
        let stored = cache_dir
            .path()
            .join("monsterid/0/b/0bc83cb571cd1c50ba6f3e8a78ef1346-80.png");

        let first = dispatcher.get_url(FALLBACK, &hash(), 80, &args).await;
        let first_bytes = std::fs::read(&stored).unwrap();
        let second = dispatcher.get_url(FALLBACK, &hash(), 80, &args).await;

        assert_eq!(
            first,
            "https://example.org/cache/monsterid/0/b/0bc83cb571cd1c50ba6f3e8a78ef1346-80.png"
        );
        assert_eq!(first, second);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(std::fs::read(&stored).unwrap(), first_bytes);

        let decoded = image::load_from_memory(&first_bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (80, 80));
    }

    #[test]
    #[should_panic(expected = "declares no types")]
    fn test_provider_without_types_panics() {
        ProviderRegistry::new().register(Arc::new(StaticIconProvider::new(
            &[],
            "Empty",
            "https://example.org",
            "x.png",
        )));
    }
}
