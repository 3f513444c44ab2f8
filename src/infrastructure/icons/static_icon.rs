//! Providers that point at a fixed bundled image.

use async_trait::async_trait;

use crate::domain::entities::IdentityHash;
use crate::domain::ports::IconProvider;

/// Serves the same bundled image for every identity and size.
#[derive(Debug, Clone)]
pub struct StaticIconProvider {
    types: Vec<String>,
    name: String,
    url: String,
}

impl StaticIconProvider {
    /// Creates a provider serving `{base_url}/{file}`.
    #[must_use]
    pub fn new(types: &[&str], name: impl Into<String>, base_url: &str, file: &str) -> Self {
        Self {
            types: types.iter().map(|t| (*t).to_string()).collect(),
            name: name.into(),
            url: format!("{}/{}", base_url.trim_end_matches('/'), file.trim_start_matches('/')),
        }
    }

    /// The "mystery person" silhouette.
    #[must_use]
    pub fn silhouette(base_url: &str) -> Self {
        Self::new(&["mystery", "mm"], "Silhouette", base_url, "mystery.svg")
    }

    /// The speech bubble.
    #[must_use]
    pub fn bubble(base_url: &str) -> Self {
        Self::new(&["bubble", "comment"], "Speech Bubble", base_url, "bubble.svg")
    }
}

#[async_trait]
impl IconProvider for StaticIconProvider {
    fn provided_types(&self) -> &[String] {
        &self.types
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn icon_url(&self, _hash: &IdentityHash, _size: u32, _force: bool) -> Option<String> {
        Some(self.url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_url_is_size_independent() {
        let provider = StaticIconProvider::silhouette("https://example.org/assets/");
        let hash = IdentityHash::new("abc");

        let small = provider.icon_url(&hash, 16, false).await;
        let large = provider.icon_url(&hash, 512, true).await;

        assert_eq!(small.as_deref(), Some("https://example.org/assets/mystery.svg"));
        assert_eq!(small, large);
        assert_eq!(provider.option_value(), "mystery");
    }
}
