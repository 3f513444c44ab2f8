//! Icon provider port definition.

use async_trait::async_trait;

use crate::domain::entities::IdentityHash;

/// A source of default icon URLs for one or more icon types.
#[async_trait]
pub trait IconProvider: Send + Sync {
    /// Type identifiers this provider answers for.
    fn provided_types(&self) -> &[String];

    /// Human readable name.
    fn name(&self) -> &str;

    /// Option value stored in settings. Defaults to the first provided type.
    fn option_value(&self) -> &str {
        self.provided_types().first().map_or("", String::as_str)
    }

    /// Returns the icon URL for the hash at `size`, or `None` if the icon
    /// could not be produced.
    async fn icon_url(&self, hash: &IdentityHash, size: u32, force: bool) -> Option<String>;
}
