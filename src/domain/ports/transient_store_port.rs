//! Persistent key/value store with expiry.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::StoreError;

/// Prefix applied to every key this crate writes.
pub const KEY_PREFIX: &str = "privatar_";

/// Visibility of a transient store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreScope {
    /// Visible to a single site.
    #[default]
    Site,
    /// Shared by all sites of a network.
    Network,
}

impl StoreScope {
    /// Returns the scope name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Site => "site",
            Self::Network => "network",
        }
    }
}

impl std::fmt::Display for StoreScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adds the crate prefix to a bare key.
#[must_use]
pub fn prefixed(key: &str) -> String {
    format!("{KEY_PREFIX}{key}")
}

/// Removes the crate prefix. Returns `None` for foreign keys.
#[must_use]
pub fn strip_prefix(key: &str) -> Option<&str> {
    key.strip_prefix(KEY_PREFIX)
}

/// Port for expiring key/value persistence.
///
/// Keys passed in are bare; implementations store them with [`KEY_PREFIX`].
#[async_trait]
pub trait TransientStorePort: Send + Sync {
    /// The scope this store was opened with.
    fn scope(&self) -> StoreScope;

    /// Returns the value if present and unexpired.
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;

    /// Stores a value for `ttl`.
    async fn set(&self, key: &str, value: serde_json::Value, ttl: Duration)
    -> Result<(), StoreError>;

    /// Removes a value. Missing keys are not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Lists every stored key (prefixed), expired ones included.
    async fn keys(&self) -> Result<Vec<String>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_round_trip() {
        let key = prefixed("check_abc");
        assert_eq!(key, "privatar_check_abc");
        assert_eq!(strip_prefix(&key), Some("check_abc"));
        assert_eq!(strip_prefix("other_check_abc"), None);
    }
}
