//! Icon request types.

use std::path::PathBuf;

use super::IdentityHash;

/// A request for a generated icon. Exists only for the duration of a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IconRequest {
    /// The icon type identifier (e.g. `monsterid`).
    pub icon_type: String,
    /// The identity hash used as key and seed.
    pub hash: IdentityHash,
    /// Edge length in pixels.
    pub size: u32,
}

impl IconRequest {
    /// Creates a new request.
    #[must_use]
    pub fn new(icon_type: impl Into<String>, hash: IdentityHash, size: u32) -> Self {
        Self {
            icon_type: icon_type.into(),
            hash,
            size,
        }
    }

    /// Returns the cache-relative path for this request.
    ///
    /// Layout: `{type}/{h0}/{h1}/{hash}-{size}.{extension}`.
    #[must_use]
    pub fn relative_path(&self, extension: &str) -> PathBuf {
        PathBuf::from(&self.icon_type)
            .join(self.hash.shard())
            .join(format!("{}-{}.{extension}", self.hash, self.size))
    }
}

impl std::fmt::Display for IconRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}@{}", self.icon_type, self.hash, self.size)
    }
}

/// Arguments passed along with an icon URL lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IconArgs {
    /// Requested icon type. `None` resolves to the fallback.
    pub icon_type: Option<String>,
    /// Regenerate even if a cached file exists.
    pub force: bool,
}

impl IconArgs {
    /// Creates arguments for the given icon type.
    #[must_use]
    pub fn with_type(icon_type: impl Into<String>) -> Self {
        Self {
            icon_type: Some(icon_type.into()),
            force: false,
        }
    }

    /// Forces regeneration.
    #[must_use]
    pub const fn forced(mut self) -> Self {
        self.force = true;
        self
    }
}

/// Presentation entry for a registered icon type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconOption {
    /// The option value stored in settings.
    pub value: String,
    /// Human readable name.
    pub name: String,
}

impl IconOption {
    /// Creates a new option entry.
    #[must_use]
    pub fn new(value: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            name: name.into(),
        }
    }
}
