//! Icon generation error types.

use std::path::PathBuf;

use thiserror::Error;

/// Icon generation error variants.
///
/// Every variant aborts the build; no partial image is ever returned.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum GenerationError {
    #[error("background image missing at {path}")]
    MissingBackground { path: PathBuf },

    #[error("could not load {category} part {path}: {reason}")]
    MissingPart {
        category: String,
        path: PathBuf,
        reason: String,
    },

    #[error("could not find parts images for {category} in {dir}")]
    NoParts { category: String, dir: PathBuf },

    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("invalid icon size {0}")]
    InvalidSize(u32),
}

impl GenerationError {
    /// Creates a missing part error.
    #[must_use]
    pub fn missing_part(
        category: impl Into<String>,
        path: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MissingPart {
            category: category.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns whether the error points at a broken asset bundle rather than
    /// a transient condition.
    #[must_use]
    pub const fn is_asset_error(&self) -> bool {
        matches!(
            self,
            Self::MissingBackground { .. } | Self::MissingPart { .. } | Self::NoParts { .. }
        )
    }
}
