//! Remote avatar validation results.

use serde::{Deserialize, Serialize};

/// Outcome of asking whether the remote service has an image for an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// An image exists, with the declared MIME type.
    Found(String),
    /// The service answered that no image exists.
    Absent,
    /// No usable answer. Never persisted.
    Unknown,
}

impl ValidationResult {
    /// Returns the MIME type if an image exists.
    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        match self {
            Self::Found(mime) => Some(mime),
            Self::Absent | Self::Unknown => None,
        }
    }

    /// Returns true if an image exists.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Returns the cacheable form of this result, if any.
    #[must_use]
    pub fn cacheable(&self) -> Option<CachedValidation> {
        match self {
            Self::Found(mime) => Some(CachedValidation::Found(mime.clone())),
            Self::Absent => Some(CachedValidation::Absent),
            Self::Unknown => None,
        }
    }
}

impl std::fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Found(mime) => write!(f, "{mime}"),
            Self::Absent => write!(f, "none"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Persisted form of a validation result. `Unknown` has no representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "mime")]
pub enum CachedValidation {
    /// An image exists.
    Found(String),
    /// No image exists.
    Absent,
}

impl From<CachedValidation> for ValidationResult {
    fn from(value: CachedValidation) -> Self {
        match value {
            CachedValidation::Found(mime) => Self::Found(mime),
            CachedValidation::Absent => Self::Absent,
        }
    }
}

/// Audience rating accepted by the remote service.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    /// Suitable for all audiences.
    G,
    /// Parental guidance.
    Pg,
    /// Restricted.
    R,
    /// Any image.
    #[default]
    X,
}

impl Rating {
    /// Returns the query parameter value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::G => "g",
            Self::Pg => "pg",
            Self::R => "r",
            Self::X => "x",
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_is_not_cacheable() {
        assert_eq!(ValidationResult::Unknown.cacheable(), None);
        assert_eq!(
            ValidationResult::Absent.cacheable(),
            Some(CachedValidation::Absent)
        );
    }

    #[test]
    fn test_cached_validation_serialization() {
        let found = CachedValidation::Found("image/png".to_string());
        let json = serde_json::to_string(&found).unwrap();
        assert_eq!(json, r#"{"kind":"found","mime":"image/png"}"#);

        let absent: CachedValidation = serde_json::from_str(r#"{"kind":"absent"}"#).unwrap();
        assert_eq!(absent, CachedValidation::Absent);
    }
}
