//! Remote avatar service port definition.

use async_trait::async_trait;

use crate::domain::entities::IdentityHash;
use crate::domain::errors::ProbeError;

/// Status and content type of a probe response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    /// HTTP status code.
    pub status: u16,
    /// Declared `Content-Type`, if any.
    pub content_type: Option<String>,
}

impl ProbeResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: u16, content_type: Option<&str>) -> Self {
        Self {
            status,
            content_type: content_type.map(String::from),
        }
    }
}

/// Port for asking the remote avatar service about an identity.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvatarServicePort: Send + Sync {
    /// Issues a single HEAD-style request for the hash.
    async fn probe(&self, hash: &IdentityHash) -> Result<ProbeResponse, ProbeError>;
}
