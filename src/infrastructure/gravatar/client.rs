//! Gravatar HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode, header};
use tracing::{debug, warn};

use crate::domain::entities::{IdentityHash, Rating};
use crate::domain::errors::ProbeError;
use crate::domain::ports::{AvatarServicePort, ProbeResponse};

/// Default service host.
pub const DEFAULT_HOST: &str = "secure.gravatar.com";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Client for the Gravatar image endpoint.
///
/// Every request asks for `d=404`, so the service never substitutes a
/// generic image for an unknown identity.
#[derive(Debug, Clone)]
pub struct GravatarClient {
    client: Client,
    host: String,
    rating: Rating,
    size: u32,
}

impl GravatarClient {
    /// Creates a client for `host` with a request timeout.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(
        host: impl Into<String>,
        rating: Rating,
        size: u32,
        timeout: Duration,
    ) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ProbeError::Client {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            host: host.into(),
            rating,
            size,
        })
    }

    /// Returns the image URL for `hash`. A zero size leaves the size
    /// parameter empty.
    #[must_use]
    pub fn url(&self, hash: &IdentityHash, size: u32, rating: Rating) -> String {
        let size = if size == 0 {
            String::new()
        } else {
            size.to_string()
        };
        format!(
            "https://{}/avatar/{hash}?d=404&s={size}&r={rating}",
            self.host
        )
    }

    /// Downloads the image for `hash`.
    ///
    /// # Errors
    /// Returns error on transport failure or a non-success status.
    pub async fn fetch_image(
        &self,
        hash: &IdentityHash,
        size: u32,
        rating: Rating,
    ) -> Result<Bytes, ProbeError> {
        let url = self.url(hash, size, rating);
        debug!(hash = %hash, size = size, "Fetching remote avatar");

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!(hash = %hash, error = %e, "Failed to fetch remote avatar");
            ProbeError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::transport(format!(
                "avatar service returned {status}"
            )));
        }

        Ok(response.bytes().await?)
    }
}

#[async_trait]
impl AvatarServicePort for GravatarClient {
    async fn probe(&self, hash: &IdentityHash) -> Result<ProbeResponse, ProbeError> {
        let url = self.url(hash, self.size, self.rating);

        let response = self.client.head(&url).send().await.map_err(|e| {
            warn!(hash = %hash, error = %e, "Avatar probe failed");
            ProbeError::from(e)
        })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());

        if status != StatusCode::OK && status != StatusCode::NOT_FOUND {
            debug!(hash = %hash, status = status.as_u16(), "Unexpected probe status");
        }

        Ok(ProbeResponse::new(status.as_u16(), content_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GravatarClient {
        GravatarClient::new(DEFAULT_HOST, Rating::G, 80, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_url() {
        let hash = IdentityHash::new("0bc83cb571cd1c50ba6f3e8a78ef1346");
        assert_eq!(
            client().url(&hash, 96, Rating::Pg),
            "https://secure.gravatar.com/avatar/0bc83cb571cd1c50ba6f3e8a78ef1346?d=404&s=96&r=pg"
        );
    }

    #[test]
    fn test_url_without_size() {
        let hash = IdentityHash::new("abc");
        assert_eq!(
            client().url(&hash, 0, Rating::X),
            "https://secure.gravatar.com/avatar/abc?d=404&s=&r=x"
        );
    }

    #[test]
    fn test_custom_host() {
        let client =
            GravatarClient::new("avatars.example.org", Rating::R, 0, Duration::from_secs(1)).unwrap();
        assert!(
            client
                .url(&IdentityHash::new("abc"), 1, Rating::R)
                .starts_with("https://avatars.example.org/avatar/abc?")
        );
    }
}
