//! Remote avatar existence checks with two cache layers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::domain::entities::{CachedValidation, IdentityHash, IdentityHasher, ValidationResult};
use crate::domain::ports::{AvatarServicePort, TransientStorePort};
use crate::domain::services::CachingPolicy;

/// MIME type recorded when the service confirms an image without naming it.
const UNSPECIFIED_MIME: &str = "application/octet-stream";

/// Request-scoped memo of validation results.
///
/// Create one per request or batch and drop it afterwards; results are not
/// shared between memos.
#[derive(Debug, Default)]
pub struct ValidationMemo {
    results: HashMap<IdentityHash, ValidationResult>,
}

impl ValidationMemo {
    /// Creates an empty memo.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the memoized result for `hash`.
    #[must_use]
    pub fn get(&self, hash: &IdentityHash) -> Option<&ValidationResult> {
        self.results.get(hash)
    }

    fn insert(&mut self, hash: IdentityHash, result: ValidationResult) {
        self.results.insert(hash, result);
    }

    /// Number of memoized results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if nothing is memoized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Decides whether the remote service has an image for an identity.
///
/// Lookups go through the memo, then the transient store, then a single
/// probe. Only definite answers are cached.
pub struct GravatarValidator {
    service: Arc<dyn AvatarServicePort>,
    store: Arc<dyn TransientStorePort>,
    policy: CachingPolicy,
}

impl GravatarValidator {
    /// Creates a validator.
    #[must_use]
    pub fn new(
        service: Arc<dyn AvatarServicePort>,
        store: Arc<dyn TransientStorePort>,
        policy: CachingPolicy,
    ) -> Self {
        Self {
            service,
            store,
            policy,
        }
    }

    /// Transient store key for `hash`.
    #[must_use]
    pub fn cache_key(hash: &IdentityHash) -> String {
        format!("check_{hash}")
    }

    /// Validates an e-mail address. `age` is the age of the content the
    /// address is attached to.
    ///
    /// An empty address yields [`ValidationResult::Unknown`] without any
    /// lookup.
    pub async fn validate(
        &self,
        memo: &mut ValidationMemo,
        email: &str,
        age: Duration,
    ) -> ValidationResult {
        if email.trim().is_empty() {
            return ValidationResult::Unknown;
        }

        let hash = IdentityHasher::Remote.hash(email);
        self.validate_hash(memo, &hash, age).await
    }

    /// Validates an already hashed identity.
    pub async fn validate_hash(
        &self,
        memo: &mut ValidationMemo,
        hash: &IdentityHash,
        age: Duration,
    ) -> ValidationResult {
        if let Some(result) = memo.get(hash) {
            trace!(hash = %hash, "Validation memo hit");
            return result.clone();
        }

        let key = Self::cache_key(hash);
        if let Some(result) = self.load(&key).await {
            trace!(hash = %hash, result = %result, "Validation store hit");
            memo.insert(hash.clone(), result.clone());
            return result;
        }

        let result = self.probe(hash).await;
        let Some(cached) = result.cacheable() else {
            return result;
        };

        let ttl = self.policy.calculate(&result, age);
        match serde_json::to_value(&cached) {
            Ok(value) => {
                if let Err(e) = self.store.set(&key, value, ttl).await {
                    warn!(hash = %hash, error = %e, "Failed to persist validation result");
                }
            }
            Err(e) => warn!(hash = %hash, error = %e, "Failed to serialize validation result"),
        }
        memo.insert(hash.clone(), result.clone());

        debug!(hash = %hash, result = %result, ttl_secs = ttl.as_secs(), "Validated remote avatar");
        result
    }

    async fn load(&self, key: &str) -> Option<ValidationResult> {
        let value = match self.store.get(key).await {
            Ok(value) => value?,
            Err(e) => {
                warn!(key = key, error = %e, "Transient store read failed");
                return None;
            }
        };

        match serde_json::from_value::<CachedValidation>(value) {
            Ok(cached) => Some(cached.into()),
            Err(e) => {
                warn!(key = key, error = %e, "Ignoring malformed validation entry");
                None
            }
        }
    }

    async fn probe(&self, hash: &IdentityHash) -> ValidationResult {
        match self.service.probe(hash).await {
            Ok(response) => match response.status {
                200 => ValidationResult::Found(
                    response
                        .content_type
                        .filter(|mime| !mime.is_empty())
                        .unwrap_or_else(|| UNSPECIFIED_MIME.to_string()),
                ),
                404 => ValidationResult::Absent,
                status => {
                    debug!(hash = %hash, status = status, "Indeterminate probe response");
                    ValidationResult::Unknown
                }
            },
            Err(e) => {
                warn!(hash = %hash, error = %e, "Remote avatar probe failed");
                ValidationResult::Unknown
            }
        }
    }
}

impl std::fmt::Debug for GravatarValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GravatarValidator")
            .field("scope", &self.store.scope())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{ProbeError, StoreError};
    use crate::domain::ports::mocks::MockAvatarServicePort;
    use crate::domain::ports::{ProbeResponse, StoreScope};
    use crate::infrastructure::storage::MemoryTransientStore;
    use async_trait::async_trait;
    use serde_json::json;

    const EMAIL: &str = "MyEmailAddress@example.com ";
    const HASH: &str = "0bc83cb571cd1c50ba6f3e8a78ef1346";
    const MINUTE: Duration = Duration::from_secs(60);

    fn service(times: usize, response: Result<ProbeResponse, ProbeError>) -> MockAvatarServicePort {
        let mut mock = MockAvatarServicePort::new();
        let response = parking_lot::Mutex::new(Some(response));
        mock.expect_probe()
            .withf(|hash| hash.as_str() == HASH)
            .times(times)
            .returning(move |_| {
                response
                    .lock()
                    .take()
                    .unwrap_or(Err(ProbeError::Timeout))
            });
        mock
    }

    fn validator(
        service: MockAvatarServicePort,
        store: Arc<MemoryTransientStore>,
    ) -> GravatarValidator {
        GravatarValidator::new(Arc::new(service), store, CachingPolicy::new())
    }

    #[tokio::test]
    async fn test_found_is_cached_in_both_layers() {
        let store = Arc::new(MemoryTransientStore::new(StoreScope::Site));
        let validator = validator(
            service(1, Ok(ProbeResponse::new(200, Some("image/png")))),
            store.clone(),
        );
        let mut memo = ValidationMemo::new();

        let result = validator.validate(&mut memo, EMAIL, MINUTE).await;

        assert_eq!(result, ValidationResult::Found("image/png".to_string()));
        assert_eq!(memo.len(), 1);
        assert_eq!(
            store.get(&format!("check_{HASH}")).await.unwrap(),
            Some(json!({"kind": "found", "mime": "image/png"}))
        );

        // Served from the memo: the mock allows a single probe.
        assert_eq!(validator.validate(&mut memo, "myemailaddress@example.com", MINUTE).await, result);
    }

    #[tokio::test]
    async fn test_absent_is_cached() {
        let store = Arc::new(MemoryTransientStore::new(StoreScope::Site));
        let validator = validator(service(1, Ok(ProbeResponse::new(404, None))), store.clone());

        let result = validator.validate(&mut ValidationMemo::new(), EMAIL, MINUTE).await;

        assert_eq!(result, ValidationResult::Absent);
        assert_eq!(
            store.get(&format!("check_{HASH}")).await.unwrap(),
            Some(json!({"kind": "absent"}))
        );

        // A fresh memo falls through to the store, not the service.
        let mut memo = ValidationMemo::new();
        assert_eq!(validator.validate(&mut memo, EMAIL, MINUTE).await, ValidationResult::Absent);
        assert_eq!(memo.get(&IdentityHash::new(HASH)), Some(&ValidationResult::Absent));
    }

    #[tokio::test]
    async fn test_server_error_is_not_cached() {
        let store = Arc::new(MemoryTransientStore::new(StoreScope::Site));
        let validator = validator(service(1, Ok(ProbeResponse::new(500, None))), store.clone());
        let mut memo = ValidationMemo::new();

        let result = validator.validate(&mut memo, EMAIL, MINUTE).await;

        assert_eq!(result, ValidationResult::Unknown);
        assert!(memo.is_empty());
        assert!(store.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_is_retried() {
        let store = Arc::new(MemoryTransientStore::new(StoreScope::Site));
        let validator = validator(service(2, Err(ProbeError::transport("reset"))), store.clone());
        let mut memo = ValidationMemo::new();

        assert_eq!(validator.validate(&mut memo, EMAIL, MINUTE).await, ValidationResult::Unknown);
        assert_eq!(validator.validate(&mut memo, EMAIL, MINUTE).await, ValidationResult::Unknown);
        assert!(store.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_email_skips_lookup() {
        let store = Arc::new(MemoryTransientStore::new(StoreScope::Site));
        let validator = validator(service(0, Err(ProbeError::Timeout)), store);

        let result = validator.validate(&mut ValidationMemo::new(), "   ", MINUTE).await;

        assert_eq!(result, ValidationResult::Unknown);
    }

    #[tokio::test]
    async fn test_store_hit_skips_probe() {
        let store = Arc::new(MemoryTransientStore::new(StoreScope::Network));
        store
            .set(&format!("check_{HASH}"), json!({"kind": "found", "mime": "image/gif"}), MINUTE)
            .await
            .unwrap();
        let validator = validator(service(0, Err(ProbeError::Timeout)), store);

        let result = validator.validate(&mut ValidationMemo::new(), EMAIL, MINUTE).await;

        assert_eq!(result, ValidationResult::Found("image/gif".to_string()));
    }

    #[tokio::test]
    async fn test_malformed_entry_is_a_miss() {
        let store = Arc::new(MemoryTransientStore::new(StoreScope::Site));
        store.set(&format!("check_{HASH}"), json!(0), MINUTE).await.unwrap();
        let validator = validator(service(1, Ok(ProbeResponse::new(404, None))), store);

        let result = validator.validate(&mut ValidationMemo::new(), EMAIL, MINUTE).await;

        assert_eq!(result, ValidationResult::Absent);
    }

    #[tokio::test]
    async fn test_missing_content_type() {
        let store = Arc::new(MemoryTransientStore::new(StoreScope::Site));
        let validator = validator(service(1, Ok(ProbeResponse::new(200, None))), store);

        let result = validator.validate(&mut ValidationMemo::new(), EMAIL, MINUTE).await;

        assert_eq!(result.mime_type(), Some(UNSPECIFIED_MIME));
    }

    /// Store whose every operation fails.
    struct BrokenStore;

    #[async_trait]
    impl TransientStorePort for BrokenStore {
        fn scope(&self) -> StoreScope {
            StoreScope::Site
        }

        async fn get(&self, _key: &str) -> Result<Option<serde_json::Value>, StoreError> {
            Err(StoreError::Io("disk on fire".to_string()))
        }

        async fn set(
            &self,
            _key: &str,
            _value: serde_json::Value,
            _ttl: Duration,
        ) -> Result<(), StoreError> {
            Err(StoreError::Io("disk on fire".to_string()))
        }

        async fn delete(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Io("disk on fire".to_string()))
        }

        async fn keys(&self) -> Result<Vec<String>, StoreError> {
            Err(StoreError::Io("disk on fire".to_string()))
        }
    }

    #[tokio::test]
    async fn test_store_failure_still_answers() {
        let validator = GravatarValidator::new(
            Arc::new(service(1, Ok(ProbeResponse::new(200, Some("image/jpeg"))))),
            Arc::new(BrokenStore),
            CachingPolicy::new(),
        );
        let mut memo = ValidationMemo::new();

        let result = validator.validate(&mut memo, EMAIL, MINUTE).await;

        assert_eq!(result, ValidationResult::Found("image/jpeg".to_string()));
        assert_eq!(memo.len(), 1);
    }
}
