//! Expiration policy for remote validation results.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::ValidationResult;

const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(60 * 60);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);
const WEEK: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Override hook: `(default duration, image found, content age) -> duration`.
pub type IntervalFilter = dyn Fn(Duration, bool, Duration) -> Duration + Send + Sync;

/// Computes how long a validation result may be cached.
///
/// A found image is kept for a week. An absent image is re-checked sooner
/// the younger the associated content is, since its author may still sign up
/// with the remote service.
#[derive(Clone, Default)]
pub struct CachingPolicy {
    filter: Option<Arc<IntervalFilter>>,
}

impl CachingPolicy {
    /// Creates the default policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a policy whose result is passed through `filter`.
    #[must_use]
    pub fn with_filter<F>(filter: F) -> Self
    where
        F: Fn(Duration, bool, Duration) -> Duration + Send + Sync + 'static,
    {
        Self {
            filter: Some(Arc::new(filter)),
        }
    }

    /// Returns the unfiltered duration.
    #[must_use]
    pub fn default_duration(found: bool, age: Duration) -> Duration {
        if found {
            return WEEK;
        }

        if age < HOUR {
            10 * MINUTE
        } else if age < DAY {
            HOUR
        } else if age < WEEK {
            DAY
        } else {
            WEEK
        }
    }

    /// Computes the caching duration for `result` given the content `age`.
    #[must_use]
    pub fn calculate(&self, result: &ValidationResult, age: Duration) -> Duration {
        let found = result.is_found();
        let duration = Self::default_duration(found, age);

        match &self.filter {
            Some(filter) => filter(duration, found, age),
            None => duration,
        }
    }
}

impl std::fmt::Debug for CachingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingPolicy")
            .field("filtered", &self.filter.is_some())
            .finish()
    }
}
