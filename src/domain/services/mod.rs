//! Domain services.

mod caching_policy;

pub use caching_policy::{CachingPolicy, IntervalFilter};
