//! Domain error types.

mod cache_error;
mod generation_error;
mod probe_error;

pub use cache_error::{CacheError, CacheResult, StoreError};
pub use generation_error::GenerationError;
pub use probe_error::ProbeError;
