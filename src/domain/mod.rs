//! Domain layer with core entities, errors, policies and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;
/// Domain services.
pub mod services;

pub use entities::{IconRequest, IdentityHash, IdentityHasher, ValidationResult};
pub use errors::{CacheError, GenerationError, ProbeError, StoreError};
pub use services::CachingPolicy;
