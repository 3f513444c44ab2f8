//! Application layer with services and use cases.

/// Application services.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use services::{GravatarValidator, IconDispatcher, ProviderRegistry, ValidationMemo};
pub use use_cases::{PurgeCachesUseCase, PurgeReport};
