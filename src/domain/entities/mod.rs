//! Domain entity definitions.

mod icon;
mod identity;
mod validation;

pub use icon::{IconArgs, IconOption, IconRequest};
pub use identity::{IdentityHash, IdentityHasher};
pub use validation::{CachedValidation, Rating, ValidationResult};
