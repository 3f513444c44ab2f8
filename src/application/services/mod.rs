//! Application services.

mod gravatar_validator;
mod icon_dispatcher;

pub use gravatar_validator::{GravatarValidator, ValidationMemo};
pub use icon_dispatcher::{IconDispatcher, ProviderRegistry, REMOTE_DEFAULT_OPTION};
