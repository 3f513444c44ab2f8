//! Icon provider adapters.

mod generating;
mod static_icon;

pub use generating::GeneratingIconProvider;
pub use static_icon::StaticIconProvider;
