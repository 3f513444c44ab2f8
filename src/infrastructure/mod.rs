//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// Remote avatar service client.
pub mod gravatar;
/// Icon provider adapters.
pub mod icons;
/// Icon generation and the file cache.
pub mod image;
/// Blob and transient storage adapters.
pub mod storage;

pub use config::{AppConfig, CliArgs, Command, ConfigLoader, LogLevel};
pub use gravatar::GravatarClient;
pub use icons::{GeneratingIconProvider, StaticIconProvider};
pub use self::image::{FileCache, MonsterIdGenerator, PartCatalog, RetroGenerator};
pub use storage::{FileTransientStore, FsBlobStore, MemoryTransientStore};
