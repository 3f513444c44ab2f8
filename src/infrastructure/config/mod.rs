//! Application configuration.

pub mod app_config;
pub mod args;
pub mod loader;

pub use app_config::{
    AppConfig, AssetsConfig, CacheConfig, GravatarConfig, LogLevel, TransientsConfig,
};
pub use args::{CliArgs, Command};
pub use loader::{ConfigError, ConfigLoader};
