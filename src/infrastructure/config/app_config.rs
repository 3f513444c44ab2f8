//! Application configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use super::args::CliArgs;
use crate::domain::entities::Rating;
use crate::domain::ports::StoreScope;
use crate::infrastructure::gravatar::DEFAULT_HOST;

pub(super) const APP_QUALIFIER: &str = "org";
pub(super) const APP_ORGANIZATION: &str = "privatar";
pub(super) const APP_NAME: &str = "privatar";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration, read from `config.toml` and overridden by CLI
/// flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log file path. Logs go to stderr only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Icon type used when a request names none.
    #[serde(default = "default_icon")]
    pub default_icon: String,

    /// Salt for local cache keys. Cache file names use the remote hash when
    /// unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,

    /// Generated icon cache.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Bundled images.
    #[serde(default)]
    pub assets: AssetsConfig,

    /// Remote avatar service.
    #[serde(default)]
    pub gravatar: GravatarConfig,

    /// Validation result store.
    #[serde(default)]
    pub transients: TransientsConfig,
}

/// Generated icon cache configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache root directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Public URL of the cache root. Defaults to a `file://` URL of `dir`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Asset bundle configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Asset bundle root. Monster parts live in `monster-id/` below it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Public URL of the bundle root. Defaults to a `file://` URL of `dir`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Remote avatar service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GravatarConfig {
    /// Service host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Highest audience rating to accept.
    #[serde(default)]
    pub rating: Rating,

    /// Image size used for probes.
    #[serde(default = "default_size")]
    pub size: u32,

    /// Probe timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl GravatarConfig {
    /// Returns the probe timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for GravatarConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            rating: Rating::default(),
            size: default_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Validation store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransientsConfig {
    /// Scope used for lookups.
    #[serde(default)]
    pub scope: StoreScope,

    /// Directory holding the store files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

fn default_icon() -> String {
    "monsterid".to_string()
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

const fn default_size() -> u32 {
    80
}

const fn default_timeout_secs() -> u64 {
    5
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
}

fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

impl AppConfig {
    /// Merges CLI logging overrides into the configuration. The config file
    /// location itself is resolved by [`ConfigLoader`](super::ConfigLoader).
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
    }

    /// Returns the icon cache directory.
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.cache.dir.clone().unwrap_or_else(|| {
            project_dirs().map_or_else(
                || std::env::temp_dir().join(APP_NAME),
                |dirs| dirs.cache_dir().to_path_buf(),
            )
            .join("avatar-privacy")
        })
    }

    /// Returns the public URL of the icon cache.
    #[must_use]
    pub fn cache_base_url(&self) -> String {
        self.cache
            .base_url
            .clone()
            .unwrap_or_else(|| file_url(&self.cache_dir()))
    }

    /// Returns the asset bundle directory.
    #[must_use]
    pub fn assets_dir(&self) -> PathBuf {
        self.assets.dir.clone().unwrap_or_else(|| {
            project_dirs().map_or_else(|| PathBuf::from("assets"), |dirs| dirs.data_dir().join("assets"))
        })
    }

    /// Returns the public URL of the asset bundle.
    #[must_use]
    pub fn assets_base_url(&self) -> String {
        self.assets
            .base_url
            .clone()
            .unwrap_or_else(|| file_url(&self.assets_dir()))
    }

    /// Returns the validation store directory.
    #[must_use]
    pub fn transients_dir(&self) -> PathBuf {
        self.transients.dir.clone().unwrap_or_else(|| {
            project_dirs().map_or_else(
                || std::env::temp_dir().join(APP_NAME),
                |dirs| dirs.data_dir().to_path_buf(),
            )
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_path: None,
            log_level: LogLevel::Info,
            default_icon: default_icon(),
            salt: None,
            cache: CacheConfig::default(),
            assets: AssetsConfig::default(),
            gravatar: GravatarConfig::default(),
            transients: TransientsConfig::default(),
        }
    }
}
