use super::app_config::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "privatar",
    version,
    about = "Privacy-preserving default avatars and remote avatar checks",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the URL of the generated icon for an e-mail address.
    Generate {
        /// E-mail address.
        #[arg(short, long, env = "PRIVATAR_EMAIL")]
        email: String,

        /// Icon type. Defaults to the configured icon.
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        icon_type: Option<String>,

        /// Edge length in pixels.
        #[arg(short, long, default_value_t = 80)]
        size: u32,

        /// Regenerate even if cached.
        #[arg(long)]
        force: bool,
    },

    /// Check whether the remote service has an image for an e-mail address.
    Validate {
        /// E-mail address.
        #[arg(short, long, env = "PRIVATAR_EMAIL")]
        email: String,

        /// Age of the associated content in seconds.
        #[arg(long, default_value_t = 0)]
        age_secs: u64,

        /// Download the remote image to this path when one exists.
        #[arg(long, value_name = "PATH")]
        save: Option<PathBuf>,
    },

    /// Remove all generated icons and stored validation results.
    Purge,

    /// List the available icon types.
    Types,
}
