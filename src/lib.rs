//! Privatar - privacy-preserving default avatars.
//!
//! This crate generates deterministic default icons from a one-way hash of an
//! e-mail address, caches them on disk, and checks with a bounded number of
//! requests whether the remote avatar service has an image for an address.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing services and use cases.
pub mod application;
/// Domain layer containing entities, errors, policies and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "privatar";
