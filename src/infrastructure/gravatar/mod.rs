//! Remote avatar service client.

mod client;

pub use client::{DEFAULT_HOST, GravatarClient};
