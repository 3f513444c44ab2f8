//! Durable blob store port definition.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;

use crate::domain::errors::CacheResult;

/// A stored blob as seen by listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobEntry {
    /// Path relative to the store root.
    pub path: PathBuf,
    /// Last modification time.
    pub modified: SystemTime,
    /// Size in bytes.
    pub len: u64,
}

/// Path-addressable blob storage with atomic publish.
///
/// All paths are relative to the store root. Readers either see no blob or
/// a fully written one.
#[async_trait]
pub trait BlobStorePort: Send + Sync {
    /// Checks whether a blob exists.
    async fn exists(&self, path: &Path) -> bool;

    /// Reads a blob. Returns `Ok(None)` if it does not exist.
    async fn read(&self, path: &Path) -> CacheResult<Option<Vec<u8>>>;

    /// Writes a blob atomically, replacing any previous content.
    async fn write(&self, path: &Path, bytes: Vec<u8>) -> CacheResult<()>;

    /// Lists all blobs below `prefix`.
    async fn list(&self, prefix: &Path) -> CacheResult<Vec<BlobEntry>>;

    /// Removes a single blob. Missing blobs are not an error.
    async fn delete(&self, path: &Path) -> CacheResult<()>;

    /// Recursively removes everything below `prefix`.
    async fn delete_tree(&self, prefix: &Path) -> CacheResult<()>;
}
