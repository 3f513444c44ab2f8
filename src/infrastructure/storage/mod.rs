//! Storage adapters.

mod fs_blob_store;
mod transient_store;

pub use fs_blob_store::FsBlobStore;
pub use transient_store::{FileTransientStore, MemoryTransientStore};
