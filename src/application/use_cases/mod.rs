//! Use case implementations.

mod purge_caches;

pub use purge_caches::{PurgeCachesUseCase, PurgeReport};
