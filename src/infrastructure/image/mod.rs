//! Icon generation and the generated-icon file cache.
//!
//! This module provides:
//! - Image compositing primitives
//! - The monster and retro generators
//! - A content-addressed cache of generated files

pub mod compositor;
pub mod file_cache;
pub mod monster_id;
pub mod parts;
pub mod retro;

pub use compositor::{Bounds, Compositor, ImageCompositor};
pub use file_cache::FileCache;
pub use monster_id::MonsterIdGenerator;
pub use parts::{ColorMode, Part, PartCatalog, PartCategory};
pub use retro::RetroGenerator;
