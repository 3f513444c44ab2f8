//! Icon generator port definition.

use crate::domain::errors::GenerationError;

/// Deterministic icon synthesis from a seed.
///
/// For a fixed `(seed, size)` and a fixed asset bundle the returned bytes
/// must be identical across invocations and processes.
pub trait IconGenerator: Send + Sync {
    /// Builds an encoded image of `size` x `size` pixels.
    ///
    /// # Errors
    /// Returns error if any required asset is missing or the image cannot be
    /// encoded. No partial output is produced.
    fn build(&self, seed: &str, size: u32) -> Result<Vec<u8>, GenerationError>;

    /// File extension of the encoded output.
    fn extension(&self) -> &'static str {
        "png"
    }
}

/// Largest edge length, in pixels, a generator will produce.
pub const MAX_ICON_SIZE: u32 = 2048;

/// Accepts sizes in `1..=MAX_ICON_SIZE`.
///
/// # Errors
/// Returns [`GenerationError::InvalidSize`] for zero or oversized requests.
pub fn check_icon_size(size: u32) -> Result<u32, GenerationError> {
    if size == 0 || size > MAX_ICON_SIZE {
        return Err(GenerationError::InvalidSize(size));
    }
    Ok(size)
}
