//! "Monster" icons assembled from pre-drawn body part fragments.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::domain::errors::GenerationError;
use crate::domain::ports::{IconGenerator, check_icon_size};

use super::compositor::{Compositor, ImageCompositor};
use super::parts::{ColorMode, MONSTER_CANVAS, PartCatalog};

/// File name of the mandatory background fragment.
pub const BACKGROUND: &str = "back.png";

/// Generator for layered monster icons.
///
/// The background is drawn first, then one fragment per catalog category in
/// catalog order. Any fragment that fails to load aborts the build.
pub struct MonsterIdGenerator<C = ImageCompositor> {
    parts_dir: PathBuf,
    catalog: PartCatalog,
    compositor: C,
}

impl MonsterIdGenerator<ImageCompositor> {
    /// Creates a generator reading fragments from `parts_dir` with the
    /// built-in catalog.
    #[must_use]
    pub fn new(parts_dir: impl Into<PathBuf>) -> Self {
        Self::with_catalog(parts_dir, PartCatalog::monster_id(), ImageCompositor::new())
    }
}

impl<C: Compositor> MonsterIdGenerator<C> {
    /// Creates a generator with an explicit catalog and compositor.
    #[must_use]
    pub fn with_catalog(parts_dir: impl Into<PathBuf>, catalog: PartCatalog, compositor: C) -> Self {
        Self {
            parts_dir: parts_dir.into(),
            catalog,
            compositor,
        }
    }

    /// Returns the parts directory.
    #[must_use]
    pub fn parts_dir(&self) -> &Path {
        &self.parts_dir
    }

    /// Returns the compositor.
    #[must_use]
    pub const fn compositor(&self) -> &C {
        &self.compositor
    }
}

impl<C: Compositor> IconGenerator for MonsterIdGenerator<C> {
    #[allow(clippy::cast_precision_loss)]
    fn build(&self, seed: &str, size: u32) -> Result<Vec<u8>, GenerationError> {
        check_icon_size(size)?;

        let mut rng = SeedStream::new(seed);

        let selection: Vec<_> = self
            .catalog
            .categories()
            .iter()
            .map(|category| {
                let index = rng.index(category.parts.len());
                (category.name.as_str(), &category.parts[index])
            })
            .collect();

        let background = self.parts_dir.join(BACKGROUND);
        if !background.is_file() {
            warn!(path = %background.display(), "Monster background image missing");
            return Err(GenerationError::MissingBackground { path: background });
        }
        let mut monster = self
            .compositor
            .load(&background, MONSTER_CANVAS)
            .map_err(|_| GenerationError::MissingBackground {
                path: background.clone(),
            })?;

        let hue = rng.hue();
        let saturation = rng.saturation();

        for (category, part) in selection {
            let path = self.parts_dir.join(&part.file);
            let mut layer = self
                .compositor
                .load(&path, MONSTER_CANVAS)
                .map_err(|e| GenerationError::missing_part(category, &path, e.to_string()))?;

            match part.color {
                ColorMode::Fixed => {}
                ColorMode::Shared => {
                    self.compositor
                        .colorize(&mut layer, hue, saturation, part.bounds);
                }
                ColorMode::Random => {
                    let (h, s) = (rng.hue(), rng.saturation());
                    self.compositor.colorize(&mut layer, h, s, part.bounds);
                }
                ColorMode::Range(low, high) => {
                    let h = rng.range(low, high).rem_euclid(1.0);
                    let s = rng.saturation();
                    self.compositor.colorize(&mut layer, h, s, part.bounds);
                }
            }

            self.compositor.apply(&mut monster, &layer);
        }

        let bytes = self.compositor.encode(&monster, size)?;
        debug!(size = size, bytes = bytes.len(), "Built monster icon");

        Ok(bytes)
    }
}

/// Reproducible pseudo-random stream derived from a seed string.
pub(crate) struct SeedStream(fastrand::Rng);

impl SeedStream {
    pub(crate) fn new(seed: &str) -> Self {
        let digest = Sha256::digest(seed.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        Self(fastrand::Rng::with_seed(u64::from_be_bytes(head)))
    }

    pub(crate) fn index(&mut self, len: usize) -> usize {
        self.0.usize(..len)
    }

    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn hue(&mut self) -> f32 {
        (self.0.u32(1..=360) - 1) as f32 / 360.0
    }

    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn saturation(&mut self) -> f32 {
        self.0.u32(25_000..=100_000) as f32 / 100_000.0
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub(crate) fn range(&mut self, low: f32, high: f32) -> f32 {
        let low = (low * 10_000.0).round() as i32;
        let high = (high * 10_000.0).round() as i32;
        self.0.i32(low..=high) as f32 / 10_000.0
    }
}
