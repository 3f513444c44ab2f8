//! Part catalogs for layered icon generators.

use std::path::Path;

use crate::domain::errors::GenerationError;

use super::compositor::Bounds;

/// How a part is tinted before compositing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorMode {
    /// Not tinted.
    Fixed,
    /// Tinted with the hue and saturation shared by the whole icon.
    Shared,
    /// Tinted with its own random hue and saturation.
    Random,
    /// Tinted with a random hue drawn from `low..=high`.
    Range(f32, f32),
}

/// A candidate fragment file.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    /// File name relative to the parts directory.
    pub file: String,
    /// Tinting rule.
    pub color: ColorMode,
    /// Area to tint. `None` leaves the fragment as is.
    pub bounds: Option<Bounds>,
}

impl Part {
    /// Creates a part.
    #[must_use]
    pub fn new(file: impl Into<String>, color: ColorMode, bounds: Option<Bounds>) -> Self {
        Self {
            file: file.into(),
            color,
            bounds,
        }
    }
}

/// A named group of interchangeable fragments.
#[derive(Debug, Clone, PartialEq)]
pub struct PartCategory {
    /// Category name, also the file name prefix.
    pub name: String,
    /// Candidates, in selection order.
    pub parts: Vec<Part>,
}

/// Ordered set of part categories. Categories are composited in order.
#[derive(Debug, Clone, PartialEq)]
pub struct PartCatalog {
    categories: Vec<PartCategory>,
}

impl PartCatalog {
    /// Creates a catalog from explicit categories.
    ///
    /// # Panics
    /// Panics if there are no categories or a category has no candidates.
    #[must_use]
    pub fn new(categories: Vec<PartCategory>) -> Self {
        assert!(!categories.is_empty(), "part catalog needs at least one category");
        for category in &categories {
            assert!(
                !category.parts.is_empty(),
                "part category '{}' has no candidates",
                category.name
            );
        }
        Self { categories }
    }

    /// Categories in compositing order.
    #[must_use]
    pub fn categories(&self) -> &[PartCategory] {
        &self.categories
    }

    /// Looks up a part by file name.
    #[must_use]
    pub fn find(&self, file: &str) -> Option<&Part> {
        self.categories
            .iter()
            .flat_map(|c| c.parts.iter())
            .find(|p| p.file == file)
    }

    /// Builds a catalog from the `{category}_{variant}.png` files present in
    /// `dir`, for the given categories in order.
    ///
    /// Tinting rules and bounds come from `known` when it lists the file;
    /// unknown files are composited untinted.
    ///
    /// # Errors
    /// Returns [`GenerationError::NoParts`] if the directory cannot be read or
    /// a category has no files.
    pub fn discover(
        dir: &Path,
        categories: &[&str],
        known: &Self,
    ) -> Result<Self, GenerationError> {
        let mut files: Vec<String> = std::fs::read_dir(dir)
            .map_err(|_| GenerationError::NoParts {
                category: categories.first().copied().unwrap_or_default().to_string(),
                dir: dir.to_path_buf(),
            })?
            .filter_map(Result::ok)
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.ends_with(".png"))
            .collect();
        files.sort_by(|a, b| natural_key(a).cmp(&natural_key(b)));

        let mut result = Vec::with_capacity(categories.len());
        for &name in categories {
            let prefix = format!("{name}_");
            let parts: Vec<Part> = files
                .iter()
                .filter(|file| file.starts_with(&prefix))
                .map(|file| {
                    known
                        .find(file)
                        .cloned()
                        .unwrap_or_else(|| Part::new(file.clone(), ColorMode::Fixed, None))
                })
                .collect();

            if parts.is_empty() {
                return Err(GenerationError::NoParts {
                    category: name.to_string(),
                    dir: dir.to_path_buf(),
                });
            }

            result.push(PartCategory {
                name: name.to_string(),
                parts,
            });
        }

        Ok(Self::new(result))
    }

    /// The built-in monster catalog.
    #[must_use]
    pub fn monster_id() -> Self {
        let canvas = Some(Bounds::full(MONSTER_CANVAS));
        let categories = MONSTER_CATEGORIES
            .iter()
            .map(|&(name, numbered, special, default_color)| PartCategory {
                name: name.to_string(),
                parts: variant_names(name, numbered, special)
                    .into_iter()
                    .map(|file| {
                        let color = monster_color(&file).unwrap_or(default_color);
                        let bounds = monster_bounds(&file).or(canvas);
                        Part::new(file, color, bounds)
                    })
                    .collect(),
            })
            .collect();

        Self::new(categories)
    }
}

/// Working canvas edge length of the monster fragments.
pub const MONSTER_CANVAS: u32 = 120;

/// `(category, numbered variants, special variants, default tint)`.
const MONSTER_CATEGORIES: [(&str, u32, u32, ColorMode); 6] = [
    ("legs", 5, 13, ColorMode::Fixed),
    ("hair", 5, 6, ColorMode::Fixed),
    ("arms", 5, 9, ColorMode::Fixed),
    ("body", 15, 5, ColorMode::Shared),
    ("eyes", 15, 6, ColorMode::Fixed),
    ("mouth", 10, 7, ColorMode::Fixed),
];

const SHARED_COLOR_PARTS: [&str; 5] = [
    "arms_S8.png",
    "legs_S5.png",
    "legs_S13.png",
    "mouth_S5.png",
    "mouth_S4.png",
];

const RANDOM_COLOR_PARTS: [&str; 30] = [
    "arms_3.png",
    "arms_4.png",
    "arms_5.png",
    "arms_S1.png",
    "arms_S3.png",
    "arms_S5.png",
    "arms_S6.png",
    "arms_S7.png",
    "arms_S9.png",
    "hair_S1.png",
    "hair_S2.png",
    "hair_S3.png",
    "hair_S5.png",
    "legs_1.png",
    "legs_2.png",
    "legs_3.png",
    "legs_5.png",
    "legs_S1.png",
    "legs_S2.png",
    "legs_S3.png",
    "legs_S4.png",
    "legs_S6.png",
    "legs_S7.png",
    "legs_S10.png",
    "legs_S12.png",
    "mouth_3.png",
    "mouth_4.png",
    "mouth_7.png",
    "mouth_10.png",
    "mouth_S6.png",
];

const RANGE_COLOR_PARTS: [(&str, f32, f32); 6] = [
    ("hair_S4.png", 0.6, 0.75),
    ("arms_S2.png", -0.05, 0.05),
    ("hair_S6.png", -0.05, 0.05),
    ("mouth_9.png", -0.05, 0.05),
    ("mouth_6.png", -0.05, 0.05),
    ("mouth_S2.png", 0.6, 0.75),
];

const PART_BOUNDS: [(&str, Bounds); 3] = [
    ("body_1.png", Bounds::new((22, 99), (17, 90))),
    ("body_2.png", Bounds::new((14, 104), (16, 89))),
    ("arms_S8.png", Bounds::new((2, 119), (18, 98))),
];

fn monster_color(file: &str) -> Option<ColorMode> {
    if SHARED_COLOR_PARTS.contains(&file) {
        Some(ColorMode::Shared)
    } else if RANDOM_COLOR_PARTS.contains(&file) {
        Some(ColorMode::Random)
    } else {
        RANGE_COLOR_PARTS
            .iter()
            .find(|(name, _, _)| *name == file)
            .map(|&(_, low, high)| ColorMode::Range(low, high))
    }
}

fn monster_bounds(file: &str) -> Option<Bounds> {
    PART_BOUNDS
        .iter()
        .find(|(name, _)| *name == file)
        .map(|&(_, bounds)| bounds)
}

fn variant_names(category: &str, numbered: u32, special: u32) -> Vec<String> {
    (1..=numbered)
        .map(|n| format!("{category}_{n}.png"))
        .chain((1..=special).map(|n| format!("{category}_S{n}.png")))
        .collect()
}

/// Sorts `body_2` before `body_10` and plain variants before `S` variants.
fn natural_key(name: &str) -> (String, bool, u32, String) {
    let stem = name.trim_end_matches(".png");
    let Some((prefix, variant)) = stem.rsplit_once('_') else {
        return (stem.to_string(), false, 0, String::new());
    };
    let special = variant.starts_with('S');
    let number = variant.trim_start_matches('S').parse().unwrap_or(u32::MAX);
    (prefix.to_string(), special, number, variant.to_string())
}
