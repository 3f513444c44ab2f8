//! Geometric "retro" icons: a mirrored 5x5 block pattern.

use image::{Rgba, RgbaImage};
use sha2::{Digest, Sha256};

use crate::domain::errors::GenerationError;
use crate::domain::ports::{IconGenerator, check_icon_size};

use super::compositor::{Compositor, ImageCompositor, hsl_to_rgb};

const GRID: u32 = 5;
const BACKGROUND: Rgba<u8> = Rgba([240, 240, 240, 255]);

/// Generator for symmetric block identicons. Needs no asset bundle.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetroGenerator<C = ImageCompositor> {
    compositor: C,
}

impl RetroGenerator<ImageCompositor> {
    /// Creates a new generator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            compositor: ImageCompositor,
        }
    }
}

impl<C: Compositor> RetroGenerator<C> {
    /// Which cells are filled, row-major, mirrored around the middle column.
    fn pattern(bytes: &[u8]) -> [[bool; GRID as usize]; GRID as usize] {
        let mut cells = [[false; GRID as usize]; GRID as usize];
        let half = GRID.div_ceil(2) as usize;

        for (row, cells_row) in cells.iter_mut().enumerate() {
            for col in 0..half {
                let bit = row * half + col;
                let byte = bytes[2 + bit / 8];
                let on = (byte >> (bit % 8)) & 1 == 1;
                cells_row[col] = on;
                cells_row[GRID as usize - 1 - col] = on;
            }
        }

        cells
    }

    fn digest(seed: &str) -> Vec<u8> {
        match hex::decode(seed) {
            Ok(bytes) if bytes.len() >= 8 => bytes,
            _ => Sha256::digest(seed.as_bytes()).to_vec(),
        }
    }
}

impl<C: Compositor> IconGenerator for RetroGenerator<C> {
    fn build(&self, seed: &str, size: u32) -> Result<Vec<u8>, GenerationError> {
        check_icon_size(size)?;

        let bytes = Self::digest(seed);
        let hue = f32::from(u16::from_be_bytes([bytes[0], bytes[1]])) / f32::from(u16::MAX);
        let [r, g, b] = hsl_to_rgb(hue, 0.55, 0.5);
        let foreground = Rgba([r, g, b, 255]);
        let cells = Self::pattern(&bytes);

        // Half a cell of margin on each side: 12 half-cell units in total.
        let units = 2 * GRID + 2;
        let canvas = RgbaImage::from_fn(size, size, |x, y| {
            let ux = u64::from(x) * u64::from(units) / u64::from(size);
            let uy = u64::from(y) * u64::from(units) / u64::from(size);
            if ux == 0 || uy == 0 || ux > u64::from(2 * GRID) || uy > u64::from(2 * GRID) {
                return BACKGROUND;
            }
            let col = usize::try_from((ux - 1) / 2).unwrap_or(0);
            let row = usize::try_from((uy - 1) / 2).unwrap_or(0);
            if cells[row][col] { foreground } else { BACKGROUND }
        });

        self.compositor.encode(&canvas, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MAX_ICON_SIZE;

    #[test]
    fn test_build_is_deterministic() {
        let generator = RetroGenerator::new();
        let a = generator.build("0bc83cb571cd1c50ba6f3e8a78ef1346", 48).unwrap();
        let b = generator.build("0bc83cb571cd1c50ba6f3e8a78ef1346", 48).unwrap();
        assert_eq!(a, b);

        let decoded = image::load_from_memory(&a).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (48, 48));
    }

    #[test]
    fn test_pattern_is_mirrored() {
        let bytes = RetroGenerator::<ImageCompositor>::digest("some seed");
        let cells = RetroGenerator::<ImageCompositor>::pattern(&bytes);
        for row in cells {
            assert_eq!(row[0], row[4]);
            assert_eq!(row[1], row[3]);
        }
    }

    #[test]
    fn test_non_hex_seed_is_accepted() {
        assert!(RetroGenerator::new().build("not a hash", 10).is_ok());
        assert!(matches!(
            RetroGenerator::new().build("abc", 0),
            Err(GenerationError::InvalidSize(0))
        ));
    }

    #[test]
    fn test_oversized_request_is_rejected() {
        let generator = RetroGenerator::new();
        for size in [MAX_ICON_SIZE + 1, u32::MAX] {
            assert!(matches!(
                generator.build("0bc83cb571cd1c50ba6f3e8a78ef1346", size),
                Err(GenerationError::InvalidSize(s)) if s == size
            ));
        }
    }
}
