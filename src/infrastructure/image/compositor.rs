//! Low-level image operations used by the icon generators.

use std::io::Cursor;
use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tracing::trace;

use crate::domain::errors::GenerationError;
use crate::domain::ports::check_icon_size;

/// Inclusive pixel rectangle that limits colorization to the opaque area of
/// a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    /// Horizontal range `(min, max)`.
    pub x: (u32, u32),
    /// Vertical range `(min, max)`.
    pub y: (u32, u32),
}

impl Bounds {
    /// Creates bounds from inclusive ranges.
    #[must_use]
    pub const fn new(x: (u32, u32), y: (u32, u32)) -> Self {
        Self { x, y }
    }

    /// Bounds covering a whole `size` x `size` canvas.
    #[must_use]
    pub const fn full(size: u32) -> Self {
        let max = size.saturating_sub(1);
        Self::new((0, max), (0, max))
    }
}

/// Image primitives needed to build layered icons.
pub trait Compositor: Send + Sync {
    /// Loads and decodes a fragment, normalized to `canvas` x `canvas`.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or decoded.
    fn load(&self, path: &Path, canvas: u32) -> Result<RgbaImage, GenerationError>;

    /// Tints the fragment with the given hue and saturation (both `0.0..=1.0`),
    /// keeping each pixel's lightness and alpha. Without `bounds` the
    /// fragment is left untouched.
    fn colorize(&self, layer: &mut RgbaImage, hue: f32, saturation: f32, bounds: Option<Bounds>);

    /// Alpha-composites `layer` onto `canvas`.
    fn apply(&self, canvas: &mut RgbaImage, layer: &RgbaImage);

    /// Resizes the canvas to `size` x `size` and encodes it as PNG.
    ///
    /// # Errors
    /// Returns error if encoding fails.
    fn encode(&self, canvas: &RgbaImage, size: u32) -> Result<Vec<u8>, GenerationError>;
}

/// [`Compositor`] backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCompositor;

impl ImageCompositor {
    /// Creates a new compositor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Compositor for ImageCompositor {
    fn load(&self, path: &Path, canvas: u32) -> Result<RgbaImage, GenerationError> {
        let bytes = std::fs::read(path)
            .map_err(|e| GenerationError::Decode(format!("{}: {e}", path.display())))?;
        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| GenerationError::Decode(format!("{}: {e}", path.display())))?
            .into_rgba8();

        if decoded.dimensions() == (canvas, canvas) {
            Ok(decoded)
        } else {
            trace!(
                path = %path.display(),
                width = decoded.width(),
                height = decoded.height(),
                "Normalizing fragment to canvas"
            );
            Ok(imageops::resize(&decoded, canvas, canvas, FilterType::Lanczos3))
        }
    }

    fn colorize(&self, layer: &mut RgbaImage, hue: f32, saturation: f32, bounds: Option<Bounds>) {
        let Some(bounds) = bounds else {
            return;
        };

        let (width, height) = layer.dimensions();
        if width == 0 || height == 0 {
            return;
        }

        let x_max = bounds.x.1.min(width - 1);
        let y_max = bounds.y.1.min(height - 1);

        for y in bounds.y.0..=y_max {
            for x in bounds.x.0..=x_max {
                let pixel = layer.get_pixel_mut(x, y);
                let Rgba([r, g, b, a]) = *pixel;
                if a == 0 {
                    continue;
                }

                let lightness = (f32::from(r) + f32::from(g) + f32::from(b)) / (3.0 * 255.0);
                let [nr, ng, nb] = hsl_to_rgb(hue, saturation, lightness);
                *pixel = Rgba([nr, ng, nb, a]);
            }
        }
    }

    fn apply(&self, canvas: &mut RgbaImage, layer: &RgbaImage) {
        imageops::overlay(canvas, layer, 0, 0);
    }

    fn encode(&self, canvas: &RgbaImage, size: u32) -> Result<Vec<u8>, GenerationError> {
        check_icon_size(size)?;

        let output = if canvas.dimensions() == (size, size) {
            canvas.clone()
        } else {
            imageops::resize(canvas, size, size, FilterType::Lanczos3)
        };

        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(output)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| GenerationError::Encode(e.to_string()))?;

        Ok(bytes)
    }
}

/// Converts HSL (all components `0.0..=1.0`) to 8-bit RGB.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::many_single_char_names)]
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [u8; 3] {
    let h = hue.rem_euclid(1.0);
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);

    if s == 0.0 {
        let v = (l * 255.0).round() as u8;
        return [v, v, v];
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    let channel = |t: f32| {
        let t = t.rem_euclid(1.0);
        let v = if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        };
        (v * 255.0).round().clamp(0.0, 255.0) as u8
    };

    [channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn gray_layer(size: u32, value: u8) -> RgbaImage {
        RgbaImage::from_pixel(size, size, Rgba([value, value, value, 255]))
    }

    #[test]
    fn test_hsl_to_rgb_primaries() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), [255, 0, 0]);
        assert_eq!(hsl_to_rgb(1.0 / 3.0, 1.0, 0.5), [0, 255, 0]);
        assert_eq!(hsl_to_rgb(2.0 / 3.0, 1.0, 0.5), [0, 0, 255]);
        assert_eq!(hsl_to_rgb(0.3, 0.0, 1.0), [255, 255, 255]);
    }

    #[test]
    fn test_colorize_without_bounds_is_identity() {
        let compositor = ImageCompositor::new();
        let mut layer = gray_layer(4, 128);
        let original = layer.clone();

        compositor.colorize(&mut layer, 0.5, 0.8, None);
        assert_eq!(layer, original);
    }

    #[test]
    fn test_colorize_respects_bounds_and_alpha() {
        let compositor = ImageCompositor::new();
        let mut layer = gray_layer(4, 128);
        layer.put_pixel(1, 1, Rgba([128, 128, 128, 0]));

        compositor.colorize(&mut layer, 0.0, 1.0, Some(Bounds::new((0, 1), (0, 1))));

        let tinted = layer.get_pixel(0, 0);
        assert!(tinted[0] > tinted[1]);
        assert_eq!(tinted[3], 255);
        assert_eq!(*layer.get_pixel(1, 1), Rgba([128, 128, 128, 0]));
        assert_eq!(*layer.get_pixel(2, 2), Rgba([128, 128, 128, 255]));
    }

    #[test]
    fn test_apply_blends_alpha() {
        let compositor = ImageCompositor::new();
        let mut canvas = gray_layer(2, 0);
        let mut layer = RgbaImage::new(2, 2);
        layer.put_pixel(0, 0, Rgba([255, 255, 255, 255]));

        compositor.apply(&mut canvas, &layer);

        assert_eq!(*canvas.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
        assert_eq!(*canvas.get_pixel(1, 1), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_load_normalizes_dimensions() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("odd.png");
        RgbaImage::from_pixel(7, 3, Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let layer = ImageCompositor::new().load(&path, 16).unwrap();
        assert_eq!(layer.dimensions(), (16, 16));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        let result = ImageCompositor::new().load(&temp.path().join("nope.png"), 16);
        assert!(matches!(result, Err(GenerationError::Decode(_))));
    }

    #[test]
    fn test_encode_resizes_to_png() {
        let compositor = ImageCompositor::new();
        let bytes = compositor.encode(&gray_layer(8, 200), 3).unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (3, 3));
        assert!(matches!(compositor.encode(&gray_layer(8, 200), 0), Err(GenerationError::InvalidSize(0))));
        assert!(matches!(
            compositor.encode(&gray_layer(8, 200), u32::MAX),
            Err(GenerationError::InvalidSize(u32::MAX))
        ));
    }
}
