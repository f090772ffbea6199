//! # VESPER Font
//!
//! Outline font rasterizer for the VESPER glyph atlas.
//!
//! [`FontRasterizer`] implements [`GlyphSource`] over `ab_glyph`, for the
//! printable ASCII range the atlas bakes. Bitmaps are 8-bit coverage, one
//! byte per pixel, row-major.
//!
//! ```no_run
//! use vesper_ui::{UiConfig, UiContext};
//!
//! let config = UiConfig::default();
//! let glyphs = vesper_font::load_or_fallback(&config.font);
//! let ui = UiContext::new(config, glyphs);
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

use std::path::Path;

use ab_glyph::{point, Font, FontArc, PxScale, ScaleFont};
use thiserror::Error;
use vesper_ui::config::FontConfig;
use vesper_ui::{BlockGlyphs, GlyphSource, LineMetrics, RasterGlyph};

/// Errors that can occur while loading a font.
#[derive(Error, Debug)]
pub enum FontError {
    /// The font file could not be read.
    #[error("font io error: {0}")]
    Io(#[from] std::io::Error),

    /// The bytes are not a font `ab_glyph` can parse.
    #[error("invalid font: {0}")]
    InvalidFont(#[from] ab_glyph::InvalidFont),

    /// The requested pixel height is zero, negative or not a number.
    #[error("invalid pixel height: {0}")]
    InvalidSize(f32),
}

/// Result type for font operations.
pub type FontResult<T> = Result<T, FontError>;

/// Glyph source backed by an outline font at a fixed pixel height.
pub struct FontRasterizer {
    font: FontArc,
    scale: PxScale,
}

impl FontRasterizer {
    /// Parses a font from memory.
    ///
    /// # Errors
    ///
    /// [`FontError::InvalidFont`] if the bytes do not parse,
    /// [`FontError::InvalidSize`] if `pixel_height` is not positive.
    pub fn from_bytes(bytes: Vec<u8>, pixel_height: f32) -> FontResult<Self> {
        if pixel_height.is_nan() || pixel_height <= 0.0 {
            return Err(FontError::InvalidSize(pixel_height));
        }
        let font = FontArc::try_from_vec(bytes)?;
        Ok(Self {
            font,
            scale: PxScale::from(pixel_height),
        })
    }

    /// Reads and parses a font file.
    ///
    /// # Errors
    ///
    /// [`FontError::Io`] if the file cannot be read, otherwise as
    /// [`from_bytes`](Self::from_bytes).
    pub fn from_file(path: impl AsRef<Path>, pixel_height: f32) -> FontResult<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        let font = Self::from_bytes(bytes, pixel_height)?;
        tracing::debug!(path = %path.as_ref().display(), pixel_height, "font loaded");
        Ok(font)
    }

    /// Pixel height the font is rasterized at.
    #[must_use]
    pub fn pixel_height(&self) -> f32 {
        self.scale.y
    }
}

impl GlyphSource for FontRasterizer {
    fn line_metrics(&self) -> LineMetrics {
        let scaled = self.font.as_scaled(self.scale);
        LineMetrics {
            ascent: scaled.ascent(),
            descent: scaled.descent(),
            line_height: scaled.height() + scaled.line_gap(),
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn rasterize(&self, ch: char) -> Option<RasterGlyph> {
        if !(' '..='~').contains(&ch) {
            return None;
        }
        let id = self.font.glyph_id(ch);
        // Glyph 0 is `.notdef`.
        if id.0 == 0 {
            return None;
        }

        let scaled = self.font.as_scaled(self.scale);
        let ascent = scaled.ascent();
        let advance_x = scaled.h_advance(id);

        let glyph = id.with_scale_and_position(self.scale, point(0.0, ascent));
        let Some(outlined) = self.font.outline_glyph(glyph) else {
            // No outline (space): advance only.
            return Some(RasterGlyph {
                advance_x,
                ..RasterGlyph::default()
            });
        };

        let bounds = outlined.px_bounds();
        let width = bounds.width().max(0.0) as u32;
        let height = bounds.height().max(0.0) as u32;
        let mut coverage = vec![0u8; width as usize * height as usize];
        outlined.draw(|x, y, c| {
            if x < width && y < height {
                coverage[(y * width + x) as usize] = (c.clamp(0.0, 1.0) * 255.0).round() as u8;
            }
        });

        Some(RasterGlyph {
            width,
            height,
            bearing_left: bounds.min.x,
            bearing_top: ascent - bounds.min.y,
            advance_x,
            advance_y: 0.0,
            coverage,
        })
    }
}

/// Loads the configured font, or the built-in block glyphs if no path is
/// set or the font cannot be loaded.
#[must_use]
pub fn load_or_fallback(config: &FontConfig) -> Box<dyn GlyphSource> {
    let Some(path) = &config.path else {
        return Box::new(BlockGlyphs::default());
    };

    match FontRasterizer::from_file(path, config.pixel_height) {
        Ok(font) => Box::new(font),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "font unavailable, using block glyphs");
            Box::new(BlockGlyphs::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vesper_ui::GlyphAtlas;

    #[test]
    fn test_garbage_bytes_rejected() {
        let err = FontRasterizer::from_bytes(vec![0, 1, 2, 3], 16.0).err().unwrap();
        assert!(matches!(err, FontError::InvalidFont(_)));
    }

    #[test]
    fn test_bad_size_rejected_before_parsing() {
        let err = FontRasterizer::from_bytes(Vec::new(), 0.0).err().unwrap();
        assert!(matches!(err, FontError::InvalidSize(_)));

        let err = FontRasterizer::from_bytes(Vec::new(), f32::NAN).err().unwrap();
        assert!(matches!(err, FontError::InvalidSize(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = FontRasterizer::from_file("/nonexistent/font.ttf", 16.0).err().unwrap();
        assert!(matches!(err, FontError::Io(_)));
    }

    #[test]
    fn test_fallback_without_path() {
        let source = load_or_fallback(&FontConfig::default());
        let atlas = GlyphAtlas::build(source.as_ref());
        assert_eq!(atlas.line_height(), 16.0);
        assert_eq!(atlas.glyph('A').advance_x, 8.0);
    }

    #[test]
    fn test_fallback_on_unreadable_font() {
        let config = FontConfig {
            path: Some("/nonexistent/font.ttf".into()),
            pixel_height: 24.0,
        };
        let source = load_or_fallback(&config);
        assert_eq!(source.line_metrics().line_height, 16.0);
        assert!(source.rasterize('\u{7f}').is_none());
    }
}
