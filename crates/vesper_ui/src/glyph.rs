//! Glyph atlas: per-character metrics and a single-row coverage bitmap.
//!
//! The atlas covers printable ASCII (32..128). Texel 0 of the bitmap is
//! fully covered so untextured geometry can sample UV (0, 0) and come out
//! as its vertex color.

/// Number of entries in the glyph table.
pub const GLYPH_COUNT: usize = 128;

/// First character baked into the atlas.
pub const FIRST_PRINTABLE: u8 = 32;

/// Vertical font metrics, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LineMetrics {
    /// Distance from the baseline to the top of the tallest glyph.
    pub ascent: f32,
    /// Distance from the baseline to the bottom (negative below baseline).
    pub descent: f32,
    /// Baseline-to-baseline distance.
    pub line_height: f32,
}

/// A rasterized glyph as handed over by a [`GlyphSource`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RasterGlyph {
    /// Bitmap width in pixels.
    pub width: u32,
    /// Bitmap height in pixels.
    pub height: u32,
    /// Horizontal offset from the pen position to the bitmap's left edge.
    pub bearing_left: f32,
    /// Vertical offset from the baseline up to the bitmap's top edge.
    pub bearing_top: f32,
    /// Pen advance after this glyph.
    pub advance_x: f32,
    /// Vertical pen advance (zero for horizontal scripts).
    pub advance_y: f32,
    /// Row-major coverage, `width * height` bytes.
    pub coverage: Vec<u8>,
}

/// Supplies glyph bitmaps and metrics to the atlas builder.
///
/// Implemented by font rasterizers outside this crate; [`BlockGlyphs`] is a
/// built-in fixed-cell source.
pub trait GlyphSource {
    /// Vertical metrics shared by every glyph.
    fn line_metrics(&self) -> LineMetrics;

    /// Rasterizes one character. `None` means the source has no glyph for
    /// it; the atlas then records zero metrics.
    fn rasterize(&self, ch: char) -> Option<RasterGlyph>;
}

/// Metrics for one atlas entry.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GlyphMetrics {
    /// Horizontal pen advance.
    pub advance_x: f32,
    /// Vertical pen advance.
    pub advance_y: f32,
    /// Bitmap width.
    pub width: f32,
    /// Bitmap height.
    pub height: f32,
    /// Bitmap top bearing.
    pub bearing_top: f32,
    /// Bitmap left bearing.
    pub bearing_left: f32,
    /// Normalized horizontal offset of the bitmap in the atlas.
    pub atlas_offset: f32,
}

/// Baked glyph table and coverage bitmap.
#[derive(Debug, Clone)]
pub struct GlyphAtlas {
    glyphs: Vec<GlyphMetrics>,
    width: u32,
    height: u32,
    line: LineMetrics,
    bitmap: Vec<u8>,
}

impl GlyphAtlas {
    /// Bakes the printable ASCII range of `source` into a single-row atlas.
    #[must_use]
    pub fn build(source: &dyn GlyphSource) -> Self {
        let rasters: Vec<(u8, RasterGlyph)> = (FIRST_PRINTABLE..128)
            .map(|c| (c, source.rasterize(char::from(c)).unwrap_or_default()))
            .collect();

        // +1 column for the white texel.
        let width = 1 + rasters.iter().map(|(_, g)| g.width).sum::<u32>();
        let height = rasters.iter().map(|(_, g)| g.height).max().unwrap_or(0).max(1);

        let mut bitmap = vec![0u8; (width * height) as usize];
        bitmap[0] = 255;

        let mut glyphs = vec![GlyphMetrics::default(); GLYPH_COUNT];
        let mut atlas_x = 1u32;
        for (c, raster) in &rasters {
            glyphs[*c as usize] = GlyphMetrics {
                advance_x: raster.advance_x,
                advance_y: raster.advance_y,
                width: raster.width as f32,
                height: raster.height as f32,
                bearing_top: raster.bearing_top,
                bearing_left: raster.bearing_left,
                atlas_offset: atlas_x as f32 / width as f32,
            };

            let row_len = raster.width as usize;
            if raster.coverage.len() >= row_len * raster.height as usize {
                for y in 0..raster.height as usize {
                    let dest = y * width as usize + atlas_x as usize;
                    bitmap[dest..dest + row_len]
                        .copy_from_slice(&raster.coverage[y * row_len..(y + 1) * row_len]);
                }
            } else {
                tracing::warn!(ch = *c, "glyph coverage shorter than its bitmap, left blank");
            }
            atlas_x += raster.width;
        }

        tracing::debug!(width, height, "glyph atlas built");

        Self {
            glyphs,
            width,
            height,
            line: source.line_metrics(),
            bitmap,
        }
    }

    /// Metrics for `ch`; characters outside the table are zero-sized.
    #[inline]
    #[must_use]
    pub fn glyph(&self, ch: char) -> GlyphMetrics {
        self.glyphs.get(ch as usize).copied().unwrap_or_default()
    }

    /// Sum of advances over the half-open char range `[start, end)`, rounded.
    #[must_use]
    pub fn measure_width(&self, text: &str, start: usize, end: usize) -> f32 {
        text.chars()
            .skip(start)
            .take(end.saturating_sub(start))
            .map(|c| self.glyph(c).advance_x)
            .sum::<f32>()
            .round()
    }

    /// Width of the whole string.
    #[must_use]
    pub fn text_width(&self, text: &str) -> f32 {
        self.measure_width(text, 0, usize::MAX)
    }

    /// One line height per line of `text`, rounded.
    #[must_use]
    pub fn measure_height(&self, text: &str) -> f32 {
        let lines = 1 + text.chars().filter(|&c| c == '\n').count();
        (self.line.line_height * lines as f32).round()
    }

    /// Atlas width in texels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Atlas height in texels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Ascent above the baseline.
    #[must_use]
    pub const fn ascent(&self) -> f32 {
        self.line.ascent
    }

    /// Descent below the baseline.
    #[must_use]
    pub const fn descent(&self) -> f32 {
        self.line.descent
    }

    /// Height of one line of text.
    #[must_use]
    pub const fn line_height(&self) -> f32 {
        self.line.line_height
    }

    /// Single-channel coverage, row-major, `width * height` bytes.
    #[must_use]
    pub fn bitmap(&self) -> &[u8] {
        &self.bitmap
    }
}

/// Fixed-cell glyph source that draws every printable character as a
/// hollow box. Used headless and when no font file can be loaded.
#[derive(Debug, Clone, Copy)]
pub struct BlockGlyphs {
    /// Pen advance per character.
    pub cell_width: u32,
    /// Line height.
    pub cell_height: u32,
}

impl Default for BlockGlyphs {
    fn default() -> Self {
        Self {
            cell_width: 8,
            cell_height: 16,
        }
    }
}

impl GlyphSource for BlockGlyphs {
    fn line_metrics(&self) -> LineMetrics {
        let ascent = (self.cell_height * 3 / 4) as f32;
        LineMetrics {
            ascent,
            descent: ascent - self.cell_height as f32,
            line_height: self.cell_height as f32,
        }
    }

    fn rasterize(&self, ch: char) -> Option<RasterGlyph> {
        if !(' '..='~').contains(&ch) {
            return None;
        }
        let advance_x = self.cell_width as f32;
        if ch == ' ' {
            return Some(RasterGlyph {
                advance_x,
                ..RasterGlyph::default()
            });
        }

        let width = self.cell_width.saturating_sub(2).max(1);
        let height = (self.cell_height * 3 / 4).saturating_sub(2).max(1);
        let coverage = (0..height)
            .flat_map(|y| {
                (0..width).map(move |x| {
                    if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                        255
                    } else {
                        0
                    }
                })
            })
            .collect();

        Some(RasterGlyph {
            width,
            height,
            bearing_left: 1.0,
            bearing_top: height as f32,
            advance_x,
            advance_y: 0.0,
            coverage,
        })
    }
}
