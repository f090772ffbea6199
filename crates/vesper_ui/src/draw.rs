//! Draw list: a growable triangle list with one vertex layout for
//! everything the UI paints.
//!
//! Every shape is emitted as quads of six vertices (two triangles sharing
//! two corners). Solid shapes sample the atlas' white texel at UV (0, 0);
//! glyph quads sample their slice of the atlas row.

// `Pod` derive expands to an `unsafe impl`.
#![allow(unsafe_code)]

use crate::geometry::{Rect, Vec2};
use crate::glyph::GlyphAtlas;
use crate::style::Color;

/// Vertex for UI rendering.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position (x, y) in target pixels.
    pub position: [f32; 2],
    /// Color (RGBA).
    pub color: [f32; 4],
    /// Atlas UV coordinates.
    pub uv: [f32; 2],
}

impl Vertex {
    /// Creates a new vertex.
    #[must_use]
    pub const fn new(position: Vec2, color: Color, uv: [f32; 2]) -> Self {
        Self {
            position: [position.x, position.y],
            color: color.to_array(),
            uv,
        }
    }
}

/// Append-only vertex list, cleared (not freed) between frames.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    vertices: Vec<Vertex>,
}

impl DrawList {
    /// Initial vertex capacity.
    pub const INITIAL_CAPACITY: usize = 1024;

    /// Creates a draw list with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::INITIAL_CAPACITY)
    }

    /// Creates a draw list with room for `capacity` vertices.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(capacity),
        }
    }

    /// Resets the length to zero, keeping the allocation.
    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    /// Appends one vertex, growing by half the capacity plus one when full.
    #[inline]
    pub fn push(&mut self, vertex: Vertex) {
        if self.vertices.len() == self.vertices.capacity() {
            self.vertices.reserve_exact(self.vertices.capacity() / 2 + 1);
        }
        self.vertices.push(vertex);
    }

    /// Number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns true if nothing was drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Allocated vertex capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.vertices.capacity()
    }

    /// The vertices, in submission order.
    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Raw bytes for GPU upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Emits a quad from four corners given as (position, uv), in
    /// bottom-left, top-left, top-right, bottom-right order.
    fn quad(&mut self, corners: [(Vec2, [f32; 2]); 4], color: Color) {
        let [bl, tl, tr, br] = corners.map(|(p, uv)| Vertex::new(p, color, uv));
        for vertex in [bl, tl, tr, bl, tr, br] {
            self.push(vertex);
        }
    }

    /// Solid rectangle.
    pub fn rect(&mut self, rect: Rect, color: Color) {
        let (x0, y0, x1, y1) = (rect.x, rect.y, rect.right(), rect.bottom());
        self.quad(
            [
                (Vec2::new(x0, y1), [0.0, 0.0]),
                (Vec2::new(x0, y0), [0.0, 0.0]),
                (Vec2::new(x1, y0), [0.0, 0.0]),
                (Vec2::new(x1, y1), [0.0, 0.0]),
            ],
            color,
        );
    }

    /// One-pixel outline drawn inside `rect`.
    pub fn rect_outline(&mut self, rect: Rect, color: Color) {
        let t = 1.0;
        self.rect(Rect::new(rect.x, rect.y, rect.width, t), color);
        self.rect(Rect::new(rect.x, rect.bottom() - t, rect.width, t), color);
        self.rect(Rect::new(rect.x, rect.y, t, rect.height), color);
        self.rect(Rect::new(rect.right() - t, rect.y, t, rect.height), color);
    }

    /// Line segment with the given thickness.
    pub fn line(&mut self, start: Vec2, end: Vec2, color: Color, thickness: f32) {
        let angle = (end.y - start.y).atan2(end.x - start.x);
        let half = thickness / 2.0;
        let up = angle + std::f32::consts::FRAC_PI_2;
        let down = angle - std::f32::consts::FRAC_PI_2;
        let n_up = Vec2::new(half * up.cos(), half * up.sin());
        let n_down = Vec2::new(half * down.cos(), half * down.sin());

        let v0 = Vertex::new(start + n_up, color, [0.0, 0.0]);
        let v1 = Vertex::new(end + n_up, color, [0.0, 0.0]);
        let v2 = Vertex::new(start + n_down, color, [0.0, 0.0]);
        let v5 = Vertex::new(end + n_down, color, [0.0, 0.0]);
        for vertex in [v0, v1, v2, v1, v2, v5] {
            self.push(vertex);
        }
    }

    /// Check mark spanning the box from `min` to `max`.
    pub fn check_mark(&mut self, min: Vec2, max: Vec2, color: Color) {
        let width = max.x - min.x;
        let height = max.y - min.y;
        let left = Vec2::new(min.x + 0.1 * width, min.y + 0.4 * height);
        let middle = Vec2::new(min.x + 0.4 * width, min.y + 0.9 * height);
        let right = Vec2::new(max.x, min.y + 0.1 * height);
        self.line(left, middle, color, 2.0);
        self.line(middle, right, color, 2.0);
    }

    /// Glyph run starting at pen position `origin` (top of the line box).
    ///
    /// Every glyph is shifted left by `scroll`. With a `clip` rect, glyphs
    /// not horizontally inside it are skipped while the pen still advances.
    pub fn text(
        &mut self,
        atlas: &GlyphAtlas,
        text: &str,
        origin: Vec2,
        color: Color,
        scroll: f32,
        clip: Option<Rect>,
    ) {
        let atlas_w = atlas.width() as f32;
        let atlas_h = atlas.height() as f32;
        let mut pen_x = origin.x;

        for ch in text.chars() {
            let glyph = atlas.glyph(ch);
            let x0 = pen_x + glyph.bearing_left - scroll;
            let x1 = x0 + glyph.width;
            let y0 = origin.y - glyph.bearing_top + atlas.ascent();
            let y1 = y0 + glyph.height;
            pen_x += glyph.advance_x;

            if glyph.width <= 0.0 || glyph.height <= 0.0 {
                continue;
            }
            if let Some(clip) = clip {
                if x0 < clip.x || x1 > clip.right() {
                    continue;
                }
            }

            let tx = glyph.atlas_offset;
            let tw = glyph.width / atlas_w;
            let th = glyph.height / atlas_h;
            self.quad(
                [
                    (Vec2::new(x0, y1), [tx, th]),
                    (Vec2::new(x0, y0), [tx, 0.0]),
                    (Vec2::new(x1, y0), [tx + tw, 0.0]),
                    (Vec2::new(x1, y1), [tx + tw, th]),
                ],
                color,
            );
        }
    }
}

/// What a frame hands to the render backend.
#[derive(Debug, Clone, Default)]
pub struct DrawData {
    /// Render target rectangle; the projection maps it to clip space.
    pub target: Rect,
    /// The frame's triangles.
    pub list: DrawList,
}

impl DrawData {
    /// Creates empty draw data.
    #[must_use]
    pub fn new() -> Self {
        Self {
            target: Rect::ZERO,
            list: DrawList::new(),
        }
    }
}
