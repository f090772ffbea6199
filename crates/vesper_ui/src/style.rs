//! Colors and the default palette.
//!
//! There is no theming layer: colors come from per-frame color stacks on the
//! context, seeded from [`UiConfig`](crate::UiConfig).

use serde::{Deserialize, Serialize};

/// RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red component (0-1).
    pub r: f32,
    /// Green component (0-1).
    pub g: f32,
    /// Blue component (0-1).
    pub b: f32,
    /// Alpha component (0-1).
    #[serde(default = "opaque")]
    pub a: f32,
}

const fn opaque() -> f32 {
    1.0
}

impl Color {
    /// Transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);
    /// Solid black.
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    /// Solid white.
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    /// Border gray.
    pub const GRAY: Self = Self::rgb(0.86, 0.86, 0.86);
    /// Panel gray.
    pub const LIGHT_GRAY: Self = Self::rgb(0.93, 0.93, 0.93);
    /// Muted gray.
    pub const DARK_GRAY: Self = Self::rgb(0.5, 0.5, 0.5);
    /// Hover/press overlay tint.
    pub const HIGHLIGHT: Self = Self::rgba(0.25, 0.75, 1.0, 0.15);

    /// Creates a color from RGBA values (0-1).
    #[must_use]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from RGB values (0-1) with full alpha.
    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Creates a color from hex value (0xRRGGBBAA).
    #[must_use]
    pub fn hex(hex: u32) -> Self {
        let r = ((hex >> 24) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let b = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let a = (hex & 0xFF) as f32 / 255.0;
        Self::rgba(r, g, b, a)
    }

    /// Returns a new color with different alpha.
    #[must_use]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self::rgba(self.r, self.g, self.b, a)
    }

    /// Converts to array format.
    #[must_use]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color() {
        let color = Color::hex(0xFF_00_00_FF);
        assert!((color.r - 1.0).abs() < 0.01);
        assert!(color.g.abs() < 0.01);
        assert!((color.a - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_alpha_defaults_to_opaque() {
        let color: Color = toml::from_str("r = 0.5\ng = 0.5\nb = 0.5").unwrap();
        assert_eq!(color.a, 1.0);
        assert_eq!(color.with_alpha(0.2).to_array(), [0.5, 0.5, 0.5, 0.2]);
    }
}
