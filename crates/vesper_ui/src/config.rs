//! UI configuration, loaded once at startup from TOML.
//!
//! ```toml
//! [font]
//! path = "fonts/DejaVuSans.ttf"
//! pixel_height = 16.0
//!
//! [colors]
//! background = { r = 1.0, g = 1.0, b = 1.0 }
//! highlight = { r = 0.25, g = 0.75, b = 1.0, a = 0.15 }
//!
//! [metrics]
//! button_padding = 20.0
//! ```
//!
//! Every table and key is optional; missing values fall back to defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{UiError, UiResult};
use crate::style::Color;

/// Complete UI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Font selection for the rasterizer.
    pub font: FontConfig,
    /// Default colors pushed at the start of every frame.
    pub colors: ColorConfig,
    /// Widget dimensions.
    pub metrics: MetricsConfig,
}

/// Font selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Outline font file; `None` uses the built-in block glyphs.
    pub path: Option<PathBuf>,
    /// Rasterization size in pixels.
    pub pixel_height: f32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            path: None,
            pixel_height: 16.0,
        }
    }
}

/// Default colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Widget background.
    pub background: Color,
    /// Widget border.
    pub border: Color,
    /// Widget text.
    pub text: Color,
    /// Root background and border.
    pub root: Color,
    /// Hover and press overlay.
    pub highlight: Color,
    /// Check marks, slider handles and the text caret.
    pub accent: Color,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            border: Color::GRAY,
            text: Color::BLACK,
            root: Color::WHITE,
            highlight: Color::HIGHLIGHT,
            accent: Color::BLACK,
        }
    }
}

/// Widget dimensions, in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Horizontal padding added to button text.
    pub button_padding: f32,
    /// Side of a checkbox or radio box.
    pub check_box_size: f32,
    /// Width of a slider bar.
    pub slider_width: f32,
    /// Width of a slider handle.
    pub slider_handle_width: f32,
    /// Width of a text field.
    pub field_width: f32,
    /// Inner margin of a text field.
    pub field_margin: f32,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            button_padding: 20.0,
            check_box_size: 16.0,
            slider_width: 150.0,
            slider_handle_width: 8.0,
            field_width: 150.0,
            field_margin: 4.0,
        }
    }
}

impl UiConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// [`UiError::Config`] if the text is not valid TOML for this schema or
    /// a value is out of range.
    pub fn from_toml_str(text: &str) -> UiResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| UiError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// [`UiError::Io`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_file(path: impl AsRef<Path>) -> UiResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), "loading ui config");
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> UiResult<()> {
        if self.font.pixel_height.is_nan() || self.font.pixel_height <= 0.0 {
            return Err(UiError::Config(format!(
                "font.pixel_height must be positive, got {}",
                self.font.pixel_height
            )));
        }
        let m = &self.metrics;
        for (name, value) in [
            ("button_padding", m.button_padding),
            ("check_box_size", m.check_box_size),
            ("slider_width", m.slider_width),
            ("slider_handle_width", m.slider_handle_width),
            ("field_width", m.field_width),
            ("field_margin", m.field_margin),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(UiError::Config(format!("metrics.{name} must not be negative, got {value}")));
            }
        }
        Ok(())
    }
}
