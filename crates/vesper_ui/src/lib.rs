//! # VESPER UI
//!
//! Immediate-mode interface core. The application declares its whole UI
//! every frame; the library rebuilds a widget tree, solves layout, runs the
//! hot/active interaction machine and emits one textured triangle list.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          FRAME                                │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Input Events → Widget Calls → Layout X/Y → Draw → Backend   │
//! │       ↓              ↓              ↓          ↓            │
//! │  InputState     Label Lookup    4 Passes   Vertex List      │
//! │                 (prev frame)                                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//!
//! Widgets have no retained objects. Each frame's tree lives in an arena that
//! is dropped once the next frame has copied what it needs out of it. State
//! that must outlive a frame (text cursor, scroll offset, which widget holds
//! the mouse) is found again by label.
//!
//! ```no_run
//! use vesper_ui::{BlockGlyphs, UiConfig, UiContext};
//!
//! # fn main() -> vesper_ui::UiResult<()> {
//! let mut ui = UiContext::new(UiConfig::default(), Box::new(BlockGlyphs::default()));
//! let mut enabled = false;
//!
//! ui.begin_frame(800.0, 600.0)?;
//! ui.row_begin("Menu")?;
//! if ui.button("File")? {
//!     // open the file menu
//! }
//! ui.checkbox("Enabled", &mut enabled)?;
//! ui.row_end()?;
//! let draw = ui.end_frame()?;
//! assert!(!draw.list.is_empty());
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod context;
pub mod draw;
pub mod error;
pub mod geometry;
pub mod glyph;
pub mod input;
pub mod interaction;
pub mod layout;
pub mod style;
pub mod widget;
pub mod widgets;

pub use config::UiConfig;
pub use context::{RenderBackend, UiContext};
pub use draw::{DrawData, DrawList, Vertex};
pub use error::{RenderError, UiError, UiResult};
pub use geometry::{Axis, Rect, Vec2};
pub use glyph::{BlockGlyphs, GlyphAtlas, GlyphMetrics, GlyphSource, LineMetrics, RasterGlyph};
pub use input::{InputEvent, InputState, Key};
pub use interaction::{Activation, Interaction, Response};
pub use style::Color;
pub use widget::{Size, Widget, WidgetFlags, WidgetHandle, WidgetTree};
