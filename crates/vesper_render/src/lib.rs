//! # VESPER Render
//!
//! wgpu backend for VESPER UI. [`UiRenderer`] implements
//! [`RenderBackend`](vesper_ui::RenderBackend): the glyph atlas becomes an
//! R8 texture sampled with nearest filtering and repeat addressing, and the
//! frame's triangle list is drawn in one call with alpha blending and no
//! depth test.
//!
//! ```no_run
//! # fn frame(
//! #     ui: &mut vesper_ui::UiContext,
//! #     renderer: &mut vesper_render::UiRenderer,
//! #     surface: &wgpu::Surface,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let frame = surface.get_current_texture()?;
//! let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
//! renderer.set_target(Some(view));
//! ui.present(renderer)?;
//! renderer.set_target(None);
//! frame.present();
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod projection;
pub mod renderer;

pub use projection::{orthographic, Mat4};
pub use renderer::UiRenderer;
