//! Frame lifecycle and the widget build protocol.
//!
//! ```text
//! begin_frame ─► widget calls ─► end_frame ─► present
//!     │              │               │
//!     │              │               ├─ reset per-frame input
//!     │              │               ├─ layout X, layout Y
//!     │              │               ├─ emit draw list
//!     │              │               ├─ current tree becomes previous
//!     │              │               └─ release capture if the active label vanished
//!     │              └─ look up last frame's twin by label, link under parent
//!     └─ clear stacks and draw list, build "~Root"
//! ```

use crate::config::UiConfig;
use crate::draw::{DrawData, DrawList};
use crate::error::{RenderError, UiError, UiResult};
use crate::geometry::{Axis, Rect, Vec2};
use crate::glyph::{GlyphAtlas, GlyphSource};
use crate::input::{InputEvent, InputState};
use crate::interaction::Interaction;
use crate::layout;
use crate::style::Color;
use crate::widget::{Size, Widget, WidgetFlags, WidgetHandle, WidgetTree};

/// Label of the synthetic root widget.
pub const ROOT_LABEL: &str = "~Root";

/// Consumer of finished frames.
///
/// Implemented by GPU backends. Failures are reported as [`RenderError`] and
/// leave the UI state untouched.
pub trait RenderBackend {
    /// Uploads the glyph atlas. Called once, before the first frame.
    ///
    /// # Errors
    ///
    /// If the backend cannot create or fill the atlas texture.
    fn upload_atlas(&mut self, atlas: &GlyphAtlas) -> Result<(), RenderError>;

    /// Draws one frame's triangles.
    ///
    /// # Errors
    ///
    /// If the frame could not be submitted.
    fn render(&mut self, draw: &DrawData) -> Result<(), RenderError>;
}

/// All UI state. Every entry point takes it by `&mut`.
pub struct UiContext {
    pub(crate) config: UiConfig,
    glyphs: Box<dyn GlyphSource>,
    pub(crate) atlas: Option<GlyphAtlas>,
    atlas_uploaded: bool,
    pub(crate) current: WidgetTree,
    pub(crate) previous: WidgetTree,
    frame: u32,
    in_frame: bool,
    pub(crate) input: InputState,
    pub(crate) interaction: Interaction,
    parent_stack: Vec<u32>,
    pref_size_stacks: [Vec<Size>; 2],
    background_stack: Vec<Color>,
    border_stack: Vec<Color>,
    text_color_stack: Vec<Color>,
    draw: DrawData,
}

impl UiContext {
    /// Creates a context. The glyph atlas is built from `glyphs` on the
    /// first [`begin_frame`](Self::begin_frame).
    #[must_use]
    pub fn new(config: UiConfig, glyphs: Box<dyn GlyphSource>) -> Self {
        Self {
            config,
            glyphs,
            atlas: None,
            atlas_uploaded: false,
            current: WidgetTree::new(1),
            previous: WidgetTree::new(0),
            frame: 0,
            in_frame: false,
            input: InputState::new(),
            interaction: Interaction::new(),
            parent_stack: Vec::with_capacity(16),
            pref_size_stacks: [Vec::with_capacity(16), Vec::with_capacity(16)],
            background_stack: Vec::with_capacity(16),
            border_stack: Vec::with_capacity(16),
            text_color_stack: Vec::with_capacity(16),
            draw: DrawData::new(),
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    /// Current input state.
    #[must_use]
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Feeds one host event. Call before declaring the frame's widgets.
    pub fn handle_event(&mut self, event: InputEvent) {
        self.input.handle_event(event);
    }

    /// Interaction state.
    #[must_use]
    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// The glyph atlas, once the first frame has begun.
    #[must_use]
    pub fn atlas(&self) -> Option<&GlyphAtlas> {
        self.atlas.as_ref()
    }

    /// Number of frames begun.
    #[must_use]
    pub const fn frame_count(&self) -> u32 {
        self.frame
    }

    /// The tree being built (or just laid out, before `end_frame` swaps it).
    #[must_use]
    pub fn current_tree(&self) -> &WidgetTree {
        &self.current
    }

    /// The last completed frame's tree.
    #[must_use]
    pub fn previous_tree(&self) -> &WidgetTree {
        &self.previous
    }

    /// The last frame's draw data.
    #[must_use]
    pub fn draw_data(&self) -> &DrawData {
        &self.draw
    }

    /// Starts a frame for a render target of `width` x `height` pixels.
    ///
    /// # Errors
    ///
    /// [`UiError::FrameInProgress`] if the previous frame was not ended.
    pub fn begin_frame(&mut self, width: f32, height: f32) -> UiResult<()> {
        if self.in_frame {
            return Err(UiError::FrameInProgress);
        }
        if self.atlas.is_none() {
            self.atlas = Some(GlyphAtlas::build(self.glyphs.as_ref()));
        }

        self.frame = self.frame.wrapping_add(1);
        self.current.reset(self.frame);
        self.draw.list.clear();
        self.draw.target = Rect::new(0.0, 0.0, width, height);

        self.parent_stack.clear();
        for stack in &mut self.pref_size_stacks {
            stack.clear();
        }
        self.background_stack.clear();
        self.border_stack.clear();
        self.text_color_stack.clear();
        self.background_stack.push(self.config.colors.background);
        self.border_stack.push(self.config.colors.border);
        self.text_color_stack.push(self.config.colors.text);

        self.in_frame = true;
        let root = self.build_widget(ROOT_LABEL, WidgetFlags::DRAW_BACKGROUND | WidgetFlags::DRAW_BORDER)?;
        if let Some(w) = self.current.get_mut(root) {
            w.child_layout_axis = Some(Axis::Y);
            w.rect = Rect::new(0.0, 0.0, width, height);
            w.pref_size = [Size::Pixels(width), Size::Pixels(height)];
            w.background = self.config.colors.root;
            w.border = self.config.colors.root;
        }
        self.parent_stack.push(root.index());
        Ok(())
    }

    /// Builds a widget as the last child of the current parent.
    ///
    /// Persistent state (active flag, cursor, scroll offset) is copied from
    /// the previous frame's widget with the same label. Colors and preferred
    /// sizes come from the tops of the stacks; callers may override them
    /// through [`widget_mut`](Self::widget_mut).
    ///
    /// # Errors
    ///
    /// [`UiError::NoFrameInProgress`] outside a frame,
    /// [`UiError::DuplicateLabel`] if `label` was already built this frame.
    pub fn build_widget(&mut self, label: &str, flags: WidgetFlags) -> UiResult<WidgetHandle> {
        if !self.in_frame {
            return Err(UiError::NoFrameInProgress);
        }

        let mut widget = Widget::new(label, flags);
        if let Some(previous) = self.previous.find(label) {
            widget.inherit(previous);
        }
        widget.background = self.background_stack.last().copied().unwrap_or(self.config.colors.background);
        widget.border = self.border_stack.last().copied().unwrap_or(self.config.colors.border);
        widget.text_color = self.text_color_stack.last().copied().unwrap_or(self.config.colors.text);
        for axis in Axis::ALL {
            if let Some(&size) = self.pref_size_stacks[axis.index()].last() {
                widget.set_pref(axis, size);
            }
        }

        self.current.insert(widget, self.parent_stack.last().copied())
    }

    /// Fails the way [`build_widget`](Self::build_widget) would for
    /// `label`, before any behavior touches interaction state.
    pub(crate) fn ensure_buildable(&self, label: &str) -> UiResult<()> {
        if !self.in_frame {
            return Err(UiError::NoFrameInProgress);
        }
        if self.current.contains_label(label) {
            return Err(UiError::DuplicateLabel(label.to_owned()));
        }
        Ok(())
    }

    /// Widget built this frame.
    #[must_use]
    pub fn widget(&self, handle: WidgetHandle) -> Option<&Widget> {
        self.current.get(handle)
    }

    /// Mutable widget built this frame.
    #[must_use]
    pub fn widget_mut(&mut self, handle: WidgetHandle) -> Option<&mut Widget> {
        self.current.get_mut(handle)
    }

    /// Rectangle the widget with `label` had at the end of the last frame.
    #[must_use]
    pub fn previous_rect(&self, label: &str) -> Option<Rect> {
        self.previous.find(label).map(|w| w.rect)
    }

    /// Makes `handle` the parent of subsequently built widgets.
    ///
    /// # Errors
    ///
    /// [`UiError::StaleHandle`] if the handle is from another frame.
    pub fn push_parent(&mut self, handle: WidgetHandle) -> UiResult<()> {
        if self.current.get(handle).is_none() {
            return Err(UiError::StaleHandle {
                handle: handle.generation(),
                current: self.current.generation(),
            });
        }
        self.parent_stack.push(handle.index());
        Ok(())
    }

    /// Restores the previous parent.
    ///
    /// # Errors
    ///
    /// [`UiError::ParentStackUnderflow`] when only the root is left.
    pub fn pop_parent(&mut self) -> UiResult<WidgetHandle> {
        if self.parent_stack.len() <= 1 {
            return Err(UiError::ParentStackUnderflow);
        }
        let index = self.parent_stack.pop().ok_or(UiError::ParentStackUnderflow)?;
        Ok(WidgetHandle::new(index, self.current.generation()))
    }

    /// Preferred size for subsequently built widgets on `axis`.
    pub fn push_pref_size(&mut self, axis: Axis, size: Size) {
        self.pref_size_stacks[axis.index()].push(size);
    }

    /// Pops the preferred size on `axis`.
    pub fn pop_pref_size(&mut self, axis: Axis) -> Option<Size> {
        self.pref_size_stacks[axis.index()].pop()
    }

    /// Background color for subsequently built widgets.
    pub fn push_background(&mut self, color: Color) {
        self.background_stack.push(color);
    }

    /// Pops the background color.
    pub fn pop_background(&mut self) -> Option<Color> {
        self.background_stack.pop()
    }

    /// Border color for subsequently built widgets.
    pub fn push_border(&mut self, color: Color) {
        self.border_stack.push(color);
    }

    /// Pops the border color.
    pub fn pop_border(&mut self) -> Option<Color> {
        self.border_stack.pop()
    }

    /// Text color for subsequently built widgets.
    pub fn push_text_color(&mut self, color: Color) {
        self.text_color_stack.push(color);
    }

    /// Pops the text color.
    pub fn pop_text_color(&mut self) -> Option<Color> {
        self.text_color_stack.pop()
    }

    /// Finishes the frame: lays the tree out, emits the draw list and makes
    /// this frame's tree the one the next frame looks labels up in.
    ///
    /// On a layout error the draw list stays empty, but the tree is still
    /// kept so persistent widget state survives into the next frame.
    ///
    /// # Errors
    ///
    /// [`UiError::NoFrameInProgress`] outside a frame, or the layout error.
    pub fn end_frame(&mut self) -> UiResult<&DrawData> {
        if !self.in_frame {
            return Err(UiError::NoFrameInProgress);
        }
        self.in_frame = false;
        self.input.end_frame();

        if self.parent_stack.len() != 1 {
            tracing::warn!(depth = self.parent_stack.len(), "unbalanced parent stack at end of frame");
        }
        for axis in Axis::ALL {
            let depth = self.pref_size_stacks[axis.index()].len();
            if depth != 0 {
                tracing::warn!(?axis, depth, "unbalanced preferred size stack at end of frame");
            }
        }

        let result = match &self.atlas {
            Some(atlas) => {
                let solved = layout::layout(&mut self.current, atlas);
                if solved.is_ok() {
                    emit(&self.current, atlas, &self.config, &mut self.draw.list);
                }
                solved
            }
            None => Ok(()),
        };

        std::mem::swap(&mut self.current, &mut self.previous);
        let built = &self.previous;
        self.interaction.retain_if_built(|label| built.contains_label(label));

        result?;
        tracing::trace!(frame = self.frame, widgets = self.previous.len(), vertices = self.draw.list.len(), "frame ended");
        Ok(&self.draw)
    }

    /// Hands the last frame to a backend, uploading the atlas first if this
    /// backend has not seen it yet.
    ///
    /// # Errors
    ///
    /// The backend's error; it is also logged. UI state is unaffected.
    pub fn present<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) -> Result<(), RenderError> {
        if !self.atlas_uploaded {
            if let Some(atlas) = &self.atlas {
                if let Err(e) = backend.upload_atlas(atlas) {
                    tracing::warn!(error = %e, "atlas upload failed");
                    return Err(e);
                }
                self.atlas_uploaded = true;
            }
        }
        backend.render(&self.draw).map_err(|e| {
            tracing::warn!(error = %e, "frame skipped by render backend");
            e
        })
    }
}

/// Walks the laid-out tree, parents before children, emitting geometry.
fn emit(tree: &WidgetTree, atlas: &GlyphAtlas, config: &UiConfig, list: &mut DrawList) {
    let colors = &config.colors;
    let metrics = &config.metrics;

    for index in tree.iter_dfs() {
        let Some(w) = tree.node(index) else { continue };
        let rect = w.rect;

        if w.flags.contains(WidgetFlags::DRAW_BACKGROUND) {
            list.rect(rect, w.background);
        }
        if w.flags.contains(WidgetFlags::DRAW_BORDER) {
            list.rect_outline(rect, w.border);
        }
        if w.flags.contains(WidgetFlags::DRAW_SLIDER_HANDLE) {
            let handle_w = metrics.slider_handle_width.min(rect.width);
            let x = rect.x + w.fraction.clamp(0.0, 1.0) * (rect.width - handle_w);
            list.rect(Rect::new(x, rect.y, handle_w, rect.height), colors.accent);
        }
        if w.flags.contains(WidgetFlags::DRAW_CHECK_MARK) {
            let inner = rect.shrink(2.0);
            list.check_mark(inner.origin(), Vec2::new(inner.right(), inner.bottom()), colors.accent);
        }
        if w.flags.contains(WidgetFlags::DRAW_TEXT) {
            if w.flags.contains(WidgetFlags::CLIP_TEXT) {
                let origin = Vec2::new(rect.x + metrics.field_margin, rect.y);
                let clip = Rect::new(origin.x, rect.y, (rect.width - 2.0 * metrics.field_margin).max(0.0), rect.height);
                list.text(atlas, &w.text, origin, w.text_color, w.text_offset, Some(clip));
            } else {
                let origin = Vec2::new(rect.x + w.pref(Axis::X).value() / 2.0, rect.y);
                list.text(atlas, &w.text, origin, w.text_color, 0.0, None);
            }
        }
        if w.flags.contains(WidgetFlags::DRAW_CURSOR) {
            let x = rect.x + metrics.field_margin + atlas.measure_width(&w.text, 0, w.cursor) - w.text_offset;
            list.rect(Rect::new(x, rect.y + 1.0, 1.0, (rect.height - 2.0).max(0.0)), colors.accent);
        }
        if w.flags.contains(WidgetFlags::DRAW_HOT_EFFECTS) {
            list.rect(rect, colors.highlight);
        }
        if w.flags.contains(WidgetFlags::DRAW_ACTIVE_EFFECTS) {
            list.rect(rect, colors.highlight);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::BlockGlyphs;

    fn context() -> UiContext {
        UiContext::new(UiConfig::default(), Box::new(BlockGlyphs::default()))
    }

    #[derive(Default)]
    struct Recorder {
        atlas_uploads: usize,
        frames: Vec<usize>,
        fail: bool,
    }

    impl RenderBackend for Recorder {
        fn upload_atlas(&mut self, _atlas: &GlyphAtlas) -> Result<(), RenderError> {
            self.atlas_uploads += 1;
            Ok(())
        }

        fn render(&mut self, draw: &DrawData) -> Result<(), RenderError> {
            if self.fail {
                return Err(RenderError::new("device lost"));
            }
            self.frames.push(draw.list.len());
            Ok(())
        }
    }

    #[test]
    fn test_root_covers_target() {
        let mut ui = context();
        ui.begin_frame(640.0, 480.0).unwrap();
        let draw = ui.end_frame().unwrap();

        assert_eq!(draw.target, Rect::new(0.0, 0.0, 640.0, 480.0));
        // Background plus four border strips.
        assert_eq!(draw.list.len(), 30);
        let root = ui.previous_tree().find(ROOT_LABEL).unwrap();
        assert_eq!(root.rect, Rect::new(0.0, 0.0, 640.0, 480.0));
    }

    #[test]
    fn test_frame_protocol_errors() {
        let mut ui = context();
        assert!(matches!(ui.end_frame(), Err(UiError::NoFrameInProgress)));
        assert!(matches!(ui.build_widget("A", WidgetFlags::empty()), Err(UiError::NoFrameInProgress)));

        ui.begin_frame(100.0, 100.0).unwrap();
        assert!(matches!(ui.begin_frame(100.0, 100.0), Err(UiError::FrameInProgress)));
        assert!(matches!(ui.pop_parent(), Err(UiError::ParentStackUnderflow)));
        ui.end_frame().unwrap();
    }

    #[test]
    fn test_stacks_seed_widgets() {
        let mut ui = context();
        ui.begin_frame(100.0, 100.0).unwrap();
        ui.push_pref_size(Axis::X, Size::Pixels(30.0));
        ui.push_background(Color::DARK_GRAY);
        let a = ui.build_widget("A", WidgetFlags::DRAW_BACKGROUND).unwrap();
        ui.pop_background();
        ui.pop_pref_size(Axis::X);
        let b = ui.build_widget("B", WidgetFlags::DRAW_BACKGROUND).unwrap();

        assert_eq!(ui.widget(a).unwrap().pref(Axis::X), Size::Pixels(30.0));
        assert_eq!(ui.widget(a).unwrap().background, Color::DARK_GRAY);
        assert_eq!(ui.widget(b).unwrap().pref(Axis::X), Size::Undefined);
        assert_eq!(ui.widget(b).unwrap().background, Color::WHITE);
        ui.end_frame().unwrap();
    }

    #[test]
    fn test_stale_handle_rejected() {
        let mut ui = context();
        ui.begin_frame(100.0, 100.0).unwrap();
        let old = ui.build_widget("Panel", WidgetFlags::empty()).unwrap();
        ui.end_frame().unwrap();

        ui.begin_frame(100.0, 100.0).unwrap();
        assert!(ui.widget(old).is_none());
        assert!(matches!(ui.push_parent(old), Err(UiError::StaleHandle { .. })));
        ui.end_frame().unwrap();
    }

    #[test]
    fn test_unbalanced_parent_stack_is_reset() {
        let mut ui = context();
        ui.begin_frame(100.0, 100.0).unwrap();
        let panel = ui.build_widget("Panel", WidgetFlags::empty()).unwrap();
        ui.push_parent(panel).unwrap();
        ui.end_frame().unwrap();

        ui.begin_frame(100.0, 100.0).unwrap();
        let panel = ui.build_widget("Panel", WidgetFlags::empty()).unwrap();
        let root = ui.current_tree().root();
        assert_eq!(ui.widget(panel).unwrap().parent(), root);
        ui.end_frame().unwrap();
    }

    #[test]
    fn test_layout_error_keeps_tree_for_next_frame() {
        let mut ui = context();
        ui.begin_frame(100.0, 100.0).unwrap();
        let root = ui.current_tree().handle_of(ROOT_LABEL).unwrap();
        ui.widget_mut(root).unwrap().pref_size = [Size::ChildrenSum; 2];
        let lost = ui.build_widget("Lost", WidgetFlags::DRAW_BACKGROUND).unwrap();
        ui.widget_mut(lost).unwrap().pref_size = [Size::ParentPercent(1.0); 2];
        ui.widget_mut(lost).unwrap().cursor = 4;

        assert!(matches!(ui.end_frame(), Err(UiError::MissingRigidAncestor { .. })));
        assert!(ui.draw_data().list.is_empty());

        ui.begin_frame(100.0, 100.0).unwrap();
        let lost = ui.build_widget("Lost", WidgetFlags::empty()).unwrap();
        assert_eq!(ui.widget(lost).unwrap().cursor, 4);
        ui.end_frame().unwrap();
    }

    #[test]
    fn test_present_uploads_atlas_once() {
        let mut ui = context();
        let mut backend = Recorder::default();

        for _ in 0..3 {
            ui.begin_frame(100.0, 100.0).unwrap();
            ui.end_frame().unwrap();
            ui.present(&mut backend).unwrap();
        }

        assert_eq!(backend.atlas_uploads, 1);
        assert_eq!(backend.frames, vec![30, 30, 30]);
    }

    #[test]
    fn test_backend_failure_is_recoverable() {
        let mut ui = context();
        let mut backend = Recorder {
            fail: true,
            ..Recorder::default()
        };

        ui.begin_frame(100.0, 100.0).unwrap();
        ui.end_frame().unwrap();
        assert!(ui.present(&mut backend).is_err());

        backend.fail = false;
        ui.begin_frame(100.0, 100.0).unwrap();
        ui.end_frame().unwrap();
        assert!(ui.present(&mut backend).is_ok());
        assert_eq!(backend.frames.len(), 1);
    }
}
