//! Widget constructors.
//!
//! Each call runs the widget's behavior against the rectangle its label had
//! last frame, then builds this frame's widget. Results (clicked, changed,
//! submitted) are returned directly; there are no callbacks.

use crate::context::UiContext;
use crate::error::UiResult;
use crate::geometry::Axis;
use crate::input::Key;
use crate::interaction::Response;
use crate::style::Color;
use crate::widget::{Size, WidgetFlags, WidgetHandle};

impl UiContext {
    /// Clickable text button. Returns true on the frame it is clicked.
    ///
    /// # Errors
    ///
    /// See [`build_widget`](Self::build_widget).
    pub fn button(&mut self, label: &str) -> UiResult<bool> {
        Ok(self.button_response(label)?.clicked)
    }

    /// Button returning the full [`Response`].
    ///
    /// # Errors
    ///
    /// See [`build_widget`](Self::build_widget).
    pub fn button_response(&mut self, label: &str) -> UiResult<Response> {
        self.ensure_buildable(label)?;
        let rect = self.previous_rect(label);
        let response = self.interaction.button_behavior(label, rect, &self.input);

        let flags = WidgetFlags::DRAW_TEXT | WidgetFlags::DRAW_BORDER | WidgetFlags::DRAW_BACKGROUND;
        let handle = self.build_widget(label, flags | effects(&response))?;
        let padding = self.config.metrics.button_padding;
        if let Some(w) = self.widget_mut(handle) {
            w.set_pref(Axis::X, Size::TextBounds(padding));
            w.set_pref(Axis::Y, Size::TextBounds(0.0));
            w.active = response.active;
        }
        Ok(response)
    }

    /// Text without behavior.
    ///
    /// # Errors
    ///
    /// See [`build_widget`](Self::build_widget).
    pub fn label(&mut self, text: &str) -> UiResult<()> {
        let handle = self.build_widget(text, WidgetFlags::DRAW_TEXT)?;
        if let Some(w) = self.widget_mut(handle) {
            w.pref_size = [Size::TextBounds(0.0); 2];
        }
        Ok(())
    }

    /// Opens a full-width, one-line-tall row; widgets until
    /// [`row_end`](Self::row_end) are laid out left to right inside it.
    ///
    /// # Errors
    ///
    /// See [`build_widget`](Self::build_widget).
    pub fn row_begin(&mut self, label: &str) -> UiResult<()> {
        let handle = self.build_widget(label, WidgetFlags::DRAW_BACKGROUND | WidgetFlags::DRAW_BORDER)?;
        let line_height = self.line_height();
        if let Some(w) = self.widget_mut(handle) {
            w.set_pref(Axis::X, Size::ParentPercent(1.0));
            w.set_pref(Axis::Y, Size::Pixels(line_height));
            w.child_layout_axis = Some(Axis::X);
        }
        self.push_parent(handle)
    }

    /// Closes the row opened by [`row_begin`](Self::row_begin).
    ///
    /// # Errors
    ///
    /// [`ParentStackUnderflow`](crate::UiError::ParentStackUnderflow) without a matching `row_begin`.
    pub fn row_end(&mut self) -> UiResult<()> {
        self.pop_parent().map(|_| ())
    }

    /// Check box followed by its label. Toggles `value` on click and returns
    /// true on the frame it changed.
    ///
    /// # Errors
    ///
    /// See [`build_widget`](Self::build_widget).
    pub fn checkbox(&mut self, label: &str, value: &mut bool) -> UiResult<bool> {
        self.ensure_buildable(label)?;
        let rect = self.previous_rect(label);
        let response = self.interaction.button_behavior(label, rect, &self.input);
        if response.clicked {
            *value = !*value;
        }

        let mut box_flags = WidgetFlags::DRAW_BORDER | WidgetFlags::DRAW_BACKGROUND;
        if *value {
            box_flags |= WidgetFlags::DRAW_CHECK_MARK;
        }
        let border = if *value { Color::LIGHT_GRAY } else { Color::GRAY };
        self.boxed_label(label, &response, box_flags, border, None)?;
        Ok(response.clicked)
    }

    /// Radio button: selects `value` into `selected` on click. Returns true
    /// if the selection changed.
    ///
    /// # Errors
    ///
    /// See [`build_widget`](Self::build_widget).
    pub fn radio_button(&mut self, label: &str, selected: &mut i32, value: i32) -> UiResult<bool> {
        self.ensure_buildable(label)?;
        let rect = self.previous_rect(label);
        let response = self.interaction.button_behavior(label, rect, &self.input);
        let changed = response.clicked && *selected != value;
        if response.clicked {
            *selected = value;
        }

        let on = *selected == value;
        let border = if on { Color::DARK_GRAY } else { Color::GRAY };
        let fill = on.then_some(Color::DARK_GRAY);
        self.boxed_label(
            label,
            &response,
            WidgetFlags::DRAW_BORDER | WidgetFlags::DRAW_BACKGROUND,
            border,
            fill,
        )?;
        Ok(changed)
    }

    /// Horizontal slider over `[min, max]`. While held, the value follows the
    /// cursor. Returns true if `value` changed this frame.
    ///
    /// # Errors
    ///
    /// See [`build_widget`](Self::build_widget).
    pub fn slider(&mut self, label: &str, value: &mut f32, min: f32, max: f32) -> UiResult<bool> {
        self.ensure_buildable(label)?;
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        let before = *value;
        *value = value.clamp(lo, hi);
        let span = hi - lo;

        let rect = self.previous_rect(label);
        let hovered = rect.is_some_and(|r| r.contains(self.input.mouse));
        if hovered && self.input.mouse_down && !self.interaction.any_active() {
            self.interaction.activate(label);
        }

        if self.interaction.is_active(label) {
            if self.input.mouse_down {
                if let Some(r) = rect.filter(|r| r.width > 0.0) {
                    let t = ((self.input.mouse.x - r.x) / r.width).clamp(0.0, 1.0);
                    *value = lo + span * t;
                }
            } else {
                self.interaction.deactivate(label);
            }
        }

        let active = self.interaction.is_active(label);
        let hot = active || (hovered && !self.interaction.any_active());
        let mut flags = WidgetFlags::DRAW_BORDER | WidgetFlags::DRAW_BACKGROUND | WidgetFlags::DRAW_SLIDER_HANDLE;
        if hot {
            flags |= WidgetFlags::DRAW_HOT_EFFECTS;
        }

        let handle = self.build_widget(label, flags)?;
        let width = self.config.metrics.slider_width;
        let line_height = self.line_height();
        if let Some(w) = self.widget_mut(handle) {
            w.set_pref(Axis::X, Size::Pixels(width));
            w.set_pref(Axis::Y, Size::Pixels(line_height));
            w.fraction = if span > 0.0 { (*value - lo) / span } else { 0.0 };
            w.border = if hot { Color::LIGHT_GRAY } else { Color::GRAY };
            w.active = active;
        }
        Ok((*value - before).abs() > f32::EPSILON)
    }

    /// Single-line text field editing `text`, at most `max_len` chars.
    ///
    /// Pressing inside focuses it, pressing outside releases it. While
    /// focused, typed characters are inserted at the caret and Backspace
    /// deletes before it. Returns true on the frame Enter is pressed.
    ///
    /// # Errors
    ///
    /// See [`build_widget`](Self::build_widget).
    pub fn text_field(&mut self, label: &str, text: &mut String, max_len: usize) -> UiResult<bool> {
        self.ensure_buildable(label)?;
        let rect = self.previous_rect(label);
        let hovered = rect.is_some_and(|r| r.contains(self.input.mouse));
        if hovered && self.input.mouse_down && !self.interaction.any_active() {
            self.interaction.activate(label);
        }

        let handle = self.build_widget(label, WidgetFlags::empty())?;
        let (mut cursor, mut offset) = self
            .widget(handle)
            .map_or((0, 0.0), |w| (w.cursor, w.text_offset));
        let len = text.chars().count();
        cursor = cursor.min(len);

        let mut submitted = false;
        if self.interaction.is_active(label) {
            match self.input.key_pressed() {
                Some(Key::Enter) => submitted = true,
                Some(Key::Backspace) if cursor > 0 => {
                    let at = byte_index(text, cursor - 1);
                    text.remove(at);
                    cursor -= 1;
                }
                Some(Key::Char(c)) if !c.is_control() && len < max_len => {
                    text.insert(byte_index(text, cursor), c);
                    cursor += 1;
                }
                _ => {}
            }
            if self.input.mouse_down && !hovered {
                self.interaction.deactivate(label);
            }
        }

        let active = self.interaction.is_active(label);
        let metrics = &self.config.metrics;
        let (field_width, margin) = (metrics.field_width, metrics.field_margin);
        // Scroll against the width the field was laid out at, which a
        // narrow parent may have clamped below the configured width.
        let visible = (rect.map_or(field_width, |r| r.width) - 2.0 * margin).max(0.0);
        let caret = self.atlas.as_ref().map_or(0.0, |a| a.measure_width(text, 0, cursor)) - offset;
        if caret > visible {
            offset += caret - visible;
        } else if caret < 0.0 {
            offset += caret;
        }

        let mut flags = WidgetFlags::DRAW_BORDER
            | WidgetFlags::DRAW_BACKGROUND
            | WidgetFlags::DRAW_TEXT
            | WidgetFlags::CLIP_TEXT;
        if active {
            flags |= WidgetFlags::DRAW_CURSOR;
        }
        if hovered {
            flags |= WidgetFlags::DRAW_HOT_EFFECTS;
        }

        let line_height = self.line_height();
        if let Some(w) = self.widget_mut(handle) {
            w.flags = flags;
            w.text.clone_from(text);
            w.cursor = cursor;
            w.text_offset = offset;
            w.active = active;
            w.set_pref(Axis::X, Size::Pixels(field_width));
            w.set_pref(Axis::Y, Size::Pixels(line_height));
        }
        Ok(submitted)
    }

    /// Horizontal container holding a square box and the label text.
    fn boxed_label(
        &mut self,
        label: &str,
        response: &Response,
        box_flags: WidgetFlags,
        border: Color,
        fill: Option<Color>,
    ) -> UiResult<WidgetHandle> {
        let side = self.config.metrics.check_box_size;
        let gap = self.config.metrics.field_margin * 2.0;

        let container = self.build_widget(label, effects(response))?;
        if let Some(w) = self.widget_mut(container) {
            w.set_pref(Axis::X, Size::ChildrenSum);
            w.set_pref(Axis::Y, Size::TextBounds(0.0));
            w.child_layout_axis = Some(Axis::X);
            w.active = response.active;
        }
        self.push_parent(container)?;

        let mark = self.build_widget(&format!("{label}##box"), box_flags)?;
        if let Some(w) = self.widget_mut(mark) {
            w.text.clear();
            w.pref_size = [Size::Pixels(side); 2];
            w.border = border;
            if let Some(fill) = fill {
                w.background = fill;
            }
        }

        let caption = self.build_widget(&format!("{label}##text"), WidgetFlags::DRAW_TEXT)?;
        if let Some(w) = self.widget_mut(caption) {
            w.text = label.to_owned();
            w.set_pref(Axis::X, Size::TextBounds(gap));
            w.set_pref(Axis::Y, Size::TextBounds(0.0));
        }

        self.pop_parent()?;
        Ok(container)
    }

    fn line_height(&self) -> f32 {
        self.atlas.as_ref().map_or(0.0, |a| a.line_height())
    }
}

/// Hover/press overlays for a behavior result.
fn effects(response: &Response) -> WidgetFlags {
    let mut flags = WidgetFlags::empty();
    if response.hovered {
        flags |= WidgetFlags::DRAW_HOT_EFFECTS;
    }
    if response.active {
        flags |= WidgetFlags::DRAW_ACTIVE_EFFECTS;
    }
    flags
}

/// Byte offset of the `n`th char (or the end of the string).
fn byte_index(text: &str, n: usize) -> usize {
    text.char_indices().nth(n).map_or(text.len(), |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UiConfig;
    use crate::geometry::Rect;
    use crate::error::UiError;
    use crate::glyph::BlockGlyphs;
    use crate::input::InputEvent;

    fn context() -> UiContext {
        UiContext::new(UiConfig::default(), Box::new(BlockGlyphs::default()))
    }

    #[test]
    fn test_button_sizes_from_text() {
        let mut ui = context();
        ui.begin_frame(400.0, 300.0).unwrap();
        assert!(!ui.button("Go").unwrap());
        ui.end_frame().unwrap();

        // Two 8px chars plus 20px padding, one 16px line.
        assert_eq!(ui.previous_rect("Go"), Some(Rect::new(0.0, 0.0, 36.0, 16.0)));
    }

    #[test]
    fn test_row_stacks_buttons_horizontally() {
        let mut ui = context();
        ui.begin_frame(400.0, 300.0).unwrap();
        ui.row_begin("Menu").unwrap();
        ui.button("File").unwrap();
        ui.button("Edit").unwrap();
        ui.row_end().unwrap();
        ui.button("Below").unwrap();
        ui.end_frame().unwrap();

        assert_eq!(ui.previous_rect("Menu"), Some(Rect::new(0.0, 0.0, 400.0, 16.0)));
        assert_eq!(ui.previous_rect("File").unwrap().x, 0.0);
        assert_eq!(ui.previous_rect("Edit").unwrap().x, 52.0);
        assert_eq!(ui.previous_rect("Below").unwrap().y, 16.0);
    }

    #[test]
    fn test_checkbox_toggles_on_click() {
        let mut ui = context();
        let mut on = false;

        ui.begin_frame(400.0, 300.0).unwrap();
        ui.checkbox("Wrap", &mut on).unwrap();
        ui.end_frame().unwrap();
        let r = ui.previous_rect("Wrap").unwrap();
        assert_eq!(r.width, 16.0 + 32.0 + 8.0);

        ui.handle_event(InputEvent::MouseMove { x: r.x + 4.0, y: r.y + 4.0 });
        ui.handle_event(InputEvent::MouseDown);
        ui.begin_frame(400.0, 300.0).unwrap();
        assert!(!ui.checkbox("Wrap", &mut on).unwrap());
        ui.end_frame().unwrap();

        ui.handle_event(InputEvent::MouseUp);
        ui.begin_frame(400.0, 300.0).unwrap();
        assert!(ui.checkbox("Wrap", &mut on).unwrap());
        ui.end_frame().unwrap();

        assert!(on);
        let mark = ui.previous_tree().find("Wrap##box").unwrap();
        assert!(mark.flags.contains(WidgetFlags::DRAW_CHECK_MARK));
    }

    #[test]
    fn test_radio_group_selects_one() {
        let mut ui = context();
        let mut choice = 0;

        ui.begin_frame(400.0, 300.0).unwrap();
        ui.radio_button("Low", &mut choice, 0).unwrap();
        ui.radio_button("High", &mut choice, 1).unwrap();
        ui.end_frame().unwrap();
        let high = ui.previous_rect("High").unwrap();

        ui.handle_event(InputEvent::MouseMove { x: high.x + 2.0, y: high.y + 2.0 });
        ui.handle_event(InputEvent::MouseDown);
        ui.begin_frame(400.0, 300.0).unwrap();
        ui.radio_button("Low", &mut choice, 0).unwrap();
        ui.radio_button("High", &mut choice, 1).unwrap();
        ui.end_frame().unwrap();

        ui.handle_event(InputEvent::MouseUp);
        ui.begin_frame(400.0, 300.0).unwrap();
        assert!(!ui.radio_button("Low", &mut choice, 0).unwrap());
        assert!(ui.radio_button("High", &mut choice, 1).unwrap());
        ui.end_frame().unwrap();

        assert_eq!(choice, 1);
    }

    #[test]
    fn test_slider_follows_mouse_while_held() {
        let mut ui = context();
        let mut volume = 2.0;

        ui.begin_frame(400.0, 300.0).unwrap();
        assert!(ui.slider("Volume", &mut volume, 0.0, 1.0).unwrap());
        ui.end_frame().unwrap();
        assert_eq!(volume, 1.0);
        let bar = ui.previous_rect("Volume").unwrap();
        assert_eq!(bar.width, 150.0);

        ui.handle_event(InputEvent::MouseMove { x: bar.x + 75.0, y: bar.y + 2.0 });
        ui.handle_event(InputEvent::MouseDown);
        ui.begin_frame(400.0, 300.0).unwrap();
        assert!(ui.slider("Volume", &mut volume, 0.0, 1.0).unwrap());
        ui.end_frame().unwrap();
        assert!((volume - 0.5).abs() < 1e-6);

        // Dragging past the end clamps; leaving the bar does not release.
        ui.handle_event(InputEvent::MouseMove { x: bar.right() + 100.0, y: bar.y + 50.0 });
        ui.begin_frame(400.0, 300.0).unwrap();
        ui.slider("Volume", &mut volume, 0.0, 1.0).unwrap();
        ui.end_frame().unwrap();
        assert_eq!(volume, 1.0);
        assert!(ui.interaction().is_active("Volume"));

        ui.handle_event(InputEvent::MouseUp);
        ui.begin_frame(400.0, 300.0).unwrap();
        assert!(!ui.slider("Volume", &mut volume, 0.0, 1.0).unwrap());
        ui.end_frame().unwrap();
        assert!(!ui.interaction().any_active());
    }

    fn field_frame(ui: &mut UiContext, text: &mut String) -> bool {
        ui.begin_frame(400.0, 300.0).unwrap();
        let submitted = ui.text_field("Name", text, 8).unwrap();
        ui.end_frame().unwrap();
        submitted
    }

    #[test]
    fn test_text_field_editing() {
        let mut ui = context();
        let mut text = String::from("ab");
        field_frame(&mut ui, &mut text);
        let r = ui.previous_rect("Name").unwrap();

        ui.handle_event(InputEvent::MouseMove { x: r.x + 2.0, y: r.y + 2.0 });
        ui.handle_event(InputEvent::MouseDown);
        field_frame(&mut ui, &mut text);
        ui.handle_event(InputEvent::MouseUp);
        assert!(ui.interaction().is_active("Name"));

        // Caret starts at 0: typing inserts in front.
        ui.handle_event(InputEvent::Key(Key::Char('x')));
        field_frame(&mut ui, &mut text);
        assert_eq!(text, "xab");
        assert_eq!(ui.previous_tree().find("Name").unwrap().cursor, 1);

        ui.handle_event(InputEvent::Key(Key::Backspace));
        field_frame(&mut ui, &mut text);
        assert_eq!(text, "ab");

        ui.handle_event(InputEvent::Key(Key::Backspace));
        field_frame(&mut ui, &mut text);
        assert_eq!(text, "ab");

        ui.handle_event(InputEvent::Key(Key::Enter));
        assert!(field_frame(&mut ui, &mut text));
        assert!(!field_frame(&mut ui, &mut text));
    }

    #[test]
    fn test_text_field_max_len_and_release() {
        let mut ui = context();
        let mut text = String::from("12345678");
        field_frame(&mut ui, &mut text);
        let r = ui.previous_rect("Name").unwrap();

        ui.handle_event(InputEvent::MouseMove { x: r.x + 2.0, y: r.y + 2.0 });
        ui.handle_event(InputEvent::MouseDown);
        field_frame(&mut ui, &mut text);
        ui.handle_event(InputEvent::MouseUp);

        ui.handle_event(InputEvent::Key(Key::Char('9')));
        field_frame(&mut ui, &mut text);
        assert_eq!(text, "12345678");

        ui.handle_event(InputEvent::MouseMove { x: r.right() + 50.0, y: r.y });
        ui.handle_event(InputEvent::MouseDown);
        field_frame(&mut ui, &mut text);
        assert!(!ui.interaction().any_active());
    }

    #[test]
    fn test_text_field_scrolls_to_caret() {
        let mut config = UiConfig::default();
        config.metrics.field_width = 40.0;
        config.metrics.field_margin = 4.0;
        let mut ui = UiContext::new(config, Box::new(BlockGlyphs::default()));
        let mut text = String::new();

        ui.begin_frame(400.0, 300.0).unwrap();
        ui.text_field("Name", &mut text, 64).unwrap();
        ui.end_frame().unwrap();
        let r = ui.previous_rect("Name").unwrap();
        ui.handle_event(InputEvent::MouseMove { x: r.x + 2.0, y: r.y + 2.0 });
        ui.handle_event(InputEvent::MouseDown);
        ui.begin_frame(400.0, 300.0).unwrap();
        ui.text_field("Name", &mut text, 64).unwrap();
        ui.end_frame().unwrap();
        ui.handle_event(InputEvent::MouseUp);

        for c in "abcdef".chars() {
            ui.handle_event(InputEvent::Key(Key::Char(c)));
            ui.begin_frame(400.0, 300.0).unwrap();
            ui.text_field("Name", &mut text, 64).unwrap();
            ui.end_frame().unwrap();
        }

        // Six 8px glyphs in a 32px visible span.
        let field = ui.previous_tree().find("Name").unwrap();
        assert_eq!(text, "abcdef");
        assert_eq!(field.cursor, 6);
        assert_eq!(field.text_offset, 16.0);
    }

    #[test]
    fn test_text_field_scrolls_within_clamped_width() {
        let mut ui = context();
        let mut text = String::new();
        let frame = |ui: &mut UiContext, text: &mut String| {
            ui.begin_frame(400.0, 300.0).unwrap();
            let panel = ui.build_widget("Panel", WidgetFlags::empty()).unwrap();
            ui.widget_mut(panel).unwrap().pref_size = [Size::Pixels(60.0), Size::Pixels(16.0)];
            ui.push_parent(panel).unwrap();
            ui.text_field("Name", text, 64).unwrap();
            ui.pop_parent().unwrap();
            ui.end_frame().unwrap();
        };

        frame(&mut ui, &mut text);
        let r = ui.previous_rect("Name").unwrap();
        assert_eq!(r.width, 60.0);
        ui.handle_event(InputEvent::MouseMove { x: r.x + 2.0, y: r.y + 2.0 });
        ui.handle_event(InputEvent::MouseDown);
        frame(&mut ui, &mut text);
        ui.handle_event(InputEvent::MouseUp);

        for c in "abcdefghij".chars() {
            ui.handle_event(InputEvent::Key(Key::Char(c)));
            frame(&mut ui, &mut text);
        }

        // Ten 8px glyphs in a 52px visible span.
        let field = ui.previous_tree().find("Name").unwrap();
        assert_eq!(field.text_offset, 28.0);
        let caret_x = field.rect.x + 4.0 + 80.0 - field.text_offset;
        assert!(caret_x <= field.rect.right() - 4.0);
    }

    #[test]
    fn test_rejected_duplicate_leaves_interaction_alone() {
        let mut ui = context();
        ui.begin_frame(400.0, 300.0).unwrap();
        ui.button("OK").unwrap();
        ui.end_frame().unwrap();
        let r = ui.previous_rect("OK").unwrap();

        ui.handle_event(InputEvent::MouseMove { x: r.x + 2.0, y: r.y + 2.0 });
        ui.handle_event(InputEvent::MouseDown);
        ui.begin_frame(400.0, 300.0).unwrap();
        ui.label("OK").unwrap();
        assert!(matches!(ui.button("OK"), Err(UiError::DuplicateLabel(_))));
        assert!(!ui.interaction().any_active());
        let mut on = false;
        assert!(ui.checkbox("OK", &mut on).is_err());
        assert!(!on);
        let mut value = 5.0;
        assert!(ui.slider("OK", &mut value, 0.0, 1.0).is_err());
        assert_eq!(value, 5.0);
        ui.end_frame().unwrap();
        assert!(!ui.interaction().any_active());
    }

    #[test]
    fn test_label_is_text_only() {
        let mut ui = context();
        ui.begin_frame(400.0, 300.0).unwrap();
        ui.label("Status").unwrap();
        let draw = ui.end_frame().unwrap();

        // Root (30) plus six glyph quads.
        assert_eq!(draw.list.len(), 30 + 36);
    }

    #[test]
    fn test_duplicate_button_label_fails_fast() {
        let mut ui = context();
        ui.begin_frame(400.0, 300.0).unwrap();
        ui.button("OK").unwrap();
        assert!(matches!(ui.button("OK"), Err(UiError::DuplicateLabel(_))));
        ui.end_frame().unwrap();
    }
}
