//! Input handling.
//!
//! The host translates its window events into [`InputEvent`]s before
//! declaring the frame's widgets. Per-frame flags (released this frame, key
//! pressed this frame) are reset by the context at the end of each frame.

#![allow(missing_docs)]

use crate::geometry::Vec2;

/// Keyboard key, reduced to what the widgets react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Enter/Return key.
    Enter,
    /// Backspace key.
    Backspace,
    /// A key producing a character.
    Char(char),
    /// Any other key.
    Other,
}

/// A host input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    MouseMove { x: f32, y: f32 },
    MouseDown,
    MouseUp,
    Key(Key),
    KeyUp,
}

/// Mouse and keyboard state as seen by widget behavior.
#[derive(Debug, Clone)]
pub struct InputState {
    /// Cursor position.
    pub mouse: Vec2,
    /// Movement since the previous move event.
    pub mouse_delta: Vec2,
    /// Primary button held.
    pub mouse_down: bool,
    /// Primary button went up this frame.
    pub mouse_released: bool,
    /// Cursor moved while the button was held.
    pub dragging: bool,
    /// Last key pressed.
    pub key: Option<Key>,
    /// A key went down this frame. Latched until `end_frame`, so a press
    /// and its release between two frames still count.
    pub key_down: bool,
    /// A key is physically held.
    pub key_held: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            // Off-target until the first move event.
            mouse: Vec2::new(-1.0, -1.0),
            mouse_delta: Vec2::ZERO,
            mouse_down: false,
            mouse_released: false,
            dragging: false,
            key: None,
            key_down: false,
            key_held: false,
        }
    }
}

impl InputState {
    /// Creates a new empty input state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one host event.
    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::MouseMove { x, y } => {
                let position = Vec2::new(x, y);
                self.mouse_delta = position - self.mouse;
                self.mouse = position;
                if self.mouse_down {
                    self.dragging = true;
                }
            }
            InputEvent::MouseDown => {
                self.mouse_down = true;
            }
            InputEvent::MouseUp => {
                self.mouse_released = self.mouse_down;
                self.mouse_down = false;
                self.dragging = false;
            }
            InputEvent::Key(key) => {
                self.key = Some(key);
                self.key_down = true;
                self.key_held = true;
            }
            InputEvent::KeyUp => {
                self.key_held = false;
            }
        }
    }

    /// Clears the flags that only last one frame.
    pub fn end_frame(&mut self) {
        self.mouse_released = false;
        self.key_down = false;
    }

    /// The key pressed this frame, if any.
    #[must_use]
    pub fn key_pressed(&self) -> Option<Key> {
        if self.key_down {
            self.key
        } else {
            None
        }
    }
}
