//! Hot/active interaction state.
//!
//! At most one widget is active (holds the mouse) at a time. It is tracked by
//! label, so the state survives the tree being rebuilt every frame. Hit
//! tests use the rectangle the widget had at the end of the previous frame;
//! the current frame's layout is not known while widgets are declared.
//!
//! ```text
//!              press inside, nothing active
//!   Inactive ────────────────────────────────► Active
//!      ▲                                          │
//!      └──────── release (click if inside) ───────┘
//!      └──────── label not built this frame ──────┘
//! ```

use crate::geometry::Rect;
use crate::input::InputState;

/// Whether a widget holds the mouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activation {
    /// Not interacting.
    #[default]
    Inactive,
    /// Holding the mouse since a press inside it.
    Active,
}

/// Result of running a widget's behavior for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Response {
    /// Released inside after being pressed inside.
    pub clicked: bool,
    /// Cursor over the widget's last rect.
    pub hovered: bool,
    /// Widget holds the mouse after this frame's behavior ran.
    pub active: bool,
    /// The widget changed the value it edits.
    pub changed: bool,
    /// Enter was pressed in a text field.
    pub submitted: bool,
}

/// The active widget, by label.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    active: Option<String>,
}

impl Interaction {
    /// Creates a state with nothing active.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Label of the active widget.
    #[must_use]
    pub fn active_label(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// State of the widget with `label`.
    #[must_use]
    pub fn activation(&self, label: &str) -> Activation {
        if self.is_active(label) {
            Activation::Active
        } else {
            Activation::Inactive
        }
    }

    /// Returns true if `label` holds the mouse.
    #[must_use]
    pub fn is_active(&self, label: &str) -> bool {
        self.active.as_deref() == Some(label)
    }

    /// Returns true if any widget holds the mouse.
    #[must_use]
    pub fn any_active(&self) -> bool {
        self.active.is_some()
    }

    /// Makes `label` the active widget.
    pub fn activate(&mut self, label: &str) {
        self.active = Some(label.to_owned());
    }

    /// Releases `label` if it is the active widget.
    pub fn deactivate(&mut self, label: &str) {
        if self.is_active(label) {
            self.active = None;
        }
    }

    /// Press/release behavior shared by buttons, checkboxes and radios.
    ///
    /// `rect` is the widget's rectangle from the previous frame, `None` on
    /// the first frame it exists.
    pub fn button_behavior(&mut self, label: &str, rect: Option<Rect>, input: &InputState) -> Response {
        let hovered = rect.is_some_and(|r| r.contains(input.mouse));
        let mut response = Response {
            hovered,
            ..Response::default()
        };

        if self.is_active(label) {
            if input.mouse_released || !input.mouse_down {
                response.clicked = input.mouse_released && hovered;
                self.active = None;
            }
        } else if hovered && input.mouse_down && !self.any_active() {
            self.activate(label);
        }

        response.active = self.is_active(label);
        response
    }

    /// Forced clear: drops the active label unless `built` says a widget
    /// with that label exists in the frame that just ended.
    pub fn retain_if_built(&mut self, built: impl Fn(&str) -> bool) {
        if let Some(label) = self.active.as_deref() {
            if !built(label) {
                tracing::debug!(label, "active widget vanished, releasing mouse capture");
                self.active = None;
            }
        }
    }
}
