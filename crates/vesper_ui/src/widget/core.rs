//! Core widget types.

use std::ops::{BitOr, BitOrAssign};

use crate::geometry::{Axis, Rect, Vec2};
use crate::style::Color;

/// Handle to a widget in one frame's tree.
///
/// Lower 32 bits: index into the frame arena.
/// Upper 32 bits: frame generation, so a handle kept past its frame is
/// detected instead of aliasing a different widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct WidgetHandle(u64);

impl WidgetHandle {
    /// Creates a handle from index and generation.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Index into the frame arena.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Generation of the frame that created the widget.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }
}

/// Draw and behavior traits of a widget (bitfield).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WidgetFlags(u32);

impl WidgetFlags {
    /// Draw the label text.
    pub const DRAW_TEXT: Self = Self(1 << 0);
    /// Draw a one-pixel border.
    pub const DRAW_BORDER: Self = Self(1 << 1);
    /// Fill the background.
    pub const DRAW_BACKGROUND: Self = Self(1 << 2);
    /// Overlay when hovered.
    pub const DRAW_HOT_EFFECTS: Self = Self(1 << 3);
    /// Overlay while active.
    pub const DRAW_ACTIVE_EFFECTS: Self = Self(1 << 4);
    /// Draw a check mark inside the rect.
    pub const DRAW_CHECK_MARK: Self = Self(1 << 5);
    /// Draw the text caret.
    pub const DRAW_CURSOR: Self = Self(1 << 6);
    /// Draw a slider handle at `fraction` of the width.
    pub const DRAW_SLIDER_HANDLE: Self = Self(1 << 7);
    /// Clip text to the rect and apply the scroll offset.
    pub const CLIP_TEXT: Self = Self(1 << 8);

    /// No flags.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Returns true if every flag in `other` is set.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Sets the flags in `other`.
    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clears the flags in `other`.
    #[inline]
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl BitOr for WidgetFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for WidgetFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Preferred size rule for one axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Size {
    /// No preference; resolves to zero.
    #[default]
    Undefined,
    /// Fixed pixel size.
    Pixels(f32),
    /// Measured text extent plus padding.
    TextBounds(f32),
    /// Fraction of the nearest rigid ancestor.
    ParentPercent(f32),
    /// Sum of the children on this axis.
    ChildrenSum,
}

impl Size {
    /// Rigid sizes are known before looking at parents or children.
    #[inline]
    #[must_use]
    pub const fn is_rigid(self) -> bool {
        matches!(self, Self::Pixels(_) | Self::TextBounds(_))
    }

    /// The rule's numeric parameter (zero when it has none).
    #[must_use]
    pub const fn value(self) -> f32 {
        match self {
            Self::Pixels(v) | Self::TextBounds(v) | Self::ParentPercent(v) => v,
            Self::Undefined | Self::ChildrenSum => 0.0,
        }
    }
}

/// One node of a frame's widget tree.
#[derive(Debug, Clone)]
pub struct Widget {
    /// Identity across frames.
    pub label: String,
    /// Text drawn for `DRAW_TEXT` and measured for `TextBounds`.
    pub text: String,
    /// Draw and behavior traits.
    pub flags: WidgetFlags,
    /// Preferred size per axis.
    pub pref_size: [Size; 2],
    /// Solved size per axis.
    pub actual_size: Vec2,
    /// Offset from the parent, per axis.
    pub relative_position: Vec2,
    /// Final absolute rectangle.
    pub rect: Rect,
    /// Axis children are stacked along; `None` overlaps them.
    pub child_layout_axis: Option<Axis>,
    /// Text caret index, in chars.
    pub cursor: usize,
    /// Horizontal text scroll, in pixels.
    pub text_offset: f32,
    /// Whether this widget held the mouse when it was built.
    pub active: bool,
    /// Background fill.
    pub background: Color,
    /// Border color.
    pub border: Color,
    /// Text color.
    pub text_color: Color,
    /// Position of a slider handle, 0..=1.
    pub fraction: f32,
    pub(crate) parent: Option<u32>,
    pub(crate) first_child: Option<u32>,
    pub(crate) last_child: Option<u32>,
    pub(crate) next_sibling: Option<u32>,
    pub(crate) prev_sibling: Option<u32>,
}

impl Widget {
    /// Creates an unlinked widget with default state.
    #[must_use]
    pub fn new(label: &str, flags: WidgetFlags) -> Self {
        Self {
            label: label.to_owned(),
            text: label.to_owned(),
            flags,
            pref_size: [Size::Undefined; 2],
            actual_size: Vec2::ZERO,
            relative_position: Vec2::ZERO,
            rect: Rect::ZERO,
            child_layout_axis: None,
            cursor: 0,
            text_offset: 0.0,
            active: false,
            background: Color::WHITE,
            border: Color::GRAY,
            text_color: Color::BLACK,
            fraction: 0.0,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            prev_sibling: None,
        }
    }

    /// Copies the state that survives a rebuild from last frame's twin.
    pub fn inherit(&mut self, previous: &Self) {
        self.active = previous.active;
        self.cursor = previous.cursor;
        self.text_offset = previous.text_offset;
    }

    /// Preferred size on `axis`.
    #[inline]
    #[must_use]
    pub const fn pref(&self, axis: Axis) -> Size {
        self.pref_size[axis.index()]
    }

    /// Sets the preferred size on `axis`.
    #[inline]
    pub fn set_pref(&mut self, axis: Axis, size: Size) {
        self.pref_size[axis.index()] = size;
    }

    /// Index of the parent in the same frame's tree.
    #[must_use]
    pub const fn parent(&self) -> Option<u32> {
        self.parent
    }

    /// Index of the first child.
    #[must_use]
    pub const fn first_child(&self) -> Option<u32> {
        self.first_child
    }

    /// Index of the last child.
    #[must_use]
    pub const fn last_child(&self) -> Option<u32> {
        self.last_child
    }

    /// Index of the next sibling.
    #[must_use]
    pub const fn next_sibling(&self) -> Option<u32> {
        self.next_sibling
    }

    /// Index of the previous sibling.
    #[must_use]
    pub const fn prev_sibling(&self) -> Option<u32> {
        self.prev_sibling
    }
}
