//! Per-frame widget arena.
//!
//! Widgets are appended in call order and linked into a first/last child,
//! next/prev sibling tree by index. The whole arena is reset at once when
//! its frame is no longer needed; nothing is freed widget by widget.

use std::collections::HashMap;

use super::{Widget, WidgetHandle};
use crate::error::{UiError, UiResult};

/// One frame's widgets, indexed by position and by label.
#[derive(Debug, Default)]
pub struct WidgetTree {
    widgets: Vec<Widget>,
    by_label: HashMap<String, u32>,
    root: Option<u32>,
    generation: u32,
}

impl WidgetTree {
    /// Creates an empty tree for the given frame generation.
    #[must_use]
    pub fn new(generation: u32) -> Self {
        Self {
            widgets: Vec::with_capacity(256),
            by_label: HashMap::with_capacity(256),
            root: None,
            generation,
        }
    }

    /// Drops every widget and starts over as `generation`.
    pub fn reset(&mut self, generation: u32) {
        self.widgets.clear();
        self.by_label.clear();
        self.root = None;
        self.generation = generation;
    }

    /// Frame generation stamped into handles.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Number of widgets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Returns true if no widget was built.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Index of the root widget.
    #[must_use]
    pub const fn root(&self) -> Option<u32> {
        self.root
    }

    /// Appends `widget` as the last child of `parent`.
    ///
    /// With no parent the widget becomes the root, or a child of the root if
    /// one already exists.
    ///
    /// # Errors
    ///
    /// [`UiError::DuplicateLabel`] if the label was already used this frame.
    ///
    /// # Panics
    ///
    /// If `parent` is not an index of this tree.
    pub fn insert(&mut self, mut widget: Widget, parent: Option<u32>) -> UiResult<WidgetHandle> {
        if self.by_label.contains_key(&widget.label) {
            return Err(UiError::DuplicateLabel(widget.label));
        }

        #[allow(clippy::cast_possible_truncation)]
        let index = self.widgets.len() as u32;
        let parent = parent.or(self.root);

        widget.parent = parent;
        widget.first_child = None;
        widget.last_child = None;
        widget.next_sibling = None;
        widget.prev_sibling = None;

        if let Some(p) = parent {
            let last = self.widgets[p as usize].last_child;
            widget.prev_sibling = last;
            match last {
                Some(last) => self.widgets[last as usize].next_sibling = Some(index),
                None => self.widgets[p as usize].first_child = Some(index),
            }
            self.widgets[p as usize].last_child = Some(index);
        } else {
            self.root = Some(index);
        }

        self.by_label.insert(widget.label.clone(), index);
        self.widgets.push(widget);
        Ok(WidgetHandle::new(index, self.generation))
    }

    /// Widget for a handle from this frame.
    #[must_use]
    pub fn get(&self, handle: WidgetHandle) -> Option<&Widget> {
        if handle.generation() != self.generation {
            return None;
        }
        self.widgets.get(handle.index() as usize)
    }

    /// Mutable widget for a handle from this frame.
    #[must_use]
    pub fn get_mut(&mut self, handle: WidgetHandle) -> Option<&mut Widget> {
        if handle.generation() != self.generation {
            return None;
        }
        self.widgets.get_mut(handle.index() as usize)
    }

    /// Widget at an arena index.
    #[must_use]
    pub fn node(&self, index: u32) -> Option<&Widget> {
        self.widgets.get(index as usize)
    }

    /// Mutable widget at an arena index.
    #[must_use]
    pub fn node_mut(&mut self, index: u32) -> Option<&mut Widget> {
        self.widgets.get_mut(index as usize)
    }

    /// Looks a widget up by label.
    #[must_use]
    pub fn find(&self, label: &str) -> Option<&Widget> {
        self.by_label.get(label).and_then(|&i| self.node(i))
    }

    /// Handle of the widget with `label`.
    #[must_use]
    pub fn handle_of(&self, label: &str) -> Option<WidgetHandle> {
        self.by_label
            .get(label)
            .map(|&i| WidgetHandle::new(i, self.generation))
    }

    /// Returns true if a widget with `label` was built.
    #[must_use]
    pub fn contains_label(&self, label: &str) -> bool {
        self.by_label.contains_key(label)
    }

    /// Child indices of `index`, in call order.
    #[must_use]
    pub fn children(&self, index: u32) -> Children<'_> {
        Children {
            tree: self,
            next: self.node(index).and_then(|w| w.first_child),
        }
    }

    /// All widget indices in depth-first pre-order from the root.
    pub fn iter_dfs(&self) -> impl Iterator<Item = u32> + '_ {
        WidgetDfsIterator {
            tree: self,
            stack: self.root.into_iter().collect(),
        }
    }
}

/// Iterator over a widget's children.
pub struct Children<'a> {
    tree: &'a WidgetTree,
    next: Option<u32>,
}

impl Iterator for Children<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next?;
        self.next = self.tree.node(index).and_then(|w| w.next_sibling);
        Some(index)
    }
}

/// Depth-first iterator over the widget tree.
struct WidgetDfsIterator<'a> {
    tree: &'a WidgetTree,
    stack: Vec<u32>,
}

impl Iterator for WidgetDfsIterator<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;

        // Push children in reverse order so they're visited left-to-right
        let mut child = self.tree.node(index).and_then(|w| w.last_child);
        while let Some(c) = child {
            self.stack.push(c);
            child = self.tree.node(c).and_then(|w| w.prev_sibling);
        }

        Some(index)
    }
}
