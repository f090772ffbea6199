//! Layout solver.
//!
//! Each axis is solved independently, X then Y, in four passes over the
//! finished tree:
//!
//! ```text
//! 1. rigid      (top-down)   Pixels, TextBounds          everything else -> 0
//! 2. upward     (top-down)   ParentPercent of the nearest rigid ancestor
//! 3. downward   (post-order) ChildrenSum
//! 4. resolve    (top-down)   clamp to parent
//!    place      (top-down)   stack children along the layout axis
//! ```
//!
//! Rect width and height are copied from both axes on every run, so a rect
//! is only complete once both axes have been solved.

use crate::error::{UiError, UiResult};
use crate::geometry::Axis;
use crate::glyph::GlyphAtlas;
use crate::widget::{Size, WidgetTree};

/// Solves X then Y.
///
/// # Errors
///
/// [`UiError::MissingRigidAncestor`] if a `ParentPercent` widget has nothing
/// rigid above it.
pub fn layout(tree: &mut WidgetTree, atlas: &GlyphAtlas) -> UiResult<()> {
    for axis in Axis::ALL {
        layout_axis(tree, atlas, axis)?;
    }
    Ok(())
}

/// Runs the four passes on one axis.
///
/// # Errors
///
/// See [`layout`].
pub fn layout_axis(tree: &mut WidgetTree, atlas: &GlyphAtlas, axis: Axis) -> UiResult<()> {
    // Pre-order visits every parent before its children; the reverse
    // visits every child before its parent.
    let order: Vec<u32> = tree.iter_dfs().collect();

    calc_rigid(tree, atlas, axis, &order);
    calc_upward_dependent(tree, axis, &order)?;
    calc_downward_dependent(tree, axis, &order);
    resolve_sizes(tree, axis, &order);
    place(tree, axis, &order);
    Ok(())
}

fn calc_rigid(tree: &mut WidgetTree, atlas: &GlyphAtlas, axis: Axis, order: &[u32]) {
    for &index in order {
        let Some(widget) = tree.node_mut(index) else { continue };
        let size = match widget.pref(axis) {
            Size::Pixels(px) => px,
            Size::TextBounds(padding) => {
                let extent = match axis {
                    Axis::X => atlas.text_width(&widget.text),
                    Axis::Y => atlas.measure_height(&widget.text),
                };
                extent + padding
            }
            Size::Undefined | Size::ParentPercent(_) | Size::ChildrenSum => 0.0,
        };
        widget.actual_size.set(axis, size);
    }
}

fn calc_upward_dependent(tree: &mut WidgetTree, axis: Axis, order: &[u32]) -> UiResult<()> {
    for &index in order {
        let Some(widget) = tree.node(index) else { continue };
        let Size::ParentPercent(fraction) = widget.pref(axis) else { continue };

        let mut ancestor = widget.parent();
        let mut basis = None;
        while let Some(a) = ancestor.and_then(|a| tree.node(a)) {
            if a.pref(axis).is_rigid() {
                basis = Some(a.actual_size.get(axis));
                break;
            }
            ancestor = a.parent();
        }

        let Some(basis) = basis else {
            tracing::warn!(label = %widget.label, ?axis, "parent-percent size without a rigid ancestor");
            return Err(UiError::MissingRigidAncestor {
                label: widget.label.clone(),
                axis,
            });
        };

        if let Some(widget) = tree.node_mut(index) {
            widget.actual_size.set(axis, fraction * basis);
        }
    }
    Ok(())
}

fn calc_downward_dependent(tree: &mut WidgetTree, axis: Axis, order: &[u32]) {
    for &index in order.iter().rev() {
        let Some(widget) = tree.node(index) else { continue };
        if widget.pref(axis) != Size::ChildrenSum {
            continue;
        }

        let sum: f32 = tree
            .children(index)
            .filter_map(|c| tree.node(c))
            .map(|c| c.actual_size.get(axis))
            .sum();

        if let Some(widget) = tree.node_mut(index) {
            widget.actual_size.set(axis, sum);
        }
    }
}

fn resolve_sizes(tree: &mut WidgetTree, axis: Axis, order: &[u32]) {
    for &index in order {
        let limit = tree
            .node(index)
            .and_then(|w| w.parent())
            .and_then(|p| tree.node(p))
            .map(|p| p.actual_size.get(axis));

        // The root is never clamped.
        let (Some(limit), Some(widget)) = (limit, tree.node_mut(index)) else { continue };
        let size = widget.actual_size.get(axis).clamp(0.0, limit.max(0.0));
        widget.actual_size.set(axis, size);
    }
}

fn place(tree: &mut WidgetTree, axis: Axis, order: &[u32]) {
    for &index in order {
        let Some(widget) = tree.node(index) else { continue };
        let base = widget
            .parent()
            .and_then(|p| tree.node(p))
            .map_or(0.0, |p| p.rect.origin().get(axis));
        let stack_children = widget.child_layout_axis == Some(axis);

        let mut offset = 0.0;
        let mut cursor = widget.first_child();
        while let Some(child) = cursor.and_then(|c| tree.node_mut(c)) {
            child.relative_position.set(axis, offset);
            if stack_children {
                offset += child.actual_size.get(axis);
            }
            cursor = child.next_sibling();
        }

        let Some(widget) = tree.node_mut(index) else { continue };
        let absolute = base + widget.relative_position.get(axis);
        match axis {
            Axis::X => widget.rect.x = absolute,
            Axis::Y => widget.rect.y = absolute,
        }
        widget.rect.width = widget.actual_size.x;
        widget.rect.height = widget.actual_size.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::glyph::BlockGlyphs;
    use crate::widget::{Widget, WidgetFlags, WidgetHandle};

    fn atlas() -> GlyphAtlas {
        GlyphAtlas::build(&BlockGlyphs::default())
    }

    fn add(tree: &mut WidgetTree, label: &str, parent: Option<WidgetHandle>, x: Size, y: Size) -> WidgetHandle {
        let mut widget = Widget::new(label, WidgetFlags::empty());
        widget.pref_size = [x, y];
        tree.insert(widget, parent.map(WidgetHandle::index)).unwrap()
    }

    fn root(tree: &mut WidgetTree, w: f32, h: f32, axis: Axis) -> WidgetHandle {
        let root = add(tree, "~Root", None, Size::Pixels(w), Size::Pixels(h));
        tree.get_mut(root).unwrap().child_layout_axis = Some(axis);
        root
    }

    #[test]
    fn test_rigid_child_clamped_to_parent() {
        let mut tree = WidgetTree::new(1);
        let r = root(&mut tree, 50.0, 50.0, Axis::Y);
        let child = add(&mut tree, "Big", Some(r), Size::Pixels(100.0), Size::Pixels(10.0));

        layout(&mut tree, &atlas()).unwrap();

        assert_eq!(tree.get(child).unwrap().actual_size.x, 50.0);
        assert_eq!(tree.get(child).unwrap().rect.width, 50.0);
    }

    #[test]
    fn test_children_sum() {
        let mut tree = WidgetTree::new(1);
        let r = root(&mut tree, 500.0, 500.0, Axis::Y);
        let row = add(&mut tree, "Row", Some(r), Size::ChildrenSum, Size::Pixels(20.0));
        tree.get_mut(row).unwrap().child_layout_axis = Some(Axis::X);
        for (label, w) in [("A", 10.0), ("B", 20.0), ("C", 30.0)] {
            add(&mut tree, label, Some(row), Size::Pixels(w), Size::Pixels(20.0));
        }

        layout(&mut tree, &atlas()).unwrap();

        assert_eq!(tree.get(row).unwrap().actual_size.x, 60.0);
    }

    #[test]
    fn test_parent_percent_of_rigid_ancestor() {
        let mut tree = WidgetTree::new(1);
        let r = root(&mut tree, 800.0, 600.0, Axis::Y);
        let panel = add(&mut tree, "Panel", Some(r), Size::Pixels(200.0), Size::Pixels(100.0));
        let middle = add(&mut tree, "Middle", Some(panel), Size::ChildrenSum, Size::Pixels(100.0));
        let half = add(&mut tree, "Half", Some(middle), Size::ParentPercent(0.5), Size::Pixels(10.0));

        layout_axis(&mut tree, &atlas(), Axis::X).unwrap();

        // Middle is not rigid, so Half measures against Panel.
        assert_eq!(tree.get(half).unwrap().actual_size.x, 100.0);
    }

    #[test]
    fn test_missing_rigid_ancestor_is_an_error() {
        let mut tree = WidgetTree::new(1);
        let top = add(&mut tree, "Top", None, Size::ChildrenSum, Size::ChildrenSum);
        add(&mut tree, "Lost", Some(top), Size::ParentPercent(1.0), Size::Pixels(1.0));

        let err = layout(&mut tree, &atlas()).unwrap_err();
        assert!(matches!(err, UiError::MissingRigidAncestor { ref label, axis: Axis::X } if label == "Lost"));
    }

    #[test]
    fn test_sibling_placement_along_layout_axis() {
        let mut tree = WidgetTree::new(1);
        let r = root(&mut tree, 500.0, 500.0, Axis::X);
        let a = add(&mut tree, "A", Some(r), Size::Pixels(10.0), Size::Pixels(5.0));
        let b = add(&mut tree, "B", Some(r), Size::Pixels(20.0), Size::Pixels(5.0));
        let c = add(&mut tree, "C", Some(r), Size::Pixels(30.0), Size::Pixels(5.0));

        layout(&mut tree, &atlas()).unwrap();

        let xs: Vec<f32> = [a, b, c].iter().map(|h| tree.get(*h).unwrap().rect.x).collect();
        assert_eq!(xs, vec![0.0, 10.0, 30.0]);
        // Cross axis does not advance.
        assert!([a, b, c].iter().all(|h| tree.get(*h).unwrap().rect.y == 0.0));
    }

    #[test]
    fn test_nested_absolute_positions() {
        let mut tree = WidgetTree::new(1);
        let r = root(&mut tree, 500.0, 500.0, Axis::Y);
        add(&mut tree, "Header", Some(r), Size::Pixels(500.0), Size::Pixels(16.0));
        let row = add(&mut tree, "Row", Some(r), Size::ParentPercent(1.0), Size::Pixels(16.0));
        tree.get_mut(row).unwrap().child_layout_axis = Some(Axis::X);
        add(&mut tree, "First", Some(row), Size::Pixels(40.0), Size::Pixels(16.0));
        let second = add(&mut tree, "Second", Some(row), Size::TextBounds(20.0), Size::TextBounds(0.0));

        layout(&mut tree, &atlas()).unwrap();

        // "Second" is 6 chars of 8px plus 20 padding, one 16px line tall.
        assert_eq!(tree.get(second).unwrap().rect, Rect::new(40.0, 16.0, 68.0, 16.0));
        assert_eq!(tree.get(row).unwrap().rect, Rect::new(0.0, 16.0, 500.0, 16.0));
    }

    #[test]
    fn test_undefined_and_overlap() {
        let mut tree = WidgetTree::new(1);
        let r = add(&mut tree, "~Root", None, Size::Pixels(100.0), Size::Pixels(100.0));
        let a = add(&mut tree, "A", Some(r), Size::Pixels(10.0), Size::Undefined);
        let b = add(&mut tree, "B", Some(r), Size::Pixels(10.0), Size::Undefined);

        layout(&mut tree, &atlas()).unwrap();

        // No layout axis on the root: children overlap.
        assert_eq!(tree.get(a).unwrap().rect, tree.get(b).unwrap().rect);
        assert_eq!(tree.get(a).unwrap().rect.height, 0.0);
    }

    #[test]
    fn test_layout_is_idempotent() {
        let mut tree = WidgetTree::new(1);
        let r = root(&mut tree, 300.0, 200.0, Axis::Y);
        let row = add(&mut tree, "Row", Some(r), Size::ParentPercent(1.0), Size::Pixels(16.0));
        tree.get_mut(row).unwrap().child_layout_axis = Some(Axis::X);
        add(&mut tree, "File", Some(row), Size::TextBounds(20.0), Size::TextBounds(0.0));
        add(&mut tree, "Edit", Some(row), Size::TextBounds(20.0), Size::TextBounds(0.0));

        let atlas = atlas();
        layout(&mut tree, &atlas).unwrap();
        let first: Vec<Rect> = tree.iter_dfs().map(|i| tree.node(i).unwrap().rect).collect();
        layout(&mut tree, &atlas).unwrap();
        let second: Vec<Rect> = tree.iter_dfs().map(|i| tree.node(i).unwrap().rect).collect();

        assert_eq!(first, second);
    }
}
