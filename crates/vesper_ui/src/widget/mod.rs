//! Widget records and the per-frame widget tree.
//!
//! A [`Widget`] is plain data: label, flags, sizing rules and the layout
//! results. Behavior lives in the widget constructors on the context.

mod core;
mod tree;

pub use core::{Size, Widget, WidgetFlags, WidgetHandle};
pub use tree::{Children, WidgetTree};
