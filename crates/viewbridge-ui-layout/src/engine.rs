use viewbridge_core::Tag;
use viewbridge_ui_graphics::Rect;

use crate::{Constraints, LayoutStyle};

/// Read-only view of a tree the layout engine walks.
pub trait LayoutTree {
    /// Children of `tag` in structural order. Unknown tags have none.
    fn layout_children(&self, tag: Tag) -> &[Tag];

    fn layout_style(&self, tag: Tag) -> LayoutStyle;
}

/// Computes frames for a subtree.
pub trait LayoutEngine: Send {
    /// Lays out the tree under `root`. Returns one frame per node in
    /// pre-order, each relative to its parent. The root's frame is relative
    /// to the root container.
    fn calculate_layout(
        &mut self,
        tree: &dyn LayoutTree,
        root: Tag,
        constraints: Constraints,
    ) -> Vec<(Tag, Rect)>;
}
