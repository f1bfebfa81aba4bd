use viewbridge_core::Tag;
use viewbridge_ui_graphics::{Point, Rect, Size};

use crate::{Axis, Constraints, LayoutEngine, LayoutTree};

/// Stacks children along the parent's `flexDirection`, one after another.
///
/// Explicit `width`/`height` win over content size and children stretch
/// across the stack when their cross size is unset. `padding` insets the
/// content box on every side, and children with `left`/`top` are placed at
/// that offset without taking space in the stack. The final size is always
/// clamped to the incoming constraints.
#[derive(Clone, Copy, Debug, Default)]
pub struct StackLayoutEngine;

impl StackLayoutEngine {
    pub fn new() -> Self {
        Self
    }

    fn layout_node(
        &self,
        tree: &dyn LayoutTree,
        tag: Tag,
        constraints: Constraints,
        origin: Point,
        out: &mut Vec<(Tag, Rect)>,
    ) -> Size {
        let style = tree.layout_style(tag);
        let slot = out.len();
        out.push((tag, Rect::ZERO));

        let (fixed_width, fixed_height) = constraints.constrain(
            style.width.unwrap_or(constraints.max_width),
            style.height.unwrap_or(constraints.max_height),
        );
        let own = Constraints {
            min_width: 0.0,
            max_width: fixed_width,
            min_height: 0.0,
            max_height: fixed_height,
        };
        let inner = own.deflate(style.padding, style.padding);
        let axis = style.direction;

        let mut cursor = 0.0f32;
        let mut cross_extent = 0.0f32;
        for &child in tree.layout_children(tag) {
            let child_style = tree.layout_style(child);
            if child_style.is_absolute() {
                let child_origin = Point::new(
                    style.padding + child_style.left.unwrap_or(0.0),
                    style.padding + child_style.top.unwrap_or(0.0),
                );
                self.layout_node(tree, child, inner, child_origin, out);
                continue;
            }

            // Children without an explicit cross size stretch to the
            // content box when it is bounded.
            let stretch = |explicit: Option<f32>, max: f32| {
                if explicit.is_none() && max.is_finite() {
                    max
                } else {
                    0.0
                }
            };
            let (child_origin, available) = match axis {
                Axis::Vertical => (
                    Point::new(style.padding, style.padding + cursor),
                    Constraints {
                        min_width: stretch(child_style.width, inner.max_width),
                        max_width: inner.max_width,
                        min_height: 0.0,
                        max_height: (inner.max_height - cursor).max(0.0),
                    },
                ),
                Axis::Horizontal => (
                    Point::new(style.padding + cursor, style.padding),
                    Constraints {
                        min_width: 0.0,
                        max_width: (inner.max_width - cursor).max(0.0),
                        min_height: stretch(child_style.height, inner.max_height),
                        max_height: inner.max_height,
                    },
                ),
            };
            let size = self.layout_node(tree, child, available, child_origin, out);
            cursor += axis.main(size);
            cross_extent = cross_extent.max(axis.cross(size));
        }

        let content = match axis {
            Axis::Vertical => Size::new(cross_extent, cursor),
            Axis::Horizontal => Size::new(cursor, cross_extent),
        };
        let (width, height) = constraints.constrain(
            style
                .width
                .unwrap_or(content.width + 2.0 * style.padding),
            style
                .height
                .unwrap_or(content.height + 2.0 * style.padding),
        );
        out[slot].1 = Rect::new(origin.x, origin.y, width, height);
        Size::new(width, height)
    }
}

impl LayoutEngine for StackLayoutEngine {
    fn calculate_layout(
        &mut self,
        tree: &dyn LayoutTree,
        root: Tag,
        constraints: Constraints,
    ) -> Vec<(Tag, Rect)> {
        let mut out = Vec::new();
        self.layout_node(tree, root, constraints, Point::ZERO, &mut out);
        out
    }
}

#[cfg(test)]
#[path = "tests/stack_tests.rs"]
mod tests;
