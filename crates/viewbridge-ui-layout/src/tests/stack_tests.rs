use super::*;
use crate::LayoutStyle;
use std::collections::HashMap;
use viewbridge_core::Props;

#[derive(Default)]
struct FixtureTree {
    children: HashMap<Tag, Vec<Tag>>,
    props: HashMap<Tag, Props>,
}

impl FixtureTree {
    fn node(mut self, tag: Tag, props: Props, children: &[Tag]) -> Self {
        self.props.insert(tag, props);
        self.children.insert(tag, children.to_vec());
        self
    }
}

impl LayoutTree for FixtureTree {
    fn layout_children(&self, tag: Tag) -> &[Tag] {
        self.children.get(&tag).map(Vec::as_slice).unwrap_or(&[])
    }

    fn layout_style(&self, tag: Tag) -> LayoutStyle {
        self.props
            .get(&tag)
            .map(LayoutStyle::from_props)
            .unwrap_or_default()
    }
}

fn frame_of(frames: &[(Tag, Rect)], tag: Tag) -> Rect {
    frames
        .iter()
        .find(|(t, _)| *t == tag)
        .map(|(_, rect)| *rect)
        .expect("tag laid out")
}

#[test]
fn column_stacks_children_below_each_other() {
    let tree = FixtureTree::default()
        .node(1, Props::new(), &[2, 3])
        .node(2, Props::new().with("height", 30.0), &[])
        .node(3, Props::new().with("height", 20.0).with("width", 50.0), &[]);

    let frames = StackLayoutEngine::new().calculate_layout(&tree, 1, Constraints::tight(100.0, 200.0));

    assert_eq!(frames.iter().map(|(t, _)| *t).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(frame_of(&frames, 1), Rect::new(0.0, 0.0, 100.0, 200.0));
    // No explicit width: a child fills the available cross extent.
    assert_eq!(frame_of(&frames, 2), Rect::new(0.0, 0.0, 100.0, 30.0));
    assert_eq!(frame_of(&frames, 3), Rect::new(0.0, 30.0, 50.0, 20.0));
}

#[test]
fn row_with_padding_offsets_children() {
    let tree = FixtureTree::default()
        .node(
            1,
            Props::new().with("flexDirection", "row").with("padding", 5.0),
            &[2, 3],
        )
        .node(2, Props::new().with("width", 10.0).with("height", 10.0), &[])
        .node(3, Props::new().with("width", 15.0).with("height", 25.0), &[]);

    let frames = StackLayoutEngine::new().calculate_layout(&tree, 1, Constraints::unbounded());

    assert_eq!(frame_of(&frames, 1), Rect::new(0.0, 0.0, 35.0, 35.0));
    assert_eq!(frame_of(&frames, 2), Rect::new(5.0, 5.0, 10.0, 10.0));
    assert_eq!(frame_of(&frames, 3), Rect::new(15.0, 5.0, 15.0, 25.0));
}

#[test]
fn absolute_children_do_not_take_stack_space() {
    let tree = FixtureTree::default()
        .node(1, Props::new(), &[2, 3])
        .node(
            2,
            Props::new()
                .with("left", 40.0)
                .with("top", 60.0)
                .with("width", 10.0)
                .with("height", 10.0),
            &[],
        )
        .node(3, Props::new().with("height", 20.0), &[]);

    let frames = StackLayoutEngine::new().calculate_layout(&tree, 1, Constraints::tight(100.0, 100.0));

    assert_eq!(frame_of(&frames, 2), Rect::new(40.0, 60.0, 10.0, 10.0));
    assert_eq!(frame_of(&frames, 3), Rect::new(0.0, 0.0, 100.0, 20.0));
}

#[test]
fn explicit_size_is_clamped_to_constraints() {
    let tree = FixtureTree::default().node(
        1,
        Props::new().with("width", 500.0).with("height", 10.0),
        &[],
    );
    let frames = StackLayoutEngine::new().calculate_layout(&tree, 1, Constraints::loose(100.0, 100.0));
    assert_eq!(frame_of(&frames, 1), Rect::new(0.0, 0.0, 100.0, 10.0));
}
