use viewbridge_core::{PointerEvents, Props, Tag};
use viewbridge_ui_graphics::Rect;

/// One node of the shadow tree.
///
/// `parent` is a handle into the owning [`ShadowTree`](crate::ShadowTree),
/// not an owning reference; the tree owns every node.
#[derive(Clone, Debug)]
pub struct ShadowNode {
    tag: Tag,
    view_type: String,
    root_tag: Tag,
    pub(crate) parent: Option<Tag>,
    pub(crate) children: Vec<Tag>,
    pub(crate) props: Props,
    pub(crate) layout: Rect,
    pub(crate) committed_layout: Option<Rect>,
    pub(crate) dirty: bool,
    pub(crate) pointer_events: PointerEvents,
}

impl ShadowNode {
    pub(crate) fn new(tag: Tag, view_type: impl Into<String>, root_tag: Tag, props: Props) -> Self {
        let pointer_events = props.pointer_events().unwrap_or_default();
        Self {
            tag,
            view_type: view_type.into(),
            root_tag,
            parent: None,
            children: Vec::new(),
            props,
            layout: Rect::ZERO,
            committed_layout: None,
            dirty: true,
            pointer_events,
        }
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn view_type(&self) -> &str {
        &self.view_type
    }

    pub fn root_tag(&self) -> Tag {
        self.root_tag
    }

    pub fn is_root(&self) -> bool {
        self.tag == self.root_tag
    }

    pub fn parent(&self) -> Option<Tag> {
        self.parent
    }

    pub fn children(&self) -> &[Tag] {
        &self.children
    }

    pub fn child_at(&self, index: usize) -> Option<Tag> {
        self.children.get(index).copied()
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    /// Frame from the most recent layout pass, relative to the parent.
    pub fn layout(&self) -> Rect {
        self.layout
    }

    /// Frame last handed to the native side, if any.
    pub fn committed_layout(&self) -> Option<Rect> {
        self.committed_layout
    }

    pub fn has_unseen_layout(&self) -> bool {
        self.committed_layout != Some(self.layout)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn pointer_events(&self) -> PointerEvents {
        self.pointer_events
    }

    pub(crate) fn merge_props(&mut self, update: &Props) {
        self.props.merge(update);
        // A cleared value parses back to `Auto`.
        if let Some(mode) = update.pointer_events() {
            self.pointer_events = mode;
        }
        self.dirty = true;
    }
}
