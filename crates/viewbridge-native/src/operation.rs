use serde::{Deserialize, Serialize};
use viewbridge_core::{PropValue, Props, Tag, ViewAtIndex, ViewResult};
use viewbridge_ui_graphics::Rect;

use crate::{NativeViewHierarchyManager, RootContainer};

/// Unit of work run exactly once on the UI thread.
pub trait UiBlock: Send {
    fn execute(self: Box<Self>, manager: &mut NativeViewHierarchyManager) -> ViewResult<()>;

    /// View the block is about. Failures are reported to that view's root.
    fn target_tag(&self) -> Option<Tag> {
        None
    }
}

/// Wraps a closure as a [`UiBlock`].
pub struct FnBlock<F> {
    f: F,
    target: Option<Tag>,
}

impl<F> FnBlock<F>
where
    F: FnOnce(&mut NativeViewHierarchyManager) -> ViewResult<()> + Send,
{
    pub fn new(f: F) -> Self {
        Self { f, target: None }
    }

    /// Closure whose failures belong to `tag`'s root.
    pub fn targeting(tag: Tag, f: F) -> Self {
        Self {
            f,
            target: Some(tag),
        }
    }
}

impl<F> UiBlock for FnBlock<F>
where
    F: FnOnce(&mut NativeViewHierarchyManager) -> ViewResult<()> + Send,
{
    fn execute(self: Box<Self>, manager: &mut NativeViewHierarchyManager) -> ViewResult<()> {
        let FnBlock { f, .. } = *self;
        f(manager)
    }

    fn target_tag(&self) -> Option<Tag> {
        self.target
    }
}

/// Serializable mutation of the native hierarchy, as produced by the UI
/// manager after a layout pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Operation {
    CreateView {
        root_tag: Tag,
        tag: Tag,
        view_type: String,
        props: Props,
    },
    UpdateProperties {
        tag: Tag,
        props: Props,
    },
    UpdateLayout {
        parent_tag: Tag,
        tag: Tag,
        frame: Rect,
    },
    ManageChildren {
        tag: Tag,
        indices_to_remove: Vec<usize>,
        views_to_add: Vec<ViewAtIndex>,
        tags_to_delete: Vec<Tag>,
    },
    SetChildren {
        tag: Tag,
        child_tags: Vec<Tag>,
    },
    RemoveRootView {
        root_tag: Tag,
    },
    DispatchCommand {
        tag: Tag,
        command: String,
        args: Vec<PropValue>,
    },
}

impl Operation {
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::CreateView { .. } => "create_view",
            Operation::UpdateProperties { .. } => "update_properties",
            Operation::UpdateLayout { .. } => "update_layout",
            Operation::ManageChildren { .. } => "manage_children",
            Operation::SetChildren { .. } => "set_children",
            Operation::RemoveRootView { .. } => "remove_root_view",
            Operation::DispatchCommand { .. } => "dispatch_command",
        }
    }

    pub fn tag(&self) -> Tag {
        match self {
            Operation::CreateView { tag, .. }
            | Operation::UpdateProperties { tag, .. }
            | Operation::UpdateLayout { tag, .. }
            | Operation::ManageChildren { tag, .. }
            | Operation::SetChildren { tag, .. }
            | Operation::DispatchCommand { tag, .. } => *tag,
            Operation::RemoveRootView { root_tag } => *root_tag,
        }
    }

    pub fn apply(&self, manager: &mut NativeViewHierarchyManager) -> ViewResult<()> {
        match self {
            Operation::CreateView {
                root_tag,
                tag,
                view_type,
                props,
            } => manager.create_view(*root_tag, *tag, view_type, props),
            Operation::UpdateProperties { tag, props } => manager.update_properties(*tag, props),
            Operation::UpdateLayout {
                parent_tag,
                tag,
                frame,
            } => manager.update_layout(*parent_tag, *tag, *frame),
            Operation::ManageChildren {
                tag,
                indices_to_remove,
                views_to_add,
                tags_to_delete,
            } => manager.manage_children(*tag, indices_to_remove, views_to_add, tags_to_delete),
            Operation::SetChildren { tag, child_tags } => manager.set_children(*tag, child_tags),
            Operation::RemoveRootView { root_tag } => manager.remove_root_view(*root_tag),
            Operation::DispatchCommand { tag, command, args } => {
                manager.dispatch_command(*tag, command, args)
            }
        }
    }
}

impl UiBlock for Operation {
    fn execute(self: Box<Self>, manager: &mut NativeViewHierarchyManager) -> ViewResult<()> {
        log::trace!("{} on {}", self.kind(), self.tag());
        self.apply(manager)
    }

    fn target_tag(&self) -> Option<Tag> {
        match self {
            // Creation and removal name their root directly.
            Operation::CreateView { root_tag, .. } | Operation::RemoveRootView { root_tag } => {
                Some(*root_tag)
            }
            other => Some(other.tag()),
        }
    }
}

/// Registers a root container under a freshly allocated tag.
pub struct AddRootView {
    pub tag: Tag,
    pub container: Box<dyn RootContainer>,
}

impl UiBlock for AddRootView {
    fn execute(self: Box<Self>, manager: &mut NativeViewHierarchyManager) -> ViewResult<()> {
        let AddRootView { tag, container } = *self;
        manager.add_root_view(tag, container)
    }

    fn target_tag(&self) -> Option<Tag> {
        Some(self.tag)
    }
}

/// Coordinate space of a measurement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MeasureSpace {
    /// Relative to the view's root.
    #[default]
    Root,
    Window,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureRequest {
    pub tag: Tag,
    pub space: MeasureSpace,
}

pub type MeasureCallback = Box<dyn FnOnce(ViewResult<Rect>) + Send>;

/// Measures a view and hands the result to a callback. A failed
/// measurement goes to the callback, not to the root's exception hook.
pub struct MeasureBlock {
    request: MeasureRequest,
    callback: MeasureCallback,
}

impl MeasureBlock {
    pub fn new(request: MeasureRequest, callback: impl FnOnce(ViewResult<Rect>) + Send + 'static) -> Self {
        Self {
            request,
            callback: Box::new(callback),
        }
    }
}

impl UiBlock for MeasureBlock {
    fn execute(self: Box<Self>, manager: &mut NativeViewHierarchyManager) -> ViewResult<()> {
        let MeasureBlock { request, callback } = *self;
        let result = match request.space {
            MeasureSpace::Root => manager.measure(request.tag),
            MeasureSpace::Window => manager.measure_in_window(request.tag),
        };
        callback(result);
        Ok(())
    }

    fn target_tag(&self) -> Option<Tag> {
        Some(self.request.tag)
    }
}
