use std::any::Any;

use viewbridge_core::{PropValue, Props, Tag, ViewError, ViewResult};
use viewbridge_ui_graphics::{Point, Rect};
use viewbridge_ui_layout::Constraints;

/// A live native view.
///
/// Views are opaque to the bridge; every hook has a no-op default so a view
/// type only implements what it reacts to. Views are created and touched on
/// the UI thread only and need not be `Send`.
pub trait NativeView: Any {
    fn set_frame(&mut self, _frame: Rect) {}
    fn insert_child(&mut self, _child: Tag, _index: usize) {}
    fn remove_child(&mut self, _child: Tag, _index: usize) {}
    /// Called when the group switches custom drawing order on or off, or
    /// the order changes while it is on.
    fn drawing_order_changed(&mut self, _custom_order: bool) {}
}

impl dyn NativeView {
    pub fn as_any(&self) -> &dyn Any {
        self
    }

    pub fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Behaviour for one view type, shared by all of its instances.
pub trait ViewManager: Send + Sync {
    /// View type name the description layer refers to.
    fn name(&self) -> &str;

    /// Creates a view with its initial props applied.
    fn create_view(&self, tag: Tag, props: &Props) -> Box<dyn NativeView>;

    fn update_properties(&self, _view: &mut dyn NativeView, _props: &Props) {}

    fn update_layout(&self, view: &mut dyn NativeView, frame: Rect) {
        view.set_frame(frame);
    }

    /// Last call a view gets before the hierarchy forgets it.
    fn on_drop_view_instance(&self, _tag: Tag, _view: &mut dyn NativeView) {}

    fn receive_command(
        &self,
        tag: Tag,
        _view: &mut dyn NativeView,
        command: &str,
        _args: &[PropValue],
    ) -> ViewResult<()> {
        Err(ViewError::illegal(
            tag,
            format!("{} does not support command `{command}`", self.name()),
        ))
    }

    /// When true the parent positions its children itself and
    /// `update_layout` leaves them alone.
    fn needs_custom_layout_for_children(&self) -> bool {
        false
    }
}

/// Host surface a root view is attached to.
pub trait RootContainer: Send {
    /// Size constraints the root is laid out with.
    fn constraints(&self) -> Constraints;

    /// Position of the root's top-left corner in window coordinates.
    fn window_origin(&self) -> Point {
        Point::ZERO
    }

    /// Receives failures of blocks that targeted this root.
    fn handle_exception(&mut self, error: &ViewError);
}
