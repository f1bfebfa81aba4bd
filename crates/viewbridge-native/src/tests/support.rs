//! Stub views and managers shared by this crate's unit tests.

use std::sync::Arc;

use parking_lot::Mutex;
use viewbridge_core::{PropValue, Props, Tag, ViewError, ViewResult};
use viewbridge_ui_graphics::{Point, Rect};
use viewbridge_ui_layout::Constraints;

use crate::{NativeView, NativeViewHierarchyManager, RootContainer, ViewManager, ViewManagerRegistry};

#[derive(Debug, Default)]
pub struct StubView {
    pub tag: Tag,
    pub frame: Rect,
    pub children: Vec<Tag>,
    pub props: Props,
    pub custom_order: bool,
}

impl NativeView for StubView {
    fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
    }

    fn insert_child(&mut self, child: Tag, index: usize) {
        self.children.insert(index, child);
    }

    fn remove_child(&mut self, child: Tag, index: usize) {
        assert_eq!(self.children.remove(index), child);
    }

    fn drawing_order_changed(&mut self, custom_order: bool) {
        self.custom_order = custom_order;
    }
}

pub struct StubManager {
    name: String,
    custom_layout: bool,
    pub dropped: Arc<Mutex<Vec<Tag>>>,
    pub commands: Arc<Mutex<Vec<(Tag, String)>>>,
}

impl StubManager {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            custom_layout: false,
            dropped: Arc::default(),
            commands: Arc::default(),
        }
    }

    pub fn laying_out_children(name: &str) -> Self {
        Self {
            custom_layout: true,
            ..Self::new(name)
        }
    }
}

impl ViewManager for StubManager {
    fn name(&self) -> &str {
        &self.name
    }

    fn create_view(&self, tag: Tag, props: &Props) -> Box<dyn NativeView> {
        Box::new(StubView {
            tag,
            props: props.clone(),
            ..StubView::default()
        })
    }

    fn update_properties(&self, view: &mut dyn NativeView, props: &Props) {
        if let Some(view) = view.as_any_mut().downcast_mut::<StubView>() {
            view.props.merge(props);
        }
    }

    fn on_drop_view_instance(&self, tag: Tag, _view: &mut dyn NativeView) {
        self.dropped.lock().push(tag);
    }

    fn receive_command(
        &self,
        tag: Tag,
        _view: &mut dyn NativeView,
        command: &str,
        _args: &[PropValue],
    ) -> ViewResult<()> {
        if command == "focus" {
            self.commands.lock().push((tag, command.to_owned()));
            Ok(())
        } else {
            Err(ViewError::illegal(tag, format!("unsupported command `{command}`")))
        }
    }

    fn needs_custom_layout_for_children(&self) -> bool {
        self.custom_layout
    }
}

pub struct StubRoot {
    pub constraints: Constraints,
    pub origin: Point,
    pub errors: Arc<Mutex<Vec<ViewError>>>,
}

impl StubRoot {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            constraints: Constraints::tight(width, height),
            origin: Point::ZERO,
            errors: Arc::default(),
        }
    }
}

impl RootContainer for StubRoot {
    fn constraints(&self) -> Constraints {
        self.constraints
    }

    fn window_origin(&self) -> Point {
        self.origin
    }

    fn handle_exception(&mut self, error: &ViewError) {
        self.errors.lock().push(error.clone());
    }
}

/// A hierarchy with a `View` manager, a `ScrollView` that lays out its own
/// children and one root at tag 1 sized 100x100.
pub struct Fixture {
    pub hierarchy: NativeViewHierarchyManager,
    pub views: Arc<StubManager>,
    pub root_errors: Arc<Mutex<Vec<ViewError>>>,
}

pub const ROOT: Tag = 1;

pub fn fixture() -> Fixture {
    let views = Arc::new(StubManager::new("View"));
    let scroll: Arc<dyn ViewManager> = Arc::new(StubManager::laying_out_children("ScrollView"));
    let registry = ViewManagerRegistry::new([views.clone() as Arc<dyn ViewManager>, scroll])
        .expect("distinct names");
    let mut hierarchy = NativeViewHierarchyManager::new(Arc::new(registry));
    let root = StubRoot::new(100.0, 100.0);
    let root_errors = Arc::clone(&root.errors);
    hierarchy
        .add_root_view(ROOT, Box::new(root))
        .expect("fresh root");
    Fixture {
        hierarchy,
        views,
        root_errors,
    }
}

impl Fixture {
    pub fn create(&mut self, tag: Tag) {
        self.hierarchy
            .create_view(ROOT, tag, "View", &Props::new())
            .expect("create view");
    }

    pub fn create_with(&mut self, tag: Tag, view_type: &str, props: Props) {
        self.hierarchy
            .create_view(ROOT, tag, view_type, &props)
            .expect("create view");
    }

    pub fn children(&self, tag: Tag) -> Vec<Tag> {
        self.hierarchy.children_of(tag).expect("known view").to_vec()
    }
}
