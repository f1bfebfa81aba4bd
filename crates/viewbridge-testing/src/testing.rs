use std::sync::Arc;

use parking_lot::Mutex;
use viewbridge_core::{PropValue, Props, Tag, TagAllocator, ViewError, ViewResult};
use viewbridge_native::{NativeView, RootContainer, ViewManager, ViewManagerRegistry};
use viewbridge_runtime_std::{FlushReport, UiBlockQueue, UiDispatcher};
use viewbridge_ui_graphics::{Point, Rect};
use viewbridge_ui_layout::Constraints;
use viewbridge_ui_manager::UiManager;

/// Something a [`RecordingViewManager`] saw happen to one of its views.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewEvent {
    Created { tag: Tag, view_type: String },
    Updated { tag: Tag, props: Props },
    Frame { tag: Tag, frame: Rect },
    Inserted { parent: Tag, child: Tag, index: usize },
    Removed { parent: Tag, child: Tag, index: usize },
    Dropped { tag: Tag },
    Command { tag: Tag, command: String, args: Vec<PropValue> },
    DrawingOrder { tag: Tag, custom: bool },
}

/// Shared, append-only record of [`ViewEvent`]s.
#[derive(Clone, Debug, Default)]
pub struct ViewLog {
    events: Arc<Mutex<Vec<ViewEvent>>>,
}

impl ViewLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: ViewEvent) {
        self.events.lock().push(event);
    }

    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().clone()
    }

    /// Returns and forgets everything recorded so far.
    pub fn take(&self) -> Vec<ViewEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    pub fn dropped(&self) -> Vec<Tag> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                ViewEvent::Dropped { tag } => Some(*tag),
                _ => None,
            })
            .collect()
    }

    pub fn created(&self) -> Vec<Tag> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                ViewEvent::Created { tag, .. } => Some(*tag),
                _ => None,
            })
            .collect()
    }
}

/// View that mirrors what the hierarchy did to it and logs every hook.
#[derive(Debug)]
pub struct TestView {
    pub tag: Tag,
    pub view_type: String,
    pub props: Props,
    pub frame: Rect,
    pub children: Vec<Tag>,
    pub custom_drawing_order: bool,
    log: ViewLog,
}

impl NativeView for TestView {
    fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
        self.log.push(ViewEvent::Frame {
            tag: self.tag,
            frame,
        });
    }

    fn insert_child(&mut self, child: Tag, index: usize) {
        self.children.insert(index, child);
        self.log.push(ViewEvent::Inserted {
            parent: self.tag,
            child,
            index,
        });
    }

    fn remove_child(&mut self, child: Tag, index: usize) {
        if self.children.get(index) == Some(&child) {
            self.children.remove(index);
        } else {
            self.children.retain(|&tag| tag != child);
        }
        self.log.push(ViewEvent::Removed {
            parent: self.tag,
            child,
            index,
        });
    }

    fn drawing_order_changed(&mut self, custom_order: bool) {
        self.custom_drawing_order = custom_order;
        self.log.push(ViewEvent::DrawingOrder {
            tag: self.tag,
            custom: custom_order,
        });
    }
}

/// View manager that creates [`TestView`]s and records into a [`ViewLog`].
///
/// Commands listed in `commands` succeed, anything else fails.
pub struct RecordingViewManager {
    name: String,
    log: ViewLog,
    commands: Vec<String>,
    custom_layout: bool,
}

impl RecordingViewManager {
    pub fn new(name: impl Into<String>, log: ViewLog) -> Self {
        Self {
            name: name.into(),
            log,
            commands: Vec::new(),
            custom_layout: false,
        }
    }

    pub fn accepting(mut self, command: impl Into<String>) -> Self {
        self.commands.push(command.into());
        self
    }

    pub fn laying_out_children(mut self) -> Self {
        self.custom_layout = true;
        self
    }
}

impl ViewManager for RecordingViewManager {
    fn name(&self) -> &str {
        &self.name
    }

    fn create_view(&self, tag: Tag, props: &Props) -> Box<dyn NativeView> {
        self.log.push(ViewEvent::Created {
            tag,
            view_type: self.name.clone(),
        });
        Box::new(TestView {
            tag,
            view_type: self.name.clone(),
            props: props.clone(),
            frame: Rect::ZERO,
            children: Vec::new(),
            custom_drawing_order: false,
            log: self.log.clone(),
        })
    }

    fn update_properties(&self, view: &mut dyn NativeView, props: &Props) {
        if let Some(view) = view.as_any_mut().downcast_mut::<TestView>() {
            view.props.merge(props);
            self.log.push(ViewEvent::Updated {
                tag: view.tag,
                props: props.clone(),
            });
        }
    }

    fn on_drop_view_instance(&self, tag: Tag, _view: &mut dyn NativeView) {
        self.log.push(ViewEvent::Dropped { tag });
    }

    fn receive_command(
        &self,
        tag: Tag,
        _view: &mut dyn NativeView,
        command: &str,
        args: &[PropValue],
    ) -> ViewResult<()> {
        if !self.commands.iter().any(|known| known == command) {
            return Err(ViewError::illegal(
                tag,
                format!("{} does not support command `{command}`", self.name),
            ));
        }
        self.log.push(ViewEvent::Command {
            tag,
            command: command.to_owned(),
            args: args.to_vec(),
        });
        Ok(())
    }

    fn needs_custom_layout_for_children(&self) -> bool {
        self.custom_layout
    }
}

/// Root container with fixed constraints that keeps every error it is
/// handed.
pub struct TestRootContainer {
    constraints: Constraints,
    origin: Point,
    errors: Arc<Mutex<Vec<ViewError>>>,
}

impl TestRootContainer {
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_constraints(Constraints::tight(width, height))
    }

    pub fn with_constraints(constraints: Constraints) -> Self {
        Self {
            constraints,
            origin: Point::ZERO,
            errors: Arc::default(),
        }
    }

    pub fn at(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    /// Handle to the errors this root receives, usable after the container
    /// has been handed over.
    pub fn errors(&self) -> Arc<Mutex<Vec<ViewError>>> {
        Arc::clone(&self.errors)
    }
}

impl RootContainer for TestRootContainer {
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

/// A [`UiManager`] wired to a [`UiDispatcher`] on the calling thread.
///
/// [`flush`](Self::flush) dispatches the pending batch and runs it right
/// away, so tests can assert on both trees without spawning threads.
pub struct TestHarness {
    pub ui: UiManager,
    pub dispatcher: UiDispatcher,
    pub log: ViewLog,
}

impl TestHarness {
    /// Harness with a recording manager for each of `view_types`.
    pub fn new(view_types: &[&str]) -> Self {
        let log = ViewLog::new();
        let managers: Vec<Arc<dyn ViewManager>> = view_types
            .iter()
            .map(|&name| {
                Arc::new(RecordingViewManager::new(name, log.clone())) as Arc<dyn ViewManager>
            })
            .collect();
        Self::with_managers(managers, log)
    }

    /// Harness over caller-built managers. `log` is only what the caller
    /// wired into them.
    ///
    /// # Panics
    ///
    /// Panics when two managers share a name.
    pub fn with_managers(managers: Vec<Arc<dyn ViewManager>>, log: ViewLog) -> Self {
        let registry = match ViewManagerRegistry::new(managers) {
            Ok(registry) => Arc::new(registry),
            Err(err) => panic!("test harness registry: {err}"),
        };
        let queue = UiBlockQueue::new();
        let ui = UiManager::new(
            Arc::clone(&registry),
            Arc::new(TagAllocator::new()),
            queue.clone(),
        );
        let dispatcher = UiDispatcher::new(registry, queue);
        Self {
            ui,
            dispatcher,
            log,
        }
    }

    /// Adds a tight root of the given size. Returns its tag and its error
    /// sink.
    pub fn add_root(&mut self, width: f32, height: f32) -> (Tag, Arc<Mutex<Vec<ViewError>>>) {
        let container = TestRootContainer::new(width, height);
        let errors = container.errors();
        let tag = match self.ui.add_root_view(Box::new(container)) {
            Ok(tag) => tag,
            Err(err) => panic!("test harness root: {err}"),
        };
        (tag, errors)
    }

    /// Dispatches pending updates and runs them on the native side.
    pub fn flush(&mut self) -> FlushReport {
        self.ui.dispatch_view_updates();
        self.dispatcher.flush()
    }

    pub fn native_children(&self, tag: Tag) -> Vec<Tag> {
        self.dispatcher
            .manager()
            .children_of(tag)
            .map(<[Tag]>::to_vec)
            .unwrap_or_default()
    }

    pub fn shadow_children(&self, tag: Tag) -> Vec<Tag> {
        self.ui
            .shadow_tree()
            .get(tag)
            .map(|node| node.children().to_vec())
            .unwrap_or_default()
    }

    pub fn native_frame(&self, tag: Tag) -> Option<Rect> {
        self.dispatcher.manager().frame_of(tag).ok()
    }

    /// Reads a [`TestView`] of the native hierarchy.
    pub fn with_test_view<R>(&mut self, tag: Tag, f: impl FnOnce(&TestView) -> R) -> Option<R> {
        self.dispatcher
            .manager_mut()
            .with_view::<TestView, R>(tag, |view| f(view))
            .ok()
    }
}
