use std::sync::Arc;
use std::thread;
use std::time::Duration;

use viewbridge_core::{PointerEventKind, PointerEventState, Props, Tag, TagAllocator, ViewError, ViewResult};
use viewbridge_native::{
    MeasureSpace, NativeView, PointerDispatcher, PointerEventSink, RawPointerEvent, RootContainer,
    ViewManager, ViewManagerRegistry,
};
use viewbridge_runtime_std::{StdFlushScheduler, UiBlockQueue, UiDispatcher};
use viewbridge_ui_graphics::{Point, Rect};
use viewbridge_ui_layout::Constraints;
use viewbridge_ui_manager::{UiManager, UiManagerConfig};

const SCREEN_WIDTH: f32 = 360.0;
const SCREEN_HEIGHT: f32 = 640.0;
const ROW_COUNT: Tag = 5;

/// Stand-in for a platform widget: it only remembers its frame and text.
struct ConsoleView {
    tag: Tag,
    text: Option<String>,
    frame: Rect,
}

impl NativeView for ConsoleView {
    fn set_frame(&mut self, frame: Rect) {
        if self.frame != frame {
            log::trace!("view {} moved to {frame:?}", self.tag);
        }
        self.frame = frame;
    }
}

struct ConsoleViewManager {
    name: &'static str,
}

impl ViewManager for ConsoleViewManager {
    fn name(&self) -> &str {
        self.name
    }

    fn create_view(&self, tag: Tag, props: &Props) -> Box<dyn NativeView> {
        log::info!("create {} #{tag}", self.name);
        Box::new(ConsoleView {
            tag,
            text: props.get_str("text").map(str::to_owned),
            frame: Rect::ZERO,
        })
    }

    fn update_properties(&self, view: &mut dyn NativeView, props: &Props) {
        let Some(view) = view.as_any_mut().downcast_mut::<ConsoleView>() else {
            return;
        };
        if let Some(text) = props.get_str("text") {
            log::info!("#{} text {:?} -> {text:?}", view.tag, view.text);
            view.text = Some(text.to_owned());
        }
    }

    fn on_drop_view_instance(&self, tag: Tag, _view: &mut dyn NativeView) {
        log::info!("drop {} #{tag}", self.name);
    }
}

struct Screen;

impl RootContainer for Screen {
    fn constraints(&self) -> Constraints {
        Constraints::tight(SCREEN_WIDTH, SCREEN_HEIGHT)
    }

    fn window_origin(&self) -> Point {
        Point::new(0.0, 24.0)
    }

    fn handle_exception(&mut self, error: &ViewError) {
        log::warn!("screen failure: {error}");
    }
}

struct PrintingSink;

impl PointerEventSink for PrintingSink {
    fn dispatch(&mut self, kind: PointerEventKind, state: PointerEventState) {
        println!(
            "{kind:?} on {:?} at {:?}",
            state.target(),
            state.active_offset()
        );
    }
}

fn row(index: Tag) -> Props {
    Props::new()
        .with("height", 48.0)
        .with("text", format!("Row {index}"))
}

/// The description side: builds a list screen, then edits it.
fn describe(mut ui: UiManager) -> ViewResult<Tag> {
    let root = ui.add_root_view(Box::new(Screen))?;
    let header = root + 1;
    let list = root + 2;
    let rows: Vec<Tag> = (0..ROW_COUNT).map(|index| root + 3 + index).collect();

    ui.create_view(
        header,
        "Text",
        root,
        Props::new().with("height", 56.0).with("text", "Inbox"),
    )?;
    ui.create_view(list, "View", root, Props::new().with("padding", 8.0))?;
    for (index, &tag) in (0..).zip(&rows) {
        ui.create_view(tag, "Text", root, row(index))?;
    }
    ui.set_children(root, vec![header, list])?;
    ui.set_children(list, rows.clone())?;
    ui.dispatch_view_updates();

    thread::sleep(Duration::from_millis(50));

    // Swap the third row for a fresh one, drop the last one and raise the
    // first above its siblings.
    let replacement = root + 3 + ROW_COUNT;
    ui.create_view(replacement, "Text", root, row(99))?;
    ui.manage_children(list, &[], &[], &[replacement], &[2], &[2, 4])?;
    ui.update_view(rows[0], Props::new().with("zIndex", 1).with("text", "Pinned"))?;
    ui.dispatch_view_updates();

    let frame = ui.measure_sync(replacement, MeasureSpace::Window, Duration::from_secs(1))?;
    println!("replacement row is at {frame:?} in the window");
    Ok(root)
}

fn main() {
    env_logger::init();

    println!("=== viewbridge demo ===");

    let managers: Vec<Arc<dyn ViewManager>> = vec![
        Arc::new(ConsoleViewManager { name: "View" }),
        Arc::new(ConsoleViewManager { name: "Text" }),
    ];
    let registry = match ViewManagerRegistry::new(managers) {
        Ok(registry) => Arc::new(registry),
        Err(err) => {
            eprintln!("registry: {err}");
            return;
        }
    };

    let scheduler = Arc::new(StdFlushScheduler::new());
    let queue = UiBlockQueue::with_scheduler(scheduler.clone());
    let ui = UiManager::new(Arc::clone(&registry), Arc::new(TagAllocator::new()), queue.clone())
        .with_config(UiManagerConfig {
            log_batches: true,
            ..UiManagerConfig::default()
        });
    let description = thread::spawn(move || describe(ui));

    let mut dispatcher = UiDispatcher::new(registry, queue);
    scheduler.set_flush_waker(|| log::debug!("flush requested"));
    while !description.is_finished() || !dispatcher.queue().is_empty() {
        dispatcher.queue().wait_for_work(Duration::from_millis(16));
        let Some(report) = scheduler.flush_if_requested(|| dispatcher.flush()) else {
            continue;
        };
        println!("--- flushed {} blocks ({} failed)", report.total(), report.failed);
        print!("{}", dispatcher.manager().dump_tree(None));
    }
    scheduler.clear_flush_waker();

    let root = match description.join() {
        Ok(Ok(root)) => root,
        Ok(Err(err)) => {
            eprintln!("description failed: {err}");
            return;
        }
        Err(_) => {
            eprintln!("description thread panicked");
            return;
        }
    };

    let mut pointers = PointerDispatcher::new(root);
    let mut sink = PrintingSink;
    for event in [
        RawPointerEvent::new(1, PointerEventKind::Down, Point::new(40.0, 90.0)),
        RawPointerEvent::new(1, PointerEventKind::Up, Point::new(40.0, 90.0)),
    ] {
        if let Err(err) = pointers.handle_event(dispatcher.manager_mut(), event, &mut sink) {
            eprintln!("pointer: {err}");
        }
    }
}
