use std::sync::Arc;
use std::thread;
use std::time::Duration;

use viewbridge_core::{Props, Tag, ViewAtIndex};
use viewbridge_native::{
    AddRootView, NativeViewHierarchyManager, Operation, UiBlock, ViewManager, ViewManagerRegistry,
};
use viewbridge_runtime_std::{StdFlushScheduler, UiBlockQueue, UiDispatcher};
use viewbridge_testing::{RecordingViewManager, TestRootContainer, ViewEvent, ViewLog};
use viewbridge_ui_graphics::Rect;

const ROOT: Tag = 1;

fn registry(log: &ViewLog) -> Arc<ViewManagerRegistry> {
    let managers: Vec<Arc<dyn ViewManager>> =
        vec![Arc::new(RecordingViewManager::new("View", log.clone()))];
    Arc::new(ViewManagerRegistry::new(managers).expect("registry"))
}

fn create(tag: Tag) -> Box<dyn UiBlock> {
    Box::new(Operation::CreateView {
        root_tag: ROOT,
        tag,
        view_type: "View".into(),
        props: Props::new(),
    })
}

/// Creates `tags` and appends them to the root after `offset` existing
/// children.
fn append_batch(tags: &[Tag], offset: usize) -> Vec<Box<dyn UiBlock>> {
    let mut batch: Vec<Box<dyn UiBlock>> = tags.iter().map(|&tag| create(tag)).collect();
    batch.push(Box::new(Operation::ManageChildren {
        tag: ROOT,
        indices_to_remove: Vec::new(),
        views_to_add: tags
            .iter()
            .enumerate()
            .map(|(index, &tag)| ViewAtIndex::new(tag, offset + index))
            .collect(),
        tags_to_delete: Vec::new(),
    }));
    batch
}

#[test]
fn batches_from_many_producers_never_interleave() {
    let log = ViewLog::new();
    let queue = UiBlockQueue::new();
    let mut dispatcher = UiDispatcher::new(registry(&log), queue.clone());
    queue.enqueue(AddRootView {
        tag: ROOT,
        container: Box::new(TestRootContainer::new(100.0, 100.0)),
    });
    dispatcher.flush();

    let producers: Vec<_> = (0..4u32)
        .map(|producer| {
            let queue = queue.clone();
            thread::spawn(move || {
                for round in 0..5u32 {
                    let base = 100 + producer * 100 + round * 10;
                    let tags = [base, base + 1, base + 2];
                    let batch: Vec<Box<dyn UiBlock>> =
                        tags.iter().map(|&tag| create(tag)).collect();
                    queue.enqueue_batch(batch);
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().expect("producer");
    }

    let report = dispatcher.flush();
    assert_eq!(report.executed, 60);
    assert_eq!(report.failed, 0);

    // Every batch of three shows up as three consecutive creations.
    let created = log.created();
    assert_eq!(created.len(), 60);
    for chunk in created.chunks(3) {
        assert_eq!(chunk[1], chunk[0] + 1);
        assert_eq!(chunk[2], chunk[0] + 2);
    }
}

#[test]
fn ui_thread_applies_batches_in_arrival_order() {
    let log = ViewLog::new();
    let queue = UiBlockQueue::new();
    let scheduler = Arc::new(StdFlushScheduler::new());
    queue.set_scheduler(scheduler.clone());

    queue.enqueue(AddRootView {
        tag: ROOT,
        container: Box::new(TestRootContainer::new(100.0, 100.0)),
    });
    queue.enqueue_batch(append_batch(&[2, 3], 0));
    queue.enqueue_batch(append_batch(&[4], 2));
    queue.enqueue(Operation::UpdateLayout {
        parent_tag: ROOT,
        tag: 4,
        frame: Rect::new(0.0, 20.0, 100.0, 10.0),
    });
    assert!(scheduler.take_flush_request());

    let ui_log = log.clone();
    let children = thread::spawn(move || {
        let mut dispatcher = UiDispatcher::new(registry(&ui_log), queue);
        let report = dispatcher.pump(Duration::from_secs(1));
        assert_eq!(report.failed, 0);
        dispatcher.manager().children_of(ROOT).expect("root").to_vec()
    })
    .join()
    .expect("ui thread");

    assert_eq!(children, vec![2, 3, 4]);
    assert!(log.events().contains(&ViewEvent::Frame {
        tag: 4,
        frame: Rect::new(0.0, 20.0, 100.0, 10.0),
    }));
}

#[test]
fn failed_operation_is_routed_to_its_root() {
    let log = ViewLog::new();
    let queue = UiBlockQueue::new();
    let mut manager = NativeViewHierarchyManager::new(registry(&log));
    let root = TestRootContainer::new(10.0, 10.0);
    let errors = root.errors();
    queue.enqueue(AddRootView {
        tag: ROOT,
        container: Box::new(root),
    });
    queue.enqueue_batch(append_batch(&[2], 0));
    // Index 5 does not exist under the root.
    queue.enqueue(Operation::ManageChildren {
        tag: ROOT,
        indices_to_remove: vec![5],
        views_to_add: Vec::new(),
        tags_to_delete: Vec::new(),
    });
    queue.enqueue_boxed(create(3));

    let report = queue.flush(&mut manager);
    assert_eq!(report.executed, 4);
    assert_eq!(report.failed, 1);
    assert_eq!(errors.lock().len(), 1);
    assert!(manager.contains(3));
}
