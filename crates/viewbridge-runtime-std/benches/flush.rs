use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use viewbridge_core::{Props, Tag, ViewAtIndex};
use viewbridge_native::{
    AddRootView, NativeViewHierarchyManager, Operation, UiBlock, ViewManager, ViewManagerRegistry,
};
use viewbridge_runtime_std::UiBlockQueue;
use viewbridge_testing::{RecordingViewManager, TestRootContainer, ViewLog};
use viewbridge_ui_graphics::Rect;

const ROOT: Tag = 1;
const VIEW_COUNT_SAMPLES: &[usize] = &[16, 64, 256, 1024];

fn registry() -> Arc<ViewManagerRegistry> {
    let managers: Vec<Arc<dyn ViewManager>> =
        vec![Arc::new(RecordingViewManager::new("View", ViewLog::new()))];
    Arc::new(ViewManagerRegistry::new(managers).expect("registry"))
}

/// A root with `views` children: create, attach and position each one.
fn mount_batch(views: usize) -> Vec<Box<dyn UiBlock>> {
    let mut batch: Vec<Box<dyn UiBlock>> = Vec::with_capacity(views * 2 + 2);
    batch.push(Box::new(AddRootView {
        tag: ROOT,
        container: Box::new(TestRootContainer::new(1080.0, 1920.0)),
    }));
    let tags: Vec<Tag> = (0..views).map(|index| ROOT + 1 + index as Tag).collect();
    for &tag in &tags {
        batch.push(Box::new(Operation::CreateView {
            root_tag: ROOT,
            tag,
            view_type: "View".into(),
            props: Props::new().with("height", 10.0),
        }));
    }
    batch.push(Box::new(Operation::ManageChildren {
        tag: ROOT,
        indices_to_remove: Vec::new(),
        views_to_add: tags
            .iter()
            .enumerate()
            .map(|(index, &tag)| ViewAtIndex::new(tag, index))
            .collect(),
        tags_to_delete: Vec::new(),
    }));
    for (index, &tag) in tags.iter().enumerate() {
        batch.push(Box::new(Operation::UpdateLayout {
            parent_tag: ROOT,
            tag,
            frame: Rect::new(0.0, index as f32 * 10.0, 1080.0, 10.0),
        }));
    }
    batch
}

fn bench_flush_mount(c: &mut Criterion) {
    let registry = registry();
    let mut group = c.benchmark_group("flush_mount");
    for &views in VIEW_COUNT_SAMPLES {
        group.bench_with_input(BenchmarkId::new("views", views), &views, |b, &views| {
            b.iter_batched(
                || {
                    let queue = UiBlockQueue::new();
                    queue.enqueue_batch(mount_batch(views));
                    (queue, NativeViewHierarchyManager::new(Arc::clone(&registry)))
                },
                |(queue, mut manager)| {
                    let report = queue.flush(&mut manager);
                    black_box(report);
                    manager
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_enqueue(c: &mut Criterion) {
    c.bench_function("enqueue_batch_256", |b| {
        b.iter_batched(
            || mount_batch(256),
            |batch| {
                let queue = UiBlockQueue::new();
                queue.enqueue_batch(batch);
                black_box(queue.len())
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(flush, bench_flush_mount, bench_enqueue);
criterion_main!(flush);
