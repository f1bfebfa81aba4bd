use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use viewbridge_core::{ViewError, ViewResult};
use viewbridge_native::{FnBlock, RootContainer, ViewManagerRegistry};
use viewbridge_ui_layout::Constraints;

struct ErrorLog(Arc<Mutex<Vec<ViewError>>>);

impl RootContainer for ErrorLog {
    fn constraints(&self) -> Constraints {
        Constraints::tight(10.0, 10.0)
    }

    fn handle_exception(&mut self, error: &ViewError) {
        self.0.lock().push(error.clone());
    }
}

fn manager() -> NativeViewHierarchyManager {
    let registry = ViewManagerRegistry::new(Vec::new()).expect("empty registry");
    NativeViewHierarchyManager::new(Arc::new(registry))
}

fn record(log: &Arc<Mutex<Vec<u32>>>, value: u32) -> impl UiBlock + 'static {
    let log = Arc::clone(log);
    FnBlock::new(move |_: &mut NativeViewHierarchyManager| -> ViewResult<()> {
        log.lock().push(value);
        Ok(())
    })
}

#[test]
fn flush_runs_blocks_in_fifo_order_once() {
    let queue = UiBlockQueue::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    queue.enqueue(record(&log, 1));
    queue.enqueue(record(&log, 2));
    queue.prepend(record(&log, 0));
    assert_eq!(queue.len(), 3);

    let mut manager = manager();
    let report = queue.flush(&mut manager);
    assert_eq!(report, FlushReport { executed: 3, failed: 0 });
    assert_eq!(*log.lock(), vec![0, 1, 2]);

    assert_eq!(queue.flush(&mut manager), FlushReport::default());
    assert_eq!(log.lock().len(), 3);
}

#[test]
fn blocks_enqueued_during_flush_wait_for_the_next_one() {
    let queue = UiBlockQueue::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    let inner_queue = queue.clone();
    let inner_log = Arc::clone(&log);
    queue.enqueue(FnBlock::new(move |_: &mut NativeViewHierarchyManager| -> ViewResult<()> {
        inner_queue.enqueue(record(&inner_log, 9));
        Ok(())
    }));

    let mut manager = manager();
    assert_eq!(queue.flush(&mut manager).executed, 1);
    assert!(log.lock().is_empty());
    assert_eq!(queue.flush(&mut manager).executed, 1);
    assert_eq!(*log.lock(), vec![9]);
}

#[test]
fn failing_block_is_reported_and_later_blocks_still_run() {
    let queue = UiBlockQueue::new();
    let errors = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut manager = manager();
    manager
        .add_root_view(1, Box::new(ErrorLog(Arc::clone(&errors))))
        .expect("root");

    queue.enqueue(record(&log, 1));
    queue.enqueue_for_root(
        1,
        FnBlock::new(|_: &mut NativeViewHierarchyManager| -> ViewResult<()> {
            Err(ViewError::NoSuchNativeView { tag: 5 })
        }),
    );
    queue.enqueue(FnBlock::targeting(1, |_: &mut NativeViewHierarchyManager| -> ViewResult<()> {
        Err(ViewError::illegal(1, "second"))
    }));
    // No root can be found for this one; it is only logged.
    queue.enqueue(FnBlock::new(|_: &mut NativeViewHierarchyManager| -> ViewResult<()> {
        Err(ViewError::NoSuchNativeView { tag: 77 })
    }));
    queue.enqueue(record(&log, 2));

    let report = queue.flush(&mut manager);
    assert_eq!(report, FlushReport { executed: 2, failed: 3 });
    assert_eq!(*log.lock(), vec![1, 2]);
    assert_eq!(
        *errors.lock(),
        vec![
            ViewError::NoSuchNativeView { tag: 5 },
            ViewError::illegal(1, "second"),
        ]
    );
}

#[test]
fn batches_do_not_interleave_across_producers() {
    let queue = UiBlockQueue::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    let producers: Vec<_> = (0..4u32)
        .map(|producer| {
            let queue = queue.clone();
            let log = Arc::clone(&log);
            thread::spawn(move || {
                for batch in 0..25u32 {
                    let blocks: Vec<Box<dyn UiBlock>> = (0..4u32)
                        .map(|i| {
                            Box::new(record(&log, producer * 10_000 + batch * 10 + i))
                                as Box<dyn UiBlock>
                        })
                        .collect();
                    queue.enqueue_batch(blocks);
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().expect("producer panicked");
    }

    let mut manager = manager();
    assert_eq!(queue.flush(&mut manager).executed, 4 * 25 * 4);
    let log = log.lock();
    for chunk in log.chunks(4) {
        let base = chunk[0];
        assert_eq!(chunk, [base, base + 1, base + 2, base + 3]);
    }
    // Each producer's own batches stay in submission order.
    for producer in 0..4u32 {
        let own: Vec<u32> = log
            .iter()
            .copied()
            .filter(|value| value / 10_000 == producer)
            .collect();
        assert!(own.windows(2).all(|pair| pair[0] < pair[1]));
    }
}

#[test]
fn enqueue_notifies_scheduler_and_waiters() {
    struct Counting(AtomicUsize);
    impl FlushScheduler for Counting {
        fn schedule_flush(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    let scheduler = Arc::new(Counting(AtomicUsize::new(0)));
    let queue = UiBlockQueue::with_scheduler(scheduler.clone());
    assert!(!queue.wait_for_work(Duration::from_millis(1)));

    let producer = queue.clone();
    let handle = thread::spawn(move || {
        producer.enqueue(FnBlock::new(|_: &mut NativeViewHierarchyManager| -> ViewResult<()> {
            Ok(())
        }));
    });
    assert!(queue.wait_for_work(Duration::from_secs(5)));
    handle.join().expect("producer panicked");
    assert_eq!(scheduler.0.load(Ordering::SeqCst), 1);

    queue.enqueue_batch(Vec::new());
    assert_eq!(scheduler.0.load(Ordering::SeqCst), 1);
}

#[test]
fn flushing_thread_is_remembered() {
    let queue = UiBlockQueue::new();
    assert!(!queue.is_flushing_thread());

    let mut manager = manager();
    queue.flush(&mut manager);
    assert!(queue.is_flushing_thread());

    let other = queue.clone();
    let elsewhere = thread::spawn(move || other.is_flushing_thread())
        .join()
        .expect("checker panicked");
    assert!(!elsewhere);
}
