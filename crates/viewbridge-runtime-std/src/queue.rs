use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex, RwLock};
use viewbridge_core::{FlushScheduler, Tag, ThreadOwner};
use viewbridge_native::{NativeViewHierarchyManager, UiBlock};

struct QueuedBlock {
    root_tag: Option<Tag>,
    block: Box<dyn UiBlock>,
}

struct Shared {
    pending: Mutex<VecDeque<QueuedBlock>>,
    work_available: Condvar,
    scheduler: RwLock<Option<Arc<dyn FlushScheduler>>>,
    flusher: RwLock<Option<ThreadOwner>>,
}

/// Outcome of one [`UiBlockQueue::flush`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub executed: usize,
    pub failed: usize,
}

impl FlushReport {
    pub fn total(&self) -> usize {
        self.executed + self.failed
    }
}

/// FIFO of [`UiBlock`]s shared between producer threads and the UI thread.
///
/// Cloning yields another handle to the same queue. All producers go
/// through one mutex, so blocks run in the order their enqueue calls
/// acquired it.
#[derive(Clone)]
pub struct UiBlockQueue {
    shared: Arc<Shared>,
}

impl UiBlockQueue {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                pending: Mutex::new(VecDeque::new()),
                work_available: Condvar::new(),
                scheduler: RwLock::new(None),
                flusher: RwLock::new(None),
            }),
        }
    }

    pub fn with_scheduler(scheduler: Arc<dyn FlushScheduler>) -> Self {
        let queue = Self::new();
        queue.set_scheduler(scheduler);
        queue
    }

    /// Scheduler told about new work after every enqueue.
    pub fn set_scheduler(&self, scheduler: Arc<dyn FlushScheduler>) {
        *self.shared.scheduler.write() = Some(scheduler);
    }

    pub fn clear_scheduler(&self) {
        *self.shared.scheduler.write() = None;
    }

    pub fn len(&self) -> usize {
        self.shared.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.pending.lock().is_empty()
    }

    pub fn enqueue(&self, block: impl UiBlock + 'static) {
        self.enqueue_boxed(Box::new(block));
    }

    pub fn enqueue_boxed(&self, block: Box<dyn UiBlock>) {
        self.push(
            QueuedBlock {
                root_tag: None,
                block,
            },
            false,
        );
    }

    /// Enqueues a block whose failures belong to `root_tag`.
    pub fn enqueue_for_root(&self, root_tag: Tag, block: impl UiBlock + 'static) {
        self.push(
            QueuedBlock {
                root_tag: Some(root_tag),
                block: Box::new(block),
            },
            false,
        );
    }

    /// Appends a whole batch under one lock, so no other producer's blocks
    /// can interleave with it.
    pub fn enqueue_batch(&self, blocks: impl IntoIterator<Item = Box<dyn UiBlock>>) {
        let batch: Vec<QueuedBlock> = blocks
            .into_iter()
            .map(|block| QueuedBlock {
                root_tag: None,
                block,
            })
            .collect();
        if batch.is_empty() {
            return;
        }
        log::trace!("enqueue batch of {} blocks", batch.len());
        self.shared.pending.lock().extend(batch);
        self.notify();
    }

    /// Puts a block ahead of everything already pending.
    pub fn prepend(&self, block: impl UiBlock + 'static) {
        self.push(
            QueuedBlock {
                root_tag: None,
                block: Box::new(block),
            },
            true,
        );
    }

    /// Runs every block pending at call time, oldest first. Blocks enqueued
    /// while flushing wait for the next flush.
    ///
    /// A failing block is handed to its root's exception hook (or logged when
    /// the root cannot be found) and the flush carries on.
    pub fn flush(&self, manager: &mut NativeViewHierarchyManager) -> FlushReport {
        *self.shared.flusher.write() = Some(manager.owner());
        let batch = std::mem::take(&mut *self.shared.pending.lock());
        let mut report = FlushReport::default();
        for queued in batch {
            let root_tag = queued.root_tag.or_else(|| {
                queued
                    .block
                    .target_tag()
                    .and_then(|tag| manager.root_tag_of(tag))
            });
            match queued.block.execute(manager) {
                Ok(()) => report.executed += 1,
                Err(err) => {
                    report.failed += 1;
                    let delivered =
                        root_tag.is_some_and(|root| manager.handle_exception(root, &err));
                    if !delivered {
                        log::error!("UI block failed with no root to report to: {err}");
                    }
                }
            }
        }
        if report.total() > 0 {
            log::debug!(
                "flushed {} blocks ({} failed)",
                report.total(),
                report.failed
            );
        }
        report
    }

    /// Whether the calling thread is the one that flushes this queue. Such a
    /// thread must never block waiting for its own queue.
    pub fn is_flushing_thread(&self) -> bool {
        self.shared
            .flusher
            .read()
            .is_some_and(|owner| owner.is_current())
    }

    /// Blocks until work is pending or `timeout` passes. Returns whether
    /// work is pending.
    pub fn wait_for_work(&self, timeout: Duration) -> bool {
        let mut pending = self.shared.pending.lock();
        if pending.is_empty() {
            self.shared.work_available.wait_for(&mut pending, timeout);
        }
        !pending.is_empty()
    }

    fn push(&self, block: QueuedBlock, front: bool) {
        {
            let mut pending = self.shared.pending.lock();
            if front {
                pending.push_front(block);
            } else {
                pending.push_back(block);
            }
        }
        self.notify();
    }

    fn notify(&self) {
        self.shared.work_available.notify_all();
        let scheduler = self.shared.scheduler.read().clone();
        if let Some(scheduler) = scheduler {
            scheduler.schedule_flush();
        }
    }
}

impl Default for UiBlockQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UiBlockQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiBlockQueue")
            .field("pending", &self.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/queue_tests.rs"]
mod tests;
