use std::sync::Arc;
use std::time::Duration;

use viewbridge_native::{NativeViewHierarchyManager, ViewManagerRegistry};

use crate::{FlushReport, UiBlockQueue};

/// UI-thread side of the bridge: the native hierarchy plus the queue it
/// drains.
///
/// Like the hierarchy it owns, a dispatcher stays on the thread that
/// created it.
pub struct UiDispatcher {
    manager: NativeViewHierarchyManager,
    queue: UiBlockQueue,
}

impl UiDispatcher {
    /// Creates the hierarchy on the calling thread.
    pub fn new(registry: Arc<ViewManagerRegistry>, queue: UiBlockQueue) -> Self {
        Self::with_manager(NativeViewHierarchyManager::new(registry), queue)
    }

    pub fn with_manager(manager: NativeViewHierarchyManager, queue: UiBlockQueue) -> Self {
        Self { manager, queue }
    }

    pub fn queue(&self) -> &UiBlockQueue {
        &self.queue
    }

    pub fn manager(&self) -> &NativeViewHierarchyManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut NativeViewHierarchyManager {
        &mut self.manager
    }

    pub fn flush(&mut self) -> FlushReport {
        self.queue.flush(&mut self.manager)
    }

    /// Waits up to `timeout` for work, then flushes whatever is pending.
    pub fn pump(&mut self, timeout: Duration) -> FlushReport {
        if self.queue.wait_for_work(timeout) {
            self.flush()
        } else {
            FlushReport::default()
        }
    }
}
