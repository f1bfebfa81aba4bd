//! Standard runtime services backed by Rust's `std` library.
//!
//! This crate provides the [`UiBlockQueue`] producers use to hand work to
//! the UI thread, a [`StdFlushScheduler`] implementing the
//! [`viewbridge_core::FlushScheduler`] hook with `std` primitives, and the
//! [`UiDispatcher`] that owns the native hierarchy on the UI thread.

mod dispatcher;
mod queue;

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use viewbridge_core::FlushScheduler;

pub use dispatcher::UiDispatcher;
pub use queue::{FlushReport, UiBlockQueue};

/// Flush scheduler for hosts that drive the UI thread themselves.
///
/// Requests coalesce: however many batches are enqueued before the host
/// gets around to flushing, the waker fires once and one flush answers
/// them all. The waker fires again only after the request was taken.
pub struct StdFlushScheduler {
    flush_requested: AtomicBool,
    coalesced: AtomicUsize,
    flush_waker: RwLock<Option<Arc<dyn Fn() + Send + Sync + 'static>>>,
}

impl StdFlushScheduler {
    pub fn new() -> Self {
        Self {
            flush_requested: AtomicBool::new(false),
            coalesced: AtomicUsize::new(0),
            flush_waker: RwLock::new(None),
        }
    }

    /// Returns whether a flush has been requested since the last call.
    pub fn take_flush_request(&self) -> bool {
        self.coalesced.store(0, Ordering::SeqCst);
        self.flush_requested.swap(false, Ordering::SeqCst)
    }

    /// Runs `flush` when a request is pending and clears it first, so
    /// requests made while `flush` runs wake the host again.
    pub fn flush_if_requested<R>(&self, flush: impl FnOnce() -> R) -> Option<R> {
        self.take_flush_request().then(flush)
    }

    /// Requests folded into the pending one since it was last taken.
    pub fn coalesced_requests(&self) -> usize {
        self.coalesced.load(Ordering::SeqCst)
    }

    /// Called once per pending request, from whichever thread enqueued.
    pub fn set_flush_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        *self.flush_waker.write() = Some(Arc::new(waker));
    }

    pub fn clear_flush_waker(&self) {
        *self.flush_waker.write() = None;
    }

    fn wake(&self) {
        let waker = self.flush_waker.read().clone();
        if let Some(waker) = waker {
            waker();
        }
    }
}

impl Default for StdFlushScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StdFlushScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdFlushScheduler")
            .field(
                "flush_requested",
                &self.flush_requested.load(Ordering::SeqCst),
            )
            .field("coalesced", &self.coalesced_requests())
            .finish()
    }
}

impl FlushScheduler for StdFlushScheduler {
    fn schedule_flush(&self) {
        if self.flush_requested.swap(true, Ordering::SeqCst) {
            self.coalesced.fetch_add(1, Ordering::SeqCst);
        } else {
            self.wake();
        }
    }
}
