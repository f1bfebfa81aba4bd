//! Host integration traits.
//!
//! The bridge never owns an event loop. Hosts plug their own loop in through
//! these traits so queued view work can be drained on the UI thread.

/// Asks the host to run a flush of the UI block queue on its UI thread.
///
/// Called from whichever thread enqueued work, so implementations must be
/// safe to use from multiple threads. Repeated requests before the flush
/// happens may be coalesced.
pub trait FlushScheduler: Send + Sync {
    fn schedule_flush(&self);
}
