//! Computation-side entry point of viewbridge.
//!
//! [`UiManager`] owns the shadow tree. Mutations are validated and applied
//! to it immediately and recorded as operations; [`UiManager::dispatch_view_updates`]
//! runs layout, appends the resulting frame updates and hands the whole
//! batch to the UI thread's queue in one piece.

mod config;
mod listener;
mod manager;

pub use config::UiManagerConfig;
pub use listener::LayoutUpdateListener;
pub use manager::UiManager;

pub mod prelude {
    pub use crate::{LayoutUpdateListener, UiManager, UiManagerConfig};
}
