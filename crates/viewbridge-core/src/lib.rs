//! Core identity, error and ordering types for viewbridge.
//!
//! Everything the shadow side and the native side both need to agree on
//! lives here: tags and their allocator, the shared error type, property
//! bags, pointer state, drawing-order bookkeeping and thread ownership.

mod children;
pub mod collections;
mod error;
pub mod ordering;
pub mod platform;
pub mod pointer;
mod props;
mod tag;
mod thread;

pub use children::{plan_manage_children, ChildrenPlan, ViewAtIndex};
pub use error::{ViewError, ViewResult};
pub use ordering::{drawing_order, DrawingOrderHelper};
pub use platform::FlushScheduler;
pub use pointer::{
    PointerButton, PointerButtons, PointerEventKind, PointerEventState, PointerEvents, PointerId,
    PointerPhase,
};
pub use props::{PropValue, Props, POINTER_EVENTS, Z_INDEX};
pub use tag::{TagAllocator, FIRST_ROOT_VIEW_TAG, ROOT_VIEW_TAG_INCREMENT};
pub use thread::ThreadOwner;

/// Process-unique identifier of a view, shared by its shadow node and its
/// native counterpart.
pub type Tag = u32;

pub mod prelude {
    pub use crate::{Props, PropValue, Tag, ViewAtIndex, ViewError, ViewResult};
}
