//! Shadow tree for viewbridge.
//!
//! The shadow tree lives on the computation thread. It mirrors the native
//! hierarchy, holds the props the layout engine reads and stores the
//! frames layout produces until they are handed to the UI thread.

mod node;
mod tree;

pub use node::ShadowNode;
pub use tree::ShadowTree;

/// View type name given to root shadow nodes.
pub const ROOT_VIEW_TYPE: &str = "RootView";
