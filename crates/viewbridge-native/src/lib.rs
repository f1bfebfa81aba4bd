//! Native side of viewbridge.
//!
//! [`NativeViewHierarchyManager`] owns every live native view and is the
//! only thing allowed to mutate them. Work reaches it as [`UiBlock`]s,
//! usually serializable [`Operation`]s produced by the UI manager, and view
//! types are resolved by name through a [`ViewManagerRegistry`].

mod hierarchy;
mod operation;
mod pointer;
mod registry;
mod view;

#[cfg(test)]
#[path = "tests/support.rs"]
mod tests_support;

pub use hierarchy::NativeViewHierarchyManager;
pub use operation::{
    AddRootView, FnBlock, MeasureBlock, MeasureCallback, MeasureRequest, MeasureSpace, Operation,
    UiBlock,
};
pub use pointer::{PointerDispatcher, PointerEventSink, RawPointerEvent};
pub use registry::{
    ComponentNameResolver, LazyViewManagers, ViewManagerRegistry, ViewManagerResolver,
};
pub use view::{NativeView, RootContainer, ViewManager};

pub mod prelude {
    pub use crate::{
        NativeView, NativeViewHierarchyManager, Operation, RootContainer, UiBlock, ViewManager,
        ViewManagerRegistry,
    };
}
