use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexSet;
use viewbridge_core::{PropValue, Props, Tag, TagAllocator, ViewAtIndex, ViewError, ViewResult};
use viewbridge_native::{
    AddRootView, ComponentNameResolver, FnBlock, MeasureBlock, MeasureRequest, MeasureSpace,
    NativeViewHierarchyManager, Operation, RootContainer, UiBlock, ViewManagerRegistry,
    ViewManagerResolver,
};
use viewbridge_runtime_std::UiBlockQueue;
use viewbridge_shadow::ShadowTree;
use viewbridge_ui_graphics::{Point, Rect};
use viewbridge_ui_layout::{Constraints, LayoutEngine, StackLayoutEngine};

use crate::{LayoutUpdateListener, UiManagerConfig};

enum Pending {
    Operation(Operation),
    Block(Box<dyn UiBlock>),
}

impl Pending {
    fn into_block(self) -> Box<dyn UiBlock> {
        match self {
            Pending::Operation(operation) => Box::new(operation),
            Pending::Block(block) => block,
        }
    }
}

/// Computation-side owner of the shadow tree.
///
/// Every mutation is validated against the shadow tree first; on success
/// the tree is updated and the matching native operation is added to the
/// pending batch. Nothing reaches the UI thread until
/// [`dispatch_view_updates`](Self::dispatch_view_updates).
pub struct UiManager {
    shadow: ShadowTree,
    registry: Arc<ViewManagerRegistry>,
    tags: Arc<TagAllocator>,
    queue: UiBlockQueue,
    layout: Box<dyn LayoutEngine>,
    listener: Option<Box<dyn LayoutUpdateListener>>,
    config: UiManagerConfig,
    pending: Vec<Pending>,
}

impl UiManager {
    pub fn new(registry: Arc<ViewManagerRegistry>, tags: Arc<TagAllocator>, queue: UiBlockQueue) -> Self {
        Self {
            shadow: ShadowTree::new(),
            registry,
            tags,
            queue,
            layout: Box::new(StackLayoutEngine::new()),
            listener: None,
            config: UiManagerConfig::default(),
            pending: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: UiManagerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_layout_engine(mut self, engine: impl LayoutEngine + 'static) -> Self {
        self.layout = Box::new(engine);
        self
    }

    pub fn config(&self) -> UiManagerConfig {
        self.config
    }

    pub fn shadow_tree(&self) -> &ShadowTree {
        &self.shadow
    }

    pub fn queue(&self) -> &UiBlockQueue {
        &self.queue
    }

    pub fn registry(&self) -> &Arc<ViewManagerRegistry> {
        &self.registry
    }

    pub fn tag_allocator(&self) -> &Arc<TagAllocator> {
        &self.tags
    }

    /// Operations recorded since the last dispatch.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Registers a root container under a fresh tag and returns the tag.
    pub fn add_root_view(&mut self, container: Box<dyn RootContainer>) -> ViewResult<Tag> {
        let tag = self.tags.next_root_tag();
        self.shadow.add_root(tag, container.constraints())?;
        self.pending
            .push(Pending::Block(Box::new(AddRootView { tag, container })));
        log::debug!("registered root view {tag}");
        Ok(tag)
    }

    /// New constraints for a root, picked up by the next layout pass.
    pub fn update_root_constraints(&mut self, root_tag: Tag, constraints: Constraints) -> ViewResult<()> {
        self.shadow.set_root_constraints(root_tag, constraints)
    }

    pub fn remove_root_view(&mut self, root_tag: Tag) -> ViewResult<()> {
        self.shadow.remove_root(root_tag)?;
        self.pending
            .push(Pending::Operation(Operation::RemoveRootView { root_tag }));
        Ok(())
    }

    pub fn create_view(&mut self, tag: Tag, view_type: &str, root_tag: Tag, props: Props) -> ViewResult<()> {
        if self.config.validate_view_types && self.registry.view_manager(view_type).is_none() {
            return Err(ViewError::UnknownViewType {
                name: view_type.to_owned(),
            });
        }
        self.shadow
            .create_node(tag, view_type, root_tag, props.clone())?;
        self.pending.push(Pending::Operation(Operation::CreateView {
            root_tag,
            tag,
            view_type: view_type.to_owned(),
            props,
        }));
        Ok(())
    }

    pub fn update_view(&mut self, tag: Tag, props: Props) -> ViewResult<()> {
        self.shadow.update_props(tag, &props)?;
        self.pending
            .push(Pending::Operation(Operation::UpdateProperties { tag, props }));
        Ok(())
    }

    /// Reorders, adds and removes children of `view_tag`.
    ///
    /// `move_from[i]` moves to `move_to[i]`, `add_child_tags[i]` is inserted
    /// at `add_at_indices[i]`, and the children at `remove_from` are removed
    /// and deleted. `move_from` and `remove_from` index the child list
    /// before the call; `move_to` and `add_at_indices` are final positions,
    /// applied in ascending order after the removals.
    pub fn manage_children(
        &mut self,
        view_tag: Tag,
        move_from: &[usize],
        move_to: &[usize],
        add_child_tags: &[Tag],
        add_at_indices: &[usize],
        remove_from: &[usize],
    ) -> ViewResult<()> {
        if move_from.len() != move_to.len() {
            return Err(ViewError::illegal(
                view_tag,
                "size of move_from != size of move_to",
            ));
        }
        if add_child_tags.len() != add_at_indices.len() {
            return Err(ViewError::illegal(
                view_tag,
                "size of add_child_tags != size of add_at_indices",
            ));
        }

        let children = self.shadow.node(view_tag)?.children();
        let child_at = |index: usize| {
            children.get(index).copied().ok_or_else(|| {
                ViewError::illegal(
                    view_tag,
                    format!("index {index} out of bounds for {} children", children.len()),
                )
            })
        };

        let mut views_to_add = Vec::with_capacity(move_from.len() + add_child_tags.len());
        let mut indices_to_remove = Vec::with_capacity(move_from.len() + remove_from.len());
        let mut tags_to_delete = Vec::with_capacity(remove_from.len());
        for (&from, &to) in move_from.iter().zip(move_to) {
            views_to_add.push(ViewAtIndex::new(child_at(from)?, to));
            indices_to_remove.push(from);
        }
        for (&tag, &index) in add_child_tags.iter().zip(add_at_indices) {
            views_to_add.push(ViewAtIndex::new(tag, index));
        }
        for &index in remove_from {
            tags_to_delete.push(child_at(index)?);
            indices_to_remove.push(index);
        }
        views_to_add.sort_by_key(|view| view.index);
        indices_to_remove.sort_unstable();

        self.manage_children_raw(view_tag, indices_to_remove, views_to_add, tags_to_delete)
    }

    /// Applies an already-translated child update: removals by index,
    /// insertions, then deletions.
    pub fn manage_children_raw(
        &mut self,
        view_tag: Tag,
        indices_to_remove: Vec<usize>,
        views_to_add: Vec<ViewAtIndex>,
        tags_to_delete: Vec<Tag>,
    ) -> ViewResult<()> {
        self.shadow
            .manage_children(view_tag, &indices_to_remove, &views_to_add, &tags_to_delete)?;
        self.pending.push(Pending::Operation(Operation::ManageChildren {
            tag: view_tag,
            indices_to_remove,
            views_to_add,
            tags_to_delete,
        }));
        Ok(())
    }

    pub fn set_children(&mut self, view_tag: Tag, child_tags: Vec<Tag>) -> ViewResult<()> {
        self.shadow.set_children(view_tag, &child_tags)?;
        self.pending.push(Pending::Operation(Operation::SetChildren {
            tag: view_tag,
            child_tags,
        }));
        Ok(())
    }

    pub fn dispatch_view_command(&mut self, tag: Tag, command: &str, args: Vec<PropValue>) -> ViewResult<()> {
        self.shadow.node(tag)?;
        self.pending.push(Pending::Operation(Operation::DispatchCommand {
            tag,
            command: command.to_owned(),
            args,
        }));
        Ok(())
    }

    /// Measures `tag` relative to its root once the pending batch has run.
    pub fn measure(&mut self, tag: Tag, callback: impl FnOnce(ViewResult<Rect>) + Send + 'static) {
        self.add_measure(tag, MeasureSpace::Root, callback);
    }

    /// Measures `tag` in window coordinates once the pending batch has run.
    pub fn measure_in_window(
        &mut self,
        tag: Tag,
        callback: impl FnOnce(ViewResult<Rect>) + Send + 'static,
    ) {
        self.add_measure(tag, MeasureSpace::Window, callback);
    }

    /// Dispatches pending work, then blocks until the UI thread has
    /// measured `tag`.
    ///
    /// The thread that flushes the queue gets
    /// [`ViewError::ConcurrencyViolation`] straight away, since it would be
    /// waiting on itself. When no answer arrives within `timeout` this fails
    /// with [`ViewError::NoResponse`].
    pub fn measure_sync(&mut self, tag: Tag, space: MeasureSpace, timeout: Duration) -> ViewResult<Rect> {
        if self.queue.is_flushing_thread() {
            return Err(ViewError::ConcurrencyViolation {
                operation: "measure_sync",
            });
        }
        let (sender, receiver) = mpsc::sync_channel(1);
        self.add_measure(tag, space, move |result| {
            // The caller may have timed out and dropped the receiver.
            let _ = sender.send(result);
        });
        self.dispatch_view_updates();
        receiver
            .recv_timeout(timeout)
            .map_err(|_| ViewError::NoResponse {
                operation: "measure_sync",
            })?
    }

    /// Finds the deepest native view under `point` inside `tag` once the
    /// pending batch has run. Point and resulting frame are relative to `tag`.
    pub fn find_subview_in(
        &mut self,
        tag: Tag,
        point: Point,
        callback: impl FnOnce(ViewResult<(Tag, Rect)>) + Send + 'static,
    ) {
        self.add_ui_block(FnBlock::targeting(tag, move |native: &mut NativeViewHierarchyManager| -> ViewResult<()> {
            callback(native.find_subview_in(tag, point));
            Ok(())
        }));
    }

    /// Frame of `tag` relative to `ancestor`, from the last layout pass.
    pub fn measure_layout(&self, tag: Tag, ancestor: Tag) -> ViewResult<Rect> {
        self.shadow.measure_layout(tag, ancestor)
    }

    pub fn measure_layout_relative_to_parent(&self, tag: Tag) -> ViewResult<Rect> {
        self.shadow.measure_layout_relative_to_parent(tag)
    }

    /// Strict: a view is not its own descendant. Unknown tags are never
    /// descendants.
    pub fn view_is_descendant_of(&self, tag: Tag, ancestor: Tag) -> bool {
        tag != ancestor
            && self.shadow.contains(tag)
            && self.shadow.contains(ancestor)
            && self.shadow.is_ancestor(ancestor, tag)
    }

    /// Adds a block to the pending batch.
    pub fn add_ui_block(&mut self, block: impl UiBlock + 'static) {
        self.pending.push(Pending::Block(Box::new(block)));
    }

    /// Puts a block in front of everything in the pending batch.
    pub fn prepend_ui_block(&mut self, block: impl UiBlock + 'static) {
        self.pending.insert(0, Pending::Block(Box::new(block)));
    }

    pub fn set_layout_update_listener(&mut self, listener: impl LayoutUpdateListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_layout_update_listener(&mut self) {
        self.listener = None;
    }

    /// Runs layout for every root, appends the changed frames and enqueues
    /// the whole batch atomically. Returns the number of blocks enqueued.
    pub fn dispatch_view_updates(&mut self) -> usize {
        let roots: Vec<Tag> = self.shadow.roots().collect();
        for root in roots {
            self.layout_root(root);
        }

        let batch = std::mem::take(&mut self.pending);
        if batch.is_empty() {
            return 0;
        }
        if self.config.log_batches {
            for pending in &batch {
                match pending {
                    Pending::Operation(operation) => log::trace!("batch op: {operation:?}"),
                    Pending::Block(_) => log::trace!("batch op: ui block"),
                }
            }
        }
        let count = batch.len();
        self.queue
            .enqueue_batch(batch.into_iter().map(Pending::into_block));
        log::debug!("dispatched {count} view updates");
        count
    }

    fn layout_root(&mut self, root: Tag) {
        let Some(constraints) = self.shadow.root_constraints(root) else {
            return;
        };
        let frames = self
            .layout
            .calculate_layout(&self.shadow, root, constraints);
        for (tag, frame) in self.shadow.apply_layout(&frames) {
            // Root frames come from the container, not from layout.
            if tag == root {
                continue;
            }
            let Some(parent_tag) = self.shadow.get(tag).and_then(|node| node.parent()) else {
                continue;
            };
            self.pending.push(Pending::Operation(Operation::UpdateLayout {
                parent_tag,
                tag,
                frame,
            }));
        }
        if let Some(listener) = self.listener.as_mut() {
            if let Some(node) = self.shadow.get(root) {
                listener.on_layout_updated(node);
            }
        }
    }

    fn add_measure(
        &mut self,
        tag: Tag,
        space: MeasureSpace,
        callback: impl FnOnce(ViewResult<Rect>) + Send + 'static,
    ) {
        self.pending.push(Pending::Block(Box::new(MeasureBlock::new(
            MeasureRequest { tag, space },
            callback,
        ))));
    }
}

impl ComponentNameResolver for UiManager {
    fn component_names(&self) -> IndexSet<String> {
        self.registry.component_names()
    }
}

#[cfg(test)]
#[path = "tests/manager_tests.rs"]
mod tests;
