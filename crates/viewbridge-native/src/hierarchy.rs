use std::sync::Arc;

use indexmap::IndexMap;
use viewbridge_core::collections::map::{HashMap, HashSet};
use viewbridge_core::{
    plan_manage_children, DrawingOrderHelper, PointerEvents, PropValue, Props, Tag, ThreadOwner,
    ViewAtIndex, ViewError, ViewResult,
};
use viewbridge_ui_graphics::{Point, Rect};

use crate::{NativeView, RootContainer, ViewManager, ViewManagerRegistry};

struct RootView;

impl NativeView for RootView {}

struct RootViewManager;

impl ViewManager for RootViewManager {
    fn name(&self) -> &str {
        "RootView"
    }

    fn create_view(&self, _tag: Tag, _props: &Props) -> Box<dyn NativeView> {
        Box::new(RootView)
    }
}

pub(crate) struct ViewEntry {
    pub(crate) view: Box<dyn NativeView>,
    pub(crate) manager: Arc<dyn ViewManager>,
    pub(crate) root_tag: Tag,
    pub(crate) parent: Option<Tag>,
    pub(crate) children: Vec<Tag>,
    pub(crate) frame: Rect,
    pub(crate) z_index: Option<i32>,
    pub(crate) pointer_events: PointerEvents,
    pub(crate) drawing_order: DrawingOrderHelper,
}

impl ViewEntry {
    fn new(view: Box<dyn NativeView>, manager: Arc<dyn ViewManager>, root_tag: Tag, props: &Props) -> Self {
        Self {
            view,
            manager,
            root_tag,
            parent: None,
            children: Vec::new(),
            frame: Rect::ZERO,
            z_index: props.z_index(),
            pointer_events: props.pointer_events().unwrap_or_default(),
            drawing_order: DrawingOrderHelper::new(),
        }
    }
}

/// Owner of every live native view.
///
/// Native views are neither `Send` nor `Sync`, so neither is the manager:
/// the compiler keeps it on the thread that created it. [`owner`](Self::owner)
/// names that thread for callers that need to tell whether they are on it.
///
/// Every mutating operation validates all of its input before touching the
/// tree: an `Err` means nothing changed.
pub struct NativeViewHierarchyManager {
    registry: Arc<ViewManagerRegistry>,
    root_manager: Arc<dyn ViewManager>,
    pub(crate) views: HashMap<Tag, ViewEntry>,
    roots: IndexMap<Tag, Box<dyn RootContainer>>,
    owner: ThreadOwner,
}

impl NativeViewHierarchyManager {
    /// Creates a manager owned by the calling thread.
    pub fn new(registry: Arc<ViewManagerRegistry>) -> Self {
        Self {
            registry,
            root_manager: Arc::new(RootViewManager),
            views: HashMap::default(),
            roots: IndexMap::new(),
            owner: ThreadOwner::current(),
        }
    }

    pub fn registry(&self) -> &Arc<ViewManagerRegistry> {
        &self.registry
    }

    pub fn owner(&self) -> ThreadOwner {
        self.owner
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.views.contains_key(&tag)
    }

    pub fn is_root(&self, tag: Tag) -> bool {
        self.roots.contains_key(&tag)
    }

    pub fn root_tags(&self) -> Vec<Tag> {
        self.roots.keys().copied().collect()
    }

    /// Children of `tag` in structural order.
    pub fn children_of(&self, tag: Tag) -> ViewResult<&[Tag]> {
        Ok(&self.entry(tag)?.children)
    }

    pub fn parent_of(&self, tag: Tag) -> ViewResult<Option<Tag>> {
        Ok(self.entry(tag)?.parent)
    }

    /// Frame last applied to `tag`, relative to its parent.
    pub fn frame_of(&self, tag: Tag) -> ViewResult<Rect> {
        Ok(self.entry(tag)?.frame)
    }

    /// Root the view was created under.
    pub fn root_tag_of(&self, tag: Tag) -> Option<Tag> {
        self.views.get(&tag).map(|entry| entry.root_tag)
    }

    pub fn add_root_view(&mut self, tag: Tag, container: Box<dyn RootContainer>) -> ViewResult<()> {
        if self.views.contains_key(&tag) {
            return Err(ViewError::DuplicateTag { tag });
        }
        let constraints = container.constraints();
        let finite_or_zero = |value: f32| if value.is_finite() { value } else { 0.0 };
        let frame = Rect::new(
            0.0,
            0.0,
            finite_or_zero(constraints.max_width),
            finite_or_zero(constraints.max_height),
        );
        let mut view = self.root_manager.create_view(tag, &Props::new());
        view.set_frame(frame);
        let mut entry = ViewEntry::new(view, Arc::clone(&self.root_manager), tag, &Props::new());
        entry.frame = frame;
        self.views.insert(tag, entry);
        self.roots.insert(tag, container);
        log::debug!("added root view {tag}");
        Ok(())
    }

    /// Creates a detached view of `view_type` owned by `root_tag`.
    pub fn create_view(
        &mut self,
        root_tag: Tag,
        tag: Tag,
        view_type: &str,
        props: &Props,
    ) -> ViewResult<()> {
        if self.views.contains_key(&tag) {
            return Err(ViewError::DuplicateTag { tag });
        }
        if !self.roots.contains_key(&root_tag) {
            return Err(ViewError::NoSuchNativeView { tag: root_tag });
        }
        let manager = self.registry.get(view_type)?;
        let view = manager.create_view(tag, props);
        self.views
            .insert(tag, ViewEntry::new(view, manager, root_tag, props));
        Ok(())
    }

    pub fn update_properties(&mut self, tag: Tag, props: &Props) -> ViewResult<()> {
        let entry = self.entry_mut(tag)?;
        entry.manager.update_properties(entry.view.as_mut(), props);
        if let Some(mode) = props.pointer_events() {
            entry.pointer_events = mode;
        }
        let restack = match props.z_index_update() {
            Some(z_index) if z_index != entry.z_index => {
                entry.z_index = z_index;
                entry.parent
            }
            _ => None,
        };
        if let Some(parent) = restack {
            self.refresh_drawing_order(parent);
        }
        Ok(())
    }

    /// Positions `tag` inside `parent_tag`, unless the parent's manager
    /// lays out its children itself.
    pub fn update_layout(&mut self, parent_tag: Tag, tag: Tag, frame: Rect) -> ViewResult<()> {
        self.entry(tag)?;
        if self
            .entry(parent_tag)?
            .manager
            .needs_custom_layout_for_children()
        {
            log::trace!("parent {parent_tag} lays out {tag} itself");
            return Ok(());
        }
        let entry = self.entry_mut(tag)?;
        entry.frame = frame;
        entry.manager.update_layout(entry.view.as_mut(), frame);
        Ok(())
    }

    /// Removes the children at `indices_to_remove`, inserts `views_to_add`
    /// and drops `tags_to_delete` (detaching any that are still attached).
    ///
    /// Removed views that are not deleted stay registered, detached, so they
    /// can be re-added elsewhere.
    pub fn manage_children(
        &mut self,
        tag: Tag,
        indices_to_remove: &[usize],
        views_to_add: &[ViewAtIndex],
        tags_to_delete: &[Tag],
    ) -> ViewResult<()> {
        let parent = self.entry(tag)?;
        let had_custom_order = parent.drawing_order.should_enable_custom_drawing_order();
        let plan = plan_manage_children(tag, &parent.children, indices_to_remove, views_to_add)?;
        for view in views_to_add {
            self.check_attachable(tag, view.tag, &plan.removed)?;
        }
        let added: HashSet<Tag> = views_to_add.iter().map(|view| view.tag).collect();
        for &delete in tags_to_delete {
            self.check_deletable(tag, delete)?;
            if added.contains(&delete) {
                return Err(ViewError::illegal(
                    tag,
                    format!("view {delete} is both added and deleted"),
                ));
            }
        }

        let mut removals = indices_to_remove.to_vec();
        removals.sort_unstable();
        for &index in removals.iter().rev() {
            self.detach_at(tag, index);
        }
        let mut additions = views_to_add.to_vec();
        additions.sort_by_key(|view| view.index);
        for view in &additions {
            self.attach_at(tag, view.tag, view.index);
        }
        for &delete in tags_to_delete {
            // Already dropped with an ancestor listed earlier.
            if !self.views.contains_key(&delete) {
                continue;
            }
            self.detach(delete);
            self.drop_view(delete);
        }

        self.notify_drawing_order(tag, had_custom_order);
        Ok(())
    }

    /// Appends detached views to `tag`.
    pub fn set_children(&mut self, tag: Tag, child_tags: &[Tag]) -> ViewResult<()> {
        let had_custom_order = self
            .entry(tag)?
            .drawing_order
            .should_enable_custom_drawing_order();
        let mut seen = HashSet::default();
        for &child in child_tags {
            if !seen.insert(child) {
                return Err(ViewError::illegal(tag, format!("view {child} listed twice")));
            }
            self.check_attachable(tag, child, &[])?;
        }

        for &child in child_tags {
            let index = self.views.get(&tag).map_or(0, |entry| entry.children.len());
            self.attach_at(tag, child, index);
        }
        self.notify_drawing_order(tag, had_custom_order);
        Ok(())
    }

    /// Drops the root, everything under it and any detached views created
    /// for it, then releases the root container.
    pub fn remove_root_view(&mut self, root_tag: Tag) -> ViewResult<()> {
        if !self.roots.contains_key(&root_tag) {
            return Err(ViewError::NoSuchNativeView { tag: root_tag });
        }
        self.drop_view(root_tag);
        let orphans: Vec<Tag> = self
            .views
            .iter()
            .filter(|(_, entry)| entry.root_tag == root_tag && entry.parent.is_none())
            .map(|(&tag, _)| tag)
            .collect();
        for orphan in orphans {
            self.drop_view(orphan);
        }
        self.roots.shift_remove(&root_tag);
        log::debug!("removed root view {root_tag}");
        Ok(())
    }

    /// Frame of `tag` relative to its root.
    pub fn measure(&self, tag: Tag) -> ViewResult<Rect> {
        self.measure_from_root(tag).map(|(frame, _)| frame)
    }

    /// Frame of `tag` in window coordinates.
    pub fn measure_in_window(&self, tag: Tag) -> ViewResult<Rect> {
        let (frame, root) = self.measure_from_root(tag)?;
        let origin = self
            .roots
            .get(&root)
            .map_or(Point::ZERO, |container| container.window_origin());
        Ok(frame.translate(origin.x, origin.y))
    }

    /// Routes a named command to the view's manager.
    pub fn dispatch_command(&mut self, tag: Tag, command: &str, args: &[PropValue]) -> ViewResult<()> {
        let entry = self.entry_mut(tag)?;
        entry
            .manager
            .receive_command(tag, entry.view.as_mut(), command, args)
    }

    /// Children of `tag` in the order they are drawn.
    pub fn drawing_order(&mut self, tag: Tag) -> ViewResult<Vec<Tag>> {
        let order = self.child_order(tag)?;
        let children = &self.entry(tag)?.children;
        Ok(order.into_iter().map(|index| children[index]).collect())
    }

    /// Structural index of the child of `tag` drawn at position `index`.
    pub fn z_index_mapped_child_index(&mut self, tag: Tag, index: usize) -> ViewResult<usize> {
        let z_indices = self.child_z_indices(tag)?;
        if index >= z_indices.len() {
            return Err(ViewError::illegal(
                tag,
                format!("child index {index} out of bounds for {} children", z_indices.len()),
            ));
        }
        let entry = self.entry_mut(tag)?;
        Ok(entry.drawing_order.child_drawing_order(&z_indices, index))
    }

    /// Hands a failure to the root container's exception hook. Returns
    /// false when the root is gone.
    pub fn handle_exception(&mut self, root_tag: Tag, error: &ViewError) -> bool {
        match self.roots.get_mut(&root_tag) {
            Some(container) => {
                container.handle_exception(error);
                true
            }
            None => false,
        }
    }

    pub fn resolve_view(&mut self, tag: Tag) -> ViewResult<&mut dyn NativeView> {
        Ok(self.entry_mut(tag)?.view.as_mut())
    }

    /// Runs `f` on the view as its concrete type.
    pub fn with_view<V: NativeView, R>(
        &mut self,
        tag: Tag,
        f: impl FnOnce(&mut V) -> R,
    ) -> ViewResult<R> {
        let view = self
            .entry_mut(tag)?
            .view
            .as_mut()
            .as_any_mut()
            .downcast_mut::<V>()
            .ok_or_else(|| {
                ViewError::illegal(
                    tag,
                    format!("view type mismatch; expected {}", std::any::type_name::<V>()),
                )
            })?;
        Ok(f(view))
    }

    pub fn resolve_view_manager(&self, tag: Tag) -> ViewResult<Arc<dyn ViewManager>> {
        Ok(Arc::clone(&self.entry(tag)?.manager))
    }

    /// Text dump of a root's subtree, or of every root when `root` is
    /// `None`.
    pub fn dump_tree(&self, root: Option<Tag>) -> String {
        let mut output = String::new();
        match root {
            Some(root) => self.dump_node(&mut output, root, 0),
            None if self.roots.is_empty() => output.push_str("(no root)\n"),
            None => {
                for &root in self.roots.keys() {
                    self.dump_node(&mut output, root, 0);
                }
            }
        }
        output
    }

    fn dump_node(&self, output: &mut String, tag: Tag, depth: usize) {
        let indent = "  ".repeat(depth);
        match self.views.get(&tag) {
            Some(entry) => {
                let frame = entry.frame;
                output.push_str(&format!(
                    "{indent}[{tag}] {} ({}, {}, {}x{})",
                    entry.manager.name(),
                    frame.x,
                    frame.y,
                    frame.width,
                    frame.height
                ));
                if let Some(z_index) = entry.z_index {
                    output.push_str(&format!(" z={z_index}"));
                }
                output.push('\n');
                for &child in &entry.children {
                    self.dump_node(output, child, depth + 1);
                }
            }
            None => output.push_str(&format!("{indent}[{tag}] (missing)\n")),
        }
    }

    pub(crate) fn entry(&self, tag: Tag) -> ViewResult<&ViewEntry> {
        self.views
            .get(&tag)
            .ok_or(ViewError::NoSuchNativeView { tag })
    }

    fn entry_mut(&mut self, tag: Tag) -> ViewResult<&mut ViewEntry> {
        self.views
            .get_mut(&tag)
            .ok_or(ViewError::NoSuchNativeView { tag })
    }

    fn is_ancestor(&self, ancestor: Tag, tag: Tag) -> bool {
        let mut current = Some(tag);
        while let Some(tag) = current {
            if tag == ancestor {
                return true;
            }
            current = self.views.get(&tag).and_then(|entry| entry.parent);
        }
        false
    }

    fn check_attachable(&self, parent: Tag, child: Tag, detached_here: &[Tag]) -> ViewResult<()> {
        let Some(entry) = self.views.get(&child) else {
            return Err(ViewError::illegal(
                parent,
                format!("trying to add unknown view tag {child}"),
            ));
        };
        if entry.root_tag == child {
            return Err(ViewError::illegal(
                parent,
                format!("root view {child} cannot become a child"),
            ));
        }
        if self.is_ancestor(child, parent) {
            return Err(ViewError::illegal(
                parent,
                format!("adding view {child} would create a cycle"),
            ));
        }
        let parent_root = self.views.get(&parent).map(|parent| parent.root_tag);
        if parent_root != Some(entry.root_tag) {
            return Err(ViewError::illegal(
                parent,
                format!(
                    "view {child} belongs to root {} and cannot move to another root",
                    entry.root_tag
                ),
            ));
        }
        match entry.parent {
            None => Ok(()),
            Some(current) if current == parent && detached_here.contains(&child) => Ok(()),
            Some(current) => Err(ViewError::illegal(
                parent,
                format!("view {child} already has parent {current}"),
            )),
        }
    }

    fn check_deletable(&self, parent: Tag, tag: Tag) -> ViewResult<()> {
        let Some(entry) = self.views.get(&tag) else {
            return Err(ViewError::illegal(
                parent,
                format!("trying to destroy unknown view tag {tag}"),
            ));
        };
        if entry.root_tag == tag {
            return Err(ViewError::illegal(
                parent,
                format!("root view {tag} can only be removed as a root"),
            ));
        }
        if self.is_ancestor(tag, parent) {
            return Err(ViewError::illegal(
                parent,
                format!("cannot destroy view {tag} while managing its descendant"),
            ));
        }
        Ok(())
    }

    fn detach_at(&mut self, parent: Tag, index: usize) {
        let Some(child) = self
            .views
            .get(&parent)
            .and_then(|entry| entry.children.get(index).copied())
        else {
            return;
        };
        let z_index = match self.views.get_mut(&child) {
            Some(entry) => {
                entry.parent = None;
                entry.z_index
            }
            None => None,
        };
        if let Some(entry) = self.views.get_mut(&parent) {
            entry.children.remove(index);
            entry.drawing_order.handle_remove_view(z_index);
            entry.view.remove_child(child, index);
        }
    }

    fn attach_at(&mut self, parent: Tag, child: Tag, index: usize) {
        let z_index = match self.views.get_mut(&child) {
            Some(entry) => {
                entry.parent = Some(parent);
                entry.z_index
            }
            None => return,
        };
        if let Some(entry) = self.views.get_mut(&parent) {
            entry.children.insert(index, child);
            entry.drawing_order.handle_add_view(z_index);
            entry.view.insert_child(child, index);
        }
    }

    fn detach(&mut self, child: Tag) {
        let Some(parent) = self.views.get(&child).and_then(|entry| entry.parent) else {
            return;
        };
        let index = self
            .views
            .get(&parent)
            .and_then(|entry| entry.children.iter().position(|&tag| tag == child));
        if let Some(index) = index {
            self.detach_at(parent, index);
        }
    }

    /// Forgets `tag` and its subtree. Every non-root view gets
    /// `on_drop_view_instance` before it is released.
    fn drop_view(&mut self, tag: Tag) {
        let mut stack = vec![tag];
        while let Some(tag) = stack.pop() {
            let Some(mut entry) = self.views.remove(&tag) else {
                continue;
            };
            if entry.root_tag != tag {
                entry
                    .manager
                    .on_drop_view_instance(tag, entry.view.as_mut());
            }
            stack.extend(entry.children.iter().rev().copied());
            log::trace!("dropped view {tag}");
        }
    }

    fn child_z_indices(&self, tag: Tag) -> ViewResult<Vec<Option<i32>>> {
        Ok(self
            .entry(tag)?
            .children
            .iter()
            .map(|child| self.views.get(child).and_then(|entry| entry.z_index))
            .collect())
    }

    pub(crate) fn child_order(&mut self, tag: Tag) -> ViewResult<Vec<usize>> {
        let z_indices = self.child_z_indices(tag)?;
        let entry = self.entry_mut(tag)?;
        Ok((0..z_indices.len())
            .map(|index| entry.drawing_order.child_drawing_order(&z_indices, index))
            .collect())
    }

    fn refresh_drawing_order(&mut self, parent: Tag) {
        let Ok(z_indices) = self.child_z_indices(parent) else {
            return;
        };
        if let Some(entry) = self.views.get_mut(&parent) {
            let had_custom_order = entry.drawing_order.should_enable_custom_drawing_order();
            entry.drawing_order.update(&z_indices);
            let custom_order = entry.drawing_order.should_enable_custom_drawing_order();
            if had_custom_order || custom_order {
                entry.view.drawing_order_changed(custom_order);
            }
        }
    }

    fn notify_drawing_order(&mut self, tag: Tag, had_custom_order: bool) {
        if let Some(entry) = self.views.get_mut(&tag) {
            let custom_order = entry.drawing_order.should_enable_custom_drawing_order();
            if had_custom_order || custom_order {
                entry.view.drawing_order_changed(custom_order);
            }
        }
    }

    fn measure_from_root(&self, tag: Tag) -> ViewResult<(Rect, Tag)> {
        let entry = self.entry(tag)?;
        let size = entry.frame.size();
        if entry.root_tag == tag {
            return Ok((Rect::from_origin_size(Point::ZERO, size), tag));
        }
        let mut x = entry.frame.x;
        let mut y = entry.frame.y;
        let mut current = entry.parent;
        loop {
            // A detached view is no longer on screen.
            let parent_tag = current.ok_or(ViewError::NoSuchNativeView { tag })?;
            let parent = self.entry(parent_tag)?;
            if parent.root_tag == parent_tag {
                return Ok((Rect::new(x, y, size.width, size.height), parent_tag));
            }
            x += parent.frame.x;
            y += parent.frame.y;
            current = parent.parent;
        }
    }
}

#[cfg(test)]
#[path = "tests/hierarchy_tests.rs"]
mod tests;
