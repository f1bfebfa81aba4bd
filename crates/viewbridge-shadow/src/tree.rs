use indexmap::IndexMap;
use viewbridge_core::collections::map::{HashMap, HashSet};
use viewbridge_core::{plan_manage_children, Props, Tag, ViewAtIndex, ViewError, ViewResult};
use viewbridge_ui_graphics::Rect;
use viewbridge_ui_layout::{Constraints, LayoutStyle, LayoutTree};

use crate::{ShadowNode, ROOT_VIEW_TYPE};

/// Arena of shadow nodes keyed by tag, plus the registered roots and their
/// layout constraints.
///
/// Every mutating method validates its whole input before changing
/// anything, so an `Err` leaves the tree exactly as it was.
#[derive(Debug, Default)]
pub struct ShadowTree {
    nodes: HashMap<Tag, ShadowNode>,
    roots: IndexMap<Tag, Constraints>,
}

impl ShadowTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.nodes.contains_key(&tag)
    }

    pub fn get(&self, tag: Tag) -> Option<&ShadowNode> {
        self.nodes.get(&tag)
    }

    pub fn node(&self, tag: Tag) -> ViewResult<&ShadowNode> {
        self.nodes
            .get(&tag)
            .ok_or(ViewError::NoSuchNativeView { tag })
    }

    /// Registered roots in registration order.
    pub fn roots(&self) -> impl Iterator<Item = Tag> + '_ {
        self.roots.keys().copied()
    }

    pub fn root_constraints(&self, root: Tag) -> Option<Constraints> {
        self.roots.get(&root).copied()
    }

    pub fn set_root_constraints(&mut self, root: Tag, constraints: Constraints) -> ViewResult<()> {
        let slot = self
            .roots
            .get_mut(&root)
            .ok_or(ViewError::NoSuchNativeView { tag: root })?;
        *slot = constraints;
        if let Some(node) = self.nodes.get_mut(&root) {
            node.dirty = true;
        }
        Ok(())
    }

    pub fn add_root(&mut self, tag: Tag, constraints: Constraints) -> ViewResult<()> {
        if self.nodes.contains_key(&tag) {
            return Err(ViewError::DuplicateTag { tag });
        }
        self.nodes
            .insert(tag, ShadowNode::new(tag, ROOT_VIEW_TYPE, tag, Props::new()));
        self.roots.insert(tag, constraints);
        Ok(())
    }

    /// Creates a detached node owned by `root_tag`.
    pub fn create_node(
        &mut self,
        tag: Tag,
        view_type: &str,
        root_tag: Tag,
        props: Props,
    ) -> ViewResult<()> {
        if self.nodes.contains_key(&tag) {
            return Err(ViewError::DuplicateTag { tag });
        }
        if !self.roots.contains_key(&root_tag) {
            return Err(ViewError::NoSuchNativeView { tag: root_tag });
        }
        self.nodes
            .insert(tag, ShadowNode::new(tag, view_type, root_tag, props));
        Ok(())
    }

    pub fn update_props(&mut self, tag: Tag, update: &Props) -> ViewResult<()> {
        let node = self
            .nodes
            .get_mut(&tag)
            .ok_or(ViewError::NoSuchNativeView { tag })?;
        node.merge_props(update);
        Ok(())
    }

    /// True when `ancestor` is `tag` or one of its ancestors.
    pub fn is_ancestor(&self, ancestor: Tag, tag: Tag) -> bool {
        let mut current = Some(tag);
        while let Some(tag) = current {
            if tag == ancestor {
                return true;
            }
            current = self.nodes.get(&tag).and_then(|node| node.parent);
        }
        false
    }

    /// Frame of `tag` from the last layout pass, relative to `ancestor`.
    pub fn measure_layout(&self, tag: Tag, ancestor: Tag) -> ViewResult<Rect> {
        let node = self.node(tag)?;
        let size = node.layout.size();
        let (mut x, mut y) = (0.0, 0.0);
        let mut current = node;
        while current.tag() != ancestor {
            x += current.layout.x;
            y += current.layout.y;
            current = match current.parent {
                Some(parent) => self.node(parent)?,
                None => {
                    return Err(ViewError::illegal(
                        tag,
                        format!("{ancestor} is not an ancestor of {tag}"),
                    ))
                }
            };
        }
        Ok(Rect::new(x, y, size.width, size.height))
    }

    pub fn measure_layout_relative_to_parent(&self, tag: Tag) -> ViewResult<Rect> {
        let node = self.node(tag)?;
        match node.parent {
            Some(_) => Ok(node.layout),
            None => Err(ViewError::illegal(tag, format!("view {tag} has no parent"))),
        }
    }

    /// Removes the children at `indices_to_remove`, inserts `views_to_add`
    /// and then deletes `tags_to_delete` with their subtrees.
    ///
    /// Returns every tag dropped from the tree, descendants included.
    pub fn manage_children(
        &mut self,
        parent: Tag,
        indices_to_remove: &[usize],
        views_to_add: &[ViewAtIndex],
        tags_to_delete: &[Tag],
    ) -> ViewResult<Vec<Tag>> {
        let current = self.node(parent)?.children.clone();
        let plan = plan_manage_children(parent, &current, indices_to_remove, views_to_add)?;

        for view in views_to_add {
            self.check_attachable(parent, view.tag, &plan.removed)?;
        }
        let added: HashSet<Tag> = views_to_add.iter().map(|view| view.tag).collect();
        for &tag in tags_to_delete {
            self.check_deletable(parent, tag)?;
            if added.contains(&tag) {
                return Err(ViewError::illegal(
                    parent,
                    format!("view {tag} is both added and deleted"),
                ));
            }
        }

        for tag in &plan.removed {
            if let Some(node) = self.nodes.get_mut(tag) {
                node.parent = None;
            }
        }
        for tag in &plan.children {
            if let Some(node) = self.nodes.get_mut(tag) {
                node.parent = Some(parent);
            }
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children = plan.children;
            node.dirty = true;
        }

        let mut deleted = Vec::new();
        for &tag in tags_to_delete {
            // Already gone when an earlier tag in the list was its ancestor.
            if !self.nodes.contains_key(&tag) {
                continue;
            }
            self.detach(tag);
            self.remove_subtree(tag, &mut deleted);
        }
        Ok(deleted)
    }

    /// Appends `child_tags`, all currently detached, to `parent`.
    pub fn set_children(&mut self, parent: Tag, child_tags: &[Tag]) -> ViewResult<()> {
        self.node(parent)?;
        let mut seen = HashSet::default();
        for &tag in child_tags {
            if !seen.insert(tag) {
                return Err(ViewError::illegal(
                    parent,
                    format!("view {tag} listed twice"),
                ));
            }
            self.check_attachable(parent, tag, &[])?;
        }

        for &tag in child_tags {
            if let Some(node) = self.nodes.get_mut(&tag) {
                node.parent = Some(parent);
            }
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.extend_from_slice(child_tags);
            node.dirty = true;
        }
        Ok(())
    }

    /// Drops a root, its subtree and any detached nodes it still owns.
    /// Returns the dropped tags.
    pub fn remove_root(&mut self, root: Tag) -> ViewResult<Vec<Tag>> {
        if self.roots.shift_remove(&root).is_none() {
            return Err(ViewError::NoSuchNativeView { tag: root });
        }
        let mut removed = Vec::new();
        self.remove_subtree(root, &mut removed);
        let orphans: Vec<Tag> = self
            .nodes
            .values()
            .filter(|node| node.root_tag() == root && node.parent.is_none())
            .map(ShadowNode::tag)
            .collect();
        for tag in orphans {
            self.remove_subtree(tag, &mut removed);
        }
        Ok(removed)
    }

    /// Stores frames produced by a layout pass and returns the ones that
    /// differ from what was last committed. Those become the committed
    /// frames.
    pub fn apply_layout(&mut self, frames: &[(Tag, Rect)]) -> Vec<(Tag, Rect)> {
        let mut changed = Vec::new();
        for &(tag, frame) in frames {
            let Some(node) = self.nodes.get_mut(&tag) else {
                log::warn!("layout produced a frame for unknown tag {tag}");
                continue;
            };
            node.layout = frame;
            node.dirty = false;
            if node.committed_layout != Some(frame) {
                node.committed_layout = Some(frame);
                changed.push((tag, frame));
            }
        }
        changed
    }

    fn check_attachable(&self, parent: Tag, tag: Tag, detached_here: &[Tag]) -> ViewResult<()> {
        let Some(node) = self.nodes.get(&tag) else {
            return Err(ViewError::illegal(
                parent,
                format!("trying to add unknown view tag {tag}"),
            ));
        };
        if node.is_root() {
            return Err(ViewError::illegal(
                parent,
                format!("root view {tag} cannot become a child"),
            ));
        }
        if self.is_ancestor(tag, parent) {
            return Err(ViewError::illegal(
                parent,
                format!("adding view {tag} would create a cycle"),
            ));
        }
        let parent_root = self.nodes.get(&parent).map(ShadowNode::root_tag);
        if parent_root != Some(node.root_tag()) {
            return Err(ViewError::illegal(
                parent,
                format!(
                    "view {tag} belongs to root {} and cannot move to another root",
                    node.root_tag()
                ),
            ));
        }
        match node.parent {
            None => Ok(()),
            Some(current) if current == parent && detached_here.contains(&tag) => Ok(()),
            Some(current) => Err(ViewError::illegal(
                parent,
                format!("view {tag} is already a child of {current}"),
            )),
        }
    }

    fn check_deletable(&self, parent: Tag, tag: Tag) -> ViewResult<()> {
        let Some(node) = self.nodes.get(&tag) else {
            return Err(ViewError::illegal(
                parent,
                format!("trying to destroy unknown view tag {tag}"),
            ));
        };
        if node.is_root() {
            return Err(ViewError::illegal(
                parent,
                format!("root view {tag} can only be removed as a root"),
            ));
        }
        if self.is_ancestor(tag, parent) {
            return Err(ViewError::illegal(
                parent,
                format!("cannot delete view {tag} while managing its descendant"),
            ));
        }
        Ok(())
    }

    fn detach(&mut self, tag: Tag) {
        let Some(parent) = self.nodes.get_mut(&tag).and_then(|node| node.parent.take()) else {
            return;
        };
        if let Some(parent) = self.nodes.get_mut(&parent) {
            parent.children.retain(|&child| child != tag);
            parent.dirty = true;
        }
    }

    fn remove_subtree(&mut self, tag: Tag, removed: &mut Vec<Tag>) {
        let mut stack = vec![tag];
        while let Some(tag) = stack.pop() {
            if let Some(node) = self.nodes.remove(&tag) {
                stack.extend(node.children.iter().copied());
                removed.push(tag);
            }
        }
    }
}

impl LayoutTree for ShadowTree {
    fn layout_children(&self, tag: Tag) -> &[Tag] {
        self.nodes
            .get(&tag)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    fn layout_style(&self, tag: Tag) -> LayoutStyle {
        self.nodes
            .get(&tag)
            .map(|node| LayoutStyle::from_props(&node.props))
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "tests/tree_tests.rs"]
mod tests;
