//! Child-list edits shared by the shadow tree and the native hierarchy.
//!
//! Both sides validate an edit completely against a scratch copy of the
//! child list before touching anything, so the same planning step is used
//! on each.

use serde::{Deserialize, Serialize};

use crate::{Tag, ViewError, ViewResult};

/// A view to insert at a structural index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewAtIndex {
    pub tag: Tag,
    pub index: usize,
}

impl ViewAtIndex {
    pub fn new(tag: Tag, index: usize) -> Self {
        Self { tag, index }
    }
}

/// Result of planning a child-list edit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChildrenPlan {
    /// Child list after removals and insertions.
    pub children: Vec<Tag>,
    /// Tags detached by the removals, in the order they were removed.
    pub removed: Vec<Tag>,
}

/// Plans removals followed by insertions on `current`, the children of
/// `parent`.
///
/// Removals are applied from the highest index down so earlier indices stay
/// valid, then insertions from the lowest index up. Nothing is mutated; any
/// out-of-range or repeated index, or a tag inserted twice, is reported as
/// [`ViewError::IllegalViewOperation`] on `parent`.
pub fn plan_manage_children(
    parent: Tag,
    current: &[Tag],
    indices_to_remove: &[usize],
    views_to_add: &[ViewAtIndex],
) -> ViewResult<ChildrenPlan> {
    let mut children = current.to_vec();

    let mut removals = indices_to_remove.to_vec();
    removals.sort_unstable();
    let mut removed = Vec::with_capacity(removals.len());
    let mut last_removed = None;
    for &index in removals.iter().rev() {
        if last_removed == Some(index) {
            return Err(ViewError::illegal(
                parent,
                format!("repeated index {index} in removal list"),
            ));
        }
        if index >= children.len() {
            return Err(ViewError::illegal(
                parent,
                format!(
                    "removal index {index} out of bounds for {} children",
                    current.len()
                ),
            ));
        }
        removed.push(children.remove(index));
        last_removed = Some(index);
    }

    let mut additions = views_to_add.to_vec();
    additions.sort_by_key(|view| view.index);
    for view in &additions {
        if view.index > children.len() {
            return Err(ViewError::illegal(
                parent,
                format!(
                    "insertion index {} out of bounds for {} children",
                    view.index,
                    children.len()
                ),
            ));
        }
        if children.contains(&view.tag) {
            return Err(ViewError::illegal(
                parent,
                format!("view {} would be added twice", view.tag),
            ));
        }
        children.insert(view.index, view.tag);
    }

    Ok(ChildrenPlan { children, removed })
}
