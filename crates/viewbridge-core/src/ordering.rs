//! Z-index driven drawing order.
//!
//! Children keep their structural order (the order `manage_children`
//! indexes into) while drawing follows their z-index. Children without a
//! z-index count as zero, and ties keep structural order.

/// Drawing order for children with the given z-indices: element `i` is the
/// structural index of the child drawn `i`-th.
pub fn drawing_order(z_indices: &[Option<i32>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..z_indices.len()).collect();
    // `sort_by_key` is stable, which keeps equal z-indices in structural order.
    order.sort_by_key(|&index| z_indices[index].unwrap_or(0));
    order
}

/// Per-group bookkeeping deciding whether custom drawing order is needed and
/// caching the order once computed.
#[derive(Clone, Debug, Default)]
pub struct DrawingOrderHelper {
    children_with_z_index: usize,
    cached: Option<Vec<usize>>,
}

impl DrawingOrderHelper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a child that was just added.
    pub fn handle_add_view(&mut self, z_index: Option<i32>) {
        if z_index.is_some() {
            self.children_with_z_index += 1;
        }
        self.cached = None;
    }

    /// Records a child that was just removed.
    pub fn handle_remove_view(&mut self, z_index: Option<i32>) {
        if z_index.is_some() {
            self.children_with_z_index = self.children_with_z_index.saturating_sub(1);
        }
        self.cached = None;
    }

    pub fn should_enable_custom_drawing_order(&self) -> bool {
        self.children_with_z_index > 0
    }

    /// Structural index of the child drawn at logical position `index`.
    ///
    /// `z_indices` are the children's z-indices in structural order.
    /// Out-of-range indices map to themselves.
    pub fn child_drawing_order(&mut self, z_indices: &[Option<i32>], index: usize) -> usize {
        if !self.should_enable_custom_drawing_order() {
            return index;
        }
        let stale = self
            .cached
            .as_ref()
            .map_or(true, |order| order.len() != z_indices.len());
        if stale {
            self.cached = Some(drawing_order(z_indices));
        }
        self.cached
            .as_ref()
            .and_then(|order| order.get(index).copied())
            .unwrap_or(index)
    }

    /// Recounts after a child's z-index changed in place.
    pub fn update(&mut self, z_indices: &[Option<i32>]) {
        self.children_with_z_index = z_indices.iter().filter(|z| z.is_some()).count();
        self.cached = None;
    }

    pub fn children_with_z_index(&self) -> usize {
        self.children_with_z_index
    }
}

#[cfg(test)]
#[path = "tests/ordering_tests.rs"]
mod tests;
