use viewbridge_shadow::ShadowNode;

/// Told about every root after each layout pass.
pub trait LayoutUpdateListener: Send {
    fn on_layout_updated(&mut self, root: &ShadowNode);
}

impl<F> LayoutUpdateListener for F
where
    F: FnMut(&ShadowNode) + Send,
{
    fn on_layout_updated(&mut self, root: &ShadowNode) {
        self(root)
    }
}
