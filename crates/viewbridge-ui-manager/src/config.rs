/// Options for a [`UiManager`](crate::UiManager).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UiManagerConfig {
    /// Reject view types the registry does not know when the view is
    /// created on the shadow side, instead of when the native side acts on
    /// it.
    pub validate_view_types: bool,
    /// Trace every operation of each dispatched batch.
    pub log_batches: bool,
}

impl Default for UiManagerConfig {
    fn default() -> Self {
        Self {
            validate_view_types: true,
            log_batches: false,
        }
    }
}
