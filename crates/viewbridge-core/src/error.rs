use thiserror::Error;

use crate::Tag;

/// Failures raised by the registry, the shadow tree and the native view
/// hierarchy. A failed operation never leaves partial state behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("no view manager registered for view type `{name}`")]
    UnknownViewType { name: String },
    #[error("trying to address view with tag {tag} which doesn't exist")]
    NoSuchNativeView { tag: Tag },
    #[error("a view with tag {tag} is already registered")]
    DuplicateTag { tag: Tag },
    #[error("illegal view operation on tag {tag}: {reason}")]
    IllegalViewOperation { tag: Tag, reason: String },
    #[error("`{operation}` called on the wrong thread")]
    ConcurrencyViolation { operation: &'static str },
    /// A blocking request whose answer never came back from the UI thread.
    #[error("`{operation}` got no response from the UI thread")]
    NoResponse { operation: &'static str },
    #[error("view manager `{name}` is registered more than once")]
    DuplicateViewManager { name: String },
}

impl ViewError {
    pub fn illegal(tag: Tag, reason: impl Into<String>) -> Self {
        ViewError::IllegalViewOperation {
            tag,
            reason: reason.into(),
        }
    }

    /// Tag the error is about, when it names one.
    pub fn tag(&self) -> Option<Tag> {
        match self {
            ViewError::NoSuchNativeView { tag }
            | ViewError::DuplicateTag { tag }
            | ViewError::IllegalViewOperation { tag, .. } => Some(*tag),
            _ => None,
        }
    }
}

pub type ViewResult<T> = Result<T, ViewError>;
