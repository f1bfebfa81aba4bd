use std::thread::{self, ThreadId};

use crate::ViewError;

/// Records the thread that owns a structure and checks callers against it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThreadOwner {
    owner: ThreadId,
}

impl ThreadOwner {
    /// Owner bound to the calling thread.
    pub fn current() -> Self {
        Self {
            owner: thread::current().id(),
        }
    }

    pub fn owner(&self) -> ThreadId {
        self.owner
    }

    pub fn is_current(&self) -> bool {
        thread::current().id() == self.owner
    }

    pub fn check(&self, operation: &'static str) -> Result<(), ViewError> {
        if self.is_current() {
            Ok(())
        } else {
            Err(ViewError::ConcurrencyViolation { operation })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_threads_are_rejected() {
        let owner = ThreadOwner::current();
        assert!(owner.check("flush").is_ok());
        let result = thread::spawn(move || owner.check("flush"))
            .join()
            .expect("checker thread panicked");
        assert_eq!(
            result,
            Err(ViewError::ConcurrencyViolation { operation: "flush" })
        );
    }
}
