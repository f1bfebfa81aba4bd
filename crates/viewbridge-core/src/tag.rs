use std::sync::atomic::{AtomicU32, Ordering};

use crate::Tag;

/// Distance between two consecutive root tags. Tags in between are left to
/// the description layer for the root's descendants.
pub const ROOT_VIEW_TAG_INCREMENT: Tag = 10;

/// First tag handed out by [`TagAllocator::new`].
pub const FIRST_ROOT_VIEW_TAG: Tag = 1;

/// Hands out root view tags.
///
/// One allocator is shared (behind an `Arc`) by every producer of root
/// views in the process. Each call returns a tag exactly
/// [`ROOT_VIEW_TAG_INCREMENT`] above the previous one, and no tag is ever
/// returned twice.
#[derive(Debug)]
pub struct TagAllocator {
    next: AtomicU32,
}

impl TagAllocator {
    pub fn new() -> Self {
        Self::starting_at(FIRST_ROOT_VIEW_TAG)
    }

    pub fn starting_at(first: Tag) -> Self {
        Self {
            next: AtomicU32::new(first),
        }
    }

    /// Returns the next root tag.
    ///
    /// # Panics
    ///
    /// Panics once the tag space is exhausted. Handing out a wrapped-around
    /// tag would alias a live view.
    pub fn next_root_tag(&self) -> Tag {
        match self
            .next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |tag| {
                tag.checked_add(ROOT_VIEW_TAG_INCREMENT)
            }) {
            Ok(tag) => tag,
            Err(last) => panic!("root view tag space exhausted at {last}"),
        }
    }

    /// Tag the next call to [`next_root_tag`](Self::next_root_tag) returns.
    pub fn peek(&self) -> Tag {
        self.next.load(Ordering::Relaxed)
    }
}

impl Default for TagAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/tag_tests.rs"]
mod tests;
