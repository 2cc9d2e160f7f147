//! Page table - the associative index from (file, page) to frame.
//!
//! Tracks which frame, if any, holds each resident page. The table and
//! the set of valid frames are kept in bijection by the buffer manager:
//! every insert/remove is paired with the matching frame update.

use std::collections::HashMap;

use crate::common::{FileId, FrameId, PageId};

/// Maps `(FileId, PageId)` to the frame currently holding that page.
///
/// A miss is the common, expected path for a first access, so `lookup`
/// returns an `Option` rather than an error. No iteration order is
/// guaranteed; this is a pure associative structure.
#[derive(Debug, Default)]
pub(crate) struct PageTable {
    map: HashMap<(FileId, PageId), FrameId>,
}

impl PageTable {
    pub(crate) fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Frame holding the page, or None if the page is not resident.
    /// Never has side effects.
    #[inline]
    pub(crate) fn lookup(&self, file_id: FileId, page_id: PageId) -> Option<FrameId> {
        self.map.get(&(file_id, page_id)).copied()
    }

    /// Add an entry. The caller guarantees the key is absent and no other
    /// entry references `frame_id`.
    pub(crate) fn insert(&mut self, file_id: FileId, page_id: PageId, frame_id: FrameId) {
        let prev = self.map.insert((file_id, page_id), frame_id);
        debug_assert!(prev.is_none(), "duplicate page table entry for {page_id}");
    }

    /// Delete an entry, returning the frame it referenced. Best-effort
    /// callers tolerate `None`.
    pub(crate) fn remove(&mut self, file_id: FileId, page_id: PageId) -> Option<FrameId> {
        self.map.remove(&(file_id, page_id))
    }

    /// Number of resident pages.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }
}
