//! Frame - a slot in the buffer pool.
//!
//! A [`Frame`] holds one page's bytes plus the metadata buffer management
//! needs: which file and page occupy the slot, the pin count, and the
//! dirty and reference bits. It is a pure state holder; all policy lives
//! in the clock sweep and the buffer manager.

use std::cell::RefCell;
use std::rc::Rc;

use crate::common::{FileId, FrameId, PageId};
use crate::storage::{FileRef, Page, PagedFile};

/// A frame in the buffer pool.
///
/// The pool allocates all frames at construction and never resizes.
/// A frame's lifecycle:
///
/// ```text
/// Empty ──(fetch miss / allocate)──▶ Resident+Pinned
///   ▲                                    │ unpin × N
///   │                                    ▼
///   └──(evicted / disposed / flushed)── Resident+Unpinned
/// ```
///
/// `page_id` is meaningful only while `valid` is set. `valid == false`
/// implies `pin_count == 0` and `dirty == false`.
pub(crate) struct Frame<F> {
    /// The pool slot's page storage. Shared with outstanding
    /// [`PinnedPage`](crate::buffer::PinnedPage) handles.
    pub(crate) page: Rc<RefCell<Page>>,

    /// The file whose page occupies this frame, or None if empty.
    pub(crate) file: Option<FileRef<F>>,

    /// Which page of `file` is loaded.
    pub(crate) page_id: PageId,

    /// True iff the frame holds a live page-table mapping.
    pub(crate) valid: bool,

    /// Set on every access; cleared by the clock sweep (second chance).
    pub(crate) ref_bit: bool,

    /// True iff the in-memory copy differs from disk.
    pub(crate) dirty: bool,

    /// Outstanding holders preventing eviction.
    pub(crate) pin_count: u32,
}

impl<F> Frame<F> {
    /// Create a new empty frame.
    pub(crate) fn new() -> Self {
        Self {
            page: Rc::new(RefCell::new(Page::new())),
            file: None,
            page_id: PageId::INVALID,
            valid: false,
            ref_bit: false,
            dirty: false,
            pin_count: 0,
        }
    }

    /// Install a freshly loaded page into this frame.
    ///
    /// The frame comes out resident, referenced, clean, and pinned once —
    /// the state of a fetch miss or a new allocation.
    pub(crate) fn set_page(&mut self, file: FileRef<F>, page_id: PageId) {
        self.file = Some(file);
        self.page_id = page_id;
        self.valid = true;
        self.ref_bit = true;
        self.dirty = false;
        self.pin_count = 1;
    }

    /// Reset the frame to empty.
    ///
    /// Page bytes are left in place; they are overwritten on the next load.
    pub(crate) fn clear(&mut self) {
        self.file = None;
        self.page_id = PageId::INVALID;
        self.valid = false;
        self.ref_bit = false;
        self.dirty = false;
        self.pin_count = 0;
    }

    #[inline]
    pub(crate) fn is_pinned(&self) -> bool {
        self.pin_count > 0
    }
}

impl<F: PagedFile> Frame<F> {
    /// Identity of the owning file, if any.
    pub(crate) fn file_id(&self) -> Option<FileId> {
        self.file.as_ref().map(|f| f.borrow().id())
    }

    pub(crate) fn snapshot(&self, frame_id: FrameId) -> FrameSnapshot {
        FrameSnapshot {
            frame_id,
            file_id: self.file_id(),
            page_id: self.valid.then_some(self.page_id),
            valid: self.valid,
            dirty: self.dirty,
            ref_bit: self.ref_bit,
            pin_count: self.pin_count,
        }
    }
}

/// Read-only view of one frame's state.
///
/// Returned by [`BufferManager::frames`](crate::buffer::BufferManager::frames)
/// for diagnostics and tests; not part of the functional contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSnapshot {
    pub frame_id: FrameId,
    /// Owning file, if any. Can be `Some` while `valid` is false only when
    /// bookkeeping has been corrupted.
    pub file_id: Option<FileId>,
    /// Resident page id; `None` unless `valid`.
    pub page_id: Option<PageId>,
    pub valid: bool,
    pub dirty: bool,
    pub ref_bit: bool,
    pub pin_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemFile;

    fn file() -> FileRef<MemFile> {
        Rc::new(RefCell::new(MemFile::new("frame-test")))
    }

    #[test]
    fn test_frame_new_is_empty() {
        let frame: Frame<MemFile> = Frame::new();
        assert!(!frame.valid);
        assert!(!frame.dirty);
        assert!(!frame.ref_bit);
        assert!(!frame.is_pinned());
        assert!(frame.file.is_none());
    }

    #[test]
    fn test_set_page_pins_and_references() {
        let mut frame = Frame::new();
        frame.set_page(file(), PageId::new(3));

        assert!(frame.valid);
        assert!(frame.ref_bit);
        assert!(!frame.dirty);
        assert_eq!(frame.pin_count, 1);
        assert_eq!(frame.page_id, PageId::new(3));
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut frame = Frame::new();
        frame.set_page(file(), PageId::new(9));
        frame.dirty = true;
        frame.pin_count = 2;

        frame.clear();

        assert!(!frame.valid);
        assert!(!frame.dirty);
        assert!(!frame.ref_bit);
        assert_eq!(frame.pin_count, 0);
        assert!(frame.file.is_none());
        assert_eq!(frame.page_id, PageId::INVALID);
    }

    #[test]
    fn test_snapshot_hides_page_id_when_invalid() {
        let mut frame = Frame::new();
        frame.set_page(file(), PageId::new(5));

        let snap = frame.snapshot(FrameId::new(0));
        assert_eq!(snap.page_id, Some(PageId::new(5)));

        frame.clear();
        let snap = frame.snapshot(FrameId::new(0));
        assert_eq!(snap.page_id, None);
        assert_eq!(snap.file_id, None);
    }
}
