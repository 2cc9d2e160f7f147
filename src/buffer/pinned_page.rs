//! Handle to a pinned page.
//!
//! [`PinnedPage`] is what `fetch_page` and `allocate_page` hand back: a
//! borrowed view into pool memory, tied to the frame's pin count rather
//! than to a raw pointer.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::common::{FileId, PageId};
use crate::storage::Page;

/// A view into a resident page's bytes.
///
/// The contents are valid only while the page stays pinned: the caller
/// must call
/// [`unpin_page`](crate::buffer::BufferManager::unpin_page) exactly once
/// per successful fetch/allocate before the frame can become eligible for
/// eviction. Unpinning is deliberately explicit rather than drop-based,
/// because the caller decides dirtiness at unpin time.
///
/// Writing through [`write`](Self::write) does NOT set the frame's dirty
/// bit; pass `dirty = true` to `unpin_page` after modifying the page.
///
/// Holding a borrow from a handle past its unpin is a usage error; if the
/// frame is meanwhile reloaded, the borrow panics instead of silently
/// aliasing the new occupant.
#[must_use = "a pinned page must be released with unpin_page"]
pub struct PinnedPage {
    page: Rc<RefCell<Page>>,
    file_id: FileId,
    page_id: PageId,
}

impl PinnedPage {
    pub(crate) fn new(page: Rc<RefCell<Page>>, file_id: FileId, page_id: PageId) -> Self {
        Self {
            page,
            file_id,
            page_id,
        }
    }

    /// Identity of the owning file.
    #[inline]
    pub fn file_id(&self) -> FileId {
        self.file_id
    }

    /// Id of the page within its file.
    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Borrow the page for reading.
    #[inline]
    pub fn read(&self) -> Ref<'_, Page> {
        self.page.borrow()
    }

    /// Borrow the page for writing.
    #[inline]
    pub fn write(&self) -> RefMut<'_, Page> {
        self.page.borrow_mut()
    }
}
