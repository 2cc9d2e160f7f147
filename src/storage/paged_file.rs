//! The paged-file collaborator contract.
//!
//! The buffer pool never touches storage media itself; all physical I/O
//! goes through a [`PagedFile`] implementation. This crate ships two:
//! [`DiskFile`](crate::storage::DiskFile) for on-disk files and
//! [`MemFile`](crate::storage::MemFile) for tests and ephemeral data.

use std::cell::RefCell;
use std::rc::Rc;

use crate::common::{FileId, PageId, Result};
use crate::storage::Page;

/// Shared handle to a paged file.
///
/// The buffer manager keeps one of these in every frame that holds a
/// resident page, so that eviction and flushing can write a dirty page
/// back to whichever file owns it. The pool is single-threaded, so a
/// plain `Rc<RefCell<_>>` is the right sharing primitive.
pub type FileRef<F> = Rc<RefCell<F>>;

/// A file made of fixed-size pages, addressed by [`PageId`].
///
/// Implementations own the physical format (allocation bookkeeping,
/// offsets, durability); the buffer pool only relies on this contract:
///
/// - `read_page` / `write_page` fail with `PageNotFound` for ids that were
///   never allocated or have been deleted.
/// - `allocate_page` returns a fresh id and an empty (zeroed) page.
/// - After `delete_page(id)`, a subsequent `read_page(id)` fails.
/// - `id()` is stable for the lifetime of the process and unique per file;
///   the buffer pool uses it as part of its page-table key.
pub trait PagedFile {
    /// Stable identity of this file.
    fn id(&self) -> FileId;

    /// Human-readable name, used in error messages and logs.
    fn name(&self) -> &str;

    /// Read a page's bytes.
    fn read_page(&mut self, page_id: PageId) -> Result<Page>;

    /// Overwrite a page's on-disk contents.
    fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()>;

    /// Grow the file by one page. Returns the fresh id and its (empty)
    /// contents.
    fn allocate_page(&mut self) -> Result<(PageId, Page)>;

    /// Remove a page from the file.
    fn delete_page(&mut self, page_id: PageId) -> Result<()>;
}
