//! In-memory paged file.
//!
//! [`MemFile`] implements the same contract as
//! [`DiskFile`](crate::storage::DiskFile) with a `Vec` of pages instead of
//! a file. Useful for tests and for ephemeral data that never needs to
//! survive the process.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::common::{Error, FileId, PageId, Result};
use crate::storage::{Page, PagedFile};

static NEXT_FILE_ID: AtomicU64 = AtomicU64::new(1 << 32);

/// A paged file held entirely in memory.
///
/// Deleted slots are `None`; their ids are reused by the next allocation,
/// smallest first, mirroring `DiskFile`'s freed-id reuse.
pub struct MemFile {
    id: FileId,
    name: String,
    pages: Vec<Option<Page>>,
}

impl MemFile {
    /// Create a new, empty in-memory file.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: FileId::new(NEXT_FILE_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
            pages: Vec::new(),
        }
    }

    /// Number of live (allocated, not deleted) pages.
    pub fn page_count(&self) -> u32 {
        self.pages.iter().filter(|p| p.is_some()).count() as u32
    }

    fn not_found(&self, page_id: PageId) -> Error {
        Error::PageNotFound {
            file: self.name.clone(),
            page_id,
        }
    }
}

impl PagedFile for MemFile {
    #[inline]
    fn id(&self) -> FileId {
        self.id
    }

    #[inline]
    fn name(&self) -> &str {
        &self.name
    }

    fn read_page(&mut self, page_id: PageId) -> Result<Page> {
        match self.pages.get(page_id.0 as usize) {
            Some(Some(stored)) => {
                let mut page = Page::new();
                page.copy_from(stored);
                Ok(page)
            }
            _ => Err(self.not_found(page_id)),
        }
    }

    fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        match self.pages.get_mut(page_id.0 as usize) {
            Some(Some(stored)) => {
                stored.copy_from(page);
                Ok(())
            }
            _ => Err(self.not_found(page_id)),
        }
    }

    fn allocate_page(&mut self) -> Result<(PageId, Page)> {
        // Reuse the lowest deleted slot before growing.
        let slot = self.pages.iter().position(|p| p.is_none());
        let page_id = match slot {
            Some(i) => {
                self.pages[i] = Some(Page::new());
                PageId::new(i as u32)
            }
            None => {
                self.pages.push(Some(Page::new()));
                PageId::new((self.pages.len() - 1) as u32)
            }
        };
        Ok((page_id, Page::new()))
    }

    fn delete_page(&mut self, page_id: PageId) -> Result<()> {
        match self.pages.get_mut(page_id.0 as usize) {
            Some(slot @ Some(_)) => {
                *slot = None;
                Ok(())
            }
            _ => Err(self.not_found(page_id)),
        }
    }
}
