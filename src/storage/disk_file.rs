//! Disk-backed paged file.
//!
//! [`DiskFile`] stores pages sequentially in a single on-disk file:
//! page N lives at byte offset `N × PAGE_SIZE`.

use std::collections::BTreeSet;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, FileId, PageId, Result};
use crate::storage::{Page, PagedFile};

// Process-wide source of file identities. Ids are never reused, so a
// page-table key can outlive a close/reopen without aliasing.
static NEXT_FILE_ID: AtomicU64 = AtomicU64::new(0);

fn next_file_id() -> FileId {
    FileId::new(NEXT_FILE_ID.fetch_add(1, Ordering::Relaxed))
}

/// A paged file backed by a real file on disk.
///
/// # File Layout
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │
/// │ (4KB)   │ (4KB)   │ (4KB)   │         │
/// └─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096     8192
/// ```
///
/// # Durability
/// All writes are followed by `fsync()` to ensure durability.
///
/// # Allocation bookkeeping
/// Deleted page ids are remembered in memory and reused by the next
/// allocation. The set of freed ids is not persisted; a persistent
/// allocation bitmap belongs to the file-format layer above this one.
pub struct DiskFile {
    file: File,
    id: FileId,
    name: String,
    /// Number of pages the file has ever grown to.
    page_count: u32,
    /// Ids deleted and available for reuse, smallest first.
    freed: BTreeSet<u32>,
}

impl DiskFile {
    /// Create a new paged file on disk.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)?;

        Ok(Self {
            file,
            id: next_file_id(),
            name: path.as_ref().display().to_string(),
            page_count: 0,
            freed: BTreeSet::new(),
        })
    }

    /// Open an existing paged file.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(&path)?;

        // Calculate page count from file size
        let metadata = file.metadata()?;
        let page_count = (metadata.len() / PAGE_SIZE as u64) as u32;

        Ok(Self {
            file,
            id: next_file_id(),
            name: path.as_ref().display().to_string(),
            page_count,
            freed: BTreeSet::new(),
        })
    }

    /// Open an existing paged file, or create if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// Number of live (allocated, not deleted) pages.
    #[inline]
    pub fn page_count(&self) -> u32 {
        self.page_count - self.freed.len() as u32
    }

    fn check_live(&self, page_id: PageId) -> Result<()> {
        if page_id.0 >= self.page_count || self.freed.contains(&page_id.0) {
            return Err(Error::PageNotFound {
                file: self.name.clone(),
                page_id,
            });
        }
        Ok(())
    }

    fn write_at(&mut self, page_id: PageId, bytes: &[u8]) -> Result<()> {
        let offset = (page_id.0 as u64) * (PAGE_SIZE as u64);
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(bytes)?;
        self.file.sync_all()?; // fsync for durability
        Ok(())
    }
}

impl PagedFile for DiskFile {
    #[inline]
    fn id(&self) -> FileId {
        self.id
    }

    #[inline]
    fn name(&self) -> &str {
        &self.name
    }

    fn read_page(&mut self, page_id: PageId) -> Result<Page> {
        self.check_live(page_id)?;

        let offset = (page_id.0 as u64) * (PAGE_SIZE as u64);
        self.file.seek(SeekFrom::Start(offset))?;

        let mut page = Page::new();
        self.file.read_exact(page.as_mut_slice())?;

        Ok(page)
    }

    fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        self.check_live(page_id)?;
        self.write_at(page_id, page.as_slice())
    }

    fn allocate_page(&mut self) -> Result<(PageId, Page)> {
        // Reuse the smallest freed id if there is one, otherwise grow.
        let page_id = match self.freed.iter().next().copied() {
            Some(id) => {
                self.freed.remove(&id);
                PageId::new(id)
            }
            None => {
                let id = PageId::new(self.page_count);
                self.page_count += 1;
                id
            }
        };

        let page = Page::new();
        self.write_at(page_id, page.as_slice())?;

        Ok((page_id, page))
    }

    fn delete_page(&mut self, page_id: PageId) -> Result<()> {
        self.check_live(page_id)?;
        self.freed.insert(page_id.0);
        Ok(())
    }
}
