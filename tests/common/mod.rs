//! Shared test support.

use pagepool::storage::{MemFile, Page, PagedFile};
use pagepool::{FileId, PageId, Result};

/// One recorded collaborator call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOp {
    Read(PageId),
    Write(PageId),
    Allocate(PageId),
    Delete(PageId),
}

/// A paged file that records every call made to it, so tests can assert
/// on the buffer manager's I/O behavior (e.g. "the dirty victim was
/// written back before the new page was read").
pub struct TraceFile {
    inner: MemFile,
    log: Vec<FileOp>,
}

impl TraceFile {
    pub fn new(name: &str) -> Self {
        Self {
            inner: MemFile::new(name),
            log: Vec::new(),
        }
    }

    /// Every collaborator call, in order.
    pub fn log(&self) -> &[FileOp] {
        &self.log
    }

    /// Just the pages written, in order.
    pub fn writes(&self) -> Vec<PageId> {
        self.log
            .iter()
            .filter_map(|op| match op {
                FileOp::Write(pid) => Some(*pid),
                _ => None,
            })
            .collect()
    }
}

impl PagedFile for TraceFile {
    fn id(&self) -> FileId {
        self.inner.id()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn read_page(&mut self, page_id: PageId) -> Result<Page> {
        self.log.push(FileOp::Read(page_id));
        self.inner.read_page(page_id)
    }

    fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        self.log.push(FileOp::Write(page_id));
        self.inner.write_page(page_id, page)
    }

    fn allocate_page(&mut self) -> Result<(PageId, Page)> {
        let (page_id, page) = self.inner.allocate_page()?;
        self.log.push(FileOp::Allocate(page_id));
        Ok((page_id, page))
    }

    fn delete_page(&mut self, page_id: PageId) -> Result<()> {
        self.log.push(FileOp::Delete(page_id));
        self.inner.delete_page(page_id)
    }
}
