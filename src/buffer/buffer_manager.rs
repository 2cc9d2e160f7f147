//! Buffer Manager - the core page caching layer.
//!
//! The [`BufferManager`] makes a fixed pool of in-memory frames behave
//! like a cache over the unbounded pages of any number of
//! [`PagedFile`]s: callers ask for "page P of file F" and the manager
//! hides the disk I/O, replacement, and lifetime tracking behind pin
//! counts.

use std::rc::Rc;

use crate::common::{Error, FrameId, PageId, Result};
use crate::storage::{FileRef, PagedFile};

use super::clock::ClockSweep;
use super::frame::{Frame, FrameSnapshot};
use super::page_table::PageTable;
use super::pinned_page::PinnedPage;
use super::stats::BufferStats;

/// Manages a pool of buffer frames caching pages of paged files.
///
/// # Architecture
/// ```text
/// ┌─────────────────────────────────────────────────────────────┐
/// │                       BufferManager                         │
/// │  ┌────────────────────┐  ┌──────────────────────────────┐  │
/// │  │     page_table     │  │      frames: Vec<Frame>      │  │
/// │  │(FileId,PageId)→Fid │─▶│ [Frame0] [Frame1] [Frame2] … │  │
/// │  └────────────────────┘  └──────────────────────────────┘  │
/// │  ┌────────────────────┐  ┌──────────────┐                  │
/// │  │  clock: ClockSweep │  │    stats     │                  │
/// │  └────────────────────┘  └──────────────┘                  │
/// └─────────────────────────────────────────────────────────────┘
/// ```
///
/// The manager never discovers pages on disk itself: residency questions
/// go to the page table, victim selection to the clock sweep, and all
/// physical I/O to the [`PagedFile`] collaborator.
///
/// # Ownership
/// One instance exclusively owns the frame table, page table, and clock
/// hand; every operation takes `&mut self`. The design is
/// single-threaded — there is no internal locking, and every call either
/// returns a result or fails before any visible mutation.
///
/// # Usage
/// ```
/// use std::{cell::RefCell, rc::Rc};
/// use pagepool::{BufferManager, storage::MemFile};
///
/// let file = Rc::new(RefCell::new(MemFile::new("scratch")));
/// let mut pool = BufferManager::new(8);
///
/// let (page_id, page) = pool.allocate_page(&file)?;
/// page.write().as_mut_slice()[0] = 0xAB;
/// pool.unpin_page(&file, page_id, true)?;
///
/// let page = pool.fetch_page(&file, page_id)?;
/// assert_eq!(page.read().as_slice()[0], 0xAB);
/// pool.unpin_page(&file, page_id, false)?;
/// # Ok::<(), pagepool::Error>(())
/// ```
pub struct BufferManager<F: PagedFile> {
    /// Fixed pool of frames allocated at startup.
    frames: Vec<Frame<F>>,

    /// Maps (file, page) identities to frame IDs.
    page_table: PageTable,

    /// Clock/second-chance victim selection.
    clock: ClockSweep,

    /// Performance counters.
    stats: BufferStats,

    /// Number of frames in the pool (immutable after construction).
    pool_size: usize,
}

impl<F: PagedFile> BufferManager<F> {
    /// Create a new buffer manager with `pool_size` frames.
    ///
    /// # Panics
    /// Panics if `pool_size` is 0.
    pub fn new(pool_size: usize) -> Self {
        assert!(pool_size > 0, "pool_size must be > 0");

        Self {
            frames: (0..pool_size).map(|_| Frame::new()).collect(),
            page_table: PageTable::new(),
            clock: ClockSweep::new(pool_size),
            stats: BufferStats::new(),
            pool_size,
        }
    }

    // ========================================================================
    // Public API: Fetch and release pages
    // ========================================================================

    /// Fetch a page, pinning it.
    ///
    /// If the page is resident this is pure bookkeeping — no I/O, the pin
    /// count goes up by one, and the reference bit is set. Otherwise a
    /// frame is obtained from the clock sweep (possibly evicting another
    /// page) and the page's bytes are read from its file.
    ///
    /// # Errors
    /// - `Error::BufferExceeded` if every frame is pinned; nothing is
    ///   committed
    /// - `Error::PageNotFound` / I/O errors from the file on a miss
    pub fn fetch_page(&mut self, file: &FileRef<F>, page_id: PageId) -> Result<PinnedPage> {
        let file_id = file.borrow().id();

        // Hit: the common path once the working set is resident.
        if let Some(frame_id) = self.page_table.lookup(file_id, page_id) {
            let frame = &mut self.frames[frame_id.0];
            frame.ref_bit = true;
            frame.pin_count += 1;
            self.stats.cache_hits += 1;
            return Ok(PinnedPage::new(Rc::clone(&frame.page), file_id, page_id));
        }

        // Miss: get a frame, then ask the file for the bytes.
        self.stats.cache_misses += 1;
        let frame_id = self
            .clock
            .allocate(&mut self.frames, &mut self.page_table, &mut self.stats)?;

        let data = file.borrow_mut().read_page(page_id)?;
        self.stats.pages_read += 1;

        let frame = &mut self.frames[frame_id.0];
        frame.page.borrow_mut().copy_from(&data);
        frame.set_page(Rc::clone(file), page_id);
        self.page_table.insert(file_id, page_id, frame_id);

        Ok(PinnedPage::new(Rc::clone(&frame.page), file_id, page_id))
    }

    /// Release one pin on a page, optionally marking it dirty.
    ///
    /// Unpinning a page that is no longer resident is a tolerated no-op:
    /// in a pool with real concurrency the page may legitimately have
    /// been evicted between pin and unpin. The dirty bit is monotonic —
    /// only a successful write-back clears it.
    ///
    /// # Errors
    /// - `Error::PageNotPinned` if the page is resident with a zero pin
    ///   count
    pub fn unpin_page(&mut self, file: &FileRef<F>, page_id: PageId, dirty: bool) -> Result<()> {
        let file_id = file.borrow().id();

        let Some(frame_id) = self.page_table.lookup(file_id, page_id) else {
            return Ok(());
        };

        let frame = &mut self.frames[frame_id.0];
        if frame.pin_count == 0 {
            return Err(Error::PageNotPinned {
                file: file.borrow().name().to_string(),
                page_id,
            });
        }

        frame.pin_count -= 1;
        if dirty {
            frame.dirty = true;
        }
        Ok(())
    }

    // ========================================================================
    // Public API: Create and delete pages
    // ========================================================================

    /// Allocate a brand-new page in `file` and pin it.
    ///
    /// The file grows by one page; the frame comes back initialized
    /// exactly like a fetch miss (pinned once, referenced, clean).
    ///
    /// # Errors
    /// - `Error::BufferExceeded` if every frame is pinned
    /// - I/O errors from the file's allocation
    pub fn allocate_page(&mut self, file: &FileRef<F>) -> Result<(PageId, PinnedPage)> {
        let (page_id, contents) = file.borrow_mut().allocate_page()?;
        let file_id = file.borrow().id();

        let frame_id = self
            .clock
            .allocate(&mut self.frames, &mut self.page_table, &mut self.stats)?;

        let frame = &mut self.frames[frame_id.0];
        frame.page.borrow_mut().copy_from(&contents);
        frame.set_page(Rc::clone(file), page_id);
        self.page_table.insert(file_id, page_id, frame_id);

        Ok((page_id, PinnedPage::new(Rc::clone(&frame.page), file_id, page_id)))
    }

    /// Remove a page from the pool and delete it from its file.
    ///
    /// A resident page must be unpinned; its frame is reset without
    /// write-back (the page is about to stop existing). Whether or not
    /// the page was resident, the file is told to delete it.
    ///
    /// # Errors
    /// - `Error::PagePinned` if the page is resident and pinned; the page
    ///   stays resident
    /// - deletion errors from the file
    pub fn dispose_page(&mut self, file: &FileRef<F>, page_id: PageId) -> Result<()> {
        let file_id = file.borrow().id();

        if let Some(frame_id) = self.page_table.lookup(file_id, page_id) {
            let frame = &mut self.frames[frame_id.0];
            if frame.is_pinned() {
                return Err(Error::PagePinned {
                    file: file.borrow().name().to_string(),
                    page_id,
                });
            }
            self.page_table.remove(file_id, page_id);
            frame.clear();
        }

        file.borrow_mut().delete_page(page_id)
    }

    // ========================================================================
    // Public API: Flush
    // ========================================================================

    /// Write back and unregister every resident page of `file`.
    ///
    /// Dirty frames are written back and cleared; clean frames are simply
    /// unregistered. The scan covers the whole frame table and is
    /// consistent per frame, not atomic across the file: an error on a
    /// later frame leaves earlier frames correctly flushed and cleared.
    ///
    /// # Errors
    /// - `Error::PagePinned` if any page of the file is pinned
    /// - `Error::BadBuffer` if a frame claims ownership by `file` while
    ///   not valid — corrupt bookkeeping, not recoverable
    /// - I/O errors from write-back
    pub fn flush_file(&mut self, file: &FileRef<F>) -> Result<()> {
        let file_id = file.borrow().id();
        log::debug!("flushing {}", file_id);

        for (i, frame) in self.frames.iter_mut().enumerate() {
            if frame.file_id() != Some(file_id) {
                continue;
            }

            if !frame.valid {
                return Err(Error::BadBuffer {
                    frame_id: FrameId::new(i),
                    valid: frame.valid,
                    dirty: frame.dirty,
                    ref_bit: frame.ref_bit,
                });
            }
            if frame.is_pinned() {
                return Err(Error::PagePinned {
                    file: file.borrow().name().to_string(),
                    page_id: frame.page_id,
                });
            }

            if frame.dirty {
                file.borrow_mut()
                    .write_page(frame.page_id, &frame.page.borrow())?;
                frame.dirty = false;
                self.stats.pages_written += 1;
            }

            self.page_table.remove(file_id, frame.page_id);
            frame.clear();
        }

        Ok(())
    }

    // ========================================================================
    // Public API: Introspection
    // ========================================================================

    /// Read-only snapshot of every frame's state.
    ///
    /// For diagnostics and tests only; not part of the functional
    /// contract.
    pub fn frames(&self) -> Vec<FrameSnapshot> {
        self.frames
            .iter()
            .enumerate()
            .map(|(i, frame)| frame.snapshot(FrameId::new(i)))
            .collect()
    }

    /// Get the pool size.
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Number of pages currently resident.
    pub fn resident_pages(&self) -> usize {
        self.page_table.len()
    }

    /// Current performance counters.
    pub fn stats(&self) -> BufferStats {
        self.stats
    }
}

impl<F: PagedFile> Drop for BufferManager<F> {
    /// Teardown writes every still-dirty frame back to its owning file.
    ///
    /// `Drop` cannot propagate errors, so write-back failures are logged
    /// and the remaining frames are still attempted.
    fn drop(&mut self) {
        for (i, frame) in self.frames.iter_mut().enumerate() {
            if !(frame.valid && frame.dirty) {
                continue;
            }
            let Some(file) = frame.file.as_ref() else {
                continue;
            };
            if let Err(e) = file
                .borrow_mut()
                .write_page(frame.page_id, &frame.page.borrow())
            {
                log::warn!(
                    "teardown write-back of {} in {} failed: {}",
                    frame.page_id,
                    FrameId::new(i),
                    e
                );
            }
        }
    }
}
