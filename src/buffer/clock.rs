//! Clock (second-chance) victim selection.
//!
//! The clock sweep approximates LRU at O(1) amortized cost per allocation:
//! instead of maintaining an ordered list, each frame carries a reference
//! bit that buys it one extra lap of the hand before it becomes a victim.

use std::rc::Rc;

use crate::common::{Error, FrameId, Result};
use crate::storage::PagedFile;

use super::frame::Frame;
use super::page_table::PageTable;
use super::stats::BufferStats;

/// The rotating hand over the frame array.
///
/// Owns no frame state; frames and the page table are passed in per
/// allocation so a single buffer-manager instance remains the exclusive
/// owner of all pool state.
pub(crate) struct ClockSweep {
    hand: usize,
    num_frames: usize,
}

impl ClockSweep {
    /// The hand starts on the last frame so the first advance inspects
    /// frame 0.
    pub(crate) fn new(num_frames: usize) -> Self {
        Self {
            hand: num_frames - 1,
            num_frames,
        }
    }

    /// Rotate the hand one frame forward, wrapping circularly.
    #[inline]
    fn advance(&mut self) {
        self.hand = (self.hand + 1) % self.num_frames;
    }

    /// Find a frame to reuse, evicting its current page if necessary.
    ///
    /// Each step of the sweep inspects the frame under the hand:
    /// - not valid: select it immediately (empty frame, no eviction)
    /// - pinned: ineligible, keep sweeping
    /// - reference bit set: clear it and keep sweeping (second chance)
    /// - otherwise: victim — write back if dirty, drop its page-table
    ///   entry, reset the frame, select it
    ///
    /// The pinned check runs before the reference-bit check so a sweep
    /// over a fully pinned pool touches nothing: the resulting
    /// `BufferExceeded` is idempotent, and frames keep their recency
    /// while in use.
    ///
    /// The sweep is bounded at `2 × num_frames` steps — one full lap to
    /// clear reference bits plus one to pick the victim. Exhausting the
    /// bound means every valid frame is pinned.
    ///
    /// # Errors
    /// - `Error::BufferExceeded` if no eligible victim exists
    /// - write-back errors from the owning file; the victim then stays
    ///   resident, dirty, and mapped
    pub(crate) fn allocate<F: PagedFile>(
        &mut self,
        frames: &mut [Frame<F>],
        table: &mut PageTable,
        stats: &mut BufferStats,
    ) -> Result<FrameId> {
        let max_steps = 2 * self.num_frames;

        for _ in 0..max_steps {
            self.advance();
            let frame_id = FrameId::new(self.hand);
            let frame = &mut frames[self.hand];

            if !frame.valid {
                return Ok(frame_id);
            }
            if frame.is_pinned() {
                continue;
            }
            if frame.ref_bit {
                frame.ref_bit = false;
                continue;
            }

            // Victim found. Write back this one page only; flushing the
            // rest of its file is a separate, explicitly-invoked operation.
            let file = match frame.file.as_ref() {
                Some(f) => Rc::clone(f),
                None => {
                    return Err(Error::BadBuffer {
                        frame_id,
                        valid: frame.valid,
                        dirty: frame.dirty,
                        ref_bit: frame.ref_bit,
                    })
                }
            };

            if frame.dirty {
                file.borrow_mut()
                    .write_page(frame.page_id, &frame.page.borrow())?;
                stats.pages_written += 1;
            }

            let file_id = file.borrow().id();
            log::debug!("evicting {} of {} from {}", frame.page_id, file_id, frame_id);

            table.remove(file_id, frame.page_id);
            frame.clear();
            stats.evictions += 1;

            return Ok(frame_id);
        }

        log::debug!("no evictable frame among {}", self.num_frames);
        Err(Error::BufferExceeded {
            pool_size: self.num_frames,
        })
    }
}
