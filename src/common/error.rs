//! Error types for pagepool.

use thiserror::Error;

use crate::common::{FrameId, PageId};

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
/// This is a common Rust pattern (see `std::io::Result`).
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in pagepool.
///
/// The first four variants cross the buffer-manager boundary; the last two
/// originate in the paged-file collaborator and propagate unchanged. There
/// is no retry anywhere in this crate — retry policy, if any, belongs to
/// the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Every valid frame in the pool is pinned, so no eviction victim
    /// exists. Returned by frame allocation and propagated by whichever
    /// operation triggered it; no state is mutated.
    #[error("buffer pool exhausted: all {pool_size} frames are pinned")]
    BufferExceeded { pool_size: usize },

    /// Attempted to unpin a resident page whose pin count is already zero.
    ///
    /// This indicates a bug in the caller - unpinning should match pinning.
    #[error("page {page_id} of file '{file}' is not pinned")]
    PageNotPinned { file: String, page_id: PageId },

    /// Attempted to dispose or flush a page that still has outstanding pins.
    #[error("page {page_id} of file '{file}' is still pinned")]
    PagePinned { file: String, page_id: PageId },

    /// A frame claims ownership of a file while marked not-valid.
    ///
    /// Internal bookkeeping invariant violation, detected during flush.
    /// Non-recoverable: do not retry against the same pool.
    #[error(
        "bad buffer: frame {frame_id} (valid={valid}, dirty={dirty}, ref_bit={ref_bit})"
    )]
    BadBuffer {
        frame_id: FrameId,
        valid: bool,
        dirty: bool,
        ref_bit: bool,
    },

    /// Requested page does not exist in the file.
    #[error("page {page_id} not found in file '{file}'")]
    PageNotFound { file: String, page_id: PageId },

    /// I/O error from disk operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
