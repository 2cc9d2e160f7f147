//! Buffer pool statistics tracking.

use std::fmt;

/// Counters tracked by the buffer pool.
///
/// The pool is single-threaded, so these are plain integers updated in
/// place; copy the struct out for display or comparison.
///
/// # Example
/// ```
/// use pagepool::BufferStats;
///
/// let stats = BufferStats::new();
/// assert_eq!(stats.hit_rate(), 0.0);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BufferStats {
    /// Number of times a page was found resident.
    pub cache_hits: u64,

    /// Number of times a page had to be read from its file.
    pub cache_misses: u64,

    /// Number of pages evicted from the pool.
    pub evictions: u64,

    /// Number of pages read from files.
    pub pages_read: u64,

    /// Number of pages written back to files.
    pub pages_written: u64,
}

impl BufferStats {
    /// Create a stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculate cache hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

impl fmt::Display for BufferStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ hits: {}, misses: {}, evictions: {}, hit_rate: {:.2}% }}",
            self.cache_hits,
            self.cache_misses,
            self.evictions,
            self.hit_rate() * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = BufferStats::new();
        assert_eq!(stats.cache_hits, 0);
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate() {
        let stats = BufferStats {
            cache_hits: 7,
            cache_misses: 3,
            ..Default::default()
        };
        assert_eq!(stats.hit_rate(), 0.7);
    }

    #[test]
    fn test_stats_display() {
        let stats = BufferStats {
            cache_hits: 80,
            cache_misses: 20,
            evictions: 5,
            ..Default::default()
        };
        let display = format!("{}", stats);

        assert!(display.contains("hits: 80"));
        assert!(display.contains("misses: 20"));
        assert!(display.contains("80.00%"));
    }
}
