//! File identifier type.

use std::fmt;

/// Stable identity of a paged file.
///
/// The buffer pool caches pages of many files in one pool, so the page
/// table is keyed on `(FileId, PageId)` rather than the page id alone.
/// Identity is assigned once when a file is opened and never reused for
/// the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u64);

impl FileId {
    /// Create a new FileId.
    #[inline]
    pub fn new(id: u64) -> Self {
        FileId(id)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "File({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_id_equality() {
        assert_eq!(FileId::new(7), FileId::new(7));
        assert_ne!(FileId::new(7), FileId::new(8));
    }

    #[test]
    fn test_file_id_display() {
        assert_eq!(format!("{}", FileId::new(3)), "File(3)");
    }
}
