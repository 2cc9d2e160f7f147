//! Randomized invariant tests.
//!
//! Drives the buffer manager with arbitrary operation sequences and
//! checks the standing invariants after every step. Individual
//! operations are allowed to fail (pool exhausted, page disposed,
//! over-unpin); the invariants must hold regardless.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use proptest::prelude::*;

use pagepool::storage::{FileRef, MemFile, PagedFile};
use pagepool::{BufferManager, PageId};

const PAGES: u32 = 6;
const POOL: usize = 3;

#[derive(Debug, Clone)]
enum Op {
    Fetch(u32),
    Unpin(u32, bool),
    Dispose(u32),
    Flush,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..PAGES).prop_map(Op::Fetch),
        (0..PAGES, any::<bool>()).prop_map(|(p, d)| Op::Unpin(p, d)),
        (0..PAGES).prop_map(Op::Dispose),
        Just(Op::Flush),
    ]
}

proptest! {
    #[test]
    fn invariants_hold_under_any_op_sequence(
        ops in prop::collection::vec(op_strategy(), 1..64)
    ) {
        let file: FileRef<MemFile> = Rc::new(RefCell::new(MemFile::new("prop")));
        for _ in 0..PAGES {
            file.borrow_mut().allocate_page().unwrap();
        }
        let mut pool = BufferManager::new(POOL);

        for op in &ops {
            let _ = match op {
                Op::Fetch(p) => pool.fetch_page(&file, PageId::new(*p)).map(drop),
                Op::Unpin(p, d) => pool.unpin_page(&file, PageId::new(*p), *d),
                Op::Dispose(p) => pool.dispose_page(&file, PageId::new(*p)),
                Op::Flush => pool.flush_file(&file),
            };

            let snaps = pool.frames();
            let mut resident_keys = HashSet::new();
            let mut valid_count = 0;

            for snap in &snaps {
                if snap.valid {
                    valid_count += 1;
                    // Bijection: a (file, page) pair occupies at most one frame.
                    prop_assert!(
                        resident_keys.insert((snap.file_id, snap.page_id)),
                        "page resident in two frames"
                    );
                    prop_assert!(snap.page_id.is_some());
                } else {
                    // Invalid frames hold no pins, no dirt, no identity.
                    prop_assert_eq!(snap.pin_count, 0);
                    prop_assert!(!snap.dirty);
                    prop_assert!(snap.page_id.is_none());
                    prop_assert!(snap.file_id.is_none());
                }
            }

            // Page table and valid frames stay in bijection.
            prop_assert_eq!(valid_count, pool.resident_pages());
        }
    }
}
