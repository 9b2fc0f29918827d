use std::num::NonZeroU64;

use tracing::{debug, warn};

use crate::disk::{types::BlockId, BlockStore};
use crate::fs::error::{FsError, Result};
use crate::fs::file::File;

/// Number of blocks a file of `size_bytes` occupies.
///
/// Partial blocks round up, and an empty file still takes one block.
pub fn blocks_needed(size_bytes: u64, block_size: NonZeroU64) -> usize {
    size_bytes.div_ceil(block_size.get()).max(1) as usize
}

/// First-fit contiguous allocator over a [`BlockStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocator {
    block_size: NonZeroU64,
}

impl Allocator {
    pub fn new(block_size: NonZeroU64) -> Self {
        Self { block_size }
    }

    pub fn block_size(&self) -> u64 {
        self.block_size.get()
    }

    pub fn blocks_needed(&self, size_bytes: u64) -> usize {
        blocks_needed(size_bytes, self.block_size)
    }

    /// Reserves the lowest-addressed free run large enough for `size_bytes`
    /// and returns its first block. On failure the store is untouched.
    pub fn allocate_contiguous(&self, store: &mut BlockStore, size_bytes: u64) -> Result<BlockId> {
        let blocks = self.blocks_needed(size_bytes);
        let total = store.total_blocks();

        let start = if blocks > total {
            None
        } else {
            (0..=total - blocks).find(|&candidate| store.is_range_free(candidate, blocks))
        };

        let Some(start) = start else {
            warn!(size_bytes, blocks, "no contiguous free run large enough");
            return Err(FsError::AllocationFailed { size_bytes, blocks });
        };

        store.mark_range(start, blocks, true)?;
        debug!(start, blocks, "allocated contiguous run");
        Ok(start)
    }

    /// Frees exactly the range `file` was given at allocation time.
    pub fn release(&self, store: &mut BlockStore, file: &File) -> Result<()> {
        store.mark_range(file.start_block, file.block_count, false)?;
        debug!(start = file.start_block, blocks = file.block_count, "released run");
        Ok(())
    }

    /// Moves `file` so it starts at `target`.
    ///
    /// The target range must lie on the device and must not touch blocks
    /// owned by any other file; the file's own current blocks may be reused.
    /// Either check failing leaves the store and `file` unchanged.
    pub fn relocate(&self, store: &mut BlockStore, file: &mut File, target: BlockId) -> Result<()> {
        let blocks = file.block_count;
        let total = store.total_blocks();

        if target.checked_add(blocks).map_or(true, |end| end > total) {
            warn!(file = %file.name, to = target, blocks, "relocation target out of bounds");
            return Err(FsError::RelocationFailed {
                target,
                blocks,
                total,
            });
        }

        let own = file.blocks();
        if let Some(block) = (target..target + blocks).find(|b| store.is_used(*b) && !own.contains(b)) {
            warn!(file = %file.name, to = target, block, "relocation target overlaps another file");
            return Err(FsError::RelocationOverlap { target, block });
        }

        store.mark_range(file.start_block, blocks, false)?;
        store.mark_range(target, blocks, true)?;
        debug!(file = %file.name, from = file.start_block, to = target, blocks, "relocated file");
        file.start_block = target;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::file::FileId;

    fn block(size: u64) -> NonZeroU64 {
        NonZeroU64::new(size).unwrap()
    }

    fn placed(store: &mut BlockStore, alloc: &Allocator, size_bytes: u64) -> File {
        let start_block = alloc.allocate_contiguous(store, size_bytes).unwrap();
        File {
            id: FileId(0),
            name: "f".into(),
            size_bytes,
            start_block,
            block_count: alloc.blocks_needed(size_bytes),
        }
    }

    #[test]
    fn blocks_needed_rounds_up() {
        assert_eq!(blocks_needed(0, block(10)), 1);
        assert_eq!(blocks_needed(1, block(10)), 1);
        assert_eq!(blocks_needed(10, block(10)), 1);
        assert_eq!(blocks_needed(11, block(10)), 2);
        assert_eq!(blocks_needed(25, block(10)), 3);
        assert_eq!(blocks_needed(100, block(10)), 10);
        assert_eq!(blocks_needed(5, block(1)), 5);
    }

    #[test]
    fn first_fit_takes_lowest_free_run() {
        let alloc = Allocator::new(block(10));
        let mut store = BlockStore::new(10);

        assert_eq!(alloc.allocate_contiguous(&mut store, 25).unwrap(), 0);
        assert_eq!(alloc.allocate_contiguous(&mut store, 10).unwrap(), 3);
        assert_eq!(store.free_blocks(), 6);
    }

    #[test]
    fn first_fit_skips_too_small_hole() {
        let alloc = Allocator::new(block(10));
        let mut store = BlockStore::new(10);
        store.mark_range(2, 1, true).unwrap();

        // Hole [0, 2) is too small for three blocks.
        assert_eq!(alloc.allocate_contiguous(&mut store, 30).unwrap(), 3);
        // ...but fits two.
        assert_eq!(alloc.allocate_contiguous(&mut store, 20).unwrap(), 0);
    }

    #[test]
    fn allocation_can_fill_the_last_block() {
        let alloc = Allocator::new(block(10));
        let mut store = BlockStore::new(10);
        store.mark_range(0, 7, true).unwrap();
        assert_eq!(alloc.allocate_contiguous(&mut store, 30).unwrap(), 7);
        assert_eq!(store.free_blocks(), 0);
    }

    #[test]
    fn scattered_free_space_is_not_enough() {
        let alloc = Allocator::new(block(10));
        let mut store = BlockStore::new(10);
        for b in [0, 2, 4, 6, 8, 9] {
            store.mark_range(b, 1, true).unwrap();
        }
        // Blocks 1, 3, 5, 7 are free: four blocks, none adjacent.
        let before = store.clone();
        let err = alloc.allocate_contiguous(&mut store, 20).unwrap_err();
        assert!(matches!(err, FsError::AllocationFailed { blocks: 2, .. }));
        assert_eq!(store, before);
    }

    #[test]
    fn oversized_request_fails() {
        let alloc = Allocator::new(block(10));
        let mut store = BlockStore::new(10);
        let err = alloc.allocate_contiguous(&mut store, 101).unwrap_err();
        assert!(matches!(err, FsError::AllocationFailed { blocks: 11, .. }));
        assert_eq!(store.free_blocks(), 10);
    }

    #[test]
    fn release_then_reallocate_returns_same_start() {
        let alloc = Allocator::new(block(10));
        let mut store = BlockStore::new(10);
        let _a = placed(&mut store, &alloc, 20);
        let b = placed(&mut store, &alloc, 30);
        let _c = placed(&mut store, &alloc, 10);

        alloc.release(&mut store, &b).unwrap();
        assert_eq!(alloc.allocate_contiguous(&mut store, 30).unwrap(), b.start_block);
    }

    #[test]
    fn relocate_moves_range() {
        let alloc = Allocator::new(block(10));
        let mut store = BlockStore::new(10);
        let mut f = placed(&mut store, &alloc, 20);

        alloc.relocate(&mut store, &mut f, 6).unwrap();
        assert_eq!(f.start_block, 6);
        assert!(store.is_range_free(0, 6));
        assert!(store.is_used(6) && store.is_used(7));
        assert_eq!(store.free_blocks(), 8);
    }

    #[test]
    fn relocate_may_overlap_own_range() {
        let alloc = Allocator::new(block(10));
        let mut store = BlockStore::new(10);
        let mut f = placed(&mut store, &alloc, 30);

        alloc.relocate(&mut store, &mut f, 1).unwrap();
        assert!(!store.is_used(0));
        assert!((1..4).all(|b| store.is_used(b)));
        assert_eq!(store.free_blocks(), 7);
    }

    #[test]
    fn relocate_out_of_bounds_is_rejected() {
        let alloc = Allocator::new(block(10));
        let mut store = BlockStore::new(10);
        let mut f = placed(&mut store, &alloc, 30);
        let before = store.clone();

        let err = alloc.relocate(&mut store, &mut f, 8).unwrap_err();
        assert!(matches!(
            err,
            FsError::RelocationFailed {
                target: 8,
                blocks: 3,
                total: 10
            }
        ));
        assert_eq!(f.start_block, 0);
        assert_eq!(store, before);
    }

    #[test]
    fn relocate_onto_other_file_is_rejected() {
        let alloc = Allocator::new(block(10));
        let mut store = BlockStore::new(10);
        let mut a = placed(&mut store, &alloc, 20);
        let _b = placed(&mut store, &alloc, 20);
        let before = store.clone();

        let err = alloc.relocate(&mut store, &mut a, 3).unwrap_err();
        assert!(matches!(err, FsError::RelocationOverlap { target: 3, block: 3 }));
        assert_eq!(a.start_block, 0);
        assert_eq!(store, before);
    }
}
