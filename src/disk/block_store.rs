use crate::disk::types::BlockId;
use crate::fs::error::{FsError, Result};

/// Used/free state of every block on the device.
///
/// One bit per block, `1` = used. The block count is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockStore {
    bits: Vec<u8>,       // bitmap, bit `i % 8` of byte `i / 8` is block `i`
    total_blocks: usize, // number of addressable blocks
    free_blocks: usize,  // cached count of zero bits
}

impl BlockStore {
    /// Creates a device with `total_blocks` blocks, all free.
    pub fn new(total_blocks: usize) -> Self {
        let byte_len = total_blocks.div_ceil(8);

        Self {
            bits: vec![0; byte_len],
            total_blocks,
            free_blocks: total_blocks,
        }
    }

    pub fn total_blocks(&self) -> usize {
        self.total_blocks
    }

    pub fn free_blocks(&self) -> usize {
        self.free_blocks
    }

    pub fn used_blocks(&self) -> usize {
        self.total_blocks - self.free_blocks
    }

    /// Returns `false` for indices past the end of the device.
    pub fn is_used(&self, block: BlockId) -> bool {
        if block >= self.total_blocks {
            return false;
        }
        let byte_index = block / 8;
        let bit_index = block % 8;
        self.bits[byte_index] & (1 << bit_index) != 0
    }

    /// True iff every block in `[start, start + count)` exists and is free.
    ///
    /// A range running past the end of the device is simply not free.
    pub fn is_range_free(&self, start: BlockId, count: usize) -> bool {
        if count == 0 {
            return false;
        }
        match start.checked_add(count) {
            Some(end) if end <= self.total_blocks => (start..end).all(|b| !self.is_used(b)),
            _ => false,
        }
    }

    /// Sets every block in `[start, start + count)` to `used`.
    ///
    /// Nothing is touched if the range leaves the device.
    pub fn mark_range(&mut self, start: BlockId, count: usize, used: bool) -> Result<()> {
        let end = start
            .checked_add(count)
            .filter(|&end| end <= self.total_blocks)
            .ok_or(FsError::OutOfRange {
                start,
                count,
                total: self.total_blocks,
            })?;

        for block in start..end {
            let byte = &mut self.bits[block / 8];
            let mask = 1u8 << (block % 8);
            let was_used = *byte & mask != 0;
            match (was_used, used) {
                (false, true) => {
                    *byte |= mask;
                    self.free_blocks -= 1;
                }
                (true, false) => {
                    *byte &= !mask;
                    self.free_blocks += 1;
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Used flags in block order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.total_blocks).map(move |b| self.is_used(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_store_is_all_free() {
        let store = BlockStore::new(10);
        assert_eq!(store.total_blocks(), 10);
        assert_eq!(store.free_blocks(), 10);
        assert!(store.iter().all(|used| !used));
        assert!(store.is_range_free(0, 10));
    }

    #[test]
    fn mark_range_flips_flags_and_counts() {
        let mut store = BlockStore::new(12);
        store.mark_range(3, 6, true).unwrap();
        assert_eq!(store.free_blocks(), 6);
        assert!(!store.is_used(2));
        assert!(store.is_used(3));
        assert!(store.is_used(8));
        assert!(!store.is_used(9));

        // Re-marking already used blocks must not skew the free count.
        store.mark_range(2, 3, true).unwrap();
        assert_eq!(store.free_blocks(), 5);

        store.mark_range(0, 12, false).unwrap();
        assert_eq!(store.free_blocks(), 12);
    }

    #[test]
    fn range_past_end_is_not_free() {
        let store = BlockStore::new(10);
        assert!(store.is_range_free(7, 3));
        assert!(!store.is_range_free(8, 3));
        assert!(!store.is_range_free(usize::MAX, 2));
        assert!(!store.is_range_free(0, 0));
    }

    #[test]
    fn range_with_one_used_block_is_not_free() {
        let mut store = BlockStore::new(10);
        store.mark_range(5, 1, true).unwrap();
        assert!(!store.is_range_free(3, 3));
        assert!(store.is_range_free(6, 4));
    }

    #[test]
    fn mark_range_out_of_bounds_fails_without_mutation() {
        let mut store = BlockStore::new(10);
        let err = store.mark_range(8, 3, true).unwrap_err();
        assert!(matches!(
            err,
            FsError::OutOfRange {
                start: 8,
                count: 3,
                total: 10
            }
        ));
        assert_eq!(store.free_blocks(), 10);
        assert!(!store.is_used(8));
    }

    #[test]
    fn non_multiple_of_eight_sizes() {
        let mut store = BlockStore::new(13);
        store.mark_range(0, 13, true).unwrap();
        assert_eq!(store.free_blocks(), 0);
        assert!(!store.is_used(13));
    }
}
