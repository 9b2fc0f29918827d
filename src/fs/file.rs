use std::fmt;
use std::ops::Range;

use crate::disk::types::BlockId;

/// Stable handle of a live file. Never reused within one disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(pub u64);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A file occupying one contiguous run of blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub id: FileId,
    pub name: String,
    pub size_bytes: u64,
    pub start_block: BlockId,
    pub block_count: usize, // fixed at allocation time, never recomputed
}

impl File {
    /// Blocks owned by this file.
    pub fn blocks(&self) -> Range<BlockId> {
        self.start_block..self.start_block + self.block_count
    }
}
