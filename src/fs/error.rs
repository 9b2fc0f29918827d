use thiserror::Error;

use crate::fs::file::FileId;

/// File system error type
#[derive(Error, Debug)]
pub enum FsError {
    #[error("Not enough contiguous space for {size_bytes} bytes ({blocks} blocks)")]
    AllocationFailed { size_bytes: u64, blocks: usize },

    #[error("Invalid start block {target}: {blocks} blocks do not fit on a {total}-block disk")]
    RelocationFailed {
        target: usize,
        blocks: usize,
        total: usize,
    },

    #[error("Cannot move to start block {target}: block {block} belongs to another file")]
    RelocationOverlap { target: usize, block: usize },

    #[error("Block range {start}+{count} is outside the {total}-block disk")]
    OutOfRange {
        start: usize,
        count: usize,
        total: usize,
    },

    #[error("No such file: {0}")]
    FileNotFound(FileId),

    #[error("File system corrupted: {0}")]
    Corrupted(String),

    #[error("Invalid disk configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, FsError>;
