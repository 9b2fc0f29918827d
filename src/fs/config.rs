use std::path::Path;

use serde::Deserialize;

use crate::disk::types::{BLOCK_SIZE, DISK_SIZE, MAX_BLOCKS, ROW_WIDTH};
use crate::fs::error::{FsError, Result};

/// Geometry of the simulated device. Fixed once the disk is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiskConfig {
    pub disk_size: u64,   // device size in bytes
    pub block_size: u64,  // block size in bytes
    pub row_width: usize, // blocks per row of the block map
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self {
            disk_size: DISK_SIZE,
            block_size: BLOCK_SIZE,
            row_width: ROW_WIDTH,
        }
    }
}

impl DiskConfig {
    /// Trailing bytes that do not fill a whole block are unusable.
    pub fn total_blocks(&self) -> usize {
        (self.disk_size / self.block_size) as usize
    }

    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(FsError::InvalidConfig("block_size must be positive".into()));
        }
        if self.disk_size < self.block_size {
            return Err(FsError::InvalidConfig(format!(
                "disk_size {} is smaller than one block of {} bytes",
                self.disk_size, self.block_size
            )));
        }
        let blocks = self.disk_size / self.block_size;
        if blocks > MAX_BLOCKS || usize::try_from(blocks).is_err() {
            return Err(FsError::InvalidConfig(format!(
                "{} blocks exceeds the limit of {} blocks",
                blocks, MAX_BLOCKS
            )));
        }
        if self.row_width == 0 {
            return Err(FsError::InvalidConfig("row_width must be positive".into()));
        }
        Ok(())
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
