/// Default size of the simulated device in bytes.
pub const DISK_SIZE: u64 = 100;

/// Default size of one block in bytes.
/// Every file occupies a whole number of blocks.
pub const BLOCK_SIZE: u64 = 10;

/// Default number of blocks printed per row of the block map.
pub const ROW_WIDTH: usize = (DISK_SIZE / BLOCK_SIZE) as usize;

/// Largest device the simulator accepts, in blocks.
pub const MAX_BLOCKS: u64 = 1 << 24;

/// Index of a block on the device, in `[0, total_blocks)`.
pub type BlockId = usize;
