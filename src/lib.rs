//! Contiguous allocation on a simulated fixed-size block device.
//!
//! [`disk::BlockStore`] tracks which blocks are used, [`fs::allocator`]
//! places files first-fit in one unbroken run, and [`fs::fragmentation`]
//! scores how scattered the remaining free space is.

pub mod disk;
pub mod fs;
pub mod shell;
