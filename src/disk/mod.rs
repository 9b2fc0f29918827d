pub mod block_store;
pub mod types;

pub use block_store::BlockStore;
pub use types::*;
