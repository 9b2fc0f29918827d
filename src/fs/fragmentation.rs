//! Free-space fragmentation metrics.
//!
//! The score is the average length of a free run: total free blocks divided
//! by the number of maximal free runs. One big hole scores high, many small
//! holes score low, and a disk with no free block scores `0`.

use crate::disk::{types::BlockId, BlockStore};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentationReport {
    pub free_blocks: usize,
    pub fragments: usize,
    pub largest_free_run: usize,
    pub score: f64,
}

/// Maximal free runs as `(start, len)`, in block order.
pub fn free_runs(store: &BlockStore) -> Vec<(BlockId, usize)> {
    let mut runs = Vec::new();
    let mut current: Option<(BlockId, usize)> = None;

    for (block, used) in store.iter().enumerate() {
        if used {
            runs.extend(current.take());
        } else if let Some((_, len)) = current.as_mut() {
            *len += 1;
        } else {
            current = Some((block, 1));
        }
    }
    runs.extend(current);
    runs
}

pub fn fragmentation_report(store: &BlockStore) -> FragmentationReport {
    let runs = free_runs(store);
    let free_blocks: usize = runs.iter().map(|(_, len)| len).sum();
    let fragments = runs.len();
    let largest_free_run = runs.iter().map(|(_, len)| *len).max().unwrap_or(0);

    let score = if fragments == 0 {
        0.0
    } else {
        free_blocks as f64 / fragments as f64
    };

    FragmentationReport {
        free_blocks,
        fragments,
        largest_free_run,
        score,
    }
}

pub fn fragmentation_score(store: &BlockStore) -> f64 {
    fragmentation_report(store).score
}
