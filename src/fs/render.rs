use std::fmt;

use crate::disk::BlockStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    Used,
    Free,
}

impl BlockState {
    pub fn marker(self) -> char {
        match self {
            Self::Used => 'X',
            Self::Free => '-',
        }
    }
}

/// Block states grouped into rows of `row_width`; the last row may be short.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockMap {
    pub rows: Vec<Vec<BlockState>>,
}

pub fn render(store: &BlockStore, row_width: usize) -> BlockMap {
    let states: Vec<BlockState> = store
        .iter()
        .map(|used| if used { BlockState::Used } else { BlockState::Free })
        .collect();

    BlockMap {
        rows: states
            .chunks(row_width.max(1))
            .map(<[BlockState]>::to_vec)
            .collect(),
    }
}

impl fmt::Display for BlockMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            let line: Vec<String> = row.iter().map(|s| s.marker().to_string()).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
