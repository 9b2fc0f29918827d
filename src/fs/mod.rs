use std::{collections::BTreeMap, num::NonZeroU64};

use tracing::info;

use crate::{
    disk::{types::BlockId, BlockStore},
    fs::{
        allocator::Allocator,
        config::DiskConfig,
        error::{FsError, Result},
        file::{File, FileId},
        fragmentation::FragmentationReport,
        render::BlockMap,
    },
};

pub mod allocator;
pub mod config;
pub mod error;
pub mod file;
pub mod fragmentation;
pub mod render;

/// A state change requested by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateFile { name: String, size_bytes: u64 },
    DeleteFile(FileId),
    RenameFile(FileId, String),
    MoveFile(FileId, BlockId),
}

/// What a successful [`Command`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created(File),
    Deleted(File),
    Renamed { id: FileId, old: String, new: String },
    Moved { id: FileId, from: BlockId, to: BlockId },
}

#[derive(Debug, Clone)]
pub struct FileSystem {
    config: DiskConfig,            // geometry, fixed for the disk's lifetime
    store: BlockStore,             // used/free bitmap
    allocator: Allocator,          // first-fit placement
    files: BTreeMap<FileId, File>, // live files
    next_id: u64,                  // ids are never reused
}

impl FileSystem {
    pub fn new(config: DiskConfig) -> Result<Self> {
        config.validate()?;
        let block_size = NonZeroU64::new(config.block_size)
            .ok_or_else(|| FsError::InvalidConfig("block_size must be positive".into()))?;
        info!(
            disk_size = config.disk_size,
            block_size = config.block_size,
            total_blocks = config.total_blocks(),
            "disk initialized"
        );

        Ok(Self {
            store: BlockStore::new(config.total_blocks()),
            allocator: Allocator::new(block_size),
            files: BTreeMap::new(),
            next_id: 1,
            config,
        })
    }

    pub fn config(&self) -> &DiskConfig {
        &self.config
    }

    pub fn store(&self) -> &BlockStore {
        &self.store
    }

    pub fn file(&self, id: FileId) -> Option<&File> {
        self.files.get(&id)
    }

    /// Live files ordered by id.
    pub fn files(&self) -> impl Iterator<Item = &File> {
        self.files.values()
    }

    pub fn create_file(&mut self, name: impl Into<String>, size_bytes: u64) -> Result<File> {
        let name = name.into();
        let start_block = self.allocator.allocate_contiguous(&mut self.store, size_bytes)?;

        let file = File {
            id: FileId(self.next_id),
            name,
            size_bytes,
            start_block,
            block_count: self.allocator.blocks_needed(size_bytes),
        };
        self.next_id += 1;
        self.files.insert(file.id, file.clone());

        info!(id = %file.id, file = %file.name, start = start_block, "file created");
        Ok(file)
    }

    pub fn delete_file(&mut self, id: FileId) -> Result<File> {
        let file = self.files.get(&id).ok_or(FsError::FileNotFound(id))?;
        self.allocator.release(&mut self.store, file)?;

        let file = self.files.remove(&id).ok_or(FsError::FileNotFound(id))?;
        info!(id = %id, file = %file.name, "file deleted");
        Ok(file)
    }

    /// Returns the previous name.
    pub fn rename_file(&mut self, id: FileId, new_name: impl Into<String>) -> Result<String> {
        let file = self.files.get_mut(&id).ok_or(FsError::FileNotFound(id))?;
        let old = std::mem::replace(&mut file.name, new_name.into());
        info!(id = %id, old = %old, new = %file.name, "file renamed");
        Ok(old)
    }

    /// Returns the previous start block.
    pub fn move_file(&mut self, id: FileId, target: BlockId) -> Result<BlockId> {
        let file = self.files.get_mut(&id).ok_or(FsError::FileNotFound(id))?;
        let from = file.start_block;
        self.allocator.relocate(&mut self.store, file, target)?;
        info!(id = %id, from, to = target, "file moved");
        Ok(from)
    }

    /// Applies `command` in place. On error nothing has changed.
    pub fn execute(&mut self, command: Command) -> Result<Outcome> {
        match command {
            Command::CreateFile { name, size_bytes } => {
                self.create_file(name, size_bytes).map(Outcome::Created)
            }
            Command::DeleteFile(id) => self.delete_file(id).map(Outcome::Deleted),
            Command::RenameFile(id, new) => {
                let old = self.rename_file(id, new.clone())?;
                Ok(Outcome::Renamed { id, old, new })
            }
            Command::MoveFile(id, to) => {
                let from = self.move_file(id, to)?;
                Ok(Outcome::Moved { id, from, to })
            }
        }
    }

    /// Drops every file and frees the whole device. Geometry is kept.
    pub fn format(&mut self) {
        self.store = BlockStore::new(self.config.total_blocks());
        self.files.clear();
        info!("disk formatted");
    }

    pub fn render(&self) -> BlockMap {
        render::render(&self.store, self.config.row_width)
    }

    pub fn fragmentation_score(&self) -> f64 {
        fragmentation::fragmentation_score(&self.store)
    }

    pub fn fragmentation_report(&self) -> FragmentationReport {
        fragmentation::fragmentation_report(&self.store)
    }

    /// Checks that the used blocks are exactly the union of the live files'
    /// ranges and that no two files share a block.
    pub fn check_consistency(&self) -> Result<()> {
        let total = self.store.total_blocks();
        let mut owner: Vec<Option<FileId>> = vec![None; total];

        for file in self.files.values() {
            if file.start_block + file.block_count > total {
                return Err(FsError::Corrupted(format!(
                    "file {} runs past the end of the disk",
                    file.id
                )));
            }
            for block in file.blocks() {
                if let Some(other) = owner[block] {
                    return Err(FsError::Corrupted(format!(
                        "block {} owned by both {} and {}",
                        block, other, file.id
                    )));
                }
                owner[block] = Some(file.id);
            }
        }

        for (block, used) in self.store.iter().enumerate() {
            match (used, owner[block]) {
                (true, None) => {
                    return Err(FsError::Corrupted(format!(
                        "block {} is used but owned by no file",
                        block
                    )))
                }
                (false, Some(id)) => {
                    return Err(FsError::Corrupted(format!(
                        "block {} of file {} is marked free",
                        block, id
                    )))
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Pure form of [`FileSystem::execute`]: returns the next state and leaves
/// `fs` untouched.
pub fn apply(fs: &FileSystem, command: Command) -> Result<FileSystem> {
    let mut next = fs.clone();
    next.execute(command)?;
    Ok(next)
}
