//! Chunk-addressed storage on the local filesystem.
//!
//! Layout under the store root:
//!
//! | Path | Contents |
//! |------|----------|
//! | `chunks/chunk_{x}_{z}.raw` | block ids, 1 byte per voxel |
//! | `chunks/chunk_{x}_{z}_color.raw` | RGB, 3 bytes per voxel |
//! | `traces/{run_id}.trace.json` | generation trace |
//!
//! `{x}` and `{z}` are the chunk's plane origin in world cells. Files carry
//! no header; their dimensions come from the generation run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::file_buffer::FileBuffer;
use crate::volume::{ChunkDims, ChunkOrigin, ColorChunk, VoxelChunk};

const CHUNK_DIR: &str = "chunks";
const TRACE_DIR: &str = "traces";

/// Files written for one chunk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkPaths {
    /// Block volume file.
    pub blocks: PathBuf,
    /// Color volume file.
    pub colors: PathBuf,
}

/// Reads and writes chunk files below a root directory.
#[derive(Clone, Debug)]
pub struct ChunkStore {
    root: PathBuf,
}

impl ChunkStore {
    /// Open a store rooted at `root`, creating `chunks/` and `traces/`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let store = Self { root: root.into() };
        for dir in [store.chunk_dir(), store.trace_dir()] {
            std::fs::create_dir_all(&dir).map_err(|e| StorageError::io(&dir, e))?;
        }
        Ok(store)
    }

    /// Store root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding chunk volumes.
    pub fn chunk_dir(&self) -> PathBuf {
        self.root.join(CHUNK_DIR)
    }

    /// Directory holding trace files.
    pub fn trace_dir(&self) -> PathBuf {
        self.root.join(TRACE_DIR)
    }

    /// Block volume path for a chunk origin.
    pub fn block_path(&self, origin: ChunkOrigin) -> PathBuf {
        self.chunk_dir()
            .join(format!("chunk_{}_{}.raw", origin.x, origin.z))
    }

    /// Color volume path for a chunk origin.
    pub fn color_path(&self, origin: ChunkOrigin) -> PathBuf {
        self.chunk_dir()
            .join(format!("chunk_{}_{}_color.raw", origin.x, origin.z))
    }

    /// Trace file path for a run.
    pub fn trace_path(&self, run_id: &str) -> PathBuf {
        self.trace_dir().join(format!("{run_id}.trace.json"))
    }

    /// Persist a chunk and its colors. Each file has exactly one writer.
    pub fn write_chunk(
        &self,
        blocks: &VoxelChunk,
        colors: &ColorChunk,
    ) -> Result<ChunkPaths, StorageError> {
        debug_assert_eq!(blocks.origin(), colors.origin());
        debug_assert_eq!(blocks.dims(), colors.dims());

        let paths = ChunkPaths {
            blocks: self.block_path(blocks.origin()),
            colors: self.color_path(colors.origin()),
        };
        FileBuffer::write_bytes(&paths.blocks, blocks.as_bytes())?;
        FileBuffer::write_bytes(&paths.colors, colors.as_bytes())?;
        tracing::trace!(
            "wrote chunk ({}, {}) {}x{}x{}",
            blocks.origin().x,
            blocks.origin().z,
            blocks.dims().x_len,
            blocks.dims().height,
            blocks.dims().z_len
        );
        Ok(paths)
    }

    /// Load a block volume written by [`write_chunk`](Self::write_chunk).
    pub fn read_chunk(
        &self,
        origin: ChunkOrigin,
        dims: ChunkDims,
    ) -> Result<VoxelChunk, StorageError> {
        let path = self.block_path(origin);
        let bytes = std::fs::read(&path).map_err(|e| StorageError::io(&path, e))?;
        let actual = bytes.len();
        VoxelChunk::from_raw(origin, dims, bytes).ok_or(StorageError::SizeMismatch {
            path,
            expected: dims.volume(),
            actual,
        })
    }

    /// Load a color volume written by [`write_chunk`](Self::write_chunk).
    pub fn read_colors(
        &self,
        origin: ChunkOrigin,
        dims: ChunkDims,
    ) -> Result<ColorChunk, StorageError> {
        let path = self.color_path(origin);
        let bytes = std::fs::read(&path).map_err(|e| StorageError::io(&path, e))?;
        let actual = bytes.len();
        ColorChunk::from_raw(origin, dims, bytes).ok_or(StorageError::SizeMismatch {
            path,
            expected: dims.volume() * 3,
            actual,
        })
    }
}
