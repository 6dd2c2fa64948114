//! Voxel chunk volumes, block ids, and chunk-addressed file storage.

pub mod block;
pub mod error;
pub mod file_buffer;
pub mod storage;
pub mod volume;

pub use block::{BlockId, Rgb, WATER_COLOR};
pub use error::StorageError;
pub use file_buffer::FileBuffer;
pub use storage::{ChunkPaths, ChunkStore};
pub use volume::{ChunkDims, ChunkOrigin, ColorChunk, VoxelChunk};
