//! Dense chunk volumes: block ids and per-voxel colors.
//!
//! Both volumes are indexed `(x, y, z)` and laid out x-major, then y, then z:
//! `linear = (x * height + y) * z_len + z`. The color volume stores three
//! consecutive bytes per voxel at `3 * linear`. Raw chunk files use exactly
//! this layout.

use serde::{Deserialize, Serialize};

use crate::block::{BlockId, Rgb};

/// Plane origin of a chunk, in world cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkOrigin {
    /// First world column along x.
    pub x: u32,
    /// First world column along z.
    pub z: u32,
}

impl ChunkOrigin {
    /// Creates an origin at world cell `(x, z)`.
    pub fn new(x: u32, z: u32) -> Self {
        Self { x, z }
    }
}

/// Spatial extent of a chunk volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkDims {
    /// Columns along x.
    pub x_len: usize,
    /// Voxels per column. Shared by every chunk of a world.
    pub height: usize,
    /// Columns along z.
    pub z_len: usize,
}

impl ChunkDims {
    /// Creates a new extent.
    pub fn new(x_len: usize, height: usize, z_len: usize) -> Self {
        Self {
            x_len,
            height,
            z_len,
        }
    }

    /// Number of voxels in the volume.
    pub fn volume(&self) -> usize {
        self.x_len * self.height * self.z_len
    }

    /// Converts `(x, y, z)` to a linear index (z varies fastest).
    #[inline]
    pub fn linear_index(&self, x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < self.x_len && y < self.height && z < self.z_len);
        (x * self.height + y) * self.z_len + z
    }
}

/// Block-id volume for one chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelChunk {
    origin: ChunkOrigin,
    dims: ChunkDims,
    blocks: Vec<u8>,
}

impl VoxelChunk {
    /// Creates a chunk filled with air.
    pub fn new_air(origin: ChunkOrigin, dims: ChunkDims) -> Self {
        Self {
            origin,
            dims,
            blocks: vec![BlockId::AIR.0; dims.volume()],
        }
    }

    /// Wraps raw block bytes. Returns `None` if the length does not match `dims`.
    pub fn from_raw(origin: ChunkOrigin, dims: ChunkDims, blocks: Vec<u8>) -> Option<Self> {
        (blocks.len() == dims.volume()).then_some(Self {
            origin,
            dims,
            blocks,
        })
    }

    /// Returns the block at `(x, y, z)`.
    pub fn get(&self, x: usize, y: usize, z: usize) -> BlockId {
        BlockId(self.blocks[self.dims.linear_index(x, y, z)])
    }

    /// Sets the block at `(x, y, z)`.
    pub fn set(&mut self, x: usize, y: usize, z: usize, block: BlockId) {
        let index = self.dims.linear_index(x, y, z);
        self.blocks[index] = block.0;
    }

    /// Sets `y` in `ys` of column `(x, z)` to `block`.
    pub fn fill_column(&mut self, x: usize, z: usize, ys: std::ops::Range<usize>, block: BlockId) {
        for y in ys {
            self.set(x, y, z, block);
        }
    }

    /// Plane origin.
    pub fn origin(&self) -> ChunkOrigin {
        self.origin
    }

    /// Spatial extent.
    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    /// Raw bytes in file layout.
    pub fn as_bytes(&self) -> &[u8] {
        &self.blocks
    }
}

/// RGB volume paired with a [`VoxelChunk`] of equal extent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorChunk {
    origin: ChunkOrigin,
    dims: ChunkDims,
    rgb: Vec<u8>,
}

impl ColorChunk {
    /// Creates a black color volume.
    pub fn new(origin: ChunkOrigin, dims: ChunkDims) -> Self {
        Self {
            origin,
            dims,
            rgb: vec![0; dims.volume() * 3],
        }
    }

    /// Wraps raw RGB bytes. Returns `None` if the length does not match `dims`.
    pub fn from_raw(origin: ChunkOrigin, dims: ChunkDims, rgb: Vec<u8>) -> Option<Self> {
        (rgb.len() == dims.volume() * 3).then_some(Self { origin, dims, rgb })
    }

    /// Returns the color at `(x, y, z)`.
    pub fn get(&self, x: usize, y: usize, z: usize) -> Rgb {
        let i = self.dims.linear_index(x, y, z) * 3;
        [self.rgb[i], self.rgb[i + 1], self.rgb[i + 2]]
    }

    /// Sets the color at `(x, y, z)`.
    pub fn set(&mut self, x: usize, y: usize, z: usize, color: Rgb) {
        let i = self.dims.linear_index(x, y, z) * 3;
        self.rgb[i..i + 3].copy_from_slice(&color);
    }

    /// Paints every voxel of column `(x, z)` with `color`.
    pub fn fill_column(&mut self, x: usize, z: usize, color: Rgb) {
        let start = self.dims.linear_index(x, 0, z) * 3;
        let stride = self.dims.z_len * 3;
        for y in 0..self.dims.height {
            let i = start + y * stride;
            self.rgb[i..i + 3].copy_from_slice(&color);
        }
    }

    /// Plane origin.
    pub fn origin(&self) -> ChunkOrigin {
        self.origin
    }

    /// Spatial extent.
    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    /// Raw bytes in file layout.
    pub fn as_bytes(&self) -> &[u8] {
        &self.rgb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_index_is_x_major() {
        let dims = ChunkDims::new(3, 4, 5);
        assert_eq!(dims.linear_index(0, 0, 0), 0);
        assert_eq!(dims.linear_index(0, 0, 1), 1);
        assert_eq!(dims.linear_index(0, 1, 0), 5);
        assert_eq!(dims.linear_index(1, 0, 0), 20);
        assert_eq!(dims.linear_index(2, 3, 4), dims.volume() - 1);
    }

    #[test]
    fn test_new_chunk_is_air() {
        let chunk = VoxelChunk::new_air(ChunkOrigin::new(0, 0), ChunkDims::new(2, 3, 2));
        assert!(chunk.as_bytes().iter().all(|&b| b == 0));
        assert_eq!(chunk.as_bytes().len(), 12);
    }

    #[test]
    fn test_set_get_and_fill_column() {
        let mut chunk = VoxelChunk::new_air(ChunkOrigin::new(0, 0), ChunkDims::new(2, 4, 3));
        chunk.fill_column(1, 2, 0..3, BlockId(5));
        chunk.set(0, 3, 0, BlockId::WATER);
        assert_eq!(chunk.get(1, 0, 2), BlockId(5));
        assert_eq!(chunk.get(1, 2, 2), BlockId(5));
        assert_eq!(chunk.get(1, 3, 2), BlockId::AIR);
        assert_eq!(chunk.get(0, 3, 0), BlockId::WATER);
    }

    #[test]
    fn test_color_fill_column_touches_only_that_column() {
        let mut colors = ColorChunk::new(ChunkOrigin::new(0, 0), ChunkDims::new(2, 3, 2));
        colors.fill_column(1, 0, [1, 2, 3]);
        for y in 0..3 {
            assert_eq!(colors.get(1, y, 0), [1, 2, 3]);
            assert_eq!(colors.get(0, y, 0), [0, 0, 0]);
            assert_eq!(colors.get(1, y, 1), [0, 0, 0]);
        }
        colors.set(1, 2, 0, [9, 9, 9]);
        assert_eq!(colors.get(1, 2, 0), [9, 9, 9]);
    }

    #[test]
    fn test_from_raw_checks_length() {
        let dims = ChunkDims::new(1, 2, 1);
        let origin = ChunkOrigin::new(4, 8);
        assert!(VoxelChunk::from_raw(origin, dims, vec![0; 2]).is_some());
        assert!(VoxelChunk::from_raw(origin, dims, vec![0; 3]).is_none());
        assert!(ColorChunk::from_raw(origin, dims, vec![0; 6]).is_some());
        assert!(ColorChunk::from_raw(origin, dims, vec![0; 2]).is_none());
    }
}
