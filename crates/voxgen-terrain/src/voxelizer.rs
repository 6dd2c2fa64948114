//! Chunked voxelization of a height field.
//!
//! The world plane is tiled into square chunks of `chunk_size` columns (edge
//! chunks are clipped). Every chunk spans the same vertical extent,
//! `max_height = max(height) + 1`. Within a column at height `h`:
//!
//! - `y < h` is solid, block id `1 + biome_index`
//! - `h <= y < sea_level` is water
//! - everything else is air
//!
//! Colors follow the same column: the biome color everywhere, except water
//! voxels, which get [`WATER_COLOR`].
//!
//! Chunks are independent, so they are built and written by a pool of worker
//! threads fed through a channel. Each chunk file has exactly one writer.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::unbounded;
use serde::{Deserialize, Serialize};
use voxgen_config::Preset;
use voxgen_voxel::{
    BlockId, ChunkDims, ChunkOrigin, ChunkPaths, ChunkStore, ColorChunk, Rgb, StorageError,
    VoxelChunk, WATER_COLOR,
};

use crate::biome::BiomeMask;
use crate::error::VoxelizeError;
use crate::heightmap::HeightField;

/// Default chunk edge length, in columns.
pub const DEFAULT_CHUNK_SIZE: usize = 128;

/// Plane footprint of one chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkExtent {
    /// First world column.
    pub origin: ChunkOrigin,
    /// Columns along x.
    pub x_len: usize,
    /// Columns along z.
    pub z_len: usize,
}

/// Tile a `world_size × world_size` plane into chunks, row-major over
/// `(cx, cz)`. A `chunk_size` of zero is treated as one.
pub fn plan_chunks(world_size: usize, chunk_size: usize) -> Vec<ChunkExtent> {
    let step = chunk_size.max(1);
    let mut plan = Vec::with_capacity(world_size.div_ceil(step).pow(2));
    for cx in (0..world_size).step_by(step) {
        for cz in (0..world_size).step_by(step) {
            plan.push(ChunkExtent {
                origin: ChunkOrigin::new(cx as u32, cz as u32),
                x_len: step.min(world_size - cx),
                z_len: step.min(world_size - cz),
            });
        }
    }
    plan
}

/// One chunk written to disk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Plane origin.
    pub origin: ChunkOrigin,
    /// Volume extent.
    pub dims: ChunkDims,
    /// Block and color files.
    pub paths: ChunkPaths,
}

/// Every chunk of a run, sorted by origin.
#[derive(Clone, Debug)]
pub struct ChunkSet {
    store: ChunkStore,
    records: Vec<ChunkRecord>,
    max_height: usize,
    chunk_size: usize,
}

impl ChunkSet {
    /// Chunk records in origin order.
    pub fn records(&self) -> &[ChunkRecord] {
        &self.records
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` for an empty world.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Shared vertical extent of every chunk.
    pub fn max_height(&self) -> usize {
        self.max_height
    }

    /// Chunk edge used to tile the plane.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Store the chunks were written to.
    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    /// Record for the chunk starting at `origin`.
    pub fn get(&self, origin: ChunkOrigin) -> Option<&ChunkRecord> {
        self.records
            .binary_search_by_key(&origin, |r| r.origin)
            .ok()
            .map(|i| &self.records[i])
    }

    /// Block file of every chunk, in origin order.
    pub fn block_paths(&self) -> Vec<PathBuf> {
        self.records.iter().map(|r| r.paths.blocks.clone()).collect()
    }

    /// Color file of every chunk, in origin order.
    pub fn color_paths(&self) -> Vec<PathBuf> {
        self.records.iter().map(|r| r.paths.colors.clone()).collect()
    }

    /// Load the block volume of `record` back from disk.
    pub fn load_blocks(&self, record: &ChunkRecord) -> Result<VoxelChunk, StorageError> {
        self.store.read_chunk(record.origin, record.dims)
    }

    /// Load the color volume of `record` back from disk.
    pub fn load_colors(&self, record: &ChunkRecord) -> Result<ColorChunk, StorageError> {
        self.store.read_colors(record.origin, record.dims)
    }
}

/// Turns a biome mask and height field into chunk volumes.
pub struct Voxelizer<'a> {
    mask: &'a BiomeMask,
    heights: &'a HeightField,
    palette: Vec<(BlockId, Rgb)>,
    sea_level: usize,
    max_height: usize,
}

impl<'a> Voxelizer<'a> {
    /// Prepare a voxelizer over borrowed, read-only grids.
    pub fn new(
        preset: &Preset,
        mask: &'a BiomeMask,
        heights: &'a HeightField,
    ) -> Result<Self, VoxelizeError> {
        let palette = preset
            .biomes
            .iter()
            .enumerate()
            .map(|(index, biome)| {
                BlockId::solid(index)
                    .map(|id| (id, biome.color))
                    .ok_or(VoxelizeError::BiomeIndexOverflow(index))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            mask,
            heights,
            palette,
            sea_level: preset.sea_level as usize,
            max_height: heights.max_height(),
        })
    }

    /// Vertical extent of every chunk.
    pub fn max_height(&self) -> usize {
        self.max_height
    }

    /// Build the block and color volumes of one chunk in memory.
    pub fn build_chunk(&self, extent: ChunkExtent) -> (VoxelChunk, ColorChunk) {
        let origin = extent.origin;
        let dims = ChunkDims::new(extent.x_len, self.max_height, extent.z_len);
        let mut blocks = VoxelChunk::new_air(origin, dims);
        let mut colors = ColorChunk::new(origin, dims);

        for lx in 0..extent.x_len {
            for lz in 0..extent.z_len {
                let (x, z) = (origin.x as usize + lx, origin.z as usize + lz);
                let height = (self.heights.get(x, z) as usize).min(self.max_height);
                let (solid, color) = self.palette[self.mask.get(x, z)];

                blocks.fill_column(lx, lz, 0..height, solid);
                colors.fill_column(lx, lz, color);

                let water_top = self.sea_level.min(self.max_height);
                if height < water_top {
                    blocks.fill_column(lx, lz, height..water_top, BlockId::WATER);
                    for y in height..water_top {
                        colors.set(lx, y, lz, WATER_COLOR);
                    }
                }
            }
        }

        (blocks, colors)
    }

    /// Build and persist every chunk of the plane.
    ///
    /// `workers == 0` uses one worker per logical CPU. The first failure stops
    /// the remaining workers from taking new chunks and is returned.
    pub fn write_all(
        &self,
        store: &ChunkStore,
        chunk_size: usize,
        workers: usize,
    ) -> Result<ChunkSet, VoxelizeError> {
        let plan = plan_chunks(self.mask.size(), chunk_size);
        let workers = match workers {
            0 => num_cpus::get(),
            n => n,
        }
        .clamp(1, plan.len().max(1));

        tracing::info!(
            "voxelizing {} chunks (edge {chunk_size}, height {}) on {workers} workers",
            plan.len(),
            self.max_height
        );

        let (task_tx, task_rx) = unbounded::<ChunkExtent>();
        for extent in &plan {
            // The receiver is held right here, so the send cannot fail.
            let _ = task_tx.send(*extent);
        }
        drop(task_tx);

        let (result_tx, result_rx) = unbounded::<Result<ChunkRecord, StorageError>>();
        let abort = AtomicBool::new(false);

        let mut records = std::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(workers);
            for worker in 0..workers {
                let task_rx = task_rx.clone();
                let result_tx = result_tx.clone();
                let abort = &abort;
                let spawned = std::thread::Builder::new()
                    .name(format!("voxelize-{worker}"))
                    .spawn_scoped(scope, move || {
                        while let Ok(extent) = task_rx.recv() {
                            if abort.load(Ordering::Relaxed) {
                                break;
                            }
                            let result = self.write_chunk(store, extent);
                            if result.is_err() {
                                abort.store(true, Ordering::Relaxed);
                            }
                            if result_tx.send(result).is_err() {
                                break;
                            }
                        }
                    });
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        abort.store(true, Ordering::Relaxed);
                        return Err(VoxelizeError::Spawn(e));
                    }
                }
            }
            drop(result_tx);

            let mut records = Vec::with_capacity(plan.len());
            let mut first_error = None;
            for result in result_rx.iter() {
                match result {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        first_error.get_or_insert(e);
                    }
                }
            }
            for handle in handles {
                handle.join().map_err(|_| VoxelizeError::WorkerPanicked)?;
            }
            match first_error {
                Some(e) => Err(VoxelizeError::Storage(e)),
                None => Ok(records),
            }
        })?;

        records.sort_by_key(|r| r.origin);
        Ok(ChunkSet {
            store: store.clone(),
            records,
            max_height: self.max_height,
            chunk_size,
        })
    }

    fn write_chunk(
        &self,
        store: &ChunkStore,
        extent: ChunkExtent,
    ) -> Result<ChunkRecord, StorageError> {
        let (blocks, colors) = self.build_chunk(extent);
        let paths = store.write_chunk(&blocks, &colors)?;
        tracing::debug!(
            "chunk ({}, {}) written: {}x{}x{}",
            extent.origin.x,
            extent.origin.z,
            extent.x_len,
            self.max_height,
            extent.z_len
        );
        Ok(ChunkRecord {
            origin: extent.origin,
            dims: blocks.dims(),
            paths,
        })
    }
}
