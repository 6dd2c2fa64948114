//! Deterministic voxel terrain generation: seeded value noise, biome bands,
//! per-biome height fields, chunked voxelization, and the run orchestrator.

mod grid;

pub mod backend;
pub mod biome;
pub mod error;
pub mod generator;
pub mod heightmap;
pub mod noise;
pub mod registry;
pub mod seed;
pub mod trace;
pub mod voxelizer;

pub use backend::{BackendError, BackendPair, NoiseBackend, ParallelBackend, SequentialBackend};
pub use biome::BiomeMask;
pub use error::{GenerateError, PostProcessError, RegistryError, TraceError, VoxelizeError};
pub use generator::{BUILD_CHUNKS, Generator, UNKNOWN_CALL, is_valid_run_id};
pub use grid::Grid2;
pub use heightmap::HeightField;
pub use noise::{Fbm, ValueNoise, normalize_min_max};
pub use registry::{PostProcessFn, PostProcessRegistry, PostProcessStep};
pub use seed::{derive_run_id, seed_hash};
pub use trace::{CallTrace, TraceEntry};
pub use voxelizer::{ChunkExtent, ChunkRecord, ChunkSet, DEFAULT_CHUNK_SIZE, Voxelizer, plan_chunks};
