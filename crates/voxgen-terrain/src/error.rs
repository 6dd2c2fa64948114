//! Error types for terrain generation.

use std::path::PathBuf;

use voxgen_config::PresetError;
use voxgen_voxel::StorageError;

use crate::backend::BackendError;

/// Errors raised while materializing chunks.
#[derive(Debug, thiserror::Error)]
pub enum VoxelizeError {
    /// A chunk file could not be written.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A chunk worker thread could not be started.
    #[error("failed to spawn chunk worker: {0}")]
    Spawn(#[source] std::io::Error),

    /// A chunk worker thread panicked.
    #[error("chunk worker panicked")]
    WorkerPanicked,

    /// A biome index has no one-byte solid block id.
    #[error("biome index {0} has no solid block id")]
    BiomeIndexOverflow(usize),
}

/// Errors raised while saving or loading a call trace.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// Reading or writing the trace file failed.
    #[error("trace I/O error at {path}: {source}")]
    Io {
        /// Trace file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The trace could not be encoded or decoded.
    #[error("trace JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while populating the post-process registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A post-process step with this name already exists.
    #[error("post-process step `{0}` is already registered")]
    Duplicate(String),

    /// Post-process step names must be non-empty.
    #[error("post-process step name must not be empty")]
    EmptyName,
}

/// Failure reported by a post-process callback.
#[derive(Debug, thiserror::Error)]
pub enum PostProcessError {
    /// The call's arguments do not fit the step.
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    /// Reading or rewriting chunk data failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Any other step-specific failure.
    #[error("{0}")]
    Failed(String),
}

/// Errors returned by [`Generator::generate`](crate::Generator::generate).
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The preset failed validation.
    #[error("invalid preset: {0}")]
    Preset(#[from] PresetError),

    /// The run id cannot be used as a file name.
    #[error("invalid run id `{0}`: must be a non-empty file name")]
    InvalidRunId(String),

    /// The configured chunk edge is zero.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,

    /// Opening the output directory failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Both height-noise backends failed.
    #[error("height noise failed: {0}")]
    Backend(#[from] BackendError),

    /// Chunk materialization failed.
    #[error("voxelization failed: {0}")]
    Voxelize(#[from] VoxelizeError),

    /// A preset call names no registered step and the policy forbids that.
    #[error("preset call #{index} names unknown step `{name}`")]
    UnknownCall {
        /// Position of the call in the preset.
        index: usize,
        /// Step name.
        name: String,
    },

    /// A registered step reported an error.
    #[error("post-process step `{name}` failed: {source}")]
    PostProcess {
        /// Step name.
        name: String,
        /// Callback error.
        #[source]
        source: PostProcessError,
    },

    /// The trace could not be written.
    #[error(transparent)]
    Trace(#[from] TraceError),
}
