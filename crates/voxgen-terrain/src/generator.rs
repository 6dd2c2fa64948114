//! Orchestrates one generation run.
//!
//! A run validates its inputs, builds the biome mask and height field,
//! writes every chunk, applies the preset's post-process calls in order,
//! and finally writes the call trace. The trace is only written once every
//! earlier step has succeeded, so its presence marks a complete run.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde_json::{Map, Value, json};
use voxgen_config::{GeneratorConfig, Preset, UnknownCallPolicy};
use voxgen_voxel::ChunkStore;

use crate::backend::{BackendPair, ParallelBackend, SequentialBackend};
use crate::biome::BiomeMask;
use crate::error::GenerateError;
use crate::heightmap::HeightField;
use crate::registry::PostProcessRegistry;
use crate::trace::CallTrace;
use crate::voxelizer::{ChunkSet, Voxelizer};

/// Trace name of the chunk materialization step.
pub const BUILD_CHUNKS: &str = "build_chunks";
/// Trace name recorded for calls that match no registered step.
pub const UNKNOWN_CALL: &str = "unknown_call";

/// Runs presets against a fixed configuration and step registry.
pub struct Generator<'a> {
    output_dir: PathBuf,
    chunk_size: usize,
    worker_threads: usize,
    unknown_calls: UnknownCallPolicy,
    backends: BackendPair,
    registry: &'a PostProcessRegistry,
}

impl<'a> Generator<'a> {
    /// Generator for `config`. `prefer_parallel` selects the parallel height
    /// backend with sequential fallback; otherwise only the sequential one runs.
    pub fn new(config: &GeneratorConfig, registry: &'a PostProcessRegistry) -> Self {
        let backends = if config.prefer_parallel {
            let threads = match config.worker_threads {
                0 => num_cpus::get(),
                n => n,
            };
            BackendPair::new(
                Box::new(ParallelBackend::new(threads)),
                Box::new(SequentialBackend),
            )
        } else {
            BackendPair::sequential_only()
        };

        Self {
            output_dir: config.output_dir.clone(),
            chunk_size: config.chunk_size as usize,
            worker_threads: config.worker_threads,
            unknown_calls: config.unknown_calls,
            backends,
            registry,
        }
    }

    /// Replace the height-noise backends.
    pub fn with_backends(mut self, backends: BackendPair) -> Self {
        self.backends = backends;
        self
    }

    /// Root directory runs are written below.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Generate the world described by `preset` and return the trace path.
    ///
    /// Nothing is computed or written if the preset, run id, chunk size, or
    /// (under [`UnknownCallPolicy::Fail`]) a call name is invalid.
    pub fn generate(&self, preset: &Preset, run_id: &str) -> Result<PathBuf, GenerateError> {
        self.validate(preset, run_id)?;
        let started = Instant::now();
        tracing::info!(
            "run `{run_id}`: {0}x{0} world, {1} biomes, {2} calls",
            preset.world_size,
            preset.biomes.len(),
            preset.calls.len()
        );

        let store = ChunkStore::open(&self.output_dir)?;
        let mut trace = CallTrace::new();

        let mask = BiomeMask::build(preset);
        tracing::info!("biome mask built");
        let heights = HeightField::build(preset, &mask, &self.backends)?;
        tracing::info!("height field built, max height {}", heights.max());

        let voxelizer = Voxelizer::new(preset, &mask, &heights)?;
        let chunks = voxelizer.write_all(&store, self.chunk_size, self.worker_threads)?;
        trace.record(BUILD_CHUNKS, build_chunks_args(&chunks));

        self.apply_calls(preset, &chunks, &mut trace)?;

        let trace_path = store.trace_path(run_id);
        trace.save(&trace_path)?;
        tracing::info!(
            "run `{run_id}` finished in {:.2?}: {} chunks",
            started.elapsed(),
            chunks.len()
        );
        Ok(trace_path)
    }

    fn validate(&self, preset: &Preset, run_id: &str) -> Result<(), GenerateError> {
        if !is_valid_run_id(run_id) {
            return Err(GenerateError::InvalidRunId(run_id.to_owned()));
        }
        if self.chunk_size == 0 {
            return Err(GenerateError::InvalidChunkSize);
        }
        preset.validate()?;
        if self.unknown_calls == UnknownCallPolicy::Fail
            && let Some((index, call)) = preset
                .calls
                .iter()
                .enumerate()
                .find(|(_, call)| !self.registry.contains(&call.name))
        {
            return Err(GenerateError::UnknownCall {
                index,
                name: call.name.clone(),
            });
        }
        Ok(())
    }

    fn apply_calls(
        &self,
        preset: &Preset,
        chunks: &ChunkSet,
        trace: &mut CallTrace,
    ) -> Result<(), GenerateError> {
        for (index, call) in preset.calls.iter().enumerate() {
            match self.registry.get(&call.name) {
                Some(step) => {
                    tracing::info!("applying `{}`", call.name);
                    step.invoke(chunks, &call.args)
                        .map_err(|source| GenerateError::PostProcess {
                            name: call.name.clone(),
                            source,
                        })?;
                    trace.record(call.name.clone(), call.args.clone());
                }
                None => match self.unknown_calls {
                    UnknownCallPolicy::Warn => {
                        tracing::warn!("call #{index} names unknown step `{}`, skipped", call.name);
                        trace.record(UNKNOWN_CALL, unknown_call_args(&call.name, &call.args));
                    }
                    UnknownCallPolicy::Fail => {
                        return Err(GenerateError::UnknownCall {
                            index,
                            name: call.name.clone(),
                        });
                    }
                },
            }
        }
        Ok(())
    }
}

/// A run id must be a plain file name: non-empty, no path separators, and
/// not `.` or `..`.
pub fn is_valid_run_id(run_id: &str) -> bool {
    !run_id.is_empty()
        && run_id != "."
        && run_id != ".."
        && !run_id.contains(['/', '\\'])
        && !run_id.contains(std::path::MAIN_SEPARATOR)
}

fn build_chunks_args(chunks: &ChunkSet) -> Map<String, Value> {
    let paths = |list: Vec<PathBuf>| -> Value {
        list.iter()
            .map(|p| Value::String(p.to_string_lossy().into_owned()))
            .collect()
    };
    let mut args = Map::new();
    args.insert("chunk_paths".into(), paths(chunks.block_paths()));
    args.insert("color_paths".into(), paths(chunks.color_paths()));
    args.insert("max_height".into(), json!(chunks.max_height()));
    args.insert("chunk_size".into(), json!(chunks.chunk_size()));
    args
}

fn unknown_call_args(name: &str, args: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    out.insert("name".into(), Value::String(name.to_owned()));
    out.insert("args".into(), Value::Object(args.clone()));
    out
}
