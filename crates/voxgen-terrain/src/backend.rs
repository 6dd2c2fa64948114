//! Compute backends for per-biome height noise.
//!
//! A [`BackendPair`] holds a preferred backend and a fallback. The preferred
//! one runs first; if it fails, its partial output is dropped and the
//! fallback recomputes the whole request. Both backends evaluate the same
//! algorithm, but callers must not rely on their outputs being bit-identical.

use glam::DVec2;

use crate::noise::{Fbm, normalize_min_max};

/// Errors a backend can report. The pair recovers from these by falling back.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// A worker thread could not be started.
    #[error("failed to spawn noise worker: {0}")]
    Spawn(#[source] std::io::Error),

    /// A worker thread panicked mid-computation.
    #[error("noise worker panicked")]
    WorkerPanicked,

    /// The backend returned the wrong number of samples.
    #[error("backend produced {actual} samples for {expected} cells")]
    LengthMismatch {
        /// Cells requested.
        expected: usize,
        /// Samples returned.
        actual: usize,
    },

    /// The backend is not usable on this machine.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Evaluates fBm over a set of cells and min-max normalizes the result.
pub trait NoiseBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// fBm at each `(x, z)` cell, normalized to `[0, 1]` over exactly these
    /// cells. Zero spread yields zeros.
    fn fbm_normalized(&self, fbm: &Fbm, cells: &[(u32, u32)]) -> Result<Vec<f64>, BackendError>;
}

fn sample_cells(fbm: &Fbm, cells: &[(u32, u32)]) -> Vec<f64> {
    cells
        .iter()
        .map(|&(x, z)| fbm.sample(DVec2::new(f64::from(x), f64::from(z))))
        .collect()
}

/// Single-threaded reference backend.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialBackend;

impl NoiseBackend for SequentialBackend {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn fbm_normalized(&self, fbm: &Fbm, cells: &[(u32, u32)]) -> Result<Vec<f64>, BackendError> {
        let mut values = sample_cells(fbm, cells);
        normalize_min_max(&mut values);
        Ok(values)
    }
}

/// Data-parallel backend: splits the cells across scoped worker threads.
#[derive(Clone, Copy, Debug)]
pub struct ParallelBackend {
    threads: usize,
}

impl ParallelBackend {
    /// Cells below this count are not worth splitting.
    const MIN_CELLS_PER_THREAD: usize = 1024;

    /// Backend using `threads` workers (at least one).
    pub fn new(threads: usize) -> Self {
        Self {
            threads: threads.max(1),
        }
    }

    /// One worker per logical CPU.
    pub fn with_defaults() -> Self {
        Self::new(num_cpus::get())
    }
}

impl NoiseBackend for ParallelBackend {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn fbm_normalized(&self, fbm: &Fbm, cells: &[(u32, u32)]) -> Result<Vec<f64>, BackendError> {
        let workers = self
            .threads
            .min(cells.len().div_ceil(Self::MIN_CELLS_PER_THREAD))
            .max(1);
        let per_worker = cells.len().div_ceil(workers).max(1);

        let mut values = std::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(workers);
            for part in cells.chunks(per_worker) {
                let handle = std::thread::Builder::new()
                    .name("height-noise".into())
                    .spawn_scoped(scope, move || sample_cells(fbm, part))
                    .map_err(BackendError::Spawn)?;
                handles.push(handle);
            }

            let mut values = Vec::with_capacity(cells.len());
            for handle in handles {
                let part = handle.join().map_err(|_| BackendError::WorkerPanicked)?;
                values.extend(part);
            }
            Ok::<_, BackendError>(values)
        })?;

        if values.len() != cells.len() {
            return Err(BackendError::LengthMismatch {
                expected: cells.len(),
                actual: values.len(),
            });
        }
        normalize_min_max(&mut values);
        Ok(values)
    }
}

/// Preferred backend with a fallback, selected at a single call site.
pub struct BackendPair {
    preferred: Option<Box<dyn NoiseBackend>>,
    fallback: Box<dyn NoiseBackend>,
}

impl BackendPair {
    /// Try `preferred` first, then `fallback`.
    pub fn new(preferred: Box<dyn NoiseBackend>, fallback: Box<dyn NoiseBackend>) -> Self {
        Self {
            preferred: Some(preferred),
            fallback,
        }
    }

    /// Parallel preferred, sequential fallback.
    pub fn with_defaults() -> Self {
        Self::new(
            Box::new(ParallelBackend::with_defaults()),
            Box::new(SequentialBackend),
        )
    }

    /// Only the sequential backend.
    pub fn sequential_only() -> Self {
        Self {
            preferred: None,
            fallback: Box::new(SequentialBackend),
        }
    }

    /// Normalized fBm over `cells`, falling back on any preferred-backend error.
    ///
    /// Fails only if the fallback itself fails.
    pub fn compute(&self, fbm: &Fbm, cells: &[(u32, u32)]) -> Result<Vec<f64>, BackendError> {
        if let Some(preferred) = &self.preferred {
            match preferred.fbm_normalized(fbm, cells) {
                Ok(values) => return Ok(values),
                Err(e) => {
                    tracing::warn!(
                        "{} backend failed ({e}), retrying {} cells on {} backend",
                        preferred.name(),
                        cells.len(),
                        self.fallback.name()
                    );
                }
            }
        }
        self.fallback.fbm_normalized(fbm, cells)
    }
}

impl Default for BackendPair {
    fn default() -> Self {
        Self::with_defaults()
    }
}
