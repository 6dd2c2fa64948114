//! Per-biome height field synthesis.
//!
//! Each biome gets its own fBm field seeded with `height_seed ^ biome_index`.
//! Noise is min-max normalized over that biome's cells only, then mapped to
//! `base + floor(amp * n)`, so every height lies in `[base, base + amp]`.

use voxgen_config::Preset;

use crate::backend::{BackendError, BackendPair};
use crate::biome::BiomeMask;
use crate::grid::Grid2;
use crate::noise::Fbm;

/// Integer terrain height per world cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeightField {
    grid: Grid2<u32>,
}

impl HeightField {
    /// Synthesize heights for every cell of `mask`.
    ///
    /// Backend failures are recovered inside `backends`; an error here means
    /// the fallback failed too.
    pub fn build(
        preset: &Preset,
        mask: &BiomeMask,
        backends: &BackendPair,
    ) -> Result<Self, BackendError> {
        let mut grid = Grid2::filled(mask.size(), 0u32);

        for (index, cells) in mask.cells_by_biome().into_iter().enumerate() {
            if cells.is_empty() {
                continue;
            }
            let biome = &preset.biomes[index];
            let fbm = Fbm::new(
                preset.height_seed ^ index as u64,
                Fbm::HEIGHT_OCTAVES,
                biome.freq,
            );
            let noise = backends.compute(&fbm, &cells)?;

            for (&(x, z), &n) in cells.iter().zip(&noise) {
                let lift = ((f64::from(biome.amp) * n).floor() as u32).min(biome.amp);
                grid.set(x as usize, z as usize, biome.base + lift);
            }
            tracing::debug!(
                "heights for biome `{}`: {} cells, range {}..={}",
                biome.id,
                cells.len(),
                biome.base,
                biome.base + biome.amp
            );
        }

        Ok(Self { grid })
    }

    /// Height at `(x, z)`.
    pub fn get(&self, x: usize, z: usize) -> u32 {
        self.grid.get(x, z)
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.grid.size()
    }

    /// Tallest column.
    pub fn max(&self) -> u32 {
        self.grid.cells().iter().copied().max().unwrap_or(0)
    }

    /// Vertical extent shared by every chunk: `max() + 1`.
    pub fn max_height(&self) -> usize {
        self.max() as usize + 1
    }

    /// Underlying grid.
    pub fn grid(&self) -> &Grid2<u32> {
        &self.grid
    }
}
