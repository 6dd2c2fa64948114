//! Biome band assignment.
//!
//! The world is split along the z axis into bands whose relative sizes follow
//! the biome widths. Each band boundary is shifted by a 1D fBm offset sampled
//! once per z coordinate and shared by every x, so band edges move with z and
//! are straight along x.

use glam::DVec2;
use voxgen_config::{BiomeConf, Preset};

use crate::grid::Grid2;
use crate::noise::Fbm;
use crate::seed::seed_hash;

/// Peak magnitude of the band-edge perturbation, in normalized axis units.
pub const BAND_NOISE_SCALE: f64 = 0.1;
/// Frequency of the band-edge perturbation, per world cell.
pub const BAND_NOISE_FREQUENCY: f64 = 0.01;
/// Octaves of the band-edge perturbation.
pub const BAND_NOISE_OCTAVES: u32 = 3;

/// Per-cell biome index into `Preset::biomes`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BiomeMask {
    grid: Grid2<u8>,
    biome_count: usize,
}

impl BiomeMask {
    /// Assign a biome to every cell of the preset's world.
    pub fn build(preset: &Preset) -> Self {
        let size = preset.world_size as usize;
        let cumulative = cumulative_widths(&preset.biomes);
        let offsets = band_offsets(preset.macro_seed, size);

        let mut grid = Grid2::filled(size, 0u8);
        for z in 0..size {
            let position = axis_position(z, size) + offsets[z];
            // Biome count is bounded by `MAX_BIOMES`, so the index fits.
            let band = select_band(&cumulative, position) as u8;
            for x in 0..size {
                grid.set(x, z, band);
            }
        }

        tracing::debug!(
            "biome mask: {size}x{size}, {} bands, offsets in [{:.4}, {:.4}]",
            cumulative.len(),
            offsets.iter().copied().fold(f64::INFINITY, f64::min),
            offsets.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        );

        Self {
            grid,
            biome_count: preset.biomes.len(),
        }
    }

    /// Build a mask from explicit indices (x-major). Returns `None` if the
    /// length is not `size * size` or an index is out of range.
    pub fn from_indices(size: usize, biome_count: usize, indices: &[u8]) -> Option<Self> {
        if indices.len() != size * size || indices.iter().any(|&i| i as usize >= biome_count) {
            return None;
        }
        let mut grid = Grid2::filled(size, 0u8);
        for (i, &index) in indices.iter().enumerate() {
            grid.set(i / size.max(1), i % size.max(1), index);
        }
        Some(Self { grid, biome_count })
    }

    /// Biome index at `(x, z)`.
    pub fn get(&self, x: usize, z: usize) -> usize {
        self.grid.get(x, z) as usize
    }

    /// Side length of the mask.
    pub fn size(&self) -> usize {
        self.grid.size()
    }

    /// Number of biomes the indices refer to.
    pub fn biome_count(&self) -> usize {
        self.biome_count
    }

    /// Underlying grid.
    pub fn grid(&self) -> &Grid2<u8> {
        &self.grid
    }

    /// Cells of each biome, x-major, indexed by biome. Empty for absent biomes.
    pub fn cells_by_biome(&self) -> Vec<Vec<(u32, u32)>> {
        let mut cells = vec![Vec::new(); self.biome_count];
        for (x, z, index) in self.grid.iter() {
            cells[index as usize].push((x as u32, z as u32));
        }
        cells
    }
}

/// Running sum of widths divided by the total. The last entry is `1.0`
/// up to rounding.
pub fn cumulative_widths(biomes: &[BiomeConf]) -> Vec<f64> {
    let total: f64 = biomes.iter().map(|b| b.width).sum();
    let mut running = 0.0;
    biomes
        .iter()
        .map(|b| {
            running += b.width;
            running / total
        })
        .collect()
}

/// Band-edge offset for each z coordinate.
pub fn band_offsets(macro_seed: u64, size: usize) -> Vec<f64> {
    let fbm = Fbm::new(
        seed_hash(macro_seed, "biome_bands"),
        BAND_NOISE_OCTAVES,
        BAND_NOISE_FREQUENCY,
    );
    (0..size)
        .map(|z| fbm.sample(DVec2::new(0.0, z as f64)) * BAND_NOISE_SCALE)
        .collect()
}

/// Index of the first band whose cumulative width reaches `position`,
/// or the last band if none does.
pub fn select_band(cumulative: &[f64], position: f64) -> usize {
    cumulative
        .iter()
        .position(|&edge| position <= edge)
        .unwrap_or(cumulative.len().saturating_sub(1))
}

/// `z / (size - 1)`, the normalized position along the partition axis.
fn axis_position(z: usize, size: usize) -> f64 {
    if size <= 1 {
        0.0
    } else {
        z as f64 / (size - 1) as f64
    }
}
