//! World presets: the declarative input to a generation run.
//!
//! A preset is read once, validated, and never mutated afterwards. Presets are
//! usually JSON; `.ron` files are accepted as well.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::PresetError;

/// Upper bound on biome count. Solid block ids are `1 + index` stored in a `u8`.
pub const MAX_BIOMES: usize = 254;

/// Latitude band a biome is meant to represent.
///
/// Purely descriptive: band order in the preset is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    /// Warm central band.
    Equator,
    /// Mid-latitude band.
    Temperate,
    /// Cold outer band.
    Polar,
}

/// Per-biome terrain parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomeConf {
    /// Biome name, e.g. `"plains"`.
    pub id: String,
    /// Descriptive latitude band.
    pub band: Band,
    /// Relative share of the partition axis. Need not be pre-normalized.
    pub width: f64,
    /// Minimum terrain height.
    pub base: u32,
    /// Height amplitude added on top of `base`.
    pub amp: u32,
    /// Noise frequency of the first fBm octave.
    pub freq: f64,
    /// Column color as RGB.
    #[serde(default = "default_color")]
    pub color: [u8; 3],
}

fn default_color() -> [u8; 3] {
    [255, 255, 255]
}

/// A named post-process step to run after voxelization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSpec {
    /// Registered function name.
    #[serde(rename = "fn")]
    pub name: String,
    /// Arguments forwarded to the function.
    #[serde(default)]
    pub args: Map<String, Value>,
}

/// Complete description of a world to generate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Side length of the square world, in cells.
    pub world_size: u32,
    /// Water fills empty voxels below this height.
    #[serde(default = "default_sea_level")]
    pub sea_level: u32,
    /// Seed for biome band placement.
    pub macro_seed: u64,
    /// Seed for per-biome height noise.
    pub height_seed: u64,
    /// Biomes in partition order.
    pub biomes: Vec<BiomeConf>,
    /// Post-process steps in execution order.
    #[serde(default)]
    pub calls: Vec<CallSpec>,
}

fn default_sea_level() -> u32 {
    62
}

impl Preset {
    /// Parse and validate a preset from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, PresetError> {
        let preset: Preset = serde_json::from_str(json)?;
        preset.validate()?;
        Ok(preset)
    }

    /// Parse and validate a preset from a RON string.
    pub fn from_ron_str(text: &str) -> Result<Self, PresetError> {
        let preset: Preset = ron::from_str(text)?;
        preset.validate()?;
        Ok(preset)
    }

    /// Load a preset from disk. Files ending in `.ron` are parsed as RON,
    /// everything else as JSON.
    pub fn load(path: &Path) -> Result<Self, PresetError> {
        let contents = std::fs::read_to_string(path).map_err(|source| PresetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let preset = match path.extension().and_then(|e| e.to_str()) {
            Some("ron") => Self::from_ron_str(&contents)?,
            _ => Self::from_json_str(&contents)?,
        };
        log::info!(
            "Loaded preset from {} ({} biomes, {} calls)",
            path.display(),
            preset.biomes.len(),
            preset.calls.len()
        );
        Ok(preset)
    }

    /// Write the preset as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), PresetError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| PresetError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check structural invariants that the generator relies on.
    pub fn validate(&self) -> Result<(), PresetError> {
        if self.world_size == 0 {
            return Err(PresetError::ZeroWorldSize);
        }
        if self.biomes.is_empty() {
            return Err(PresetError::NoBiomes);
        }
        if self.biomes.len() > MAX_BIOMES {
            return Err(PresetError::TooManyBiomes(self.biomes.len()));
        }

        for (index, biome) in self.biomes.iter().enumerate() {
            if biome.id.is_empty() {
                return Err(PresetError::EmptyBiomeId(index));
            }
            if self.biomes[..index].iter().any(|b| b.id == biome.id) {
                return Err(PresetError::DuplicateBiomeId(biome.id.clone()));
            }
            if !biome.width.is_finite() || biome.width <= 0.0 {
                return Err(PresetError::InvalidWidth {
                    id: biome.id.clone(),
                    width: biome.width,
                });
            }
            if !biome.freq.is_finite() {
                return Err(PresetError::InvalidFrequency {
                    id: biome.id.clone(),
                    freq: biome.freq,
                });
            }
            if biome.base.checked_add(biome.amp).is_none() {
                return Err(PresetError::HeightOverflow(biome.id.clone()));
            }
        }

        if let Some(index) = self.calls.iter().position(|c| c.name.is_empty()) {
            return Err(PresetError::EmptyCallName(index));
        }
        Ok(())
    }
}
