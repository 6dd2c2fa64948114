//! Block identifiers stored in chunk volumes.

use serde::{Deserialize, Serialize};

/// One-byte block identifier.
///
/// `0` is air, `2` is water, and `1 + biome_index` is solid ground of that
/// biome. The second biome's solid id therefore equals the water id; consumers
/// that need to tell them apart use the column height and sea level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(pub u8);

impl BlockId {
    /// Empty space.
    pub const AIR: Self = Self(0);
    /// Sea-level fill.
    pub const WATER: Self = Self(2);

    /// Solid block for the biome at `biome_index` in the preset.
    ///
    /// Returns `None` if the index does not fit in a byte after the offset.
    pub fn solid(biome_index: usize) -> Option<Self> {
        u8::try_from(biome_index + 1).ok().map(Self)
    }

    /// Returns `true` for air.
    pub fn is_air(self) -> bool {
        self == Self::AIR
    }
}

/// RGB color stored alongside each voxel.
pub type Rgb = [u8; 3];

/// Color written to every water voxel, whatever the block id beneath it.
pub const WATER_COLOR: Rgb = [32, 96, 192];
