//! Configuration and preset error types.

use std::path::PathBuf;

/// Errors that can occur when loading, saving, or parsing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    #[error("failed to read config: {0}")]
    ReadError(#[source] std::io::Error),

    /// Failed to write the config file to disk.
    #[error("failed to write config: {0}")]
    WriteError(#[source] std::io::Error),

    /// Failed to parse RON content.
    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// Failed to serialize config to RON.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),
}

/// Errors raised while loading or validating a world preset.
///
/// Every variant is fatal and is reported before any generation work starts.
#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    /// The preset file could not be read or written.
    #[error("preset I/O error at {path}: {source}")]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The preset is not valid JSON or does not match the expected shape.
    #[error("failed to parse preset JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The preset is not valid RON or does not match the expected shape.
    #[error("failed to parse preset RON: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// `world_size` must be at least one cell.
    #[error("world_size must be greater than zero")]
    ZeroWorldSize,

    /// At least one biome is required.
    #[error("preset declares no biomes")]
    NoBiomes,

    /// Solid block ids are `1 + index` and must fit in a byte.
    #[error("preset declares {0} biomes, at most {max} are supported", max = crate::MAX_BIOMES)]
    TooManyBiomes(usize),

    /// A biome width is zero, negative, or not finite.
    #[error("biome `{id}` has invalid width {width}")]
    InvalidWidth {
        /// Biome identifier.
        id: String,
        /// Offending width.
        width: f64,
    },

    /// A biome noise frequency is not finite.
    #[error("biome `{id}` has invalid frequency {freq}")]
    InvalidFrequency {
        /// Biome identifier.
        id: String,
        /// Offending frequency.
        freq: f64,
    },

    /// A biome has an empty identifier.
    #[error("biome at index {0} has an empty id")]
    EmptyBiomeId(usize),

    /// Two biomes share the same identifier.
    #[error("duplicate biome id: {0}")]
    DuplicateBiomeId(String),

    /// `base + amp` would overflow the height type.
    #[error("biome `{0}` height range overflows")]
    HeightOverflow(String),

    /// A post-process call has an empty function name.
    #[error("call at index {0} has an empty function name")]
    EmptyCallName(usize),
}
