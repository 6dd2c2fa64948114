//! Configuration for voxgen: world presets and generator settings.
//!
//! Presets describe the world to build and are validated before any work
//! starts. Generator settings persist to disk as RON files and accept CLI
//! overrides via clap.

mod cli;
mod config;
mod error;
mod preset;

pub use cli::CliArgs;
pub use config::{GeneratorConfig, UnknownCallPolicy};
pub use error::{ConfigError, PresetError};
pub use preset::{Band, BiomeConf, CallSpec, MAX_BIOMES, Preset};
