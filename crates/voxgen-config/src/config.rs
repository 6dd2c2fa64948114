//! Generator configuration with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What to do when a preset names a post-process function that is not registered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownCallPolicy {
    /// Log a warning and record an `unknown_call` entry in the trace.
    #[default]
    Warn,
    /// Abort the run.
    Fail,
}

/// Top-level generator configuration.
///
/// Everything here tunes *how* a world is produced; *what* is produced comes
/// from the [`Preset`](crate::Preset).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Root directory for `chunks/` and `traces/`.
    pub output_dir: PathBuf,
    /// Edge length of a square chunk, in cells.
    pub chunk_size: u32,
    /// Chunk worker threads. `0` picks one per logical CPU.
    pub worker_threads: usize,
    /// Try the parallel noise backend before the sequential one.
    pub prefer_parallel: bool,
    /// Handling of unregistered post-process calls.
    pub unknown_calls: UnknownCallPolicy,
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Directory for the JSON log file, if any.
    pub log_dir: Option<PathBuf>,
    /// Also write a JSON log file into `log_dir`.
    pub json_log: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("data"),
            chunk_size: 128,
            worker_threads: 0,
            prefer_parallel: true,
            unknown_calls: UnknownCallPolicy::Warn,
            log_level: "info".to_string(),
            log_dir: None,
            json_log: false,
        }
    }
}

// --- Load / Save / Reload ---

impl GeneratorConfig {
    /// Platform default config directory (`<config_dir>/voxgen`).
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("voxgen"))
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: GeneratorConfig =
                ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = GeneratorConfig::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Re-read `config.ron`: returns `Some(new_config)` if it changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: GeneratorConfig =
            ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
