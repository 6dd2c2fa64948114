//! Command-line front end for voxgen.
//!
//! Resolves configuration (config file, then CLI overrides), loads the
//! preset, and hands both to the terrain generator.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use voxgen_config::{CliArgs, GeneratorConfig, Preset, PresetError};
use voxgen_terrain::{GenerateError, Generator, PostProcessRegistry, derive_run_id};

/// Errors surfaced to the user by the binary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// `--preset` was not given.
    #[error("no preset given (use --preset <FILE>)")]
    MissingPreset,

    /// The preset could not be loaded.
    #[error(transparent)]
    Preset(#[from] PresetError),

    /// Generation failed.
    #[error(transparent)]
    Generate(#[from] GenerateError),

    /// The schema listing could not be encoded.
    #[error("failed to encode schemas: {0}")]
    Schema(#[from] serde_json::Error),
}

/// What a successful invocation produced.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Pretty JSON of the registered post-process schemas.
    Schemas(String),
    /// Path of the written trace.
    Trace(PathBuf),
}

/// Config directory: `--config` if given, else the platform default, else
/// the working directory.
pub fn config_dir(args: &CliArgs) -> PathBuf {
    args.config
        .clone()
        .or_else(GeneratorConfig::default_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Load `config.ron` from `dir` (creating it if missing) and apply CLI
/// overrides. A broken config file falls back to defaults.
pub fn load_config(dir: &Path, args: &CliArgs) -> GeneratorConfig {
    let mut config = GeneratorConfig::load_or_create(dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        GeneratorConfig::default()
    });
    config.apply_cli_overrides(args);
    config
}

/// `--id` if given, otherwise an id derived from the current time.
pub fn resolve_run_id(args: &CliArgs) -> String {
    match &args.run_id {
        Some(id) => id.clone(),
        None => {
            let nanos = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or_default();
            derive_run_id(nanos)
        }
    }
}

/// Post-process steps available to presets run from the command line.
pub fn builtin_registry() -> PostProcessRegistry {
    PostProcessRegistry::new()
}

/// Execute one invocation.
pub fn run(
    args: &CliArgs,
    config: &GeneratorConfig,
    registry: &PostProcessRegistry,
) -> Result<Outcome, AppError> {
    if args.schema {
        let schemas = serde_json::Value::Object(registry.schemas());
        return Ok(Outcome::Schemas(serde_json::to_string_pretty(&schemas)?));
    }

    let preset_path = args.preset.as_deref().ok_or(AppError::MissingPreset)?;
    let preset = Preset::load(preset_path)?;
    let run_id = resolve_run_id(args);
    tracing::info!(
        "generating `{run_id}` from {} into {}",
        preset_path.display(),
        config.output_dir.display()
    );

    let trace = Generator::new(config, registry).generate(&preset, &run_id)?;
    Ok(Outcome::Trace(trace))
}
