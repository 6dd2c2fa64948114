//! Command-line argument parsing for the `voxgen` binary.

use std::path::PathBuf;

use clap::Parser;

use crate::GeneratorConfig;

/// voxgen command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "voxgen", about = "Generate a voxel world from a preset")]
pub struct CliArgs {
    /// Path to the preset file (JSON or RON).
    #[arg(short, long, required_unless_present = "schema")]
    pub preset: Option<PathBuf>,

    /// Run identifier used for the trace file name.
    #[arg(short = 'i', long = "id")]
    pub run_id: Option<String>,

    /// Output root directory.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Chunk edge length in cells.
    #[arg(long)]
    pub chunk_size: Option<u32>,

    /// Number of chunk worker threads (0 = one per CPU).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the registered post-process schemas as JSON and exit.
    #[arg(long)]
    pub schema: bool,
}

impl GeneratorConfig {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref dir) = args.output {
            self.output_dir = dir.clone();
        }
        if let Some(size) = args.chunk_size {
            self.chunk_size = size;
        }
        if let Some(workers) = args.workers {
            self.worker_threads = workers;
        }
        if let Some(ref level) = args.log_level {
            self.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = GeneratorConfig::default();
        let args = CliArgs::parse_from([
            "voxgen",
            "--preset",
            "world.json",
            "--output",
            "/tmp/out",
            "--chunk-size",
            "32",
        ]);
        config.apply_cli_overrides(&args);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.chunk_size, 32);
        // Non-overridden fields retain defaults
        assert_eq!(config.worker_threads, 0);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_cli_no_override() {
        let original = GeneratorConfig::default();
        let mut config = GeneratorConfig::default();
        let args = CliArgs::parse_from(["voxgen", "-p", "world.json"]);
        config.apply_cli_overrides(&args);
        assert_eq!(config, original);
        assert_eq!(args.preset, Some(PathBuf::from("world.json")));
    }

    #[test]
    fn test_preset_required_without_schema() {
        assert!(CliArgs::try_parse_from(["voxgen"]).is_err());
        let args = CliArgs::try_parse_from(["voxgen", "--schema"]).unwrap();
        assert!(args.schema);
    }
}
