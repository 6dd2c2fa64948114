//! Structured logging for voxgen.
//!
//! Provides span-based, filterable logging via the `tracing` ecosystem:
//! console output with uptime timestamps and module paths, plus an optional
//! JSON log file for post-run analysis. The level comes from the generator
//! config and can be overridden with `RUST_LOG`.

use std::path::Path;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use voxgen_config::GeneratorConfig;

const DEFAULT_FILTER: &str = "info";

/// Name of the JSON log file written into the log directory.
pub const LOG_FILE_NAME: &str = "voxgen.log";

/// Initialize the global tracing subscriber.
///
/// Sets up:
/// - Console output with uptime, module paths, and severity levels
/// - A JSON file in `log_dir` when `json_file` is set
/// - Environment-based filtering (`RUST_LOG` wins over the config level)
///
/// Must be called at most once per process.
///
/// # Examples
///
/// ```no_run
/// use voxgen_config::GeneratorConfig;
/// use voxgen_log::init_logging;
///
/// let config = GeneratorConfig::default();
/// init_logging(None, false, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, json_file: bool, config: Option<&GeneratorConfig>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(true) // chunk workers are named
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if json_file
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE_NAME))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

/// Filter directive derived from the config, falling back to `info`.
pub fn filter_directive(config: Option<&GeneratorConfig>) -> String {
    match config {
        Some(config) if !config.log_level.is_empty() => config.log_level.clone(),
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Create an `EnvFilter` with the default filter string.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}
