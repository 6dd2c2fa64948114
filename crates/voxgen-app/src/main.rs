//! The `voxgen` binary: generate a voxel world from a preset file.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `voxgen --preset world.json --id demo` to write chunks and a trace
//! below the configured output directory.

use clap::Parser;
use voxgen_app::{Outcome, builtin_registry, config_dir, load_config, run};
use voxgen_config::CliArgs;

fn main() {
    let args = CliArgs::parse();

    let config_dir = config_dir(&args);
    let config = load_config(&config_dir, &args);

    let log_dir = config
        .log_dir
        .clone()
        .unwrap_or_else(|| config_dir.join("logs"));
    voxgen_log::init_logging(Some(&log_dir), config.json_log, Some(&config));

    let registry = builtin_registry();
    match run(&args, &config, &registry) {
        Ok(Outcome::Schemas(json)) => println!("{json}"),
        Ok(Outcome::Trace(path)) => println!("{}", path.display()),
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("voxgen: {e}");
            std::process::exit(1);
        }
    }
}
