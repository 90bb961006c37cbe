//! Seascape viewer binary.
//!
//! Configuration is loaded from `seascape.ron` and can be overridden via CLI
//! flags, e.g. `seascape --width 1920 --height 1080 --no-panel`.

use clap::Parser;
use seascape_config::{CliArgs, Config, default_config_dir};
use tracing::{error, info};

fn main() {
    let args = CliArgs::parse();
    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    seascape_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    if let Err(e) = config.validate() {
        error!("invalid configuration: {e}, using defaults");
        config = Config::default();
        config.apply_cli_overrides(&args);
    }

    let resource_root = std::env::current_dir().unwrap_or_else(|_| config_dir.clone());
    info!(
        "starting seascape {} (config: {})",
        env!("CARGO_PKG_VERSION"),
        config_dir.display()
    );

    if let Err(e) = seascape_app::run(config, resource_root) {
        error!("event loop failed: {e}");
        std::process::exit(1);
    }
}
