//! Structured logging for Seascape.
//!
//! Installs a `tracing` subscriber with uptime-stamped console output and,
//! when enabled in the config, a JSON log file for post-mortem analysis.
//! `RUST_LOG` always wins over the configured level.

use seascape_config::Config;
use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config names a level.
pub const DEFAULT_FILTER: &str = "info,wgpu=warn,naga=warn";

/// File name of the JSON log inside the log directory.
pub const LOG_FILE_NAME: &str = "seascape.log";

/// Resolve the filter directive from the config.
///
/// Adds the `wgpu`/`naga` quieting unless the configured level already
/// mentions those targets.
pub fn filter_directive(config: Option<&Config>) -> String {
    match config.map(|c| c.debug.log_level.trim()) {
        Some(level) if !level.is_empty() => {
            if level.contains("wgpu") || level.contains("naga") {
                level.to_string()
            } else {
                format!("{level},wgpu=warn,naga=warn")
            }
        }
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Initialize the global tracing subscriber.
///
/// * `log_dir` - directory for the JSON log file; only used when
///   `config.debug.file_logging` is set or `debug_build` is true
/// * `debug_build` - whether this is a debug build
/// * `config` - optional configuration supplying the log level
///
/// Calling this twice is harmless; the second call leaves the first
/// subscriber in place.
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    let wants_file = debug_build || config.is_some_and(|c| c.debug.file_logging);
    if wants_file
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

        let _ = subscriber.with(file_layer).try_init();
        return;
    }

    let _ = subscriber.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_without_config() {
        assert_eq!(filter_directive(None), DEFAULT_FILTER);
    }

    #[test]
    fn test_config_level_gets_gpu_quieting() {
        let mut config = Config::default();
        config.debug.log_level = "debug".to_string();
        let directive = filter_directive(Some(&config));
        assert_eq!(directive, "debug,wgpu=warn,naga=warn");
        assert!(EnvFilter::try_new(&directive).is_ok());
    }

    #[test]
    fn test_explicit_wgpu_level_is_kept() {
        let mut config = Config::default();
        config.debug.log_level = "info,wgpu=trace".to_string();
        assert_eq!(filter_directive(Some(&config)), "info,wgpu=trace");
    }

    #[test]
    fn test_blank_level_falls_back() {
        let mut config = Config::default();
        config.debug.log_level = "  ".to_string();
        assert_eq!(filter_directive(Some(&config)), DEFAULT_FILTER);
    }

    #[test]
    fn test_subsystem_filters_parse() {
        for directive in [
            "info",
            "debug,seascape_scene=trace",
            "warn,seascape_panel=debug,seascape_app=info",
        ] {
            assert!(
                EnvFilter::try_new(directive).is_ok(),
                "failed to parse {directive}"
            );
        }
    }

    #[test]
    fn test_init_with_file_logging_creates_log() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.debug.file_logging = true;
        init_logging(Some(dir.path()), false, Some(&config));
        // A second call must not panic.
        init_logging(None, false, None);
        tracing::info!("log file smoke test");
        assert!(dir.path().join(LOG_FILE_NAME).exists());
    }
}
