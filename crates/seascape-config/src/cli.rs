//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Seascape command-line arguments.
///
/// CLI values override settings loaded from `seascape.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "seascape", about = "Ocean, sky and airplane scene viewer")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Airplane model to load instead of the configured one.
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Control panel port.
    #[arg(long)]
    pub panel_port: Option<u16>,

    /// Do not start the HTTP control panel.
    #[arg(long)]
    pub no_panel: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(ref model) = args.model {
            self.airplane.model_path = model.clone();
        }
        if let Some(port) = args.panel_port {
            self.panel.port = port;
        }
        if args.no_panel {
            self.panel.enabled = false;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs::parse_from([
            "seascape",
            "--width",
            "1920",
            "--model",
            "models/biplane.gltf",
            "--no-panel",
        ]);
        config.apply_cli_overrides(&args);
        assert_eq!(config.window.width, 1920);
        assert_eq!(
            config.airplane.model_path,
            PathBuf::from("models/biplane.gltf")
        );
        assert!(!config.panel.enabled);
        // Non-overridden fields retain defaults
        assert_eq!(config.window.height, 720);
        assert_eq!(config.panel.port, 9870);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }
}
