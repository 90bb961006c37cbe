//! Configuration system for Seascape.
//!
//! Every tunable of the scene (sun angles, water shading inputs, airplane
//! transform, light rig, render-loop stepping) lives in a single [`Config`]
//! persisted as `seascape.ron`. CLI arguments parsed with clap override the
//! loaded values.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    AirplaneConfig, CameraConfig, Config, DebugConfig, LayersConfig, LightingConfig, PanelConfig,
    RenderLoopConfig, SkyConfig, WaterConfig, WaveStep, WindowConfig, default_config_dir,
};
pub use error::ConfigError;
