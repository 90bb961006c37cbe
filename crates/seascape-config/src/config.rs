//! Configuration structs with scene defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "seascape.ron";
const APP_NAME: &str = "seascape";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Perspective camera and orbit limits.
    pub camera: CameraConfig,
    /// Procedural sky and sun angles.
    pub sky: SkyConfig,
    /// Water surface shading inputs.
    pub water: WaterConfig,
    /// Initial scene membership of the environment layers.
    pub layers: LayersConfig,
    /// Airplane model and its transform.
    pub airplane: AirplaneConfig,
    /// Ambient and point light rig.
    pub lighting: LightingConfig,
    /// Per-frame stepping.
    pub render_loop: RenderLoopConfig,
    /// HTTP control panel.
    pub panel: PanelConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// Camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Near clip plane.
    pub near: f32,
    /// Far clip plane.
    pub far: f32,
    /// Initial eye position.
    pub position: [f32; 3],
    /// Orbit target.
    pub target: [f32; 3],
    /// Maximum polar angle the orbit controller may reach, in radians.
    pub max_polar_angle: f32,
    /// Closest orbit distance.
    pub min_distance: f32,
    /// Farthest orbit distance.
    pub max_distance: f32,
}

/// Sky configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SkyConfig {
    /// Sun inclination in `[0, 0.5]`.
    pub inclination: f32,
    /// Sun azimuth in `[0, 1]`.
    pub azimuth: f32,
    /// Atmospheric turbidity.
    pub turbidity: f32,
    /// Rayleigh scattering coefficient.
    pub rayleigh: f32,
    /// Mie scattering coefficient.
    pub mie_coefficient: f32,
    /// Mie directional anisotropy.
    pub mie_directional_g: f32,
    /// Uniform scale of the sky dome.
    pub scale: f32,
}

/// Water configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WaterConfig {
    /// Normal-map distortion strength, `[0, 8]`.
    pub distortion_scale: f32,
    /// Normal-map tiling size, `[0.1, 10]`.
    pub size: f32,
    /// Side length of the water plane.
    pub extent: f32,
    /// Surface opacity.
    pub alpha: f32,
    /// Sun highlight color as `0xRRGGBB`.
    pub sun_color: u32,
    /// Water body color as `0xRRGGBB`.
    pub water_color: u32,
}

/// Which environment layers start attached to the scene.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayersConfig {
    pub sky: bool,
    pub water: bool,
    pub terrain: bool,
}

/// Airplane configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AirplaneConfig {
    /// Model resource path handed to the asset loader.
    pub model_path: PathBuf,
    /// Initial world position.
    pub position: [f32; 3],
    /// User-facing scale multiplier, `[0.5, 2]`.
    pub scale: f32,
    /// Scale that brings the model's native units to scene units.
    pub base_scale: f32,
    /// Spin about the vertical axis on startup.
    pub rotation_enabled: bool,
    /// Spin rate in radians per second.
    pub angular_rate: f32,
}

/// Light rig configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightingConfig {
    /// Ambient color as `0xRRGGBB`.
    pub ambient_color: u32,
    /// Ambient intensity.
    pub ambient_intensity: f32,
    /// Point light color as `0xRRGGBB`.
    pub point_color: u32,
    /// Point light intensity.
    pub point_intensity: f32,
    /// Point light falloff exponent.
    pub point_decay: f32,
    /// Point light cutoff distance; 0 means unbounded.
    pub point_range: f32,
    /// Point light position.
    pub point_position: [f32; 3],
    /// Attach a helper marker at the point light.
    pub show_point_helper: bool,
}

/// How the water clock advances on each tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum WaveStep {
    /// Constant increment per tick, independent of frame time.
    Fixed(f32),
    /// Increment of `rate * delta_seconds`.
    Scaled(f32),
}

impl WaveStep {
    fn value(self) -> f32 {
        match self {
            WaveStep::Fixed(v) | WaveStep::Scaled(v) => v,
        }
    }
}

/// Render loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderLoopConfig {
    /// Water clock stepping policy.
    pub wave_step: WaveStep,
    /// Frame deltas above this many seconds are clamped.
    pub max_frame_time: f64,
}

/// HTTP control panel configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PanelConfig {
    /// Start the panel server.
    pub enabled: bool,
    /// Port on 127.0.0.1; 0 lets the OS pick.
    pub port: u16,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "seascape_scene=trace").
    pub log_level: String,
    /// Write JSON logs next to the config directory.
    pub file_logging: bool,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            vsync: true,
            title: "Seascape".to_string(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            position: [15.0, 15.0, 20.0],
            target: [0.0, 0.0, 0.0],
            max_polar_angle: std::f32::consts::PI * 0.495,
            min_distance: 10.0,
            max_distance: 200.0,
        }
    }
}

impl Default for SkyConfig {
    fn default() -> Self {
        Self {
            inclination: 0.4373,
            azimuth: 0.287,
            turbidity: 10.0,
            rayleigh: 2.0,
            mie_coefficient: 0.005,
            mie_directional_g: 0.8,
            scale: 10_000.0,
        }
    }
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            distortion_scale: 3.7,
            size: 1.0,
            extent: 10_000.0,
            alpha: 1.0,
            sun_color: 0xffffff,
            water_color: 0x001e0f,
        }
    }
}

impl Default for LayersConfig {
    fn default() -> Self {
        Self {
            sky: true,
            water: true,
            terrain: true,
        }
    }
}

impl Default for AirplaneConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("resources/A380/scene.gltf"),
            position: [0.0, 5.0, 0.0],
            scale: 1.0,
            base_scale: 0.015,
            rotation_enabled: true,
            angular_rate: 0.5,
        }
    }
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_color: 0xffffff,
            ambient_intensity: 0.001,
            point_color: 0x097969,
            point_intensity: 0.1,
            point_decay: 2.0,
            point_range: 0.0,
            point_position: [-15.0, 10.0, 5.0],
            show_point_helper: true,
        }
    }
}

impl Default for RenderLoopConfig {
    fn default() -> Self {
        Self {
            wave_step: WaveStep::Fixed(1.0 / 60.0),
            max_frame_time: 0.25,
        }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 9870,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            file_logging: false,
        }
    }
}

/// Platform config directory for Seascape (`$XDG_CONFIG_HOME/seascape` on Linux).
///
/// Falls back to the working directory when the OS exposes none.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|base| base.join(APP_NAME))
        .unwrap_or_else(|| PathBuf::from("."))
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            config.validate()?;
            log::info!("Loaded scene config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Wrote default scene config to {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `seascape.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized).map_err(ConfigError::WriteError)
    }

    /// Reject values the scene cannot honor.
    ///
    /// Sun angles must lie inside the panel's slider bounds, and the wave
    /// step must be positive so the water clock strictly increases.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=0.5).contains(&self.sky.inclination) {
            return Err(ConfigError::Invalid {
                field: "sky.inclination",
                reason: format!("{} is outside [0, 0.5]", self.sky.inclination),
            });
        }
        if !(0.0..=1.0).contains(&self.sky.azimuth) {
            return Err(ConfigError::Invalid {
                field: "sky.azimuth",
                reason: format!("{} is outside [0, 1]", self.sky.azimuth),
            });
        }
        let step = self.render_loop.wave_step.value();
        if step.is_nan() || step <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "render_loop.wave_step",
                reason: format!("step must be positive, got {step}"),
            });
        }
        let max_frame = self.render_loop.max_frame_time;
        if max_frame.is_nan() || max_frame <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "render_loop.max_frame_time",
                reason: format!("must be positive, got {max_frame}"),
            });
        }
        if self.airplane.base_scale <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "airplane.base_scale",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("inclination: 0.4373"));
        assert!(ron_str.contains("title: \"Seascape\""));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let config: Config = ron::from_str("(sky: (azimuth: 0.9))").unwrap();
        assert_eq!(config.sky.azimuth, 0.9);
        assert_eq!(config.sky.inclination, 0.4373);
        assert_eq!(config.lighting, LightingConfig::default());
    }

    #[test]
    fn test_wave_step_variants_parse() {
        let config: Config = ron::from_str("(render_loop: (wave_step: Scaled(1.5)))").unwrap();
        assert_eq!(config.render_loop.wave_step, WaveStep::Scaled(1.5));
        assert_eq!(config.render_loop.max_frame_time, 0.25);
    }

    #[test]
    fn test_default_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_out_of_range_inclination_rejected() {
        let mut config = Config::default();
        config.sky.inclination = 0.75;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "sky.inclination",
                ..
            }
        ));
    }

    #[test]
    fn test_zero_wave_step_rejected() {
        let mut config = Config::default();
        config.render_loop.wave_step = WaveStep::Fixed(0.0);
        assert!(config.validate().is_err());
        config.render_loop.wave_step = WaveStep::Scaled(f32::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.sky.azimuth = 0.6;
        config.airplane.model_path = PathBuf::from("models/glider.gltf");

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "(sky: (azimuth: 3.0))").unwrap();
        assert!(matches!(
            Config::load_or_create(dir.path()),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }
}
