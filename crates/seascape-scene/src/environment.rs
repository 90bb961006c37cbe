//! Environment model: sun placement, sky/water shader inputs, layer
//! membership, and the environment lighting derived from the sky.

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;
use seascape_config::Config;
use serde::{Deserialize, Serialize};

use crate::graph::{NodeId, NodeKind, Scene, SceneNode, Transform};
use crate::sky::SkyUniforms;
use crate::sun::SunAngles;
use crate::water::{WaterUniforms, WaveClock};

/// Environment layers whose scene membership the panel can toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    Sky,
    Water,
    Terrain,
}

impl Layer {
    pub const ALL: [Layer; 3] = [Layer::Sky, Layer::Water, Layer::Terrain];
}

/// Sun angles plus layer visibility, as edited through the panel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneParameters {
    pub sun_inclination: f32,
    pub sun_azimuth: f32,
    pub sky_visible: bool,
    pub water_visible: bool,
    pub terrain_visible: bool,
}

impl Default for SceneParameters {
    fn default() -> Self {
        let sun = SunAngles::default();
        Self {
            sun_inclination: sun.inclination,
            sun_azimuth: sun.azimuth,
            sky_visible: true,
            water_visible: true,
            terrain_visible: true,
        }
    }
}

impl SceneParameters {
    pub fn visible(&self, layer: Layer) -> bool {
        match layer {
            Layer::Sky => self.sky_visible,
            Layer::Water => self.water_visible,
            Layer::Terrain => self.terrain_visible,
        }
    }

    fn set_visible(&mut self, layer: Layer, visible: bool) {
        match layer {
            Layer::Sky => self.sky_visible = visible,
            Layer::Water => self.water_visible = visible,
            Layer::Terrain => self.terrain_visible = visible,
        }
    }
}

/// Lighting precomputed from the sky state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnvironmentLighting {
    /// Incremented each time the lighting is regenerated.
    pub generation: u64,
    pub sun_direction: Vec3,
    /// Direct sun color with intensity baked in (linear RGB).
    pub sun_color: Vec3,
    pub zenith_color: Vec3,
    pub horizon_color: Vec3,
    /// Average sky radiance used for image-based ambient light.
    pub ambient_color: Vec3,
}

impl Default for EnvironmentLighting {
    fn default() -> Self {
        Self {
            generation: 0,
            sun_direction: Vec3::Y,
            sun_color: Vec3::ONE,
            zenith_color: Vec3::ZERO,
            horizon_color: Vec3::ZERO,
            ambient_color: Vec3::ZERO,
        }
    }
}

/// Produces environment lighting from the current sky.
///
/// Potentially expensive: the environment model only calls it when the sun
/// angles change, never per frame.
pub trait EnvironmentBaker {
    fn bake(&mut self, sky: &SkyUniforms) -> EnvironmentLighting;
}

/// CPU baker using smooth elevation curves for sun and sky colors.
#[derive(Debug, Default)]
pub struct SkyLightBaker {
    generation: u64,
}

impl SkyLightBaker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EnvironmentBaker for SkyLightBaker {
    fn bake(&mut self, sky: &SkyUniforms) -> EnvironmentLighting {
        self.generation += 1;

        let sun = sky.sun_position().normalize_or(Vec3::Y);
        let day = sun_intensity_curve(sun);

        let warm = Vec3::new(1.0, 0.6, 0.3);
        let neutral = Vec3::new(1.0, 0.98, 0.92);
        let sun_color = warm.lerp(neutral, smoothstep(0.0, 0.5, sun.y)) * day;

        // Stronger Rayleigh scattering deepens the zenith blue.
        let rayleigh = (sky.rayleigh / 4.0).clamp(0.0, 1.0);
        let day_zenith = Vec3::new(0.25, 0.45, 0.75).lerp(Vec3::new(0.12, 0.3, 0.8), rayleigh);
        let night_zenith = Vec3::new(0.005, 0.008, 0.02);
        let zenith_color = night_zenith.lerp(day_zenith, day);

        // Turbidity washes the horizon toward haze.
        let haze = Vec3::new(0.8, 0.75, 0.65) * day.max(0.05);
        let horizon_color = zenith_color.lerp(haze, (sky.turbidity / 20.0).clamp(0.0, 1.0));

        EnvironmentLighting {
            generation: self.generation,
            sun_direction: sun,
            sun_color,
            zenith_color,
            horizon_color,
            ambient_color: (zenith_color + horizon_color) * 0.5,
        }
    }
}

/// Sun intensity from elevation: 0 below -10°, 1 above 15°.
pub fn sun_intensity_curve(sun_direction: Vec3) -> f32 {
    let low = (-10.0_f32).to_radians().sin();
    let high = (15.0_f32).to_radians().sin();
    smoothstep(low, high, sun_direction.y)
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Owns the sky, water and terrain nodes and everything derived from the sun.
pub struct EnvironmentModel {
    params: SceneParameters,
    sky: SkyUniforms,
    water: WaterUniforms,
    wave_clock: WaveClock,
    lighting: EnvironmentLighting,
    baker: Box<dyn EnvironmentBaker>,
    sky_node: NodeId,
    water_node: NodeId,
    terrain_node: NodeId,
}

impl EnvironmentModel {
    /// Spawn the environment nodes into `scene`, attach the configured layers,
    /// and place the sun.
    pub fn new(scene: &mut Scene, config: &Config, baker: Box<dyn EnvironmentBaker>) -> Self {
        let mut sky_transform = Transform::default();
        sky_transform.set_uniform_scale(config.sky.scale);
        let sky_node = scene.spawn(SceneNode::new("sky", NodeKind::Sky).with_transform(sky_transform));

        // The water plane is authored in XY; lay it flat.
        let water_transform = Transform {
            rotation: Vec3::new(-FRAC_PI_2, 0.0, 0.0),
            scale: Vec3::new(config.water.extent, config.water.extent, 1.0),
            ..Transform::default()
        };
        let water_node =
            scene.spawn(SceneNode::new("water", NodeKind::Water).with_transform(water_transform));

        let terrain_node = scene.spawn(SceneNode::new("terrain", NodeKind::Terrain));

        let mut model = Self {
            params: SceneParameters {
                sun_inclination: config.sky.inclination,
                sun_azimuth: config.sky.azimuth,
                sky_visible: false,
                water_visible: false,
                terrain_visible: false,
            },
            sky: SkyUniforms::from_config(&config.sky),
            water: WaterUniforms::from_config(&config.water),
            wave_clock: WaveClock::default(),
            lighting: EnvironmentLighting::default(),
            baker,
            sky_node,
            water_node,
            terrain_node,
        };

        model.set_visible(scene, Layer::Water, config.layers.water);
        model.set_visible(scene, Layer::Sky, config.layers.sky);
        model.set_visible(scene, Layer::Terrain, config.layers.terrain);
        model.set_sun_angles(config.sky.inclination, config.sky.azimuth);
        model
    }

    /// Recompute the sun direction, push it into both shaders, and regenerate
    /// the environment lighting. Returns the new direction.
    pub fn set_sun_angles(&mut self, inclination: f32, azimuth: f32) -> Vec3 {
        self.params.sun_inclination = inclination;
        self.params.sun_azimuth = azimuth;

        // One normalized vector for both shaders so they never disagree.
        let sun = SunAngles {
            inclination,
            azimuth,
        }
        .direction()
        .normalize();
        self.sky.sun_position = sun.to_array();
        self.water.sun_direction = sun.to_array();
        self.lighting = self.baker.bake(&self.sky);

        tracing::debug!(
            inclination,
            azimuth,
            generation = self.lighting.generation,
            "sun moved to ({:.4}, {:.4}, {:.4})",
            sun.x,
            sun.y,
            sun.z
        );
        sun
    }

    /// Attach or detach a layer's node. Idempotent in both directions.
    pub fn set_visible(&mut self, scene: &mut Scene, layer: Layer, visible: bool) {
        let node = self.node(layer);
        let changed = if visible {
            scene.add(node)
        } else {
            scene.remove(node)
        };
        self.params.set_visible(layer, visible);
        if changed {
            tracing::debug!(?layer, visible, "layer membership changed");
        }
    }

    /// Advance the water phase by `step` and push it to the water shader.
    pub fn advance_wave_clock(&mut self, step: f32) -> f32 {
        self.wave_clock.advance(step);
        self.water.time = self.wave_clock.uniform_time();
        self.water.time
    }

    pub fn set_distortion_scale(&mut self, distortion_scale: f32) {
        self.water.distortion_scale = distortion_scale;
    }

    pub fn set_water_size(&mut self, size: f32) {
        self.water.size = size;
    }

    pub fn node(&self, layer: Layer) -> NodeId {
        match layer {
            Layer::Sky => self.sky_node,
            Layer::Water => self.water_node,
            Layer::Terrain => self.terrain_node,
        }
    }

    pub fn params(&self) -> &SceneParameters {
        &self.params
    }

    pub fn sky(&self) -> &SkyUniforms {
        &self.sky
    }

    pub fn water(&self) -> &WaterUniforms {
        &self.water
    }

    pub fn wave_time(&self) -> f64 {
        self.wave_clock.time()
    }

    pub fn lighting(&self) -> &EnvironmentLighting {
        &self.lighting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_with(config: &Config) -> (Scene, EnvironmentModel) {
        let mut scene = Scene::new();
        let model = EnvironmentModel::new(&mut scene, config, Box::new(SkyLightBaker::new()));
        (scene, model)
    }

    #[test]
    fn test_sky_and_water_share_direction() {
        let (_, mut model) = model_with(&Config::default());
        for (i, a) in [(0.0, 0.0), (0.25, 0.6), (0.5, 1.0), (0.1, 0.33)] {
            let sun = model.set_sun_angles(i, a);
            assert!((sun.length() - 1.0).abs() < 1e-6);
            assert_eq!(model.sky().sun_position, model.water().sun_direction);
        }
    }

    #[test]
    fn test_sun_change_regenerates_lighting_once() {
        let (_, mut model) = model_with(&Config::default());
        let before = model.lighting().generation;
        model.set_sun_angles(0.3, 0.4);
        assert_eq!(model.lighting().generation, before + 1);
        model.advance_wave_clock(1.0 / 60.0);
        model.set_distortion_scale(5.0);
        assert_eq!(model.lighting().generation, before + 1);
    }

    #[test]
    fn test_layers_attached_per_config() {
        let mut config = Config::default();
        config.layers.terrain = false;
        let (scene, model) = model_with(&config);
        assert!(scene.contains(model.node(Layer::Sky)));
        assert!(scene.contains(model.node(Layer::Water)));
        assert!(!scene.contains(model.node(Layer::Terrain)));
        assert!(!model.params().terrain_visible);
    }

    #[test]
    fn test_set_visible_is_idempotent() {
        let (mut scene, mut model) = model_with(&Config::default());
        let sky = model.node(Layer::Sky);
        model.set_visible(&mut scene, Layer::Sky, true);
        model.set_visible(&mut scene, Layer::Sky, true);
        assert_eq!(scene.instances(sky), 1);

        model.set_visible(&mut scene, Layer::Sky, false);
        let len = scene.len();
        model.set_visible(&mut scene, Layer::Sky, false);
        assert_eq!(scene.len(), len);
        assert_eq!(scene.instances(sky), 0);
    }

    #[test]
    fn test_wave_clock_feeds_water_time() {
        let (_, mut model) = model_with(&Config::default());
        model.advance_wave_clock(0.25);
        model.advance_wave_clock(0.25);
        assert_eq!(model.water().time, 0.5);
        assert_eq!(model.wave_time(), 0.5);
    }

    #[test]
    fn test_baker_brighter_by_day() {
        let mut baker = SkyLightBaker::new();
        let mut sky = SkyUniforms::default();
        sky.sun_position = [0.0, 1.0, 0.0];
        let noon = baker.bake(&sky);
        sky.sun_position = [0.0, -1.0, 0.0];
        let night = baker.bake(&sky);
        assert!(noon.ambient_color.length() > night.ambient_color.length());
        assert_eq!(night.sun_color, Vec3::ZERO);
        assert_eq!(night.generation, 2);
    }

    #[test]
    fn test_water_plane_lies_flat() {
        let (scene, model) = model_with(&Config::default());
        let water = scene.node(model.node(Layer::Water)).unwrap();
        let up = water.transform.matrix().transform_vector3(Vec3::Z).normalize();
        assert!((up - Vec3::Y).length() < 1e-5);
    }
}
