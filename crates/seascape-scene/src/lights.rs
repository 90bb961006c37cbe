//! Light rig: one ambient light and one point light with a helper marker.
//!
//! Setters apply immediately and do no validation; the panel's slider bounds
//! are the only guard on their inputs.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use seascape_config::LightingConfig;

use crate::color::Rgb;
use crate::graph::{NodeId, NodeKind, Scene, SceneNode, Transform};

/// Uniform light that fills the whole scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmbientLight {
    pub color: Rgb,
    pub intensity: f32,
}

/// Omnidirectional light at a position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub color: Rgb,
    pub intensity: f32,
    /// Distance falloff exponent; 2 is physically based.
    pub decay: f32,
    /// Cutoff distance; 0 means the light reaches everywhere.
    pub range: f32,
    pub position: Vec3,
}

/// GPU uniform for the light rig, 64 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct LightUniforms {
    /// xyz = ambient color (linear), w = intensity.
    pub ambient: [f32; 4],
    /// xyz = point position, w = range.
    pub point_position_range: [f32; 4],
    /// xyz = point color (linear), w = intensity.
    pub point_color_intensity: [f32; 4],
    /// x = decay.
    pub point_decay: [f32; 4],
}

/// Ambient and point light plus their scene nodes.
#[derive(Debug)]
pub struct LightRig {
    ambient: AmbientLight,
    point: PointLight,
    ambient_node: NodeId,
    point_node: NodeId,
    helper_node: Option<NodeId>,
}

impl LightRig {
    /// Spawn and attach the light nodes described by `config`.
    pub fn new(scene: &mut Scene, config: &LightingConfig) -> Self {
        let position = Vec3::from_array(config.point_position);

        let ambient_node = scene.spawn_attached(SceneNode::new("ambient", NodeKind::AmbientLight));
        let point_node = scene.spawn_attached(
            SceneNode::new("point", NodeKind::PointLight)
                .with_transform(Transform::from_position(position)),
        );
        let helper_node = config.show_point_helper.then(|| {
            scene.spawn_attached(
                SceneNode::new("point-helper", NodeKind::LightHelper)
                    .with_transform(Transform::from_position(position)),
            )
        });

        Self {
            ambient: AmbientLight {
                color: Rgb::from_hex(config.ambient_color),
                intensity: config.ambient_intensity,
            },
            point: PointLight {
                color: Rgb::from_hex(config.point_color),
                intensity: config.point_intensity,
                decay: config.point_decay,
                range: config.point_range,
                position,
            },
            ambient_node,
            point_node,
            helper_node,
        }
    }

    pub fn set_ambient(&mut self, color: Rgb, intensity: f32) {
        self.ambient = AmbientLight { color, intensity };
    }

    pub fn set_point(&mut self, color: Rgb, intensity: f32, decay: f32, range: f32) {
        self.point.color = color;
        self.point.intensity = intensity;
        self.point.decay = decay;
        self.point.range = range;
    }

    pub fn set_ambient_color(&mut self, color: Rgb) {
        self.ambient.color = color;
    }

    pub fn set_ambient_intensity(&mut self, intensity: f32) {
        self.ambient.intensity = intensity;
    }

    pub fn set_point_color(&mut self, color: Rgb) {
        self.point.color = color;
    }

    pub fn set_point_intensity(&mut self, intensity: f32) {
        self.point.intensity = intensity;
    }

    pub fn set_point_decay(&mut self, decay: f32) {
        self.point.decay = decay;
    }

    pub fn set_point_range(&mut self, range: f32) {
        self.point.range = range;
    }

    pub fn ambient(&self) -> &AmbientLight {
        &self.ambient
    }

    pub fn point(&self) -> &PointLight {
        &self.point
    }

    pub fn ambient_node(&self) -> NodeId {
        self.ambient_node
    }

    pub fn point_node(&self) -> NodeId {
        self.point_node
    }

    pub fn helper_node(&self) -> Option<NodeId> {
        self.helper_node
    }

    pub fn to_uniform(&self) -> LightUniforms {
        let ambient = self.ambient.color.to_linear();
        let point = self.point.color.to_linear();
        let p = self.point.position;
        LightUniforms {
            ambient: [ambient.x, ambient.y, ambient.z, self.ambient.intensity],
            point_position_range: [p.x, p.y, p.z, self.point.range],
            point_color_intensity: [point.x, point.y, point.z, self.point.intensity],
            point_decay: [self.point.decay, 0.0, 0.0, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> (Scene, LightRig) {
        let mut scene = Scene::new();
        let rig = LightRig::new(&mut scene, &LightingConfig::default());
        (scene, rig)
    }

    #[test]
    fn test_defaults_from_config() {
        let (scene, rig) = rig();
        assert_eq!(rig.ambient().color, Rgb::from_hex(0xffffff));
        assert_eq!(rig.ambient().intensity, 0.001);
        assert_eq!(rig.point().color, Rgb::from_hex(0x097969));
        assert_eq!(rig.point().position, Vec3::new(-15.0, 10.0, 5.0));
        assert!(scene.contains(rig.point_node()));
        assert!(scene.contains(rig.helper_node().unwrap()));
    }

    #[test]
    fn test_helper_optional() {
        let mut scene = Scene::new();
        let config = LightingConfig {
            show_point_helper: false,
            ..LightingConfig::default()
        };
        let rig = LightRig::new(&mut scene, &config);
        assert!(rig.helper_node().is_none());
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn test_set_point_is_immediate() {
        let (_, mut rig) = rig();
        rig.set_point(Rgb::from_hex(0xff0000), 1.5, 1.0, 40.0);
        let point = rig.point();
        assert_eq!(point.color.to_hex(), 0xff0000);
        assert_eq!((point.intensity, point.decay, point.range), (1.5, 1.0, 40.0));
        let uniform = rig.to_uniform();
        assert_eq!(uniform.point_position_range[3], 40.0);
        assert_eq!(uniform.point_color_intensity[3], 1.5);
    }

    #[test]
    fn test_set_ambient_unvalidated() {
        let (_, mut rig) = rig();
        rig.set_ambient(Rgb::BLACK, 7.0);
        assert_eq!(rig.ambient().intensity, 7.0);
    }

    #[test]
    fn test_uniform_size() {
        assert_eq!(std::mem::size_of::<LightUniforms>(), 64);
    }
}
