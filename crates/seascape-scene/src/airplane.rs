//! Airplane actor: the loaded model node, its transform, and its spin.
//!
//! The model arrives asynchronously, so the node reference starts unset and
//! may stay unset forever if the load fails. Every mutator checks for it and
//! turns into a silent no-op while it is missing.

use glam::Vec3;
use seascape_config::AirplaneConfig;

use crate::graph::{NodeId, NodeKind, Scene, SceneNode, Transform};
use crate::loader::ModelAsset;
use crate::panel::EditOutcome;

/// World axis selector for per-axis position edits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Snapshot of the actor's user-facing state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AirplaneState {
    pub rotation_enabled: bool,
    pub position: Vec3,
    pub scale: f32,
}

#[derive(Debug)]
pub struct AirplaneActor {
    node: Option<NodeId>,
    rotation_enabled: bool,
    position: Vec3,
    scale: f32,
    base_scale: f32,
    /// Radians per second about +Y.
    angular_rate: f32,
}

impl AirplaneActor {
    pub fn new(config: &AirplaneConfig) -> Self {
        Self {
            node: None,
            rotation_enabled: config.rotation_enabled,
            position: Vec3::from_array(config.position),
            scale: config.scale,
            base_scale: config.base_scale,
            angular_rate: config.angular_rate,
        }
    }

    /// Spawn the loaded model into the scene with the stored transform.
    ///
    /// A second attach replaces the first model.
    pub fn attach(&mut self, scene: &mut Scene, asset: &ModelAsset) -> NodeId {
        if let Some(previous) = self.node.take() {
            tracing::warn!(node = previous.index(), "replacing previously attached airplane");
            scene.remove(previous);
        }

        let mut transform = Transform::from_position(self.position);
        transform.set_uniform_scale(self.scale * self.base_scale);
        let node = scene.spawn_attached(
            SceneNode::new(asset.name(), NodeKind::Model {
                source: asset.source.clone(),
                byte_len: asset.bytes.len(),
            })
            .with_transform(transform),
        );
        self.node = Some(node);
        tracing::info!(node = node.index(), source = %asset.source.display(), "airplane attached");
        node
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn is_attached(&self) -> bool {
        self.node.is_some()
    }

    /// Spin about the vertical axis by `delta_seconds * angular_rate`. Yaw is
    /// kept in `[0, 2π)`.
    ///
    /// Returns `true` if the node rotated.
    pub fn tick(&mut self, scene: &mut Scene, delta_seconds: f32) -> bool {
        if !self.rotation_enabled {
            return false;
        }
        let Some(node) = self.node_mut(scene) else {
            return false;
        };
        let yaw = node.transform.rotation.y + delta_seconds * self.angular_rate;
        node.transform.rotation.y = yaw.rem_euclid(std::f32::consts::TAU);
        true
    }

    pub fn set_rotation_enabled(&mut self, enabled: bool) -> EditOutcome {
        if self.node.is_none() {
            tracing::trace!("airplane not loaded, ignoring rotation toggle");
            return EditOutcome::Skipped;
        }
        self.rotation_enabled = enabled;
        EditOutcome::Applied
    }

    pub fn set_position_axis(&mut self, scene: &mut Scene, axis: Axis, value: f32) -> EditOutcome {
        let Some(node) = self.node_mut(scene) else {
            tracing::trace!(?axis, "airplane not loaded, ignoring position edit");
            return EditOutcome::Skipped;
        };
        match axis {
            Axis::X => node.transform.position.x = value,
            Axis::Y => node.transform.position.y = value,
            Axis::Z => node.transform.position.z = value,
        }
        self.position = node.transform.position;
        EditOutcome::Applied
    }

    /// Set the user scale; the node receives `scale * base_scale`.
    pub fn set_scale(&mut self, scene: &mut Scene, scale: f32) -> EditOutcome {
        let base = self.base_scale;
        let Some(node) = self.node_mut(scene) else {
            tracing::trace!("airplane not loaded, ignoring scale edit");
            return EditOutcome::Skipped;
        };
        node.transform.set_uniform_scale(scale * base);
        self.scale = scale;
        EditOutcome::Applied
    }

    /// Current yaw in radians, if attached.
    pub fn yaw(&self, scene: &Scene) -> Option<f32> {
        self.node
            .and_then(|id| scene.node(id))
            .map(|node| node.transform.rotation.y)
    }

    pub fn state(&self) -> AirplaneState {
        AirplaneState {
            rotation_enabled: self.rotation_enabled,
            position: self.position,
            scale: self.scale,
        }
    }

    fn node_mut<'a>(&self, scene: &'a mut Scene) -> Option<&'a mut SceneNode> {
        self.node.and_then(|id| scene.node_mut(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn asset() -> ModelAsset {
        ModelAsset {
            source: PathBuf::from("resources/A380/scene.gltf"),
            bytes: vec![0u8; 16],
        }
    }

    fn attached() -> (Scene, AirplaneActor) {
        let mut scene = Scene::new();
        let mut actor = AirplaneActor::new(&AirplaneConfig::default());
        actor.attach(&mut scene, &asset());
        (scene, actor)
    }

    #[test]
    fn test_attach_applies_stored_transform() {
        let (scene, actor) = attached();
        let node = scene.node(actor.node().unwrap()).unwrap();
        assert_eq!(node.transform.position, Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(node.transform.scale, Vec3::splat(0.015));
        assert_eq!(node.name, "scene");
    }

    #[test]
    fn test_tick_disabled_leaves_rotation() {
        let (mut scene, mut actor) = attached();
        actor.set_rotation_enabled(false);
        for delta in [0.0, 0.016, 1.0, 30.0] {
            assert!(!actor.tick(&mut scene, delta));
        }
        assert_eq!(actor.yaw(&scene), Some(0.0));
    }

    #[test]
    fn test_tick_proportional_to_delta() {
        let (mut scene, mut actor) = attached();
        actor.tick(&mut scene, 0.2);
        let after_one = actor.yaw(&scene).unwrap();
        assert!((after_one - 0.1).abs() < 1e-6);

        actor.tick(&mut scene, 0.3);
        let sequential = actor.yaw(&scene).unwrap();

        let (mut scene2, mut actor2) = attached();
        actor2.tick(&mut scene2, 0.5);
        let combined = actor2.yaw(&scene2).unwrap();
        assert!(sequential > after_one);
        assert!((sequential - combined).abs() < 1e-6);
    }

    #[test]
    fn test_yaw_wraps_within_one_turn() {
        let (mut scene, mut actor) = attached();
        for _ in 0..100_000 {
            actor.tick(&mut scene, 0.25);
        }
        let yaw = actor.yaw(&scene).unwrap();
        assert!((0.0..std::f32::consts::TAU).contains(&yaw), "yaw {yaw}");

        // Resolution near the wrap point is the same as at the start.
        let before = yaw;
        actor.tick(&mut scene, 0.002);
        let step = (actor.yaw(&scene).unwrap() - before).rem_euclid(std::f32::consts::TAU);
        assert!((step - 0.001).abs() < 1e-5, "step {step}");
    }

    #[test]
    fn test_edits_before_attach_are_skipped() {
        let mut scene = Scene::new();
        let mut actor = AirplaneActor::new(&AirplaneConfig::default());
        let before = actor.state();

        assert_eq!(actor.set_rotation_enabled(false), EditOutcome::Skipped);
        assert_eq!(
            actor.set_position_axis(&mut scene, Axis::X, 12.0),
            EditOutcome::Skipped
        );
        assert_eq!(actor.set_scale(&mut scene, 2.0), EditOutcome::Skipped);
        assert!(!actor.tick(&mut scene, 1.0));

        assert_eq!(actor.state(), before);
        assert_eq!(scene.node_count(), 0);
    }

    #[test]
    fn test_scale_multiplies_base() {
        let (mut scene, mut actor) = attached();
        assert_eq!(actor.set_scale(&mut scene, 2.0), EditOutcome::Applied);
        let node = scene.node(actor.node().unwrap()).unwrap();
        assert!((node.transform.scale.x - 0.03).abs() < 1e-7);
        assert_eq!(actor.state().scale, 2.0);
    }

    #[test]
    fn test_position_axis_edit() {
        let (mut scene, mut actor) = attached();
        actor.set_position_axis(&mut scene, Axis::Z, -20.0);
        let node = scene.node(actor.node().unwrap()).unwrap();
        assert_eq!(node.transform.position, Vec3::new(0.0, 5.0, -20.0));
        assert_eq!(actor.state().position.z, -20.0);
    }

    #[test]
    fn test_reattach_replaces_model() {
        let (mut scene, mut actor) = attached();
        let first = actor.node().unwrap();
        let second = actor.attach(&mut scene, &asset());
        assert_ne!(first, second);
        assert!(!scene.contains(first));
        assert!(scene.contains(second));
    }
}
