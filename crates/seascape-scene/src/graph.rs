//! Retained scene graph.
//!
//! Nodes live in a store keyed by [`NodeId`] for as long as the process runs;
//! what the renderer draws is the ordered root membership list. Attaching and
//! detaching are idempotent, so layer toggles can be replayed freely.

use std::path::PathBuf;

use glam::{EulerRot, Mat4, Quat, Vec3};
use rustc_hash::FxHashMap;

/// Handle to a node in a [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// What a node renders as. The renderer decides how to draw each kind.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// Procedural sky dome.
    Sky,
    /// Animated water plane.
    Water,
    /// Ground terrain patch.
    Terrain,
    /// A loaded model; the payload stays opaque to the core.
    Model { source: PathBuf, byte_len: usize },
    /// Scene-wide ambient light.
    AmbientLight,
    /// Point light.
    PointLight,
    /// Wireframe marker drawn at a point light.
    LightHelper,
}

/// Local transform of a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in radians, applied X then Y then Z.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn set_uniform_scale(&mut self, s: f32) {
        self.scale = Vec3::splat(s);
    }

    /// Model matrix `T * R * S`.
    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.position)
    }
}

/// A renderable node.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    pub transform: Transform,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            transform: Transform::default(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}

/// Node store plus the root membership list traversed by the renderer.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: FxHashMap<NodeId, SceneNode>,
    attached: Vec<NodeId>,
    next_id: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a node without attaching it.
    pub fn spawn(&mut self, node: SceneNode) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    /// Store a node and attach it in one step.
    pub fn spawn_attached(&mut self, node: SceneNode) -> NodeId {
        let id = self.spawn(node);
        self.add(id);
        id
    }

    /// Attach a stored node to the root. Returns `true` if membership changed.
    ///
    /// Adding an attached node, or an id this scene never issued, is a no-op.
    pub fn add(&mut self, id: NodeId) -> bool {
        if !self.nodes.contains_key(&id) {
            tracing::debug!(node = id.0, "ignoring add of unknown node");
            return false;
        }
        if self.attached.contains(&id) {
            return false;
        }
        self.attached.push(id);
        true
    }

    /// Detach a node from the root. Returns `true` if membership changed.
    pub fn remove(&mut self, id: NodeId) -> bool {
        match self.attached.iter().position(|&a| a == id) {
            Some(pos) => {
                self.attached.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.attached.contains(&id)
    }

    /// How many times `id` appears in the root list (0 or 1).
    pub fn instances(&self, id: NodeId) -> usize {
        self.attached.iter().filter(|&&a| a == id).count()
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(&id)
    }

    /// Attached nodes in insertion order.
    pub fn attached(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> + '_ {
        self.attached
            .iter()
            .filter_map(move |id| self.nodes.get(id).map(|node| (*id, node)))
    }

    /// Number of attached nodes.
    pub fn len(&self) -> usize {
        self.attached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }

    /// Number of stored nodes, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
