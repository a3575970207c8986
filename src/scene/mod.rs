//! Scene graph.
//!
//! Nodes live in a flat arena owned by [`Scene`]; parent/child links are
//! indices into it. There is no global registry, the scene handed to the
//! renderer is the only place a node exists.

pub mod camera;
pub mod compose;
pub mod light;
pub mod mesh;

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::gfx::math::Color;
use crate::timeline::Pose;
use camera::Camera;
use light::{EnvironmentPreset, Light};
use mesh::MeshData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeIndex(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(usize);

impl MeshId {
    /// Position in [`Scene::meshes`].
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub pose: Pose,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            pose: Pose::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn local_matrix(&self) -> Mat4 {
        let r = self.pose.rotation;
        Mat4::from_scale_rotation_translation(
            self.scale,
            Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z),
            self.pose.position,
        )
    }
}

/// A page region whose children are driven by scroll progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRegion {
    pub pages: f32,
    pub damping: f32,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Group,
    Mesh(MeshId),
    Camera(Camera),
    Light(Light),
    ScrollRegion(ScrollRegion),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    parent: Option<NodeIndex>,
    children: Vec<NodeIndex>,
    world: Mat4,
}

impl Node {
    pub fn new(name: &str, kind: NodeKind) -> Self {
        Self {
            name: name.to_string(),
            transform: Transform::default(),
            kind,
            parent: None,
            children: Vec::new(),
            world: Mat4::IDENTITY,
        }
    }

    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    /// World matrix as of the last [`Scene::update_world_matrices`].
    pub fn world_matrix(&self) -> Mat4 {
        self.world
    }

    pub fn world_position(&self) -> Vec3 {
        self.world.w_axis.truncate()
    }
}

#[derive(Debug, Default)]
pub struct Scene {
    nodes: Vec<Node>,
    roots: Vec<NodeIndex>,
    meshes: Vec<MeshData>,
    pub environment: Option<EnvironmentPreset>,
    pub background: Option<Color>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build_node(&mut self, name: &str) -> NodeBuilder<'_> {
        NodeBuilder::new(self, name)
    }

    pub fn add_node(&mut self, node: Node) -> NodeIndex {
        let idx = NodeIndex(self.nodes.len());
        self.nodes.push(node);
        self.roots.push(idx);
        idx
    }

    pub fn add_to_parent(&mut self, node: Node, parent: NodeIndex) -> NodeIndex {
        let idx = self.add_node(node);
        self.attach(idx, parent);
        idx
    }

    /// Moves `child` under `parent`, detaching it from its previous parent.
    /// Attaching a node to itself or to one of its descendants is ignored.
    pub fn attach(&mut self, child: NodeIndex, parent: NodeIndex) {
        if child == parent || self.is_ancestor(child, parent) {
            return;
        }
        if self.nodes.get(child.0).is_none() || self.nodes.get(parent.0).is_none() {
            return;
        }

        match self.nodes[child.0].parent {
            Some(old) => self.nodes[old.0].children.retain(|c| *c != child),
            None => self.roots.retain(|r| *r != child),
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn is_ancestor(&self, ancestor: NodeIndex, node: NodeIndex) -> bool {
        let mut cursor = self.nodes.get(node.0).and_then(|n| n.parent);
        while let Some(idx) = cursor {
            if idx == ancestor {
                return true;
            }
            cursor = self.nodes[idx.0].parent;
        }
        false
    }

    pub fn node(&self, idx: NodeIndex) -> Option<&Node> {
        self.nodes.get(idx.0)
    }

    pub fn node_mut(&mut self, idx: NodeIndex) -> Option<&mut Node> {
        self.nodes.get_mut(idx.0)
    }

    pub fn roots(&self) -> &[NodeIndex] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<NodeIndex> {
        self.nodes.iter().position(|n| n.name == name).map(NodeIndex)
    }

    pub fn add_mesh(&mut self, mesh: MeshData) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    pub fn mesh(&self, id: MeshId) -> Option<&MeshData> {
        self.meshes.get(id.0)
    }

    pub fn meshes(&self) -> &[MeshData] {
        &self.meshes
    }

    pub fn update_world_matrices(&mut self) {
        let mut stack: Vec<(NodeIndex, Mat4)> =
            self.roots.iter().rev().map(|r| (*r, Mat4::IDENTITY)).collect();

        while let Some((idx, parent_world)) = stack.pop() {
            let node = &mut self.nodes[idx.0];
            node.world = parent_world * node.transform.local_matrix();
            let world = node.world;
            stack.extend(node.children.iter().rev().map(|c| (*c, world)));
        }
    }

    /// Mesh nodes with their world matrices.
    pub fn mesh_instances(&self) -> impl Iterator<Item = (Mat4, MeshId)> + '_ {
        self.nodes.iter().filter_map(|n| match n.kind {
            NodeKind::Mesh(id) => Some((n.world, id)),
            _ => None,
        })
    }

    pub fn lights(&self) -> impl Iterator<Item = (&Node, &Light)> + '_ {
        self.nodes.iter().filter_map(|n| match &n.kind {
            NodeKind::Light(light) => Some((n, light)),
            _ => None,
        })
    }

    /// First camera in the scene.
    pub fn camera(&self) -> Option<(&Node, &Camera)> {
        self.nodes.iter().find_map(|n| match &n.kind {
            NodeKind::Camera(camera) => Some((n, camera)),
            _ => None,
        })
    }

    pub fn scroll_region(&self) -> Option<(NodeIndex, ScrollRegion)> {
        self.nodes.iter().enumerate().find_map(|(i, n)| match n.kind {
            NodeKind::ScrollRegion(region) => Some((NodeIndex(i), region)),
            _ => None,
        })
    }
}

pub struct NodeBuilder<'a> {
    scene: &'a mut Scene,
    node: Node,
    parent: Option<NodeIndex>,
}

impl<'a> NodeBuilder<'a> {
    pub fn new(scene: &'a mut Scene, name: &str) -> Self {
        Self {
            scene,
            node: Node::new(name, NodeKind::Group),
            parent: None,
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.node.transform.pose.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.node.transform.pose.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.node.transform.scale = scale;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.node.transform = transform;
        self
    }

    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.node.kind = kind;
        self
    }

    pub fn with_parent(mut self, parent: NodeIndex) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn build(self) -> NodeIndex {
        match self.parent {
            Some(parent) => self.scene.add_to_parent(self.node, parent),
            None => self.scene.add_node(self.node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_vec(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn world_matrices_compose_parent_first() {
        let mut scene = Scene::new();
        let parent = scene
            .build_node("parent")
            .with_position(Vec3::new(1.0, 0.0, 0.0))
            .with_scale(Vec3::splat(2.0))
            .build();
        let child = scene
            .build_node("child")
            .with_position(Vec3::new(0.0, 1.0, 0.0))
            .with_parent(parent)
            .build();

        scene.update_world_matrices();

        let pos = scene.node(child).unwrap().world_position();
        assert!(approx_vec(pos, Vec3::new(1.0, 2.0, 0.0)), "{pos:?}");
        assert_eq!(scene.roots(), &[parent]);
    }

    #[test]
    fn rotation_applies_to_children() {
        let mut scene = Scene::new();
        let parent = scene
            .build_node("spin")
            .with_rotation(Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0))
            .build();
        let child = scene
            .build_node("arm")
            .with_position(Vec3::new(1.0, 0.0, 0.0))
            .with_parent(parent)
            .build();
        scene.update_world_matrices();

        let pos = scene.node(child).unwrap().world_position();
        assert!(approx_vec(pos, Vec3::new(0.0, 0.0, -1.0)), "{pos:?}");
    }

    #[test]
    fn attach_rejects_cycles() {
        let mut scene = Scene::new();
        let a = scene.build_node("a").build();
        let b = scene.build_node("b").with_parent(a).build();
        scene.attach(a, b);
        assert_eq!(scene.node(a).unwrap().parent(), None);
        assert_eq!(scene.node(b).unwrap().parent(), Some(a));
    }

    #[test]
    fn reattach_moves_child() {
        let mut scene = Scene::new();
        let a = scene.build_node("a").build();
        let b = scene.build_node("b").build();
        let c = scene.build_node("c").with_parent(a).build();
        scene.attach(c, b);
        assert!(scene.node(a).unwrap().children().is_empty());
        assert_eq!(scene.node(b).unwrap().children(), &[c]);
        assert_eq!(scene.find("c"), Some(c));
    }
}
