//! Scene graph input types.
//!
//! A [`Scene`] is a forest of [`SceneNode`]s, each with a local transform and
//! optionally a [`Geometry`] and [`Material`]. The exporter only reads from the
//! scene, except for computing missing normals on geometry it exports.

mod geometry;
mod material;

pub use geometry::{Geometry, IndexBuffer};
pub use material::{Material, Side};

use crate::error::{ExportError, Result};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Local transform of a node, relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub position: Vec3,
    /// Rotation as a unit quaternion, serialized as `[x, y, z, w]`.
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }
}

/// What a node represents in the source scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A renderable mesh.
    #[default]
    Mesh,
    /// A transform-only grouping node.
    Group,
}

/// A node in the scene tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub kind: NodeKind,
    #[serde(flatten)]
    pub transform: Transform,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<Material>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// Create a mesh node.
    pub fn mesh(geometry: Geometry, material: Material) -> Self {
        Self {
            kind: NodeKind::Mesh,
            geometry: Some(geometry),
            material: Some(material),
            ..Default::default()
        }
    }

    /// Create an empty group node.
    pub fn group() -> Self {
        Self {
            kind: NodeKind::Group,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn is_mesh(&self) -> bool {
        self.kind == NodeKind::Mesh
    }

    /// The node name, treating an empty name as absent.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    /// Whether the exporter will emit this node.
    pub fn is_exportable(&self) -> bool {
        self.is_mesh()
            && self
                .geometry
                .as_ref()
                .is_some_and(|g| g.position_attribute().is_some())
    }
}

/// A scene: the roots of the node forest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub nodes: Vec<SceneNode>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, node: SceneNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Depth-first, pre-order walk over every node.
    pub fn traverse(&self) -> Traverse<'_> {
        Traverse {
            stack: self.nodes.iter().rev().collect(),
        }
    }

    /// Visit every node mutably in the same order as [`Scene::traverse`].
    pub fn for_each_node_mut(&mut self, mut f: impl FnMut(&mut SceneNode)) {
        let mut stack: Vec<&mut SceneNode> = self.nodes.iter_mut().rev().collect();
        while let Some(node) = stack.pop() {
            f(&mut *node);
            stack.extend(node.children.iter_mut().rev());
        }
    }

    /// Compute normals on every exportable geometry that lacks them.
    pub fn ensure_normals(&mut self) {
        self.for_each_node_mut(|node| {
            if node.is_mesh() {
                if let Some(geometry) = node.geometry.as_mut() {
                    geometry.ensure_normals();
                }
            }
        });
    }

    /// Number of nodes in the whole tree.
    pub fn node_count(&self) -> usize {
        self.traverse().count()
    }
}

/// Iterator returned by [`Scene::traverse`].
pub struct Traverse<'a> {
    stack: Vec<&'a SceneNode>,
}

impl<'a> Iterator for Traverse<'a> {
    type Item = &'a SceneNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Load a scene description from JSON bytes.
///
/// A JSON `null` document means there is no scene to export.
pub fn load_from_bytes(data: &[u8]) -> Result<Scene> {
    let scene: Option<Scene> = serde_json::from_slice(data)?;
    scene.ok_or(ExportError::MissingScene)
}

/// Load a scene description from a JSON file.
pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Scene> {
    let data = std::fs::read(path)?;
    load_from_bytes(&data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> SceneNode {
        SceneNode::group().with_name(name)
    }

    #[test]
    fn test_traverse_is_pre_order() {
        let scene = Scene::new()
            .with_node(named("a").with_child(named("a1")).with_child(named("a2")))
            .with_node(named("b").with_child(named("b1").with_child(named("b1x"))));

        let names: Vec<_> = scene.traverse().filter_map(|n| n.display_name()).collect();
        assert_eq!(names, vec!["a", "a1", "a2", "b", "b1", "b1x"]);
        assert_eq!(scene.node_count(), 6);
    }

    #[test]
    fn test_for_each_node_mut_matches_traverse() {
        let mut scene = Scene::new()
            .with_node(named("a").with_child(named("a1")))
            .with_node(named("b"));

        let mut visited = Vec::new();
        scene.for_each_node_mut(|n| visited.push(n.name.clone().unwrap_or_default()));
        assert_eq!(visited, vec!["a", "a1", "b"]);
    }

    #[test]
    fn test_ensure_normals_skips_groups() {
        let geometry = Geometry::new(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        let mut group = SceneNode::group();
        group.geometry = Some(geometry.clone());
        let mut scene = Scene::new()
            .with_node(group.with_child(SceneNode::mesh(geometry, Material::new())));

        scene.ensure_normals();

        assert!(scene.nodes[0].geometry.as_ref().unwrap().normals.is_none());
        assert!(scene.nodes[0].children[0].geometry.as_ref().unwrap().normals.is_some());
    }

    #[test]
    fn test_exportable_requires_positions() {
        assert!(!SceneNode::group().is_exportable());
        assert!(!SceneNode::mesh(Geometry::default(), Material::new()).is_exportable());
        assert!(!SceneNode::mesh(Geometry::new(vec![]), Material::new()).is_exportable());
        assert!(SceneNode::mesh(Geometry::new(vec![[0.0; 3]]), Material::new()).is_exportable());
    }

    #[test]
    fn test_empty_name_is_absent() {
        assert_eq!(named("").display_name(), None);
        assert_eq!(named("Desk").display_name(), Some("Desk"));
    }

    #[test]
    fn test_load_scene_json() {
        let json = br#"{
            "nodes": [{
                "name": "Monitor",
                "position": [0.0, 1.0, 0.0],
                "rotation": [0.0, 0.0, 0.0, 1.0],
                "geometry": {
                    "positions": [[0, 0, 0], [1, 0, 0], [0, 1, 0]],
                    "indices": { "u16": [0, 1, 2] }
                },
                "material": { "color": [0.2, 0.2, 0.2] },
                "children": [{ "kind": "group" }]
            }]
        }"#;

        let scene = load_from_bytes(json).unwrap();
        let node = &scene.nodes[0];
        assert_eq!(node.display_name(), Some("Monitor"));
        assert_eq!(node.transform.position, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(node.transform.scale, Vec3::ONE);
        assert_eq!(
            node.geometry.as_ref().unwrap().indices,
            Some(IndexBuffer::U16(vec![0, 1, 2]))
        );
        assert_eq!(node.children[0].kind, NodeKind::Group);
    }

    #[test]
    fn test_null_scene_is_missing() {
        let result = load_from_bytes(b"null");
        assert!(matches!(result, Err(ExportError::MissingScene)));
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        std::fs::write(&path, r#"{"nodes": []}"#).unwrap();

        let scene = load_from_path(&path).unwrap();
        assert!(scene.nodes.is_empty());
        assert!(load_from_path(dir.path().join("missing.json")).is_err());
    }
}
