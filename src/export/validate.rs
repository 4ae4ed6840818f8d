//! Structural checks on glTF documents.
//!
//! Only a handful of properties are checked: the asset version, the presence
//! of scenes and a default scene, and the bounds of scene-to-node and
//! node-to-mesh references. Accessor, buffer view and material references,
//! numeric ranges and buffer lengths are not checked. An empty result means
//! the document passed these checks, not that it conforms to glTF.

use gltf_json as json;
use serde_json::Value;
use thiserror::Error;

/// A structural problem found in a glTF document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    #[error("Missing required asset.version")]
    MissingAssetVersion,

    #[error("No scenes defined")]
    NoScenes,

    #[error("No default scene specified")]
    NoDefaultScene,

    #[error("Scene {scene} references invalid node {node}")]
    InvalidSceneNode { scene: usize, node: Value },

    #[error("Node {node} references invalid mesh {mesh}")]
    InvalidNodeMesh { node: usize, mesh: Value },

    /// The document could not be turned into JSON at all.
    #[error("Document is not valid JSON: {0}")]
    Unreadable(String),
}

/// Validate a document built in memory.
pub fn validate(root: &json::Root) -> Vec<ValidationIssue> {
    match serde_json::to_value(root) {
        Ok(value) => validate_value(&value),
        Err(e) => vec![ValidationIssue::Unreadable(e.to_string())],
    }
}

/// Validate glTF JSON text.
pub fn validate_slice(data: &[u8]) -> Vec<ValidationIssue> {
    match serde_json::from_slice::<Value>(data) {
        Ok(value) => validate_value(&value),
        Err(e) => vec![ValidationIssue::Unreadable(e.to_string())],
    }
}

/// Validate a parsed JSON document from any source.
///
/// Every check runs; issues are reported in check order.
pub fn validate_value(doc: &Value) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let has_version = doc["asset"]["version"]
        .as_str()
        .is_some_and(|v| !v.is_empty());
    if !has_version {
        issues.push(ValidationIssue::MissingAssetVersion);
    }

    let scenes = array(doc, "scenes");
    if scenes.is_empty() {
        issues.push(ValidationIssue::NoScenes);
    }

    if doc.get("scene").map_or(true, Value::is_null) {
        issues.push(ValidationIssue::NoDefaultScene);
    }

    let nodes = array(doc, "nodes");
    for (scene_index, scene) in scenes.iter().enumerate() {
        for node in array(scene, "nodes") {
            if !in_bounds(node, nodes.len()) {
                issues.push(ValidationIssue::InvalidSceneNode {
                    scene: scene_index,
                    node: node.clone(),
                });
            }
        }
    }

    let mesh_count = array(doc, "meshes").len();
    for (node_index, node) in nodes.iter().enumerate() {
        match node.get("mesh") {
            Some(mesh) if !mesh.is_null() && !in_bounds(mesh, mesh_count) => {
                issues.push(ValidationIssue::InvalidNodeMesh {
                    node: node_index,
                    mesh: mesh.clone(),
                });
            }
            _ => {}
        }
    }

    issues
}

/// The array under `key`, or an empty slice if absent or not an array.
fn array<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Whether `index` is a non-negative integer below `len`.
fn in_bounds(index: &Value, len: usize) -> bool {
    index.as_u64().is_some_and(|i| i < len as u64)
}
