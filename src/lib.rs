//! # Scene GLB
//!
//! A Rust library for exporting 3D scene graphs as binary glTF (GLB).
//!
//! ## Overview
//!
//! The exporter walks a [`Scene`], writes every mesh node's positions, normals
//! and indices into a single binary buffer, describes them in a glTF document
//! and packs both into a GLB container. A small structural validator checks
//! glTF documents from any source.
//!
//! ## Quick Start
//!
//! ```ignore
//! use scene_glb::{load_scene, export_glb, ExportConfig};
//!
//! // Load a scene description
//! let mut scene = load_scene("path/to/scene.json")?;
//!
//! // Export to GLB
//! let glb_bytes = export_glb(&mut scene, &ExportConfig::default())?;
//! ```
//!
//! ## Building scenes in code
//!
//! ```ignore
//! use scene_glb::{Geometry, IndexBuffer, Material, Scene, SceneNode};
//!
//! let triangle = Geometry::new(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
//!     .with_indices(IndexBuffer::U16(vec![0, 1, 2]));
//! let mut scene = Scene::new()
//!     .with_node(SceneNode::mesh(triangle, Material::new()).with_name("Triangle"));
//! ```

pub mod error;
pub mod scene;
pub mod export;

// Re-export main types for convenience
pub use error::{ExportError, Result};
pub use scene::{Geometry, IndexBuffer, Material, NodeKind, Scene, SceneNode, Side, Transform};
pub use export::{
    build_document, export_glb, export_glb_to_path, parse_glb, serialize_glb, validate,
    validate_slice, validate_value, BuiltDocument, DocumentBuilder, ExportConfig, GlbContainer,
    ValidationIssue, DEFAULT_FILE_NAME, GLB_MIME_TYPE,
};

/// Load a scene description from a JSON file.
pub fn load_scene<P: AsRef<std::path::Path>>(path: P) -> Result<Scene> {
    scene::load_from_path(path)
}

/// Load a scene description from JSON bytes (for WASM compatibility).
pub fn load_scene_from_bytes(data: &[u8]) -> Result<Scene> {
    scene::load_from_bytes(data)
}

#[cfg(feature = "wasm")]
pub mod wasm;
