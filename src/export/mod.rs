//! Scene export to binary glTF.
//!
//! Export runs in three steps: [`gltf::build_document`] walks the scene and
//! produces a glTF document plus its binary payload, [`validate::validate`]
//! checks the document's structure, and [`glb::serialize_glb`] packs both into
//! a GLB container.

pub mod glb;
pub mod gltf;
pub mod validate;

pub use glb::{parse_glb, serialize_glb, GlbContainer};
pub use gltf::{build_document, BinaryPayload, BuiltDocument, DocumentBuilder};
pub use validate::{validate, validate_slice, validate_value, ValidationIssue};

use crate::error::{ExportError, Result};
use crate::scene::Scene;
use std::path::Path;

/// MIME type of GLB files.
pub const GLB_MIME_TYPE: &str = "model/gltf-binary";

/// Default file name for downloaded exports.
pub const DEFAULT_FILE_NAME: &str = "workspace_scene.glb";

/// Export configuration.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Value written to `asset.generator`.
    pub generator: String,
    /// Fail the export when validation finds issues instead of logging them.
    pub strict: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            generator: concat!("scene-glb ", env!("CARGO_PKG_VERSION")).to_string(),
            strict: false,
        }
    }
}

impl ExportConfig {
    pub fn with_generator(mut self, generator: impl Into<String>) -> Self {
        self.generator = generator.into();
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Export a scene to GLB bytes.
///
/// Missing normals are computed and stored on the scene's geometry. Validation
/// issues are logged as warnings, or returned as [`ExportError::Validation`]
/// when `config.strict` is set.
pub fn export_glb(scene: &mut Scene, config: &ExportConfig) -> Result<Vec<u8>> {
    let built = build_document(scene, config);

    let issues = validate(&built.root);
    if !issues.is_empty() {
        if config.strict {
            return Err(ExportError::Validation(issues));
        }
        for issue in &issues {
            log::warn!("glTF validation: {}", issue);
        }
    }

    let glb = serialize_glb(&built.root, &built.binary)?;
    log::debug!(
        "exported {} nodes, {} accessors, {} byte GLB",
        built.root.nodes.len(),
        built.root.accessors.len(),
        glb.len()
    );
    Ok(glb)
}

/// Export a scene and write the GLB to `path`.
pub fn export_glb_to_path<P: AsRef<Path>>(
    scene: &mut Scene,
    config: &ExportConfig,
    path: P,
) -> Result<()> {
    let glb = export_glb(scene, config)?;
    std::fs::write(path, glb)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Geometry, IndexBuffer, Material, SceneNode};

    /// A unit cube with 8 shared corners and 12 triangles.
    fn unit_cube() -> SceneNode {
        let positions = vec![
            [-0.5, -0.5, -0.5],
            [0.5, -0.5, -0.5],
            [0.5, 0.5, -0.5],
            [-0.5, 0.5, -0.5],
            [-0.5, -0.5, 0.5],
            [0.5, -0.5, 0.5],
            [0.5, 0.5, 0.5],
            [-0.5, 0.5, 0.5],
        ];
        let indices = vec![
            0, 2, 1, 0, 3, 2, // back
            4, 5, 6, 4, 6, 7, // front
            0, 1, 5, 0, 5, 4, // bottom
            3, 7, 6, 3, 6, 2, // top
            0, 4, 7, 0, 7, 3, // left
            1, 2, 6, 1, 6, 5, // right
        ];
        SceneNode::mesh(
            Geometry::new(positions).with_indices(IndexBuffer::U16(indices)),
            Material::new(),
        )
        .with_name("Cube")
    }

    fn read_u32(data: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(data[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn test_export_unit_cube() {
        let mut scene = Scene::new().with_node(unit_cube());
        let glb = export_glb(&mut scene, &ExportConfig::default()).unwrap();

        assert_eq!(&glb[0..4], b"glTF");
        assert_eq!(read_u32(&glb, 4), 2);
        assert_eq!(read_u32(&glb, 8) as usize, glb.len());

        let container = parse_glb(&glb).unwrap();
        let doc = container.json_value().unwrap();
        assert!(validate_value(&doc).is_empty());
        assert_eq!(doc["accessors"][0]["count"], 8);
        assert_eq!(doc["accessors"][2]["count"], 36);
        assert_eq!(doc["accessors"][2]["componentType"], 5123);
        assert_eq!(doc["materials"][0]["name"], "Cube_material");

        // 96 position bytes, 96 normal bytes, 72 index bytes.
        let bin = container.bin.unwrap();
        assert_eq!(bin.len(), 264);
        assert_eq!(doc["buffers"][0]["byteLength"], 264);
    }

    #[test]
    fn test_export_empty_scene() {
        let mut scene = Scene::new();
        let glb = export_glb(&mut scene, &ExportConfig::default()).unwrap();

        let container = parse_glb(&glb).unwrap();
        assert!(container.bin.is_none());
        assert_eq!(glb.len(), 12 + 8 + container.json.len());
    }

    #[test]
    fn test_generator_is_configurable() {
        let mut scene = Scene::new().with_node(unit_cube());
        let config = ExportConfig::default().with_generator("portfolio");
        let glb = export_glb(&mut scene, &config).unwrap();

        let doc = parse_glb(&glb).unwrap().json_value().unwrap();
        assert_eq!(doc["asset"]["generator"], "portfolio");
        assert_eq!(doc["asset"]["version"], "2.0");
    }

    #[test]
    fn test_strict_export_accepts_valid_document() {
        let mut scene = Scene::new().with_node(unit_cube());
        let config = ExportConfig::default().with_strict(true);
        assert!(export_glb(&mut scene, &config).is_ok());
    }

    #[test]
    fn test_export_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_FILE_NAME);
        let mut scene = Scene::new().with_node(unit_cube());

        export_glb_to_path(&mut scene, &ExportConfig::default(), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(parse_glb(&bytes).is_ok());
    }
}
