//! glTF document construction from a scene.

use super::ExportConfig;
use crate::scene::{IndexBuffer, Material, Scene, SceneNode, Transform};
use gltf_json as json;
use glam::{Quat, Vec3};
use json::validation::Checked::Valid;
use json::validation::USize64;
use std::collections::BTreeMap;

/// Byte stride of a tightly packed VEC3 of f32.
const VEC3_STRIDE: usize = 12;

/// A glTF document and the binary payload its buffer views point into.
#[derive(Debug, Clone)]
pub struct BuiltDocument {
    /// The glTF JSON document.
    pub root: json::Root,
    /// Contents of buffer 0, every chunk padded to 4 bytes.
    pub binary: Vec<u8>,
}

/// Append-only byte payload backing buffer 0.
#[derive(Debug, Clone, Default)]
pub struct BinaryPayload {
    data: Vec<u8>,
}

impl BinaryPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk padded with zeros to a 4-byte boundary.
    ///
    /// Returns the chunk's byte offset and padded length.
    pub fn append(&mut self, bytes: &[u8]) -> (usize, usize) {
        let offset = self.data.len();
        self.data.extend_from_slice(bytes);
        let padding = padding_for(bytes.len());
        self.data.extend(std::iter::repeat(0u8).take(padding));
        (offset, bytes.len() + padding)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Number of bytes needed to pad `len` to a multiple of four.
pub(crate) fn padding_for(len: usize) -> usize {
    (4 - (len % 4)) % 4
}

/// Incrementally builds a glTF document.
///
/// Every `append_*` call pushes onto one of the document's arrays and returns
/// the index of the new entry. Indices are never reused.
#[derive(Debug)]
pub struct DocumentBuilder {
    root: json::Root,
    payload: BinaryPayload,
}

impl DocumentBuilder {
    /// Start a document with one empty default scene and one buffer.
    pub fn new(generator: &str) -> Self {
        let mut root = json::Root {
            asset: json::Asset {
                copyright: None,
                extensions: Default::default(),
                extras: Default::default(),
                generator: Some(generator.to_string()),
                min_version: None,
                version: "2.0".to_string(),
            },
            ..Default::default()
        };
        let scene = root.push(json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            nodes: Vec::new(),
        });
        root.scene = Some(scene);
        root.push(json::Buffer {
            byte_length: USize64(0),
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            uri: None,
        });

        Self {
            root,
            payload: BinaryPayload::new(),
        }
    }

    pub fn append_buffer_view(&mut self, view: json::buffer::View) -> json::Index<json::buffer::View> {
        self.root.push(view)
    }

    pub fn append_accessor(&mut self, accessor: json::Accessor) -> json::Index<json::Accessor> {
        self.root.push(accessor)
    }

    pub fn append_material(&mut self, material: json::Material) -> json::Index<json::Material> {
        self.root.push(material)
    }

    pub fn append_mesh(&mut self, mesh: json::Mesh) -> json::Index<json::Mesh> {
        self.root.push(mesh)
    }

    pub fn append_node(&mut self, node: json::Node) -> json::Index<json::Node> {
        self.root.push(node)
    }

    /// Current document, for inspection while building.
    pub fn root(&self) -> &json::Root {
        &self.root
    }

    /// Append one mesh-bearing scene node with its geometry and material.
    ///
    /// Returns `None` without touching the document when the node is not a
    /// mesh or has no position attribute. Normals are exported only if the
    /// geometry already carries them; see [`Scene::ensure_normals`].
    pub fn add_scene_node(&mut self, node: &SceneNode) -> Option<json::Index<json::Node>> {
        if !node.is_mesh() {
            return None;
        }
        let geometry = node.geometry.as_ref()?;
        let positions = geometry.position_attribute()?;

        let position_accessor = self.add_positions(positions);
        let normal_accessor = geometry
            .normals
            .as_deref()
            .map(|normals| self.add_normals(normals));
        let index_accessor = geometry
            .indices
            .as_ref()
            .map(|indices| self.add_indices(indices));

        let label = node.display_name().unwrap_or("Object");
        let default_material = Material::default();
        let material = node.material.as_ref().unwrap_or(&default_material);
        let material_index =
            self.append_material(create_material(&format!("{}_material", label), material));

        let mesh_index = self.append_mesh(json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(format!("{}_mesh", label)),
            primitives: vec![create_primitive(
                position_accessor,
                normal_accessor,
                index_accessor,
                material_index,
            )],
            weights: None,
        });

        let node_name = match node.display_name() {
            Some(name) => name.to_string(),
            None => format!("Node_{}", self.root.nodes.len()),
        };
        let node_index = self.append_node(create_node(node_name, mesh_index, &node.transform));
        self.root.scenes[0].nodes.push(node_index);

        log::debug!(
            "exported node {} ({} vertices) as node {}",
            label,
            geometry.vertex_count(),
            node_index.value()
        );
        Some(node_index)
    }

    fn add_positions(&mut self, positions: &[[f32; 3]]) -> json::Index<json::Accessor> {
        let (offset, length) = self.payload.append(&vec3_bytes(positions));
        let view = self.append_buffer_view(create_buffer_view(
            offset,
            length,
            Some(VEC3_STRIDE),
            json::buffer::Target::ArrayBuffer,
        ));
        let (min, max) = compute_bounds(positions);
        self.append_accessor(create_accessor(
            view,
            positions.len(),
            json::accessor::Type::Vec3,
            json::accessor::ComponentType::F32,
            Some((min, max)),
        ))
    }

    fn add_normals(&mut self, normals: &[[f32; 3]]) -> json::Index<json::Accessor> {
        let (offset, length) = self.payload.append(&vec3_bytes(normals));
        let view = self.append_buffer_view(create_buffer_view(
            offset,
            length,
            None,
            json::buffer::Target::ArrayBuffer,
        ));
        self.append_accessor(create_accessor(
            view,
            normals.len(),
            json::accessor::Type::Vec3,
            json::accessor::ComponentType::F32,
            None,
        ))
    }

    fn add_indices(&mut self, indices: &IndexBuffer) -> json::Index<json::Accessor> {
        let (offset, length) = self.payload.append(&indices.to_le_bytes());
        let view = self.append_buffer_view(create_buffer_view(
            offset,
            length,
            None,
            json::buffer::Target::ElementArrayBuffer,
        ));
        self.append_accessor(create_accessor(
            view,
            indices.len(),
            json::accessor::Type::Scalar,
            index_component_type(indices),
            None,
        ))
    }

    /// Finish the document, recording the payload length on buffer 0.
    pub fn finish(mut self) -> BuiltDocument {
        self.root.buffers[0].byte_length = USize64::from(self.payload.len());
        BuiltDocument {
            root: self.root,
            binary: self.payload.into_bytes(),
        }
    }
}

/// Build a glTF document and binary payload from a scene.
///
/// Normals are computed first for every exported geometry that lacks them,
/// which writes them into the scene. Nodes are then visited in pre-order and
/// every exportable one becomes a top-level node of the single scene;
/// hierarchy is not preserved.
pub fn build_document(scene: &mut Scene, config: &ExportConfig) -> BuiltDocument {
    scene.ensure_normals();

    let mut builder = DocumentBuilder::new(&config.generator);
    for node in scene.traverse() {
        if builder.add_scene_node(node).is_none() && node.is_mesh() {
            log::debug!(
                "skipping node {:?}: no position attribute",
                node.display_name().unwrap_or("<unnamed>")
            );
        }
    }
    builder.finish()
}

/// glTF component type for an index buffer, chosen by storage width.
pub fn index_component_type(indices: &IndexBuffer) -> json::accessor::ComponentType {
    match indices {
        IndexBuffer::U16(_) => json::accessor::ComponentType::U16,
        IndexBuffer::U32(_) => json::accessor::ComponentType::U32,
    }
}

/// Per-component minimum and maximum over all positions.
pub fn compute_bounds(positions: &[[f32; 3]]) -> ([f32; 3], [f32; 3]) {
    let mut min = [f32::INFINITY; 3];
    let mut max = [f32::NEG_INFINITY; 3];

    for position in positions {
        for i in 0..3 {
            min[i] = min[i].min(position[i]);
            max[i] = max[i].max(position[i]);
        }
    }

    (min, max)
}

fn vec3_bytes(data: &[[f32; 3]]) -> Vec<u8> {
    data.iter()
        .flatten()
        .flat_map(|component| component.to_le_bytes())
        .collect()
}

/// Create a buffer view into buffer 0.
fn create_buffer_view(
    offset: usize,
    size: usize,
    stride: Option<usize>,
    target: json::buffer::Target,
) -> json::buffer::View {
    json::buffer::View {
        buffer: json::Index::new(0),
        byte_length: USize64::from(size),
        byte_offset: Some(USize64::from(offset)),
        byte_stride: stride.map(json::buffer::Stride),
        extensions: Default::default(),
        extras: Default::default(),
        name: None,
        target: Some(Valid(target)),
    }
}

/// Create an accessor.
fn create_accessor(
    buffer_view: json::Index<json::buffer::View>,
    count: usize,
    type_: json::accessor::Type,
    component_type: json::accessor::ComponentType,
    bounds: Option<([f32; 3], [f32; 3])>,
) -> json::Accessor {
    let (min, max) = match bounds {
        Some((min, max)) => (
            Some(json::Value::from(min.to_vec())),
            Some(json::Value::from(max.to_vec())),
        ),
        None => (None, None),
    };

    json::Accessor {
        buffer_view: Some(buffer_view),
        byte_offset: Some(USize64(0)),
        count: USize64::from(count),
        component_type: Valid(json::accessor::GenericComponentType(component_type)),
        extensions: Default::default(),
        extras: Default::default(),
        type_: Valid(type_),
        min,
        max,
        name: None,
        normalized: false,
        sparse: None,
    }
}

/// Create a triangle primitive.
fn create_primitive(
    positions: json::Index<json::Accessor>,
    normals: Option<json::Index<json::Accessor>>,
    indices: Option<json::Index<json::Accessor>>,
    material: json::Index<json::Material>,
) -> json::mesh::Primitive {
    let mut attributes = BTreeMap::new();
    attributes.insert(Valid(json::mesh::Semantic::Positions), positions);
    if let Some(normals) = normals {
        attributes.insert(Valid(json::mesh::Semantic::Normals), normals);
    }

    json::mesh::Primitive {
        attributes,
        extensions: Default::default(),
        extras: Default::default(),
        indices,
        material: Some(material),
        mode: Valid(json::mesh::Mode::Triangles),
        targets: None,
    }
}

/// Create a metallic-roughness material from a scene material.
fn create_material(name: &str, material: &Material) -> json::Material {
    let alpha_mode = if material.transparent {
        json::material::AlphaMode::Blend
    } else {
        json::material::AlphaMode::Opaque
    };

    json::Material {
        pbr_metallic_roughness: json::material::PbrMetallicRoughness {
            base_color_texture: None,
            base_color_factor: json::material::PbrBaseColorFactor(material.base_color_factor()),
            metallic_factor: json::material::StrengthFactor(material.metallic_factor()),
            roughness_factor: json::material::StrengthFactor(material.roughness_factor()),
            metallic_roughness_texture: None,
            extensions: Default::default(),
            extras: Default::default(),
        },
        alpha_mode: Valid(alpha_mode),
        alpha_cutoff: None,
        double_sided: material.is_double_sided(),
        normal_texture: None,
        occlusion_texture: None,
        emissive_texture: None,
        emissive_factor: json::material::EmissiveFactor([0.0, 0.0, 0.0]),
        name: Some(name.to_string()),
        extensions: Default::default(),
        extras: Default::default(),
    }
}

/// Create a node, omitting transform components that are at their defaults.
fn create_node(name: String, mesh: json::Index<json::Mesh>, transform: &Transform) -> json::Node {
    json::Node {
        mesh: Some(mesh),
        name: Some(name),
        translation: (transform.position != Vec3::ZERO).then(|| transform.position.to_array()),
        rotation: (transform.rotation != Quat::IDENTITY)
            .then(|| json::scene::UnitQuaternion(transform.rotation.to_array())),
        scale: (transform.scale != Vec3::ONE).then(|| transform.scale.to_array()),
        ..Default::default()
    }
}
