//! Geometry attribute buffers.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Triangle index storage.
///
/// The variant records the native storage width of the source buffer. The
/// exporter picks the glTF component type from this width, not from the
/// largest index value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBuffer {
    /// 16-bit unsigned indices.
    U16(Vec<u16>),
    /// 32-bit unsigned indices.
    U32(Vec<u32>),
}

impl IndexBuffer {
    /// Number of indices.
    pub fn len(&self) -> usize {
        match self {
            IndexBuffer::U16(indices) => indices.len(),
            IndexBuffer::U32(indices) => indices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over the indices widened to u32.
    pub fn iter(&self) -> Box<dyn Iterator<Item = u32> + '_> {
        match self {
            IndexBuffer::U16(indices) => Box::new(indices.iter().map(|&i| i as u32)),
            IndexBuffer::U32(indices) => Box::new(indices.iter().copied()),
        }
    }

    /// Little-endian bytes in the native storage width.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        match self {
            IndexBuffer::U16(indices) => indices.iter().flat_map(|i| i.to_le_bytes()).collect(),
            IndexBuffer::U32(indices) => indices.iter().flat_map(|i| i.to_le_bytes()).collect(),
        }
    }
}

/// Vertex attributes of a mesh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Vertex positions. Required for export.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positions: Option<Vec<[f32; 3]>>,
    /// Vertex normals. Computed on demand when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normals: Option<Vec<[f32; 3]>>,
    /// Optional triangle indices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indices: Option<IndexBuffer>,
}

impl Geometry {
    pub fn new(positions: Vec<[f32; 3]>) -> Self {
        Self {
            positions: Some(positions),
            normals: None,
            indices: None,
        }
    }

    pub fn with_normals(mut self, normals: Vec<[f32; 3]>) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn with_indices(mut self, indices: IndexBuffer) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Position attribute, if present and non-empty.
    pub fn position_attribute(&self) -> Option<&[[f32; 3]]> {
        self.positions.as_deref().filter(|p| !p.is_empty())
    }

    /// Number of vertices in the position attribute.
    pub fn vertex_count(&self) -> usize {
        self.positions.as_ref().map_or(0, Vec::len)
    }

    /// Compute vertex normals unless the geometry already carries them.
    ///
    /// This writes the computed normals back into the geometry, so callers
    /// holding the same geometry will observe the new attribute afterwards.
    pub fn ensure_normals(&mut self) {
        if self.normals.is_none() && self.position_attribute().is_some() {
            self.compute_vertex_normals();
        }
    }

    /// Replace the normal attribute with face-averaged vertex normals.
    ///
    /// Indexed geometry accumulates each face normal into every vertex the face
    /// touches; non-indexed geometry treats each run of three vertices as one
    /// face. Faces referencing missing vertices are ignored.
    pub fn compute_vertex_normals(&mut self) {
        let Some(positions) = self.positions.as_deref() else {
            return;
        };

        let mut normals = vec![Vec3::ZERO; positions.len()];
        let face_normal = |a: usize, b: usize, c: usize| {
            let (pa, pb, pc) = (
                Vec3::from(positions[a]),
                Vec3::from(positions[b]),
                Vec3::from(positions[c]),
            );
            (pc - pb).cross(pa - pb)
        };

        match &self.indices {
            Some(indices) => {
                let indices: Vec<usize> = indices.iter().map(|i| i as usize).collect();
                for face in indices.chunks_exact(3) {
                    let (a, b, c) = (face[0], face[1], face[2]);
                    if a >= positions.len() || b >= positions.len() || c >= positions.len() {
                        continue;
                    }
                    let n = face_normal(a, b, c);
                    normals[a] += n;
                    normals[b] += n;
                    normals[c] += n;
                }
            }
            None => {
                for start in (0..positions.len() / 3 * 3).step_by(3) {
                    let n = face_normal(start, start + 1, start + 2);
                    normals[start] = n;
                    normals[start + 1] = n;
                    normals[start + 2] = n;
                }
            }
        }

        self.normals = Some(
            normals
                .into_iter()
                .map(|n| n.normalize_or_zero().to_array())
                .collect(),
        );
    }
}
