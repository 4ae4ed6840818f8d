//! GLB container serialization.
//!
//! A GLB file is a 12-byte header followed by a JSON chunk and an optional
//! binary chunk. All integers are little-endian and both chunks are padded to
//! a 4-byte boundary: the JSON chunk with spaces, the binary chunk with zeros.

use super::gltf::padding_for;
use crate::error::{ExportError, Result};
use gltf_json as json;

/// `glTF` as a little-endian u32.
pub const GLB_MAGIC: u32 = 0x4654_6C67;
/// Container version written and accepted.
pub const GLB_VERSION: u32 = 2;
/// Chunk type of the JSON chunk (`JSON`).
pub const CHUNK_JSON: u32 = 0x4E4F_534A;
/// Chunk type of the binary chunk (`BIN\0`).
pub const CHUNK_BIN: u32 = 0x004E_4942;

const HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

/// Serialize a glTF document and its binary payload into a GLB container.
///
/// The binary chunk is only written when the payload is non-empty.
pub fn serialize_glb(root: &json::Root, binary: &[u8]) -> Result<Vec<u8>> {
    let json_string = json::serialize::to_string(root)?;
    let json_bytes = json_string.as_bytes();

    // Pad JSON to 4-byte alignment
    let json_padding = padding_for(json_bytes.len());
    let padded_json_len = json_bytes.len() + json_padding;

    // Pad buffer to 4-byte alignment
    let binary_padding = padding_for(binary.len());
    let padded_binary_len = binary.len() + binary_padding;

    let mut total_size = HEADER_LEN + CHUNK_HEADER_LEN + padded_json_len;
    if padded_binary_len > 0 {
        total_size += CHUNK_HEADER_LEN + padded_binary_len;
    }
    let declared = u32::try_from(total_size).map_err(|_| ExportError::ContainerTooLarge(total_size))?;

    let mut glb = Vec::with_capacity(total_size);

    // GLB Header
    glb.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    glb.extend_from_slice(&GLB_VERSION.to_le_bytes());
    glb.extend_from_slice(&declared.to_le_bytes());

    // JSON Chunk
    glb.extend_from_slice(&(padded_json_len as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    glb.extend_from_slice(json_bytes);
    glb.extend(std::iter::repeat(0x20u8).take(json_padding));

    // BIN Chunk
    if padded_binary_len > 0 {
        glb.extend_from_slice(&(padded_binary_len as u32).to_le_bytes());
        glb.extend_from_slice(&CHUNK_BIN.to_le_bytes());
        glb.extend_from_slice(binary);
        glb.extend(std::iter::repeat(0u8).take(binary_padding));
    }

    if glb.len() != total_size {
        return Err(ExportError::LengthMismatch {
            declared: total_size,
            actual: glb.len(),
        });
    }

    Ok(glb)
}

/// A GLB container split into its chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlbContainer<'a> {
    pub version: u32,
    /// Total length declared by the header.
    pub length: u32,
    /// JSON chunk contents, including trailing space padding.
    pub json: &'a [u8],
    /// Binary chunk contents, including trailing zero padding.
    pub bin: Option<&'a [u8]>,
}

impl GlbContainer<'_> {
    /// Parse the JSON chunk.
    pub fn json_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_slice(self.json)?)
    }
}

/// Split a GLB container into header and chunks.
///
/// Checks the magic, version, declared length and chunk bounds. Chunks after
/// the binary chunk are ignored.
pub fn parse_glb(data: &[u8]) -> Result<GlbContainer<'_>> {
    if data.len() < HEADER_LEN {
        return Err(invalid(format!("{} bytes is shorter than the header", data.len())));
    }

    let magic = read_u32(data, 0);
    if magic != GLB_MAGIC {
        return Err(invalid(format!("bad magic 0x{:08X}", magic)));
    }
    let version = read_u32(data, 4);
    if version != GLB_VERSION {
        return Err(invalid(format!("unsupported version {}", version)));
    }
    let length = read_u32(data, 8);
    if length as usize != data.len() {
        return Err(invalid(format!(
            "header declares {} bytes but container has {}",
            length,
            data.len()
        )));
    }

    let (json_type, json, mut offset) = read_chunk(data, HEADER_LEN)?;
    if json_type != CHUNK_JSON {
        return Err(invalid(format!("first chunk has type 0x{:08X}, expected JSON", json_type)));
    }

    let mut bin = None;
    while offset < data.len() {
        let (chunk_type, contents, next) = read_chunk(data, offset)?;
        if chunk_type == CHUNK_BIN && bin.is_none() {
            bin = Some(contents);
        }
        offset = next;
    }

    Ok(GlbContainer {
        version,
        length,
        json,
        bin,
    })
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}

/// Read the chunk at `offset`, returning its type, contents and the offset after it.
fn read_chunk(data: &[u8], offset: usize) -> Result<(u32, &[u8], usize)> {
    if data.len() < offset + CHUNK_HEADER_LEN {
        return Err(invalid(format!("truncated chunk header at byte {}", offset)));
    }
    let chunk_len = read_u32(data, offset) as usize;
    let chunk_type = read_u32(data, offset + 4);
    let start = offset + CHUNK_HEADER_LEN;
    let end = start
        .checked_add(chunk_len)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| invalid(format!("chunk at byte {} overruns the container", offset)))?;
    Ok((chunk_type, &data[start..end], end))
}

fn invalid(message: String) -> ExportError {
    ExportError::InvalidContainer(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_root() -> json::Root {
        json::Root {
            scene: Some(json::Index::new(0)),
            ..Default::default()
        }
    }

    fn padded_json_len(root: &json::Root) -> usize {
        let len = json::serialize::to_string(root).unwrap().len();
        len + padding_for(len)
    }

    #[test]
    fn test_empty_binary_omits_bin_chunk() {
        let root = minimal_root();
        let glb = serialize_glb(&root, &[]).unwrap();

        assert_eq!(glb.len(), 12 + 8 + padded_json_len(&root));
        assert_eq!(read_u32(&glb, 8) as usize, glb.len());

        let container = parse_glb(&glb).unwrap();
        assert!(container.bin.is_none());
    }

    #[test]
    fn test_header_and_chunk_layout() {
        let root = minimal_root();
        let glb = serialize_glb(&root, &[1, 2, 3, 4, 5]).unwrap();

        assert_eq!(&glb[0..4], b"glTF");
        assert_eq!(read_u32(&glb, 4), 2);
        assert_eq!(read_u32(&glb, 8) as usize, glb.len());
        assert_eq!(&glb[16..20], b"JSON");

        let json_len = read_u32(&glb, 12) as usize;
        assert_eq!(json_len % 4, 0);
        let bin_header = 20 + json_len;
        assert_eq!(read_u32(&glb, bin_header), 8);
        assert_eq!(&glb[bin_header + 4..bin_header + 8], b"BIN\0");
        assert_eq!(&glb[bin_header + 8..], &[1, 2, 3, 4, 5, 0, 0, 0]);
    }

    #[test]
    fn test_json_padded_with_spaces() {
        let root = minimal_root();
        let glb = serialize_glb(&root, &[]).unwrap();
        let container = parse_glb(&glb).unwrap();

        let raw = json::serialize::to_string(&root).unwrap();
        assert_eq!(&container.json[..raw.len()], raw.as_bytes());
        assert!(container.json[raw.len()..].iter().all(|&b| b == b' '));
        assert_eq!(container.json_value().unwrap()["scene"], 0);
    }

    #[test]
    fn test_parse_rejects_bad_magic() {
        let mut glb = serialize_glb(&minimal_root(), &[]).unwrap();
        glb[0] = b'x';
        assert!(matches!(parse_glb(&glb), Err(ExportError::InvalidContainer(_))));
    }

    #[test]
    fn test_parse_rejects_length_mismatch() {
        let mut glb = serialize_glb(&minimal_root(), &[0; 4]).unwrap();
        glb.push(0);
        assert!(parse_glb(&glb).is_err());
        assert!(parse_glb(&glb[..10]).is_err());
    }

    #[test]
    fn test_parse_rejects_overrunning_chunk() {
        let mut glb = serialize_glb(&minimal_root(), &[]).unwrap();
        glb[12..16].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(parse_glb(&glb), Err(ExportError::InvalidContainer(_))));
    }
}
