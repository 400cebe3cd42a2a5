//! GLB binary container.
//!
//! Layout (little-endian):
//! - header: magic `glTF`, version 2, total length
//! - JSON chunk: length, `JSON`, document padded with spaces
//! - BIN chunk (only when there is binary data): length, `BIN\0`, payload
//!   padded with zeros
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use std::io::{Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Result};

use super::buffer::{ALIGNMENT, pad_chunk};
use super::json::to_json;
use super::types::GltfDocument;

pub const GLB_MAGIC: u32 = 0x46546C67; // "glTF"
pub const GLB_VERSION: u32 = 2;
pub const CHUNK_TYPE_JSON: u32 = 0x4E4F534A; // "JSON"
pub const CHUNK_TYPE_BIN: u32 = 0x004E4942; // "BIN\0"

const HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

/// A typed, length-prefixed record inside the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub chunk_type: u32,
    data: Vec<u8>,
}

impl Chunk {
    /// JSON chunk, padded with ASCII spaces.
    #[must_use]
    pub fn json(json: &str) -> Self {
        Self {
            chunk_type: CHUNK_TYPE_JSON,
            data: pad_chunk(json.as_bytes().to_vec(), ALIGNMENT, b' '),
        }
    }

    /// Binary chunk, padded with zeros.
    #[must_use]
    pub fn bin(bytes: &[u8]) -> Self {
        Self {
            chunk_type: CHUNK_TYPE_BIN,
            data: pad_chunk(bytes.to_vec(), ALIGNMENT, 0),
        }
    }

    /// Post-padding payload length.
    #[must_use]
    pub fn length(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Bytes this chunk occupies in the container, header included.
    #[must_use]
    pub fn framed_len(&self) -> usize {
        CHUNK_HEADER_LEN + self.data.len()
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LittleEndian>(self.data.len() as u32)?;
        writer.write_u32::<LittleEndian>(self.chunk_type)?;
        writer.write_all(&self.data)?;
        Ok(())
    }
}

/// Frame a JSON document and optional binary payload into a container.
///
/// An empty or absent payload produces no BIN chunk.
pub fn write_glb<W: Write>(writer: &mut W, json: &str, bin: Option<&[u8]>) -> Result<usize> {
    let json_chunk = Chunk::json(json);
    let bin_chunk = bin.filter(|b| !b.is_empty()).map(Chunk::bin);

    let total_len = HEADER_LEN
        + json_chunk.framed_len()
        + bin_chunk.as_ref().map_or(0, Chunk::framed_len);

    let total_u32 = u32::try_from(total_len).map_err(|_| Error::InvalidGlb {
        message: format!("container too large: {total_len} bytes"),
    })?;

    writer.write_u32::<LittleEndian>(GLB_MAGIC)?;
    writer.write_u32::<LittleEndian>(GLB_VERSION)?;
    writer.write_u32::<LittleEndian>(total_u32)?;

    json_chunk.write_to(writer)?;
    if let Some(chunk) = &bin_chunk {
        chunk.write_to(writer)?;
    }

    Ok(total_len)
}

/// Encode a finalized document as GLB bytes.
///
/// Buffer URIs are cleared (binary data is implicit in a container) and the
/// BIN chunk carries the first buffer only.
pub fn encode_glb(doc: &mut GltfDocument) -> Result<Vec<u8>> {
    for buffer in &mut doc.buffers {
        buffer.uri = None;
    }
    if doc.buffers.len() > 1 {
        tracing::warn!(
            "Document has {} buffers; only the first is stored in the GLB binary chunk",
            doc.buffers.len()
        );
    }

    let json = to_json(doc)?;
    let bin = doc
        .buffers
        .iter()
        .any(|b| b.byte_length > 0)
        .then(|| doc.buffers[0].bytes.as_slice());

    let mut output = Vec::with_capacity(HEADER_LEN + json.len() + doc.binary_len() + 32);
    write_glb(&mut output, &json, bin)?;
    Ok(output)
}

/// Summary of a chunk found while reading a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkInfo {
    pub chunk_type: u32,
    pub length: usize,
    pub offset: usize,
}

impl ChunkInfo {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self.chunk_type {
            CHUNK_TYPE_JSON => "JSON",
            CHUNK_TYPE_BIN => "BIN",
            _ => "unknown",
        }
    }
}

/// Header and chunk table of a GLB container.
#[derive(Debug, Clone)]
pub struct GlbInfo {
    pub version: u32,
    /// Length declared in the header.
    pub length: usize,
    pub chunks: Vec<ChunkInfo>,
    /// The JSON chunk with trailing padding removed.
    pub json: String,
}

fn invalid(message: impl Into<String>) -> Error {
    Error::InvalidGlb {
        message: message.into(),
    }
}

/// Read a container's header and chunk table.
///
/// The declared length must equal the number of bytes supplied, and every
/// chunk must fit inside it.
pub fn read_glb_info(bytes: &[u8]) -> Result<GlbInfo> {
    let mut cursor = Cursor::new(bytes);
    let magic = cursor
        .read_u32::<LittleEndian>()
        .map_err(|_| invalid("truncated header"))?;
    if magic != GLB_MAGIC {
        return Err(invalid(format!("bad magic 0x{magic:08X}")));
    }
    let version = cursor.read_u32::<LittleEndian>()?;
    let length = cursor.read_u32::<LittleEndian>()? as usize;
    if length != bytes.len() {
        return Err(invalid(format!(
            "header declares {length} bytes but {} are present",
            bytes.len()
        )));
    }

    let mut chunks = Vec::new();
    let mut json = None;
    while (cursor.position() as usize) < length {
        let chunk_len = cursor
            .read_u32::<LittleEndian>()
            .map_err(|_| invalid("truncated chunk header"))? as usize;
        let chunk_type = cursor
            .read_u32::<LittleEndian>()
            .map_err(|_| invalid("truncated chunk header"))?;
        let offset = cursor.position() as usize;
        if offset + chunk_len > length {
            return Err(invalid(format!("chunk at {offset} overruns container")));
        }

        let mut data = vec![0u8; chunk_len];
        cursor.read_exact(&mut data)?;
        if chunk_type == CHUNK_TYPE_JSON && json.is_none() {
            let text = String::from_utf8(data).map_err(|e| invalid(e.to_string()))?;
            json = Some(text.trim_end_matches(' ').to_string());
        }

        chunks.push(ChunkInfo {
            chunk_type,
            length: chunk_len,
            offset,
        });
    }

    let json = json.ok_or_else(|| invalid("missing JSON chunk"))?;
    Ok(GlbInfo {
        version,
        length,
        chunks,
        json,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_and_chunks() {
        let mut out = Vec::new();
        let written = write_glb(&mut out, r#"{"a":1}"#, Some(&[1, 2, 3, 4, 5])).unwrap();

        assert_eq!(written, out.len());
        assert_eq!(&out[0..4], b"glTF");
        assert_eq!(u32::from_le_bytes(out[4..8].try_into().unwrap()), 2);
        assert_eq!(u32::from_le_bytes(out[8..12].try_into().unwrap()) as usize, out.len());
        // JSON: 7 bytes -> 8, BIN: 5 bytes -> 8
        assert_eq!(out.len(), 12 + 8 + 8 + 8 + 8);
        assert_eq!(&out[16..20], b"JSON");
        assert_eq!(out[27], b' ');
        assert_eq!(&out[32..36], b"BIN\0");
        assert_eq!(&out[36..44], &[1, 2, 3, 4, 5, 0, 0, 0]);
    }

    #[test]
    fn test_empty_payload_omits_bin_chunk() {
        let mut out = Vec::new();
        write_glb(&mut out, "{}", Some(&[])).unwrap();
        assert_eq!(out.len(), 12 + 8 + 4);

        let info = read_glb_info(&out).unwrap();
        assert_eq!(info.chunks.len(), 1);
        assert_eq!(info.chunks[0].type_name(), "JSON");
        assert_eq!(info.json, "{}");
    }

    #[test]
    fn test_read_rejects_bad_length() {
        let mut out = Vec::new();
        write_glb(&mut out, "{}", None).unwrap();
        out.push(0);
        assert!(matches!(read_glb_info(&out), Err(Error::InvalidGlb { .. })));
    }

    #[test]
    fn test_read_rejects_bad_magic() {
        let bytes = [0u8; 12];
        assert!(read_glb_info(&bytes).is_err());
    }

    #[test]
    fn test_chunk_length_is_padded() {
        let chunk = Chunk::bin(&[7; 11]);
        assert_eq!(chunk.length(), 12);
        assert_eq!(chunk.framed_len(), 20);
        assert_eq!(chunk.data()[11], 0);
    }
}
