//! glTF 2.0 types, buffer packing, and serialization.
//!
//! This module provides the output document model and everything needed to
//! turn it into `.gltf` JSON or a `.glb` container.

pub mod buffer;
pub mod glb;
pub mod json;
mod materials;
mod types;
mod validate;

pub use buffer::{ALIGNMENT, AccessorSpec, finalize, pad_chunk, padding_for};
pub use glb::{Chunk, ChunkInfo, GlbInfo, encode_glb, read_glb_info, write_glb};
pub use json::{bound_f32, to_json, to_json_pretty};
pub use validate::validate_references;

pub use types::{
    GltfAccessor, GltfAsset, GltfBuffer, GltfBufferView, GltfCamera, GltfDocument, GltfMesh,
    GltfNode, GltfOrthographic, GltfPerspective, GltfPrimitive, GltfScene, component_type, target,
};

pub use materials::{
    GltfImage, GltfMaterial, GltfPbrMetallicRoughness, GltfSampler, GltfTexture, GltfTextureInfo,
    normalize_extension,
};
