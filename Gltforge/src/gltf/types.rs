//! Core glTF 2.0 structure types.
//!
//! Buffers, buffer views and accessors are index-linked records: a buffer
//! lists the views it owns and a view lists the accessors it owns, both in
//! registration order. Staged bytes live in skipped fields and are folded
//! into offsets and lengths by [`finalize`](super::buffer::finalize).

use indexmap::IndexMap;
use serde::Serialize;

use super::json::bounded;
use super::materials::{GltfImage, GltfMaterial, GltfSampler, GltfTexture};

/// Accessor component types.
pub mod component_type {
    pub const UNSIGNED_SHORT: u32 = 5123;
    pub const UNSIGNED_INT: u32 = 5125;
    pub const FLOAT: u32 = 5126;
}

/// Buffer view binding targets.
pub mod target {
    pub const ARRAY_BUFFER: u32 = 34962;
    pub const ELEMENT_ARRAY_BUFFER: u32 = 34963;
}

/// Asset metadata
#[derive(Debug, Clone, Serialize)]
pub struct GltfAsset {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
}

/// Scene definition
#[derive(Debug, Clone, Default, Serialize)]
pub struct GltfScene {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<usize>,
}

/// Node in the scene graph
#[derive(Debug, Clone, Default, Serialize)]
pub struct GltfNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "bounded")]
    pub translation: Option<[f32; 3]>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "bounded")]
    pub rotation: Option<[f32; 4]>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "bounded")]
    pub scale: Option<[f32; 3]>,
}

/// Perspective projection parameters
#[derive(Debug, Clone, Serialize)]
pub struct GltfPerspective {
    #[serde(rename = "aspectRatio")]
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "bounded")]
    pub aspect_ratio: Option<f32>,
    #[serde(serialize_with = "bounded")]
    pub yfov: f32,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "bounded")]
    pub zfar: Option<f32>,
    #[serde(serialize_with = "bounded")]
    pub znear: f32,
}

/// Orthographic projection parameters
#[derive(Debug, Clone, Serialize)]
pub struct GltfOrthographic {
    #[serde(serialize_with = "bounded")]
    pub xmag: f32,
    #[serde(serialize_with = "bounded")]
    pub ymag: f32,
    #[serde(serialize_with = "bounded")]
    pub zfar: f32,
    #[serde(serialize_with = "bounded")]
    pub znear: f32,
}

/// Camera definition
#[derive(Debug, Clone, Serialize)]
pub struct GltfCamera {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub camera_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perspective: Option<GltfPerspective>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orthographic: Option<GltfOrthographic>,
}

/// Mesh definition
#[derive(Debug, Clone, Serialize)]
pub struct GltfMesh {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub primitives: Vec<GltfPrimitive>,
}

/// Mesh primitive (geometry + material)
#[derive(Debug, Clone, Default, Serialize)]
pub struct GltfPrimitive {
    pub attributes: IndexMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indices: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<usize>,
}

/// Accessor for typed buffer data
#[derive(Debug, Clone, Serialize)]
pub struct GltfAccessor {
    #[serde(rename = "bufferView")]
    pub buffer_view: usize,
    #[serde(rename = "byteOffset")]
    pub byte_offset: usize,
    #[serde(rename = "componentType")]
    pub component_type: u32,
    pub count: usize,
    #[serde(rename = "type")]
    pub accessor_type: String,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "bounded")]
    pub min: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "bounded")]
    pub max: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized: Option<bool>,
    /// Raw element bytes, unpadded.
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// Buffer view (slice of a buffer)
#[derive(Debug, Clone, Serialize)]
pub struct GltfBufferView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub buffer: usize,
    #[serde(rename = "byteOffset")]
    pub byte_offset: usize,
    #[serde(rename = "byteLength")]
    pub byte_length: usize,
    #[serde(rename = "byteStride")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_stride: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
    /// Owned accessors, in registration order.
    #[serde(skip)]
    pub accessors: Vec<usize>,
    /// Packed bytes. For views without accessors (embedded images) this is
    /// the raw payload itself.
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// Binary buffer
#[derive(Debug, Clone, Default, Serialize)]
pub struct GltfBuffer {
    #[serde(rename = "byteLength")]
    pub byte_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Owned buffer views, in registration order.
    #[serde(skip)]
    pub views: Vec<usize>,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// Complete glTF document
#[derive(Debug, Clone, Serialize)]
pub struct GltfDocument {
    pub asset: GltfAsset,
    pub scene: usize,
    pub scenes: Vec<GltfScene>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<GltfNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cameras: Vec<GltfCamera>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub meshes: Vec<GltfMesh>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<GltfMaterial>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub textures: Vec<GltfTexture>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<GltfImage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub samplers: Vec<GltfSampler>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub accessors: Vec<GltfAccessor>,
    #[serde(rename = "bufferViews")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub buffer_views: Vec<GltfBufferView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub buffers: Vec<GltfBuffer>,
    /// Index of the buffer shared by geometry and embedded images.
    #[serde(skip)]
    pub(crate) shared_buffer: Option<usize>,
}

impl GltfDocument {
    /// Create an empty document with a single, empty scene.
    #[must_use]
    pub fn new(generator: Option<String>, copyright: Option<String>) -> Self {
        Self {
            asset: GltfAsset {
                version: "2.0".to_string(),
                generator,
                copyright,
            },
            scene: 0,
            scenes: vec![GltfScene::default()],
            nodes: Vec::new(),
            cameras: Vec::new(),
            meshes: Vec::new(),
            materials: Vec::new(),
            textures: Vec::new(),
            images: Vec::new(),
            samplers: Vec::new(),
            accessors: Vec::new(),
            buffer_views: Vec::new(),
            buffers: Vec::new(),
            shared_buffer: None,
        }
    }

    /// The default scene.
    pub fn main_scene_mut(&mut self) -> &mut GltfScene {
        &mut self.scenes[self.scene]
    }

    #[must_use]
    pub fn main_scene(&self) -> &GltfScene {
        &self.scenes[self.scene]
    }

    /// Append a node, attaching it under `parent` or to the scene top level.
    /// Returns the node index.
    pub fn add_node(&mut self, node: GltfNode, parent: Option<usize>) -> usize {
        let node_idx = self.nodes.len();
        self.nodes.push(node);
        match parent {
            Some(parent_idx) => self.nodes[parent_idx].children.push(node_idx),
            None => self.main_scene_mut().nodes.push(node_idx),
        }
        node_idx
    }

    pub fn add_mesh(&mut self, mesh: GltfMesh) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    pub fn add_camera(&mut self, camera: GltfCamera) -> usize {
        self.cameras.push(camera);
        self.cameras.len() - 1
    }

    /// Total bytes across all buffers.
    #[must_use]
    pub fn binary_len(&self) -> usize {
        self.buffers.iter().map(|b| b.byte_length).sum()
    }
}

impl Default for GltfDocument {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_node_attaches_to_parent_or_scene() {
        let mut doc = GltfDocument::default();
        let root = doc.add_node(GltfNode::default(), None);
        let child = doc.add_node(GltfNode::default(), Some(root));

        assert_eq!(doc.main_scene().nodes, vec![root]);
        assert_eq!(doc.nodes[root].children, vec![child]);
    }

    #[test]
    fn test_empty_collections_are_omitted() {
        let doc = GltfDocument::new(Some("test".into()), None);
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(
            json,
            r#"{"asset":{"version":"2.0","generator":"test"},"scene":0,"scenes":[{}]}"#
        );
    }
}
