//! glTF 2.0 material, texture, and image types.

use std::path::PathBuf;

use serde::Serialize;

use super::json::bounded;

/// Image referenced by URI (`.gltf` output) or embedded in a buffer view
/// (`.glb` output).
#[derive(Debug, Clone, Default, Serialize)]
pub struct GltfImage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(rename = "bufferView")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_view: Option<usize>,
    #[serde(rename = "mimeType")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Lowercase extension without the dot; `jpg` is normalized to `jpeg`.
    #[serde(skip)]
    pub file_extension: String,
    /// Where the image file lives on disk, if not next to the output file.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl GltfImage {
    /// Create an image referencing `uri`.
    #[must_use]
    pub fn from_uri(uri: impl Into<String>, source_path: Option<PathBuf>) -> Self {
        let uri = uri.into();
        let file_extension = normalize_extension(
            std::path::Path::new(&uri)
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("png"),
        );
        Self {
            name: None,
            uri: Some(uri),
            buffer_view: None,
            mime_type: None,
            file_extension,
            source_path,
        }
    }
}

/// Lowercase an image extension and fold `jpg` into `jpeg`.
#[must_use]
pub fn normalize_extension(extension: &str) -> String {
    let lower = extension.to_ascii_lowercase();
    if lower == "jpg" { "jpeg".to_string() } else { lower }
}

/// Texture sampler defining filtering and wrapping
#[derive(Debug, Clone, Serialize)]
pub struct GltfSampler {
    #[serde(rename = "magFilter")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mag_filter: Option<u32>,
    #[serde(rename = "minFilter")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_filter: Option<u32>,
    #[serde(rename = "wrapS")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap_s: Option<u32>,
    #[serde(rename = "wrapT")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap_t: Option<u32>,
}

impl Default for GltfSampler {
    fn default() -> Self {
        Self {
            mag_filter: Some(9729),  // LINEAR
            min_filter: Some(9987),  // LINEAR_MIPMAP_LINEAR
            wrap_s: Some(10497),     // REPEAT
            wrap_t: Some(10497),     // REPEAT
        }
    }
}

/// Texture referencing an image and sampler
#[derive(Debug, Clone, Serialize)]
pub struct GltfTexture {
    pub source: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampler: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Texture info used in materials
#[derive(Debug, Clone, Serialize)]
pub struct GltfTextureInfo {
    pub index: usize,
    #[serde(rename = "texCoord")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tex_coord: Option<usize>,
}

/// PBR Metallic-Roughness material model
#[derive(Debug, Clone, Serialize)]
pub struct GltfPbrMetallicRoughness {
    #[serde(rename = "baseColorFactor")]
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "bounded")]
    pub base_color_factor: Option<[f32; 4]>,
    #[serde(rename = "baseColorTexture")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_color_texture: Option<GltfTextureInfo>,
    #[serde(rename = "metallicFactor")]
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "bounded")]
    pub metallic_factor: Option<f32>,
    #[serde(rename = "roughnessFactor")]
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "bounded")]
    pub roughness_factor: Option<f32>,
}

impl Default for GltfPbrMetallicRoughness {
    fn default() -> Self {
        Self {
            base_color_factor: Some([1.0, 1.0, 1.0, 1.0]),
            base_color_texture: None,
            metallic_factor: Some(1.0),
            roughness_factor: Some(1.0),
        }
    }
}

/// Material definition
#[derive(Debug, Clone, Default, Serialize)]
pub struct GltfMaterial {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "pbrMetallicRoughness")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pbr_metallic_roughness: Option<GltfPbrMetallicRoughness>,
    #[serde(rename = "emissiveFactor")]
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "bounded")]
    pub emissive_factor: Option<[f32; 3]>,
    #[serde(rename = "alphaMode")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha_mode: Option<String>,
    #[serde(rename = "doubleSided")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub double_sided: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_normalization() {
        assert_eq!(normalize_extension("JPG"), "jpeg");
        assert_eq!(normalize_extension("jpeg"), "jpeg");
        assert_eq!(normalize_extension("Png"), "png");
    }

    #[test]
    fn test_image_from_uri() {
        let image = GltfImage::from_uri("textures/wood.JPG", None);
        assert_eq!(image.uri.as_deref(), Some("textures/wood.JPG"));
        assert_eq!(image.file_extension, "jpeg");
        assert!(image.buffer_view.is_none());
    }
}
