//! Material export.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::gltf::{
    GltfDocument, GltfImage, GltfMaterial, GltfPbrMetallicRoughness, GltfSampler, GltfTexture,
    GltfTextureInfo,
};
use crate::scene::SourceMaterial;

/// Appends a glTF material to a document.
pub trait MaterialExporter {
    /// Export `material` into `doc` and return its material index.
    ///
    /// Textures are registered as images referencing a file by URI; the
    /// driver later copies or embeds them depending on the output format.
    fn export_material(&mut self, material: &SourceMaterial, doc: &mut GltfDocument) -> Result<usize>;
}

/// Metallic-roughness materials with an optional base color texture.
///
/// Textures referencing the same file share one image and one texture.
/// Distinct files with the same name get distinct URIs (`wood.png`,
/// `wood_1.png`, ...) so they can sit side by side in the output directory.
#[derive(Debug, Default)]
pub struct PbrMaterialExporter {
    textures: HashMap<PathBuf, usize>,
    uris: HashSet<String>,
    sampler: Option<usize>,
}

impl PbrMaterialExporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn texture_for(&mut self, path: &Path, doc: &mut GltfDocument) -> usize {
        if let Some(&texture) = self.textures.get(path) {
            return texture;
        }

        let sampler = *self.sampler.get_or_insert_with(|| {
            doc.samplers.push(GltfSampler::default());
            doc.samplers.len() - 1
        });

        let file_name = path
            .file_name()
            .map_or_else(|| path.to_string_lossy(), |n| n.to_string_lossy())
            .into_owned();
        let uri = self.unique_uri(path, &file_name);
        let mut image = GltfImage::from_uri(uri, Some(path.to_path_buf()));
        image.name = Some(file_name.clone());
        doc.images.push(image);

        doc.textures.push(GltfTexture {
            source: doc.images.len() - 1,
            sampler: Some(sampler),
            name: Some(file_name),
        });
        let texture = doc.textures.len() - 1;
        self.textures.insert(path.to_path_buf(), texture);
        texture
    }

    fn unique_uri(&mut self, path: &Path, file_name: &str) -> String {
        let mut uri = file_name.to_string();
        if self.uris.contains(&uri) {
            let stem = path.file_stem().map_or_else(|| file_name.into(), |s| s.to_string_lossy());
            let extension = path.extension().map(|e| e.to_string_lossy());
            uri = (1..)
                .map(|n| match &extension {
                    Some(ext) => format!("{stem}_{n}.{ext}"),
                    None => format!("{stem}_{n}"),
                })
                .find(|candidate| !self.uris.contains(candidate))
                .unwrap_or_default();
            tracing::debug!("Texture {} renamed to '{uri}' to avoid a name clash", path.display());
        }
        self.uris.insert(uri.clone());
        uri
    }
}

impl MaterialExporter for PbrMaterialExporter {
    fn export_material(&mut self, material: &SourceMaterial, doc: &mut GltfDocument) -> Result<usize> {
        let base_color_texture = material
            .base_color_texture
            .as_deref()
            .map(|path| GltfTextureInfo {
                index: self.texture_for(path, doc),
                tex_coord: None,
            });

        let name = if material.name.is_empty() { &material.id } else { &material.name };
        doc.materials.push(GltfMaterial {
            name: Some(name.clone()),
            pbr_metallic_roughness: Some(GltfPbrMetallicRoughness {
                base_color_factor: Some(material.base_color),
                base_color_texture,
                metallic_factor: Some(material.metallic),
                roughness_factor: Some(material.roughness),
            }),
            emissive_factor: (material.emissive != [0.0; 3]).then_some(material.emissive),
            alpha_mode: (material.base_color[3] < 1.0).then(|| "BLEND".to_string()),
            double_sided: material.double_sided.then_some(true),
        });

        tracing::debug!("Exported material '{name}'");
        Ok(doc.materials.len() - 1)
    }
}
