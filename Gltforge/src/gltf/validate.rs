//! Cross-reference checks run before serialization.

use crate::error::{Error, Result};

use super::types::GltfDocument;

fn check(from: impl FnOnce() -> String, target: &'static str, index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(Error::DanglingReference {
            from: from(),
            target,
            index,
        })
    }
}

/// Verify that every index stored in the document points at an existing entry.
pub fn validate_references(doc: &GltfDocument) -> Result<()> {
    check(|| "document".into(), "scene", doc.scene, doc.scenes.len())?;

    for (i, scene) in doc.scenes.iter().enumerate() {
        for &node in &scene.nodes {
            check(|| format!("scenes[{i}]"), "node", node, doc.nodes.len())?;
        }
    }

    for (i, node) in doc.nodes.iter().enumerate() {
        let from = || format!("nodes[{i}]");
        if let Some(mesh) = node.mesh {
            check(from, "mesh", mesh, doc.meshes.len())?;
        }
        if let Some(camera) = node.camera {
            check(from, "camera", camera, doc.cameras.len())?;
        }
        for &child in &node.children {
            check(from, "node", child, doc.nodes.len())?;
        }
    }

    for (i, mesh) in doc.meshes.iter().enumerate() {
        let from = || format!("meshes[{i}]");
        for primitive in &mesh.primitives {
            for &accessor in primitive.attributes.values() {
                check(from, "accessor", accessor, doc.accessors.len())?;
            }
            if let Some(indices) = primitive.indices {
                check(from, "accessor", indices, doc.accessors.len())?;
            }
            if let Some(material) = primitive.material {
                check(from, "material", material, doc.materials.len())?;
            }
        }
    }

    for (i, material) in doc.materials.iter().enumerate() {
        let texture = material
            .pbr_metallic_roughness
            .as_ref()
            .and_then(|pbr| pbr.base_color_texture.as_ref());
        if let Some(info) = texture {
            check(|| format!("materials[{i}]"), "texture", info.index, doc.textures.len())?;
        }
    }

    for (i, texture) in doc.textures.iter().enumerate() {
        let from = || format!("textures[{i}]");
        check(from, "image", texture.source, doc.images.len())?;
        if let Some(sampler) = texture.sampler {
            check(from, "sampler", sampler, doc.samplers.len())?;
        }
    }

    for (i, image) in doc.images.iter().enumerate() {
        if let Some(view) = image.buffer_view {
            check(|| format!("images[{i}]"), "bufferView", view, doc.buffer_views.len())?;
        }
    }

    for (i, accessor) in doc.accessors.iter().enumerate() {
        check(
            || format!("accessors[{i}]"),
            "bufferView",
            accessor.buffer_view,
            doc.buffer_views.len(),
        )?;
    }

    for (i, view) in doc.buffer_views.iter().enumerate() {
        check(|| format!("bufferViews[{i}]"), "buffer", view.buffer, doc.buffers.len())?;
    }

    Ok(())
}

impl GltfDocument {
    /// See [`validate_references`].
    pub fn validate_references(&self) -> Result<()> {
        validate_references(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gltf::types::GltfNode;

    #[test]
    fn test_valid_document() {
        let mut doc = GltfDocument::default();
        let parent = doc.add_node(GltfNode::default(), None);
        doc.add_node(GltfNode::default(), Some(parent));
        assert!(validate_references(&doc).is_ok());
    }

    #[test]
    fn test_dangling_mesh() {
        let mut doc = GltfDocument::default();
        doc.add_node(
            GltfNode {
                mesh: Some(0),
                ..GltfNode::default()
            },
            None,
        );
        let err = validate_references(&doc).unwrap_err();
        assert!(matches!(
            err,
            Error::DanglingReference { target: "mesh", index: 0, .. }
        ));
    }

    #[test]
    fn test_dangling_scene_node() {
        let mut doc = GltfDocument::default();
        doc.main_scene_mut().nodes.push(3);
        assert!(doc.validate_references().is_err());
    }
}
