//! Mesh export.
//!
//! Geometry extraction is pluggable: the driver calls a [`MeshExporter`] once
//! per source mesh and shares the returned glTF mesh with every instance of
//! that mesh. [`GeometryMeshExporter`] covers plain triangle lists.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use indexmap::IndexMap;

use crate::error::Result;
use crate::gltf::{GltfDocument, GltfMesh, GltfPrimitive};
use crate::scene::SourceMesh;

use super::session::MaterialRegistry;

const VEC3_STRIDE: usize = 3 * size_of::<f32>();
const VEC2_STRIDE: usize = 2 * size_of::<f32>();

/// Appends the glTF representation of a source mesh to a document.
pub trait MeshExporter {
    /// Export `mesh` into `doc`.
    ///
    /// Returns the glTF mesh index, or `None` when the mesh carries no
    /// geometry (its nodes are still exported, without a mesh). Materials are
    /// referenced through `materials`, which hands out their final indices.
    fn export_mesh(
        &mut self,
        mesh: &SourceMesh,
        doc: &mut GltfDocument,
        materials: &mut MaterialRegistry,
    ) -> Result<Option<usize>>;
}

/// Writes positions, normals, texture coordinates and indices of a triangle
/// list, one primitive per mesh.
#[derive(Debug, Default)]
pub struct GeometryMeshExporter;

impl MeshExporter for GeometryMeshExporter {
    fn export_mesh(
        &mut self,
        mesh: &SourceMesh,
        doc: &mut GltfDocument,
        materials: &mut MaterialRegistry,
    ) -> Result<Option<usize>> {
        let name = mesh.header.display_name();
        if !mesh.has_geometry() {
            tracing::debug!("Mesh '{name}' has no geometry");
            return Ok(None);
        }

        let vertex_count = mesh.positions.len();
        let mut attributes = IndexMap::new();

        let vec3_view = doc.add_vertex_view("bufferViewFloatVector3", VEC3_STRIDE);
        attributes.insert(
            "POSITION".to_string(),
            doc.add_vec3_accessor(vec3_view, &mesh.positions, true),
        );
        if mesh.normals.len() == vertex_count {
            attributes.insert(
                "NORMAL".to_string(),
                doc.add_vec3_accessor(vec3_view, &mesh.normals, false),
            );
        } else if !mesh.normals.is_empty() {
            tracing::warn!(
                "Mesh '{name}': {} normals for {vertex_count} vertices, normals dropped",
                mesh.normals.len()
            );
        }

        if mesh.uvs.len() == vertex_count {
            let vec2_view = doc.add_vertex_view("bufferViewFloatVector2", VEC2_STRIDE);
            attributes.insert(
                "TEXCOORD_0".to_string(),
                doc.add_vec2_accessor(vec2_view, &mesh.uvs),
            );
        } else if !mesh.uvs.is_empty() {
            tracing::warn!(
                "Mesh '{name}': {} texture coordinates for {vertex_count} vertices, dropped",
                mesh.uvs.len()
            );
        }

        let indices = if mesh.indices.is_empty() {
            None
        } else {
            let scalar_view = doc.add_index_view("bufferViewScalar");
            Some(doc.add_index_accessor(scalar_view, &mesh.indices))
        };

        let material = mesh.material_id.as_deref().map(|id| materials.index_of(id));

        let mesh_idx = doc.add_mesh(GltfMesh {
            name: Some(name.to_string()),
            primitives: vec![GltfPrimitive {
                attributes,
                indices,
                material,
            }],
        });

        tracing::debug!(
            "Exported mesh '{name}' ({vertex_count} vertices, {} indices) as mesh {mesh_idx}",
            mesh.indices.len()
        );
        Ok(Some(mesh_idx))
    }
}
