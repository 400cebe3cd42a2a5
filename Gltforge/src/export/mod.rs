//! Scene export pipeline.
//!
//! Flatten the scene, export meshes, export the node hierarchy, export the
//! materials the meshes referenced, pack buffers, then write either
//! `<stem>.gltf` + `<stem>.bin` or a single `<stem>.glb`. Everything is
//! assembled in memory before the first file is written, so a failed or
//! cancelled export leaves nothing behind.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

pub mod images;
pub mod material;
pub mod mesh;
pub mod nodes;
pub mod options;
pub mod progress;
pub mod session;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::gltf::{GltfDocument, GltfMaterial, encode_glb, finalize, to_json, to_json_pretty};
use crate::scene::{Node, Scene, SceneGraph, flatten_scene};

pub use images::embed_images;
pub use material::{MaterialExporter, PbrMaterialExporter};
pub use mesh::{GeometryMeshExporter, MeshExporter};
pub use nodes::{export_hierarchy, inject_root, is_node_relevant_to_export};
pub use options::{DEFAULT_GENERATOR, ExportOptions};
pub use progress::{CancellationToken, ExportPhase, ExportProgress, ProgressCallback};
pub use session::{ExportReport, ExportSession, MaterialRegistry};

/// Share of the overall progress spent exporting meshes.
const MESH_PROGRESS: f32 = 40.0;

/// Export `scene` next to `output_stem` with default options.
///
/// `output_stem` names the output without extension (`out/scene` writes
/// `out/scene.glb`); an extension, if present, is replaced.
pub fn export_scene(scene: &Scene, output_stem: &Path, binary: bool) -> Result<ExportReport> {
    export_scene_with_options(scene, output_stem, &ExportOptions::new().with_binary(binary))
}

/// Export `scene` with the default mesh and material exporters.
pub fn export_scene_with_options(
    scene: &Scene,
    output_stem: &Path,
    options: &ExportOptions<'_>,
) -> Result<ExportReport> {
    export_scene_with(
        scene,
        output_stem,
        options,
        &mut GeometryMeshExporter,
        &mut PbrMaterialExporter::new(),
    )
}

/// Export `scene` using custom mesh and material exporters.
pub fn export_scene_with(
    scene: &Scene,
    output_stem: &Path,
    options: &ExportOptions<'_>,
    mesh_exporter: &mut dyn MeshExporter,
    material_exporter: &mut dyn MaterialExporter,
) -> Result<ExportReport> {
    let (output_dir, stem) = split_output_stem(output_stem)?;
    let mut session = ExportSession::new(options);

    let mut doc = build_document(scene, options, &mut session, mesh_exporter, material_exporter)?;

    let output = if options.binary {
        session.set_progress(ExportPhase::EmbeddingImages, 90.0);
        let glb = assemble_glb(&mut doc, &output_dir, &session)?;
        vec![PendingFile::bytes(output_dir.join(format!("{stem}.glb")), glb)]
    } else {
        assemble_gltf(&mut doc, &output_dir, &stem, options)?
    };

    session.check_cancelled()?;
    session.set_progress(ExportPhase::WritingOutput, 90.0);
    fs::create_dir_all(&output_dir)?;
    for file in output {
        if let Err(err) = file.write() {
            for written in &session.report.output_files {
                if let Err(remove_err) = fs::remove_file(written) {
                    tracing::warn!("Could not remove {}: {remove_err}", written.display());
                }
            }
            return Err(err);
        }
        session.report.output_files.push(file.path);
    }

    session.report.node_count = doc.nodes.len();
    session.report.mesh_count = doc.meshes.len();
    session.report.material_count = doc.materials.len();
    session.report.image_count = doc.images.len();
    session.report.binary_bytes = doc.binary_len();

    session.set_progress(ExportPhase::Complete, 100.0);
    session.message(&format!(
        "Exported {} nodes, {} meshes, {} materials to {}",
        session.report.node_count,
        session.report.mesh_count,
        session.report.material_count,
        output_dir.join(&stem).display()
    ));
    Ok(session.report)
}

/// Assemble the complete, finalized document in memory.
///
/// Progress runs from 0 to 90; the caller reports the output phases.
pub fn build_document(
    scene: &Scene,
    options: &ExportOptions<'_>,
    session: &mut ExportSession<'_>,
    mesh_exporter: &mut dyn MeshExporter,
    material_exporter: &mut dyn MaterialExporter,
) -> Result<GltfDocument> {
    session.set_progress(ExportPhase::Starting, 0.0);
    session.check_cancelled()?;

    let graph = SceneGraph::new(flatten_scene(scene));
    let mut doc = GltfDocument::new(Some(options.generator.clone()), options.copyright.clone());
    doc.main_scene_mut().name.clone_from(&scene.name);

    session.set_progress(ExportPhase::ExportingMeshes, 10.0);
    let step = MESH_PROGRESS / scene.meshes.len().max(1) as f32;
    for node in graph.nodes() {
        let Node::Mesh {
            mesh,
            group_instance,
        } = *node
        else {
            continue;
        };
        session.check_cancelled()?;
        if let Some(mesh_idx) = mesh_exporter.export_mesh(mesh, &mut doc, &mut session.materials)? {
            session.register_group_mesh(group_instance, mesh_idx);
        }
        session.advance_progress(step, mesh.header.display_name());
    }

    session.set_progress(ExportPhase::ExportingNodes, 50.0);
    export_hierarchy(&graph, &mut doc, session)?;

    session.set_progress(ExportPhase::ExportingMaterials, 90.0);
    export_materials(scene, &mut doc, session, material_exporter)?;

    session.set_progress(ExportPhase::PackingBuffers, 90.0);
    finalize(&mut doc);
    Ok(doc)
}

/// Export every material registered by the mesh exporter, in registration
/// order, so material indices handed out earlier stay valid.
fn export_materials(
    scene: &Scene,
    doc: &mut GltfDocument,
    session: &mut ExportSession<'_>,
    material_exporter: &mut dyn MaterialExporter,
) -> Result<()> {
    let pending = session.materials.pending().to_vec();
    for (expected, material_id) in pending.iter().enumerate() {
        session.check_cancelled()?;
        let exported = if let Some(material) = scene.material(material_id) {
            material_exporter.export_material(material, doc)?
        } else {
            session.warning(format!(
                "Material '{material_id}' is referenced but not defined; using a default material"
            ));
            doc.materials.push(GltfMaterial {
                name: Some(material_id.clone()),
                ..GltfMaterial::default()
            });
            doc.materials.len() - 1
        };
        if exported != expected {
            session.warning(format!(
                "Material '{material_id}' landed at index {exported} instead of {expected}"
            ));
        }
    }
    Ok(())
}

fn assemble_glb(
    doc: &mut GltfDocument,
    output_dir: &Path,
    session: &ExportSession<'_>,
) -> Result<Vec<u8>> {
    for buffer in &mut doc.buffers {
        buffer.uri = None;
    }
    session.check_cancelled()?;
    let embedded = embed_images(doc, output_dir)?;
    if !embedded.is_empty() {
        tracing::debug!("Embedded {} images", embedded.len());
    }
    finalize(doc);
    encode_glb(doc)
}

fn assemble_gltf(
    doc: &mut GltfDocument,
    output_dir: &Path,
    stem: &str,
    options: &ExportOptions<'_>,
) -> Result<Vec<PendingFile>> {
    let mut files = Vec::new();

    for (i, buffer) in doc.buffers.iter_mut().enumerate() {
        if buffer.byte_length == 0 {
            continue;
        }
        let file_name = if i == 0 {
            format!("{stem}.bin")
        } else {
            format!("{stem}_{i}.bin")
        };
        buffer.uri = Some(file_name.clone());
        files.push(PendingFile::bytes(
            output_dir.join(file_name),
            std::mem::take(&mut buffer.bytes),
        ));
    }

    for image in &mut doc.images {
        let (Some(uri), Some(source)) = (&image.uri, &image.source_path) else {
            continue;
        };
        if options.copy_textures {
            let target = output_dir.join(uri);
            if target != *source {
                files.push(PendingFile::copy(target, source.clone()));
            }
        } else {
            image.uri = Some(source.to_string_lossy().replace('\\', "/"));
        }
    }

    let json = if options.pretty { to_json_pretty(doc)? } else { to_json(doc)? };
    files.insert(
        0,
        PendingFile::bytes(output_dir.join(format!("{stem}.gltf")), json.into_bytes()),
    );
    Ok(files)
}

fn split_output_stem(output_stem: &Path) -> Result<(PathBuf, String)> {
    let stem = output_stem
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::InvalidOutputPath {
            path: output_stem.to_path_buf(),
        })?;
    let dir = output_stem
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    Ok((dir, stem.to_string()))
}

/// An output file assembled in memory, or a texture to copy.
struct PendingFile {
    path: PathBuf,
    source: FileSource,
}

enum FileSource {
    Bytes(Vec<u8>),
    Copy(PathBuf),
}

impl PendingFile {
    fn bytes(path: PathBuf, bytes: Vec<u8>) -> Self {
        Self {
            path,
            source: FileSource::Bytes(bytes),
        }
    }

    fn copy(path: PathBuf, from: PathBuf) -> Self {
        Self {
            path,
            source: FileSource::Copy(from),
        }
    }

    fn write(&self) -> Result<()> {
        match &self.source {
            FileSource::Bytes(bytes) => fs::write(&self.path, bytes)?,
            FileSource::Copy(from) => {
                if let Some(parent) = self.path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(from, &self.path)?;
            }
        }
        tracing::debug!("Wrote {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{NodeHeader, SourceMaterial, SourceMesh};
    use std::sync::Mutex;

    fn undefined_material_scene() -> Scene {
        let mut mesh = SourceMesh::new(NodeHeader::new("m", "Quad"));
        mesh.positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]];
        mesh.indices = vec![0, 1, 2];
        mesh.material_id = Some("missing".into());
        Scene {
            meshes: vec![mesh],
            materials: vec![SourceMaterial {
                id: "unused".into(),
                ..SourceMaterial::default()
            }],
            ..Scene::default()
        }
    }

    #[test]
    fn test_split_output_stem() {
        let (dir, stem) = split_output_stem(Path::new("out/scene.glb")).unwrap();
        assert_eq!(dir, PathBuf::from("out"));
        assert_eq!(stem, "scene");

        let (dir, stem) = split_output_stem(Path::new("scene")).unwrap();
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(stem, "scene");

        assert!(matches!(
            split_output_stem(Path::new("/")),
            Err(Error::InvalidOutputPath { .. })
        ));
    }

    #[test]
    fn test_undefined_material_gets_default() {
        let options = ExportOptions::new();
        let mut session = ExportSession::new(&options);
        let doc = build_document(
            &undefined_material_scene(),
            &options,
            &mut session,
            &mut GeometryMeshExporter,
            &mut PbrMaterialExporter::new(),
        )
        .unwrap();

        assert_eq!(doc.materials.len(), 1);
        assert_eq!(doc.materials[0].name.as_deref(), Some("missing"));
        assert_eq!(doc.meshes[0].primitives[0].material, Some(0));
        assert_eq!(session.report.warnings.len(), 1);
    }

    #[test]
    fn test_progress_milestones() {
        let seen = Mutex::new(Vec::new());
        let callback = |p: &ExportProgress| seen.lock().unwrap().push(p.percent);
        let dir = tempfile::tempdir().unwrap();
        let options = ExportOptions::binary().with_progress(&callback);

        export_scene_with_options(&undefined_material_scene(), &dir.path().join("out"), &options).unwrap();

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.first(), Some(&0));
        assert!(seen.contains(&10));
        assert!(seen.contains(&50));
        assert!(seen.contains(&90));
        assert_eq!(seen.last(), Some(&100));
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    }
}
