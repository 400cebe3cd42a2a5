//! Node hierarchy export.
//!
//! Walks the flattened scene from its roots, appending one glTF node per
//! exportable scene node, then wraps everything under a synthetic `root`
//! node converting the left-handed source frame to glTF's right-handed one.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use std::f32::consts::PI;

use crate::error::{Error, Result};
use crate::gltf::{GltfCamera, GltfDocument, GltfNode, GltfOrthographic, GltfPerspective};
use crate::scene::{CameraMode, Node, SYNTHETIC_GROUP_INSTANCE, SceneGraph, SourceCamera, Transform};

use super::session::ExportSession;

/// Name of the coordinate-conversion node wrapping the exported forest.
pub const ROOT_NODE_NAME: &str = "root";

/// Transform of the synthetic root: half a turn about +Y, Z mirrored.
pub const ROOT_TRANSFORM: Transform = Transform {
    position: [0.0; 3],
    rotation: [0.0, PI, 0.0],
    rotation_quaternion: None,
    scaling: [1.0, 1.0, -1.0],
};

/// Share of the overall progress spent on the hierarchy.
const HIERARCHY_PROGRESS: f32 = 40.0;

/// Export every root subtree of `graph`, then inject the synthetic root.
///
/// Returns the index of the synthetic root node.
pub fn export_hierarchy(
    graph: &SceneGraph<'_>,
    doc: &mut GltfDocument,
    session: &mut ExportSession<'_>,
) -> Result<usize> {
    let mut walker = HierarchyWalker::new(graph);
    let roots = graph.roots();
    let step = HIERARCHY_PROGRESS / roots.len().max(1) as f32;

    for &root in roots {
        session.check_cancelled()?;
        walker.export_node_rec(root, None, doc, session)?;
        session.advance_progress(step, graph.node(root).name());
    }

    for index in walker.unvisited() {
        let node = graph.node(index);
        session.warning(format!(
            "{} '{}' is not reachable from any root (parent '{}') and was not exported",
            node.kind_name(),
            node.name(),
            node.parent_id().unwrap_or_default()
        ));
    }

    Ok(inject_root(doc, session))
}

/// Whether `index` should appear in the output.
///
/// Meshes, mesh instances and cameras always do. A light only does when one
/// of its descendants does, since glTF core has no lights and an empty light
/// node is only worth keeping as a transform parent.
#[must_use]
pub fn is_node_relevant_to_export(graph: &SceneGraph<'_>, index: usize) -> bool {
    let mut seen = vec![false; graph.len()];
    is_relevant(graph, index, &mut seen)
}

fn is_relevant(graph: &SceneGraph<'_>, index: usize, seen: &mut [bool]) -> bool {
    if std::mem::replace(&mut seen[index], true) {
        return false;
    }
    match graph.node(index) {
        Node::Mesh { .. } | Node::MeshInstance { .. } | Node::Camera(_) => true,
        Node::Light(_) => graph
            .children(index)
            .iter()
            .any(|&child| is_relevant(graph, child, seen)),
    }
}

/// Move the scene's top-level nodes under a new `root` node.
///
/// Afterwards the scene lists exactly one node. Returns its index.
pub fn inject_root(doc: &mut GltfDocument, session: &ExportSession<'_>) -> usize {
    let previous = std::mem::take(&mut doc.main_scene_mut().nodes);
    let mut root = mesh_node(
        ROOT_NODE_NAME,
        &ROOT_TRANSFORM,
        SYNTHETIC_GROUP_INSTANCE,
        session,
    );
    root.children = previous;

    let root_idx = doc.add_node(root, None);
    tracing::debug!(
        "Injected root node {root_idx} over {} top-level nodes",
        doc.nodes[root_idx].children.len()
    );
    root_idx
}

struct HierarchyWalker<'g, 'a> {
    graph: &'g SceneGraph<'a>,
    visited: Vec<bool>,
}

impl<'g, 'a> HierarchyWalker<'g, 'a> {
    fn new(graph: &'g SceneGraph<'a>) -> Self {
        Self {
            graph,
            visited: vec![false; graph.len()],
        }
    }

    fn export_node_rec(
        &mut self,
        index: usize,
        parent: Option<usize>,
        doc: &mut GltfDocument,
        session: &mut ExportSession<'_>,
    ) -> Result<()> {
        self.visited[index] = true;
        let node = self.graph.node(index);

        let exported = match node {
            Node::Mesh { group_instance, .. } | Node::MeshInstance { group_instance, .. } => {
                let gltf_node = mesh_node(node.name(), node.transform(), group_instance, session);
                Some(doc.add_node(gltf_node, parent))
            }
            Node::Camera(camera) => match export_camera_node(camera, parent, doc) {
                Ok(node_idx) => Some(node_idx),
                Err(err) if !err.is_fatal() => {
                    session.error(&err);
                    None
                }
                Err(err) => return Err(err),
            },
            Node::Light(_) => {
                if is_node_relevant_to_export(self.graph, index) {
                    session.warning(format!(
                        "Light '{}' exported as an empty node: glTF 2.0 has no lights",
                        node.name()
                    ));
                    Some(doc.add_node(transform_node(node.name(), node.transform()), parent))
                } else {
                    session.message(&format!(
                        "Light '{}' skipped: nothing exportable below it",
                        node.name()
                    ));
                    None
                }
            }
        };

        session.check_cancelled()?;
        let Some(node_idx) = exported else {
            self.skip_subtree(index);
            return Ok(());
        };

        for &child in self.graph.children(index) {
            if self.visited[child] {
                // Duplicate ids can loop a subtree back onto itself
                let child_node = self.graph.node(child);
                session.warning(format!(
                    "{} '{}' is reached again through a duplicate node id; exported only once",
                    child_node.kind_name(),
                    child_node.name()
                ));
                continue;
            }
            self.export_node_rec(child, Some(node_idx), doc, session)?;
        }
        Ok(())
    }

    fn skip_subtree(&mut self, index: usize) {
        let mut stack = vec![index];
        while let Some(current) = stack.pop() {
            self.visited[current] = true;
            stack.extend(
                self.graph
                    .children(current)
                    .iter()
                    .filter(|&&child| !self.visited[child]),
            );
        }
    }

    fn unvisited(&self) -> impl Iterator<Item = usize> + '_ {
        self.visited
            .iter()
            .enumerate()
            .filter(|(_, visited)| !**visited)
            .map(|(i, _)| i)
    }
}

/// A node carrying only a name and a local transform.
///
/// Components equal to their glTF default are omitted.
fn transform_node(name: &str, transform: &Transform) -> GltfNode {
    let rotation = transform.quaternion();
    GltfNode {
        name: Some(name.to_string()),
        translation: (transform.position != [0.0; 3]).then_some(transform.position),
        rotation: (rotation != [0.0, 0.0, 0.0, 1.0]).then_some(rotation),
        scale: (transform.scaling != [1.0; 3]).then_some(transform.scaling),
        ..GltfNode::default()
    }
}

/// A node referencing the mesh exported for `group_instance`, if any.
fn mesh_node(
    name: &str,
    transform: &Transform,
    group_instance: i32,
    session: &ExportSession<'_>,
) -> GltfNode {
    GltfNode {
        mesh: session.group_mesh(group_instance),
        ..transform_node(name, transform)
    }
}

fn export_camera_node(
    camera: &SourceCamera,
    parent: Option<usize>,
    doc: &mut GltfDocument,
) -> Result<usize> {
    let name = camera.header.display_name();
    let gltf_camera = camera_projection(camera).map_err(|reason| Error::UnexportableNode {
        name: name.to_string(),
        reason,
    })?;

    let camera_idx = doc.add_camera(gltf_camera);
    let node = GltfNode {
        camera: Some(camera_idx),
        ..transform_node(name, &camera.header.transform)
    };
    Ok(doc.add_node(node, parent))
}

fn camera_projection(camera: &SourceCamera) -> std::result::Result<GltfCamera, String> {
    let name = Some(camera.header.display_name().to_string());
    match camera.mode {
        CameraMode::Perspective => {
            if !(camera.fov.is_finite() && camera.fov > 0.0) {
                return Err(format!("field of view must be positive, got {}", camera.fov));
            }
            if !(camera.min_z.is_finite() && camera.min_z > 0.0) {
                return Err(format!("near plane must be positive, got {}", camera.min_z));
            }
            Ok(GltfCamera {
                name,
                camera_type: "perspective".to_string(),
                perspective: Some(GltfPerspective {
                    aspect_ratio: camera.aspect_ratio.filter(|r| *r > 0.0),
                    yfov: camera.fov,
                    zfar: (camera.max_z > camera.min_z).then_some(camera.max_z),
                    znear: camera.min_z,
                }),
                orthographic: None,
            })
        }
        CameraMode::Orthographic => {
            let [xmag, ymag] = camera.ortho_size;
            if xmag == 0.0 || ymag == 0.0 {
                return Err("orthographic extents must be non-zero".to_string());
            }
            if !(camera.min_z >= 0.0 && camera.max_z > camera.min_z) {
                return Err(format!(
                    "invalid clip range {}..{}",
                    camera.min_z, camera.max_z
                ));
            }
            Ok(GltfCamera {
                name,
                camera_type: "orthographic".to_string(),
                perspective: None,
                orthographic: Some(GltfOrthographic {
                    xmag,
                    ymag,
                    zfar: camera.max_z,
                    znear: camera.min_z,
                }),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportOptions;
    use crate::scene::{NodeHeader, Scene, SourceLight, SourceMesh, flatten_scene};
    use pretty_assertions::assert_eq;

    fn light(id: &str, parent: Option<&str>) -> SourceLight {
        let header = NodeHeader::new(id, id);
        SourceLight {
            header: match parent {
                Some(p) => header.with_parent(p),
                None => header,
            },
            ..SourceLight::default()
        }
    }

    fn run(scene: &Scene) -> (GltfDocument, Vec<String>, Vec<String>) {
        let options = ExportOptions::new();
        let mut session = ExportSession::new(&options);
        let mut doc = GltfDocument::default();
        let graph = SceneGraph::new(flatten_scene(scene));
        export_hierarchy(&graph, &mut doc, &mut session).unwrap();
        (doc, session.report.warnings, session.report.errors)
    }

    fn names(doc: &GltfDocument, indices: &[usize]) -> Vec<String> {
        indices
            .iter()
            .map(|&i| doc.nodes[i].name.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_empty_scene_still_gets_root() {
        let (doc, _, _) = run(&Scene::default());
        assert_eq!(doc.nodes.len(), 1);
        assert_eq!(names(&doc, &doc.main_scene().nodes), ["root"]);
        assert!(doc.nodes[0].children.is_empty());
        assert_eq!(doc.nodes[0].scale, Some([1.0, 1.0, -1.0]));
        assert!(doc.nodes[0].mesh.is_none());
    }

    #[test]
    fn test_root_adopts_top_level_nodes() {
        let scene = Scene {
            meshes: vec![
                SourceMesh::new(NodeHeader::new("a", "A")),
                SourceMesh::new(NodeHeader::new("b", "B")),
                SourceMesh::new(NodeHeader::new("c", "C").with_parent("a")),
            ],
            ..Scene::default()
        };
        let (doc, _, _) = run(&scene);
        let root = doc.main_scene().nodes[0];
        assert_eq!(doc.main_scene().nodes.len(), 1);
        assert_eq!(names(&doc, &doc.nodes[root].children), ["A", "B"]);

        let a = doc.nodes[root].children[0];
        assert_eq!(names(&doc, &doc.nodes[a].children), ["C"]);
    }

    #[test]
    fn test_irrelevant_light_subtree_is_dropped() {
        let scene = Scene {
            lights: vec![light("l1", None), light("l2", Some("l1"))],
            ..Scene::default()
        };
        let (doc, warnings, _) = run(&scene);
        assert_eq!(doc.nodes.len(), 1);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_light_with_mesh_descendant_is_kept() {
        let scene = Scene {
            meshes: vec![SourceMesh::new(NodeHeader::new("m", "M").with_parent("l2"))],
            lights: vec![light("l1", None), light("l2", Some("l1"))],
            ..Scene::default()
        };
        let (doc, warnings, _) = run(&scene);
        assert_eq!(doc.nodes.len(), 4);
        assert_eq!(warnings.len(), 2);

        let graph_scene = SceneGraph::new(flatten_scene(&scene));
        assert!(is_node_relevant_to_export(&graph_scene, 1));
        assert!(is_node_relevant_to_export(&graph_scene, 2));
    }

    #[test]
    fn test_invalid_camera_is_contained() {
        let scene = Scene {
            meshes: vec![SourceMesh::new(NodeHeader::new("m", "M").with_parent("cam"))],
            cameras: vec![
                SourceCamera {
                    header: NodeHeader::new("cam", "Broken"),
                    fov: 0.0,
                    ..SourceCamera::default()
                },
                SourceCamera {
                    header: NodeHeader::new("ok", "Good"),
                    ..SourceCamera::default()
                },
            ],
            ..Scene::default()
        };
        let (doc, warnings, errors) = run(&scene);

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Broken"));
        assert_eq!(doc.cameras.len(), 1);
        let root = doc.main_scene().nodes[0];
        assert_eq!(names(&doc, &doc.nodes[root].children), ["Good"]);
        // The mesh below the broken camera is skipped, not reported as orphaned
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_orphans_are_reported() {
        let scene = Scene {
            meshes: vec![SourceMesh::new(NodeHeader::new("m", "M").with_parent("nowhere"))],
            ..Scene::default()
        };
        let (doc, warnings, _) = run(&scene);
        assert_eq!(doc.nodes.len(), 1);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("nowhere"));
    }

    #[test]
    fn test_duplicate_ids_terminate() {
        let scene = Scene {
            meshes: vec![
                SourceMesh::new(NodeHeader::new("x", "First X")),
                SourceMesh::new(NodeHeader::new("y", "Y").with_parent("x")),
                SourceMesh::new(NodeHeader::new("x", "Second X").with_parent("y")),
            ],
            ..Scene::default()
        };
        let (doc, warnings, _) = run(&scene);

        assert_eq!(doc.nodes.len(), 4);
        let root = doc.main_scene().nodes[0];
        assert_eq!(names(&doc, &doc.nodes[root].children), ["First X"]);
        let first = doc.nodes[root].children[0];
        let y = doc.nodes[first].children[0];
        assert_eq!(names(&doc, &doc.nodes[y].children), ["Second X"]);
        assert!(doc.nodes[doc.nodes[y].children[0]].children.is_empty());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("'Y' is reached again"));
    }

    #[test]
    fn test_cancellation_is_polled_for_skipped_nodes() {
        let scene = Scene {
            lights: vec![light("l1", None)],
            ..Scene::default()
        };
        let token = crate::export::CancellationToken::new();
        let options = ExportOptions::new().with_cancellation(token.clone());
        let mut session = ExportSession::new(&options);
        let graph = SceneGraph::new(flatten_scene(&scene));
        let mut walker = HierarchyWalker::new(&graph);

        token.cancel();
        let result = walker.export_node_rec(0, None, &mut GltfDocument::default(), &mut session);
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[test]
    fn test_default_transform_components_are_omitted() {
        let node = transform_node("n", &Transform::IDENTITY);
        assert!(node.translation.is_none());
        assert!(node.rotation.is_none());
        assert!(node.scale.is_none());

        let moved = Transform {
            position: [1.0, 2.0, 3.0],
            ..Transform::IDENTITY
        };
        assert_eq!(transform_node("n", &moved).translation, Some([1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_orthographic_camera() {
        let camera = SourceCamera {
            mode: CameraMode::Orthographic,
            min_z: 0.0,
            ortho_size: [4.0, 3.0],
            ..SourceCamera::default()
        };
        let gltf = camera_projection(&camera).unwrap();
        assert_eq!(gltf.camera_type, "orthographic");
        assert_eq!(gltf.orthographic.unwrap().xmag, 4.0);
    }
}
