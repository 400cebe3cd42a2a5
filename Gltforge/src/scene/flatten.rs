//! Scene flattening.
//!
//! Turns the per-category source lists into one ordered, indexable node list
//! and tags every mesh together with its instances.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use super::{MeshInstance, NodeHeader, Scene, SourceCamera, SourceLight, SourceMesh, Transform};

/// Group-instance tag of nodes that do not come from the source scene.
pub const SYNTHETIC_GROUP_INSTANCE: i32 = -1;

/// A flattened scene node, borrowing its source entity.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Mesh {
        mesh: &'a SourceMesh,
        group_instance: i32,
    },
    MeshInstance {
        instance: &'a MeshInstance,
        group_instance: i32,
    },
    Light(&'a SourceLight),
    Camera(&'a SourceCamera),
}

impl<'a> Node<'a> {
    #[must_use]
    pub fn header(&self) -> &'a NodeHeader {
        match self {
            Node::Mesh { mesh, .. } => &mesh.header,
            Node::MeshInstance { instance, .. } => &instance.header,
            Node::Light(light) => &light.header,
            Node::Camera(camera) => &camera.header,
        }
    }

    #[must_use]
    pub fn id(&self) -> &'a str {
        &self.header().id
    }

    #[must_use]
    pub fn parent_id(&self) -> Option<&'a str> {
        self.header().parent_id.as_deref()
    }

    #[must_use]
    pub fn name(&self) -> &'a str {
        self.header().display_name()
    }

    #[must_use]
    pub fn transform(&self) -> &'a Transform {
        &self.header().transform
    }

    /// Tag shared by a mesh and its instances; `None` for lights and cameras.
    #[must_use]
    pub fn group_instance(&self) -> Option<i32> {
        match self {
            Node::Mesh { group_instance, .. } | Node::MeshInstance { group_instance, .. } => {
                Some(*group_instance)
            }
            Node::Light(_) | Node::Camera(_) => None,
        }
    }

    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Mesh { .. } => "mesh",
            Node::MeshInstance { .. } => "mesh instance",
            Node::Light(_) => "light",
            Node::Camera(_) => "camera",
        }
    }
}

/// Flatten a scene into a single node list.
///
/// Order: each mesh followed by its instances (in source order), then lights,
/// then cameras. Tags start at 0 and increase by one per mesh.
#[must_use]
pub fn flatten_scene(scene: &Scene) -> Vec<Node<'_>> {
    let mut nodes = Vec::with_capacity(scene.node_count());

    for (group_instance, mesh) in (0..).zip(&scene.meshes) {
        nodes.push(Node::Mesh {
            mesh,
            group_instance,
        });
        nodes.extend(mesh.instances.iter().map(|instance| Node::MeshInstance {
            instance,
            group_instance,
        }));
    }

    nodes.extend(scene.lights.iter().map(Node::Light));
    nodes.extend(scene.cameras.iter().map(Node::Camera));

    tracing::debug!(
        "Flattened scene: {} meshes, {} lights, {} cameras -> {} nodes",
        scene.meshes.len(),
        scene.lights.len(),
        scene.cameras.len(),
        nodes.len()
    );

    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn mesh(id: &str, instances: usize) -> SourceMesh {
        let mut mesh = SourceMesh::new(NodeHeader::new(id, id));
        mesh.instances = (0..instances)
            .map(|i| MeshInstance {
                header: NodeHeader::new(format!("{id}-{i}"), ""),
            })
            .collect();
        mesh
    }

    fn sample_scene() -> Scene {
        Scene {
            meshes: vec![mesh("a", 2), mesh("b", 0), mesh("c", 1)],
            lights: vec![SourceLight {
                header: NodeHeader::new("sun", "Sun"),
                ..SourceLight::default()
            }],
            cameras: vec![SourceCamera {
                header: NodeHeader::new("cam", "Camera"),
                ..SourceCamera::default()
            }],
            ..Scene::default()
        }
    }

    #[test]
    fn test_node_count() {
        let scene = sample_scene();
        let nodes = flatten_scene(&scene);
        assert_eq!(nodes.len(), 3 + 1 + 2 + 1 + 1);
        assert_eq!(nodes.len(), scene.node_count());
    }

    #[test]
    fn test_ordering() {
        let scene = sample_scene();
        let ids: Vec<&str> = flatten_scene(&scene).iter().map(Node::id).collect();
        assert_eq!(ids, ["a", "a-0", "a-1", "b", "c", "c-0", "sun", "cam"]);
    }

    #[test]
    fn test_group_tags() {
        let scene = sample_scene();
        let nodes = flatten_scene(&scene);
        let tags: Vec<Option<i32>> = nodes.iter().map(Node::group_instance).collect();
        assert_eq!(
            tags,
            [Some(0), Some(0), Some(0), Some(1), Some(2), Some(2), None, None]
        );

        let mesh_tags: HashSet<i32> = nodes
            .iter()
            .filter(|n| matches!(n, Node::Mesh { .. }))
            .filter_map(Node::group_instance)
            .collect();
        assert_eq!(mesh_tags.len(), scene.meshes.len());
        assert!(!mesh_tags.contains(&SYNTHETIC_GROUP_INSTANCE));
    }

    #[test]
    fn test_empty_scene() {
        assert!(flatten_scene(&Scene::default()).is_empty());
    }
}
