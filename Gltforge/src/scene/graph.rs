//! Parent/child index over the flattened node list.

use std::collections::{HashMap, HashSet};

use super::flatten::Node;

/// Flattened nodes plus a precomputed parent -> children index.
///
/// Children keep their flattened order, so walking the index visits nodes in
/// the same order as scanning the whole list for matching parent ids.
#[derive(Debug)]
pub struct SceneGraph<'a> {
    nodes: Vec<Node<'a>>,
    children: HashMap<&'a str, Vec<usize>>,
    roots: Vec<usize>,
}

impl<'a> SceneGraph<'a> {
    #[must_use]
    pub fn new(nodes: Vec<Node<'a>>) -> Self {
        let mut children: HashMap<&'a str, Vec<usize>> = HashMap::new();
        let mut roots = Vec::new();
        let mut ids = HashSet::new();

        for (i, node) in nodes.iter().enumerate() {
            if !ids.insert(node.id()) {
                tracing::warn!(
                    "Node '{}' reuses id '{}'; both share one set of children",
                    node.name(),
                    node.id()
                );
            }
            match node.parent_id() {
                None => roots.push(i),
                Some(parent) if parent == node.id() => {
                    tracing::warn!("Node '{}' is its own parent and is ignored", node.name());
                }
                Some(parent) => children.entry(parent).or_default().push(i),
            }
        }

        Self {
            nodes,
            children,
            roots,
        }
    }

    #[must_use]
    pub fn node(&self, index: usize) -> Node<'a> {
        self.nodes[index]
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node<'a>] {
        &self.nodes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Positions of nodes without a parent, in flattened order.
    #[must_use]
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Positions of the direct children of `index`, in flattened order.
    #[must_use]
    pub fn children(&self, index: usize) -> &[usize] {
        self.children
            .get(self.nodes[index].id())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{NodeHeader, Scene, SourceLight, SourceMesh, flatten_scene};

    #[test]
    fn test_roots_and_children() {
        let scene = Scene {
            meshes: vec![
                SourceMesh::new(NodeHeader::new("m1", "").with_parent("l1")),
                SourceMesh::new(NodeHeader::new("m2", "")),
                SourceMesh::new(NodeHeader::new("m3", "").with_parent("l1")),
            ],
            lights: vec![SourceLight {
                header: NodeHeader::new("l1", ""),
                ..SourceLight::default()
            }],
            ..Scene::default()
        };
        let graph = SceneGraph::new(flatten_scene(&scene));

        assert_eq!(graph.roots(), &[1, 3]);
        assert_eq!(graph.children(3), &[0, 2]);
        assert!(graph.children(1).is_empty());
    }

    #[test]
    fn test_self_parent_is_dropped() {
        let scene = Scene {
            meshes: vec![SourceMesh::new(NodeHeader::new("m1", "").with_parent("m1"))],
            ..Scene::default()
        };
        let graph = SceneGraph::new(flatten_scene(&scene));
        assert!(graph.roots().is_empty());
        assert!(graph.children(0).is_empty());
    }
}
