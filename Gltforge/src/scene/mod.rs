//! Source scene model.
//!
//! The in-memory scene handed to the exporter: meshes (each optionally
//! owning instances), lights, cameras, and the materials meshes refer to.
//! Rotations follow the left-handed yaw/pitch/roll convention of the
//! authoring side; the exporter converts to glTF's right-handed frame.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

pub mod flatten;
pub mod graph;

use std::path::{Path, PathBuf};

use glam::{EulerRot, Quat};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use flatten::{Node, SYNTHETIC_GROUP_INSTANCE, flatten_scene};
pub use graph::SceneGraph;

/// Local transform of a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transform {
    pub position: [f32; 3],
    /// Euler angles in radians (pitch about X, yaw about Y, roll about Z).
    pub rotation: [f32; 3],
    /// Takes precedence over `rotation` when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_quaternion: Option<[f32; 4]>,
    pub scaling: [f32; 3],
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: [0.0; 3],
        rotation: [0.0; 3],
        rotation_quaternion: None,
        scaling: [1.0; 3],
    };

    /// Rotation as an `[x, y, z, w]` quaternion.
    #[must_use]
    pub fn quaternion(&self) -> [f32; 4] {
        if let Some(q) = self.rotation_quaternion {
            return q;
        }
        let [pitch, yaw, roll] = self.rotation;
        Quat::from_euler(EulerRot::YXZ, yaw, pitch, roll).to_array()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Fields shared by every node kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeHeader {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(flatten)]
    pub transform: Transform,
}

impl NodeHeader {
    /// Create a root-level header with an identity transform.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: None,
            transform: Transform::IDENTITY,
        }
    }

    /// Set the parent identifier.
    #[must_use]
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Display name, falling back to the identifier.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() { &self.id } else { &self.name }
    }
}

/// A mesh with its geometry and any repeated-geometry instances.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceMesh {
    #[serde(flatten)]
    pub header: NodeHeader,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_id: Option<String>,
    pub instances: Vec<MeshInstance>,
}

impl SourceMesh {
    #[must_use]
    pub fn new(header: NodeHeader) -> Self {
        Self {
            header,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn has_geometry(&self) -> bool {
        !self.positions.is_empty()
    }
}

/// A placement of another mesh's geometry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshInstance {
    #[serde(flatten)]
    pub header: NodeHeader,
}

/// Light type. Carried for diagnostics only: glTF 2.0 core has no lights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightKind {
    #[default]
    Point,
    Directional,
    Spot,
    Hemispheric,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLight {
    #[serde(flatten)]
    pub header: NodeHeader,
    #[serde(default)]
    pub kind: LightKind,
    #[serde(default)]
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraMode {
    #[default]
    Perspective,
    Orthographic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceCamera {
    #[serde(flatten)]
    pub header: NodeHeader,
    pub mode: CameraMode,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub min_z: f32,
    pub max_z: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<f32>,
    /// Half extents of the orthographic view volume.
    pub ortho_size: [f32; 2],
}

impl Default for SourceCamera {
    fn default() -> Self {
        Self {
            header: NodeHeader::default(),
            mode: CameraMode::Perspective,
            fov: 0.8,
            min_z: 1.0,
            max_z: 10_000.0,
            aspect_ratio: None,
            ortho_size: [1.0, 1.0],
        }
    }
}

/// Metallic-roughness material parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceMaterial {
    pub id: String,
    pub name: String,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub emissive: [f32; 3],
    pub double_sided: bool,
    /// Texture file, relative to the scene file or absolute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_color_texture: Option<PathBuf>,
}

impl Default for SourceMaterial {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            base_color: [1.0; 4],
            metallic: 0.0,
            roughness: 1.0,
            emissive: [0.0; 3],
            double_sided: false,
            base_color_texture: None,
        }
    }
}

/// The complete source scene.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub name: Option<String>,
    pub meshes: Vec<SourceMesh>,
    pub lights: Vec<SourceLight>,
    pub cameras: Vec<SourceCamera>,
    pub materials: Vec<SourceMaterial>,
}

impl Scene {
    /// Parse a scene from its JSON description.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a scene from a JSON file.
    ///
    /// Relative texture paths are resolved against the file's directory.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let mut scene = Self::from_json_str(&json)?;
        if let Some(base) = path.parent() {
            scene.resolve_texture_paths(base);
        }
        Ok(scene)
    }

    fn resolve_texture_paths(&mut self, base: &Path) {
        for material in &mut self.materials {
            if let Some(texture) = material
                .base_color_texture
                .as_mut()
                .filter(|t| t.is_relative())
            {
                *texture = base.join(&*texture);
            }
        }
    }

    /// Look up a material by identifier.
    #[must_use]
    pub fn material(&self, id: &str) -> Option<&SourceMaterial> {
        self.materials.iter().find(|m| m.id == id)
    }

    /// Total number of nodes the scene flattens to.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.meshes.iter().map(|m| 1 + m.instances.len()).sum::<usize>()
            + self.lights.len()
            + self.cameras.len()
    }
}
