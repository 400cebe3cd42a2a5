//! # Gltforge
//!
//! Exports an in-memory scene graph (meshes with instances, lights, cameras
//! and materials) as glTF 2.0, either as `.gltf` JSON plus a `.bin` buffer
//! or as a single binary `.glb` container.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use gltforge::prelude::*;
//!
//! let scene = Scene::from_json_file(Path::new("scene.json"))?;
//!
//! // Writes out/scene.glb
//! let report = export_scene(&scene, Path::new("out/scene"), true)?;
//! println!("{} nodes, {} warnings", report.node_count, report.warnings.len());
//! # Ok::<(), gltforge::Error>(())
//! ```
//!
//! ### Progress and Cancellation
//!
//! ```no_run
//! use std::path::Path;
//! use gltforge::prelude::*;
//!
//! # let scene = Scene::default();
//! let token = CancellationToken::new();
//! let on_progress = |p: &ExportProgress| println!("{}: {}%", p.phase.as_str(), p.percent);
//! let options = ExportOptions::binary()
//!     .with_progress(&on_progress)
//!     .with_cancellation(token.clone());
//!
//! export_scene_with_options(&scene, Path::new("out/scene"), &options)?;
//! # Ok::<(), gltforge::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `gltforge` command-line binary

pub mod error;
pub mod export;
pub mod gltf;
pub mod scene;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};

    pub use crate::scene::{
        CameraMode, LightKind, MeshInstance, NodeHeader, Scene, SourceCamera, SourceLight,
        SourceMaterial, SourceMesh, Transform,
    };

    pub use crate::export::{
        CancellationToken, ExportOptions, ExportPhase, ExportProgress, ExportReport,
        GeometryMeshExporter, MaterialExporter, MeshExporter, PbrMaterialExporter, export_scene,
        export_scene_with, export_scene_with_options,
    };

    pub use crate::gltf::{GlbInfo, GltfDocument, read_glb_info};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
