//! Types for export progress tracking and cancellation
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// ============================================================================
// Progress Types
// ============================================================================

/// Progress callback type for export operations
pub type ProgressCallback<'a> = &'a (dyn Fn(&ExportProgress) + Sync + Send);

/// Progress information during an export
#[derive(Debug, Clone)]
pub struct ExportProgress {
    /// Current operation phase
    pub phase: ExportPhase,
    /// Overall completion, 0-100
    pub percent: u8,
    /// Item being processed (if applicable)
    pub current_item: Option<String>,
}

impl ExportProgress {
    /// Create a new progress update
    #[must_use]
    pub fn new(phase: ExportPhase, percent: u8) -> Self {
        Self {
            phase,
            percent,
            current_item: None,
        }
    }

    /// Create a progress update with an item name
    #[must_use]
    pub fn with_item(phase: ExportPhase, percent: u8, item: impl Into<String>) -> Self {
        Self {
            phase,
            percent,
            current_item: Some(item.into()),
        }
    }

    /// Get the progress fraction (0.0 - 1.0)
    #[must_use]
    pub fn fraction(&self) -> f32 {
        f32::from(self.percent.min(100)) / 100.0
    }
}

/// Phase of an export operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPhase {
    /// Flattening the scene graph
    Starting,
    /// Exporting mesh geometry
    ExportingMeshes,
    /// Exporting the node hierarchy
    ExportingNodes,
    /// Exporting materials
    ExportingMaterials,
    /// Packing buffers
    PackingBuffers,
    /// Embedding images into the binary buffer
    EmbeddingImages,
    /// Writing output files
    WritingOutput,
    /// Operation complete
    Complete,
}

impl ExportPhase {
    /// Get a human-readable description of this phase
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "Starting",
            Self::ExportingMeshes => "Exporting meshes",
            Self::ExportingNodes => "Exporting nodes",
            Self::ExportingMaterials => "Exporting materials",
            Self::PackingBuffers => "Packing buffers",
            Self::EmbeddingImages => "Embedding images",
            Self::WritingOutput => "Writing output",
            Self::Complete => "Complete",
        }
    }
}

// ============================================================================
// Cancellation
// ============================================================================

/// Shared flag the host raises to abort an export.
///
/// Clones share the same flag, so the host keeps one clone and hands another
/// to the exporter.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The export stops at its next checkpoint.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
