//! Per-export state threaded through every phase.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{Error, Result};

use super::options::ExportOptions;
use super::progress::{CancellationToken, ExportPhase, ExportProgress, ProgressCallback};

/// Materials referenced by exported meshes, in first-reference order.
///
/// The position of a material id in this list is its final index in the
/// document: materials are exported in this order once all nodes are done.
#[derive(Debug, Default)]
pub struct MaterialRegistry {
    pending: Vec<String>,
}

impl MaterialRegistry {
    /// Document index for `material_id`, registering it on first use.
    pub fn index_of(&mut self, material_id: &str) -> usize {
        if let Some(idx) = self.pending.iter().position(|id| id == material_id) {
            return idx;
        }
        self.pending.push(material_id.to_string());
        self.pending.len() - 1
    }

    #[must_use]
    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// What happened during an export.
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    /// Files written, in write order.
    pub output_files: Vec<PathBuf>,
    /// Nodes in the output document (synthetic root included).
    pub node_count: usize,
    pub mesh_count: usize,
    pub material_count: usize,
    pub image_count: usize,
    /// Total bytes across all buffers.
    pub binary_bytes: usize,
    pub warnings: Vec<String>,
    /// Contained per-node errors; the export still completed.
    pub errors: Vec<String>,
}

/// Mutable state of one export pass.
pub struct ExportSession<'a> {
    /// glTF mesh index per group-instance tag.
    group_meshes: HashMap<i32, usize>,
    pub materials: MaterialRegistry,
    pub report: ExportReport,
    progress: Option<ProgressCallback<'a>>,
    cancellation: Option<CancellationToken>,
    phase: ExportPhase,
    percent: f32,
}

impl<'a> ExportSession<'a> {
    #[must_use]
    pub fn new(options: &ExportOptions<'a>) -> Self {
        Self {
            group_meshes: HashMap::new(),
            materials: MaterialRegistry::default(),
            report: ExportReport::default(),
            progress: options.progress,
            cancellation: options.cancellation.clone(),
            phase: ExportPhase::Starting,
            percent: 0.0,
        }
    }

    // ==================== Messages ====================

    pub fn message(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    pub fn warning(&mut self, msg: String) {
        tracing::warn!("{msg}");
        self.report.warnings.push(msg);
    }

    pub fn error(&mut self, err: &Error) {
        tracing::error!("{err}");
        self.report.errors.push(err.to_string());
    }

    // ==================== Control points ====================

    /// Abort with [`Error::Cancelled`] if the host asked to stop.
    pub fn check_cancelled(&self) -> Result<()> {
        match &self.cancellation {
            Some(token) if token.is_cancelled() => {
                tracing::info!("Export cancelled during {}", self.phase.as_str());
                Err(Error::Cancelled)
            }
            _ => Ok(()),
        }
    }

    /// Jump to an absolute percentage at the start of a phase.
    pub fn set_progress(&mut self, phase: ExportPhase, percent: f32) {
        self.phase = phase;
        self.percent = percent;
        self.emit(ExportProgress::new(self.phase, self.percent()));
    }

    /// Advance within the current phase after finishing `item`.
    pub fn advance_progress(&mut self, step: f32, item: &str) {
        self.percent += step;
        self.emit(ExportProgress::with_item(self.phase, self.percent(), item));
    }

    #[must_use]
    pub fn percent(&self) -> u8 {
        self.percent.clamp(0.0, 100.0) as u8
    }

    fn emit(&self, update: ExportProgress) {
        if let Some(callback) = self.progress {
            callback(&update);
        }
    }

    // ==================== Mesh groups ====================

    pub fn register_group_mesh(&mut self, group_instance: i32, mesh_idx: usize) {
        self.group_meshes.insert(group_instance, mesh_idx);
    }

    /// The glTF mesh shared by every node of a group, if one was exported.
    #[must_use]
    pub fn group_mesh(&self, group_instance: i32) -> Option<usize> {
        self.group_meshes.get(&group_instance).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_material_registry_dedups() {
        let mut registry = MaterialRegistry::default();
        assert_eq!(registry.index_of("wood"), 0);
        assert_eq!(registry.index_of("steel"), 1);
        assert_eq!(registry.index_of("wood"), 0);
        assert_eq!(registry.pending(), &["wood", "steel"]);
    }

    #[test]
    fn test_progress_is_reported() {
        let seen = Mutex::new(Vec::new());
        let callback =
            |p: &ExportProgress| seen.lock().unwrap().push((p.percent, p.current_item.clone()));
        let options = ExportOptions::new().with_progress(&callback);
        let mut session = ExportSession::new(&options);

        session.set_progress(ExportPhase::ExportingMeshes, 10.0);
        session.advance_progress(20.0, "Rock");
        session.advance_progress(20.0, "Tree");

        assert_eq!(
            *seen.lock().unwrap(),
            vec![(10, None), (30, Some("Rock".to_string())), (50, Some("Tree".to_string()))]
        );
    }

    #[test]
    fn test_cancellation_checkpoint() {
        let token = CancellationToken::new();
        let options = ExportOptions::new().with_cancellation(token.clone());
        let session = ExportSession::new(&options);

        assert!(session.check_cancelled().is_ok());
        token.cancel();
        assert!(matches!(session.check_cancelled(), Err(Error::Cancelled)));
    }
}
