//! Error types for `Gltforge`
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `Gltforge` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The output path has no usable file stem.
    #[error("invalid output path: {}", path.display())]
    InvalidOutputPath {
        /// The rejected output path.
        path: PathBuf,
    },

    // ==================== Export Control ====================
    /// The host cancelled the export.
    #[error("export cancelled")]
    Cancelled,

    /// A scene node could not be expressed in glTF.
    ///
    /// Contained by the node exporter: the node and its subtree are skipped
    /// and the export continues.
    #[error("node '{name}' cannot be exported: {reason}")]
    UnexportableNode {
        /// Name (or identifier) of the offending node.
        name: String,
        /// Why the node was rejected.
        reason: String,
    },

    // ==================== Document Errors ====================
    /// A document entry references an index that does not exist.
    #[error("{from} references missing {target} index {index}")]
    DanglingReference {
        /// The referencing entry, e.g. `nodes[3]`.
        from: String,
        /// The referenced collection, e.g. `mesh`.
        target: &'static str,
        /// The out-of-range index.
        index: usize,
    },

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ==================== GLB Container Errors ====================
    /// The bytes are not a valid GLB container.
    #[error("invalid GLB: {message}")]
    InvalidGlb {
        /// Description of what is invalid.
        message: String,
    },

    // ==================== Image Errors ====================
    /// Failed to open or decode a source image.
    #[error("failed to load image {}: {source}", path.display())]
    ImageLoad {
        /// The image file that failed to load.
        path: PathBuf,
        /// The decoder error.
        source: image::ImageError,
    },

    /// Failed to re-encode an image for embedding.
    #[error("failed to encode image {}: {source}", path.display())]
    ImageEncode {
        /// The image file being embedded.
        path: PathBuf,
        /// The encoder error.
        source: image::ImageError,
    },
}

impl Error {
    /// Whether this error aborts the whole export.
    ///
    /// Only per-node problems are contained; resource and document errors
    /// terminate the operation.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::UnexportableNode { .. })
    }
}

/// A specialized Result type for `Gltforge` operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_node_errors_are_contained() {
        let node = Error::UnexportableNode {
            name: "cam".into(),
            reason: "zero fov".into(),
        };
        assert!(!node.is_fatal());
        assert!(Error::Cancelled.is_fatal());
        assert!(Error::Io(std::io::Error::other("disk full")).is_fatal());
    }

    #[test]
    fn test_dangling_reference_message() {
        let err = Error::DanglingReference {
            from: "nodes[2]".into(),
            target: "mesh",
            index: 7,
        };
        assert_eq!(err.to_string(), "nodes[2] references missing mesh index 7");
    }
}
