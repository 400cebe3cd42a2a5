//! Export configuration.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use std::fmt;

use super::progress::{CancellationToken, ProgressCallback};

/// Generator string written to `asset.generator` unless overridden.
pub const DEFAULT_GENERATOR: &str = concat!("Gltforge ", env!("CARGO_PKG_VERSION"));

/// Options controlling a scene export.
#[derive(Clone)]
pub struct ExportOptions<'a> {
    /// Emit a single `.glb` instead of `.gltf` + `.bin`.
    pub binary: bool,
    /// Value for `asset.generator`.
    pub generator: String,
    /// Value for `asset.copyright`.
    pub copyright: Option<String>,
    /// Copy texture files next to the `.gltf` (non-binary mode only).
    pub copy_textures: bool,
    /// Indent the `.gltf` JSON. The GLB JSON chunk is always compact.
    pub pretty: bool,
    /// Receives 0-100 progress updates.
    pub progress: Option<ProgressCallback<'a>>,
    /// Polled between export phases.
    pub cancellation: Option<CancellationToken>,
}

impl ExportOptions<'_> {
    /// Options for `.gltf` + `.bin` output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            binary: false,
            generator: DEFAULT_GENERATOR.to_string(),
            copyright: None,
            copy_textures: true,
            pretty: false,
            progress: None,
            cancellation: None,
        }
    }

    /// Options for `.glb` output.
    #[must_use]
    pub fn binary() -> Self {
        Self {
            binary: true,
            ..Self::new()
        }
    }

    #[must_use]
    pub fn with_binary(mut self, binary: bool) -> Self {
        self.binary = binary;
        self
    }

    #[must_use]
    pub fn with_generator(mut self, generator: impl Into<String>) -> Self {
        self.generator = generator.into();
        self
    }

    #[must_use]
    pub fn with_copyright(mut self, copyright: impl Into<String>) -> Self {
        self.copyright = Some(copyright.into());
        self
    }

    #[must_use]
    pub fn with_copy_textures(mut self, copy: bool) -> Self {
        self.copy_textures = copy;
        self
    }

    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

impl<'a> ExportOptions<'a> {
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressCallback<'a>) -> Self {
        self.progress = Some(progress);
        self
    }
}

impl Default for ExportOptions<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExportOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportOptions")
            .field("binary", &self.binary)
            .field("generator", &self.generator)
            .field("copyright", &self.copyright)
            .field("copy_textures", &self.copy_textures)
            .field("pretty", &self.pretty)
            .field("progress", &self.progress.is_some())
            .field("cancellation", &self.cancellation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = ExportOptions::new();
        assert!(!opts.binary);
        assert!(opts.copy_textures);
        assert!(opts.generator.starts_with("Gltforge"));
    }

    #[test]
    fn test_builder() {
        let opts = ExportOptions::binary()
            .with_generator("test")
            .with_copyright("2025 nobody");
        assert!(opts.binary);
        assert_eq!(opts.generator, "test");
        assert_eq!(opts.copyright.as_deref(), Some("2025 nobody"));
    }
}
