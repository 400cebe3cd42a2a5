//! Document serialization.
//!
//! `serde_json` writes non-finite floats as `null`, which glTF readers reject
//! for required numbers. Every float in the document is therefore routed
//! through [`bounded`], which saturates infinities to the `f32` range and
//! maps NaN to zero before the value reaches the JSON writer.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use serde::{Serialize, Serializer};

use crate::error::Result;

use super::types::GltfDocument;
use super::validate::validate_references;

/// Values whose floats can be clamped into the finite range.
pub trait BoundFloats {
    #[must_use]
    fn bounded(&self) -> Self;
}

/// Clamp a single float: `+inf -> f32::MAX`, `-inf -> f32::MIN`, `NaN -> 0`.
#[must_use]
pub fn bound_f32(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else if value == f32::INFINITY {
        f32::MAX
    } else if value == f32::NEG_INFINITY {
        f32::MIN
    } else {
        value
    }
}

impl BoundFloats for f32 {
    fn bounded(&self) -> Self {
        bound_f32(*self)
    }
}

impl<const N: usize> BoundFloats for [f32; N] {
    fn bounded(&self) -> Self {
        self.map(bound_f32)
    }
}

impl BoundFloats for Vec<f32> {
    fn bounded(&self) -> Self {
        self.iter().copied().map(bound_f32).collect()
    }
}

impl<T: BoundFloats> BoundFloats for Option<T> {
    fn bounded(&self) -> Self {
        self.as_ref().map(BoundFloats::bounded)
    }
}

/// `serialize_with` adapter for float-bearing fields.
pub fn bounded<T, S>(value: &T, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    T: BoundFloats + Serialize,
    S: Serializer,
{
    value.bounded().serialize(serializer)
}

/// Render a document as compact JSON.
///
/// # Errors
/// Returns an error if the document holds a dangling index or serialization
/// fails.
pub fn to_json(doc: &GltfDocument) -> Result<String> {
    validate_references(doc)?;
    Ok(serde_json::to_string(doc)?)
}

/// Render a document as indented JSON, for inspection.
///
/// # Errors
/// Same as [`to_json`].
pub fn to_json_pretty(doc: &GltfDocument) -> Result<String> {
    validate_references(doc)?;
    Ok(serde_json::to_string_pretty(doc)?)
}
