//! Buffer, buffer view and accessor packing.
//!
//! Exporters register accessors with their raw bytes; nothing is laid out
//! until [`finalize`] folds every accessor into its view and every view into
//! its buffer, padding each region to the 4-byte glTF alignment. The layout
//! is recomputed from the staged bytes on every call, so running it again
//! after more views were appended (embedded images) is safe.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use super::types::{
    GltfAccessor, GltfBuffer, GltfBufferView, GltfDocument, component_type, target,
};

/// Alignment of every accessor, view and chunk.
pub const ALIGNMENT: usize = 4;

/// Bytes needed to bring `len` up to a multiple of `alignment`.
#[must_use]
pub fn padding_for(len: usize, alignment: usize) -> usize {
    (alignment - (len % alignment)) % alignment
}

/// Pad `chunk` with `fill` until its length is a multiple of `alignment`.
#[must_use]
pub fn pad_chunk(mut chunk: Vec<u8>, alignment: usize, fill: u8) -> Vec<u8> {
    let padding = padding_for(chunk.len(), alignment);
    chunk.extend(std::iter::repeat_n(fill, padding));
    chunk
}

/// Layout of an accessor about to be registered.
#[derive(Debug, Clone)]
pub struct AccessorSpec {
    pub component_type: u32,
    pub count: usize,
    pub accessor_type: &'static str,
    pub min: Option<Vec<f32>>,
    pub max: Option<Vec<f32>>,
}

impl AccessorSpec {
    #[must_use]
    pub fn new(component_type: u32, count: usize, accessor_type: &'static str) -> Self {
        Self {
            component_type,
            count,
            accessor_type,
            min: None,
            max: None,
        }
    }

    #[must_use]
    pub fn with_bounds(mut self, min: Vec<f32>, max: Vec<f32>) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }
}

/// Little-endian bytes of a float slice.
fn f32_le_bytes(values: &[f32]) -> Vec<u8> {
    if cfg!(target_endian = "little") {
        bytemuck::cast_slice(values).to_vec()
    } else {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }
}

fn component_bounds<const N: usize>(values: &[[f32; N]]) -> (Vec<f32>, Vec<f32>) {
    let mut min = [f32::MAX; N];
    let mut max = [f32::MIN; N];
    for value in values {
        for i in 0..N {
            min[i] = min[i].min(value[i]);
            max[i] = max[i].max(value[i]);
        }
    }
    (min.to_vec(), max.to_vec())
}

impl GltfDocument {
    /// Append an empty buffer. Returns the buffer index.
    pub fn add_buffer(&mut self, uri: Option<String>) -> usize {
        self.buffers.push(GltfBuffer {
            uri,
            ..GltfBuffer::default()
        });
        self.buffers.len() - 1
    }

    /// The buffer shared by geometry and embedded images, created on first use.
    pub fn shared_buffer(&mut self) -> usize {
        if let Some(idx) = self.shared_buffer {
            return idx;
        }
        let idx = self.add_buffer(None);
        self.shared_buffer = Some(idx);
        idx
    }

    /// Register a view owned by `buffer`. Offset and length are set by
    /// [`finalize`].
    pub fn add_buffer_view(
        &mut self,
        buffer: usize,
        name: Option<String>,
        target: Option<u32>,
    ) -> usize {
        let view_idx = self.buffer_views.len();
        self.buffer_views.push(GltfBufferView {
            name,
            buffer,
            byte_offset: 0,
            byte_length: 0,
            byte_stride: None,
            target,
            accessors: Vec::new(),
            bytes: Vec::new(),
        });
        self.buffers[buffer].views.push(view_idx);
        view_idx
    }

    /// Register an accessor owned by `view` with its raw, unpadded bytes.
    pub fn add_accessor(&mut self, view: usize, spec: AccessorSpec, bytes: Vec<u8>) -> usize {
        let accessor_idx = self.accessors.len();
        self.accessors.push(GltfAccessor {
            buffer_view: view,
            byte_offset: 0,
            component_type: spec.component_type,
            count: spec.count,
            accessor_type: spec.accessor_type.to_string(),
            min: spec.min,
            max: spec.max,
            normalized: None,
            bytes,
        });
        self.buffer_views[view].accessors.push(accessor_idx);
        accessor_idx
    }

    /// Register a `VEC3` float accessor, optionally with per-component bounds.
    pub fn add_vec3_accessor(&mut self, view: usize, values: &[[f32; 3]], with_bounds: bool) -> usize {
        let mut spec = AccessorSpec::new(component_type::FLOAT, values.len(), "VEC3");
        if with_bounds {
            let (min, max) = component_bounds(values);
            spec = spec.with_bounds(min, max);
        }
        self.add_accessor(view, spec, f32_le_bytes(values.as_flattened()))
    }

    /// Register a `VEC2` float accessor.
    pub fn add_vec2_accessor(&mut self, view: usize, values: &[[f32; 2]]) -> usize {
        let spec = AccessorSpec::new(component_type::FLOAT, values.len(), "VEC2");
        self.add_accessor(view, spec, f32_le_bytes(values.as_flattened()))
    }

    /// Register a `SCALAR` index accessor, narrowed to `u16` when every index
    /// fits.
    pub fn add_index_accessor(&mut self, view: usize, indices: &[u32]) -> usize {
        let max_index = indices.iter().copied().max().unwrap_or(0);
        let (component, bytes) = if max_index <= u32::from(u16::MAX) {
            let bytes = indices
                .iter()
                .flat_map(|&i| (i as u16).to_le_bytes())
                .collect();
            (component_type::UNSIGNED_SHORT, bytes)
        } else {
            let bytes = indices.iter().flat_map(|i| i.to_le_bytes()).collect();
            (component_type::UNSIGNED_INT, bytes)
        };
        self.add_accessor(view, AccessorSpec::new(component, indices.len(), "SCALAR"), bytes)
    }

    /// Convenience for exporters: a vertex-attribute view on the shared buffer.
    ///
    /// Several attribute accessors may live in one view, so the element size
    /// is recorded as the view's byte stride.
    pub fn add_vertex_view(&mut self, name: &str, byte_stride: usize) -> usize {
        let buffer = self.shared_buffer();
        let view = self.add_buffer_view(buffer, Some(name.to_string()), Some(target::ARRAY_BUFFER));
        self.buffer_views[view].byte_stride = Some(byte_stride);
        view
    }

    /// Convenience for exporters: an index view on the shared buffer.
    pub fn add_index_view(&mut self, name: &str) -> usize {
        let buffer = self.shared_buffer();
        self.add_buffer_view(
            buffer,
            Some(name.to_string()),
            Some(target::ELEMENT_ARRAY_BUFFER),
        )
    }
}

/// Lay out every buffer of the document.
///
/// For each buffer, for each owned view, for each owned accessor: pad the
/// accessor bytes to [`ALIGNMENT`] with zeros, record its offset within the
/// view, and append. Then record the view's offset within the buffer and
/// append the view. Views without accessors keep their own payload, padded.
pub fn finalize(doc: &mut GltfDocument) {
    let GltfDocument {
        buffers,
        buffer_views,
        accessors,
        ..
    } = doc;

    for buffer in buffers.iter_mut() {
        let mut buffer_bytes = Vec::new();

        for &view_idx in &buffer.views {
            let view = &mut buffer_views[view_idx];

            if view.accessors.is_empty() {
                let padding = padding_for(view.bytes.len(), ALIGNMENT);
                view.bytes.extend(std::iter::repeat_n(0u8, padding));
            } else {
                let mut view_bytes = Vec::new();
                for &accessor_idx in &view.accessors {
                    let accessor = &mut accessors[accessor_idx];
                    accessor.byte_offset = view_bytes.len();
                    view_bytes.extend_from_slice(&accessor.bytes);
                    let padding = padding_for(accessor.bytes.len(), ALIGNMENT);
                    view_bytes.extend(std::iter::repeat_n(0u8, padding));
                }
                view.bytes = view_bytes;
            }

            view.byte_length = view.bytes.len();
            view.byte_offset = buffer_bytes.len();
            buffer_bytes.extend_from_slice(&view.bytes);
        }

        buffer.byte_length = buffer_bytes.len();
        buffer.bytes = buffer_bytes;
    }

    tracing::debug!(
        "Packed {} buffers, {} views, {} accessors",
        buffers.len(),
        buffer_views.len(),
        accessors.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_chunk() {
        assert_eq!(pad_chunk(vec![1; 11], 4, 0).len(), 12);
        assert_eq!(pad_chunk(vec![1; 12], 4, 0).len(), 12);
        assert_eq!(pad_chunk(Vec::new(), 4, 0).len(), 0);
        assert_eq!(pad_chunk(vec![b'{'], 4, b' '), b"{   ".to_vec());
    }

    #[test]
    fn test_accessors_pad_independently() {
        let mut doc = GltfDocument::default();
        let view = doc.add_index_view("bufferViewScalar");
        // 3 u16 indices = 6 bytes -> padded to 8
        let first = doc.add_index_accessor(view, &[0, 1, 2]);
        let second = doc.add_index_accessor(view, &[2, 1, 0]);

        finalize(&mut doc);

        assert_eq!(doc.accessors[first].byte_offset, 0);
        assert_eq!(doc.accessors[second].byte_offset, 8);
        assert_eq!(doc.buffer_views[view].byte_length, 16);
        assert_eq!(&doc.buffer_views[view].bytes[6..8], &[0, 0]);
    }

    #[test]
    fn test_views_are_prefix_sums() {
        let mut doc = GltfDocument::default();
        let indices = doc.add_index_view("bufferViewScalar");
        doc.add_index_accessor(indices, &[0, 1, 2]);
        let vertices = doc.add_vertex_view("bufferViewFloatVector3", 12);
        doc.add_vec3_accessor(vertices, &[[0.0; 3], [1.0; 3], [2.0; 3]], true);

        finalize(&mut doc);

        let buffer = &doc.buffers[0];
        let total: usize = buffer.views.iter().map(|&v| doc.buffer_views[v].byte_length).sum();
        assert_eq!(buffer.byte_length, total);
        assert_eq!(buffer.byte_length, buffer.bytes.len());
        assert_eq!(doc.buffer_views[indices].byte_offset, 0);
        assert_eq!(doc.buffer_views[vertices].byte_offset, 8);
        assert_eq!(doc.buffer_views[vertices].byte_length, 36);
        for view in &doc.buffer_views {
            assert_eq!(view.byte_length % ALIGNMENT, 0);
        }
    }

    #[test]
    fn test_finalize_twice_is_stable() {
        let mut doc = GltfDocument::default();
        let view = doc.add_vertex_view("bufferViewFloatVector2", 8);
        doc.add_vec2_accessor(view, &[[0.5, 0.5]]);
        finalize(&mut doc);
        let first = doc.buffers[0].bytes.clone();

        let buffer = doc.shared_buffer();
        let image_view = doc.add_buffer_view(buffer, None, None);
        doc.buffer_views[image_view].bytes = vec![9; 5];
        finalize(&mut doc);

        assert_eq!(&doc.buffers[0].bytes[..first.len()], first.as_slice());
        assert_eq!(doc.buffer_views[image_view].byte_offset, first.len());
        assert_eq!(doc.buffer_views[image_view].byte_length, 8);
        assert_eq!(doc.buffers[0].byte_length, first.len() + 8);
    }

    #[test]
    fn test_index_narrowing() {
        let mut doc = GltfDocument::default();
        let view = doc.add_index_view("bufferViewScalar");
        let small = doc.add_index_accessor(view, &[0, 65535]);
        let large = doc.add_index_accessor(view, &[0, 65536]);
        assert_eq!(doc.accessors[small].component_type, component_type::UNSIGNED_SHORT);
        assert_eq!(doc.accessors[large].component_type, component_type::UNSIGNED_INT);
        assert_eq!(doc.accessors[large].bytes.len(), 8);
    }

    #[test]
    fn test_position_bounds() {
        let mut doc = GltfDocument::default();
        let view = doc.add_vertex_view("bufferViewFloatVector3", 12);
        let acc = doc.add_vec3_accessor(view, &[[-1.0, 2.0, 0.0], [3.0, -4.0, 0.5]], true);
        assert_eq!(doc.accessors[acc].min, Some(vec![-1.0, -4.0, 0.0]));
        assert_eq!(doc.accessors[acc].max, Some(vec![3.0, 2.0, 0.5]));
        assert_eq!(doc.accessors[acc].bytes.len(), 24);
    }
}
