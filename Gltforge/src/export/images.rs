//! Embedding referenced images into the binary buffer for GLB output.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;

use crate::error::{Error, Result};
use crate::gltf::{ALIGNMENT, GltfDocument, pad_chunk};

/// Name given to buffer views holding embedded images.
pub const IMAGE_VIEW_NAME: &str = "bufferViewImage";

const JPEG_QUALITY: u8 = 90;

/// Move every URI-referenced image into the shared buffer.
///
/// Each image is loaded from its recorded source path, or from `output_dir`
/// joined with its URI, re-encoded to its own format and appended as a new
/// buffer view. The buffer's byte length is bumped immediately so a later
/// [`finalize`](crate::gltf::finalize) yields the same offsets.
///
/// Returns the indices of the new buffer views.
pub fn embed_images(doc: &mut GltfDocument, output_dir: &Path) -> Result<Vec<usize>> {
    let mut new_views = Vec::new();
    if doc.images.iter().all(|image| image.uri.is_none()) {
        return Ok(new_views);
    }

    let buffer = doc.shared_buffer();

    for image_idx in 0..doc.images.len() {
        let image = &doc.images[image_idx];
        let Some(uri) = image.uri.as_deref() else {
            continue;
        };
        let path = image
            .source_path
            .clone()
            .unwrap_or_else(|| output_dir.join(uri));
        let (encoded, mime_type) = encode_image(&path, &image.file_extension)?;
        let bytes = pad_chunk(encoded, ALIGNMENT, 0);
        let byte_length = bytes.len();

        let view_idx = doc.add_buffer_view(buffer, Some(IMAGE_VIEW_NAME.to_string()), None);
        let byte_offset = doc.buffers[buffer].byte_length;
        let view = &mut doc.buffer_views[view_idx];
        view.byte_offset = byte_offset;
        view.byte_length = byte_length;
        view.bytes = bytes;
        doc.buffers[buffer].byte_length += byte_length;

        let image = &mut doc.images[image_idx];
        image.uri = None;
        image.buffer_view = Some(view_idx);
        image.mime_type = Some(mime_type.to_string());

        tracing::debug!(
            "Embedded {} ({byte_length} bytes) as buffer view {view_idx}",
            path.display()
        );
        new_views.push(view_idx);
    }

    Ok(new_views)
}

/// Load `path` and re-encode it: JPEG for `jpeg`, PNG for anything else.
///
/// Returns the encoded bytes and their MIME type.
fn encode_image(path: &Path, extension: &str) -> Result<(Vec<u8>, &'static str)> {
    let img = image::open(path).map_err(|source| Error::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;

    let mut data = Vec::new();
    let (encoded, mime_type) = if extension == "jpeg" {
        let encoder = JpegEncoder::new_with_quality(&mut data, JPEG_QUALITY);
        (img.to_rgb8().write_with_encoder(encoder), "image/jpeg")
    } else {
        (img.write_with_encoder(PngEncoder::new(&mut data)), "image/png")
    };
    encoded.map_err(|source| Error::ImageEncode {
        path: path.to_path_buf(),
        source,
    })?;

    Ok((data, mime_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gltf::{GltfImage, finalize};
    use image::{Rgb, RgbImage};

    fn write_test_image(dir: &Path, name: &str) {
        let img = RgbImage::from_fn(5, 3, |x, y| Rgb([(x * 40) as u8, (y * 60) as u8, 128]));
        img.save(dir.join(name)).unwrap();
    }

    #[test]
    fn test_embeds_png_next_to_output() {
        let dir = tempfile::tempdir().unwrap();
        write_test_image(dir.path(), "checker.png");

        let mut doc = GltfDocument::default();
        let view = doc.add_vertex_view("bufferViewFloatVector3", 12);
        doc.add_vec3_accessor(view, &[[1.0, 2.0, 3.0]], true);
        finalize(&mut doc);
        doc.images.push(GltfImage::from_uri("checker.png", None));

        let views = embed_images(&mut doc, dir.path()).unwrap();
        assert_eq!(views.len(), 1);

        let image = &doc.images[0];
        assert!(image.uri.is_none());
        assert_eq!(image.buffer_view, Some(views[0]));
        assert_eq!(image.mime_type.as_deref(), Some("image/png"));

        let image_view = &doc.buffer_views[views[0]];
        assert_eq!(image_view.name.as_deref(), Some(IMAGE_VIEW_NAME));
        assert_eq!(image_view.byte_offset, 12);
        assert_eq!(image_view.byte_length % 4, 0);
        assert_eq!(doc.buffers[0].byte_length, 12 + image_view.byte_length);

        // Re-packing keeps the layout the embedder wrote
        let before = doc.buffers[0].byte_length;
        finalize(&mut doc);
        assert_eq!(doc.buffers[0].byte_length, before);
        assert_eq!(doc.buffer_views[views[0]].byte_offset, 12);
        assert_eq!(&doc.buffers[0].bytes[12..20], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_jpg_is_reencoded_as_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        write_test_image(dir.path(), "photo.jpg");

        let mut doc = GltfDocument::default();
        doc.images.push(GltfImage::from_uri("photo.jpg", Some(dir.path().join("photo.jpg"))));

        let views = embed_images(&mut doc, Path::new("/nonexistent")).unwrap();
        assert_eq!(doc.images[0].mime_type.as_deref(), Some("image/jpeg"));
        assert_eq!(doc.buffer_views[views[0]].byte_offset, 0);
        assert_eq!(&doc.buffer_views[views[0]].bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_other_formats_are_labelled_as_png() {
        let dir = tempfile::tempdir().unwrap();
        write_test_image(dir.path(), "scan.tiff");

        let mut doc = GltfDocument::default();
        doc.images.push(GltfImage::from_uri("scan.tiff", None));

        let views = embed_images(&mut doc, dir.path()).unwrap();
        assert_eq!(doc.images[0].file_extension, "tiff");
        assert_eq!(doc.images[0].mime_type.as_deref(), Some("image/png"));
        assert_eq!(&doc.buffer_views[views[0]].bytes[..4], b"\x89PNG");
    }

    #[test]
    fn test_missing_image_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = GltfDocument::default();
        doc.images.push(GltfImage::from_uri("missing.png", None));

        let err = embed_images(&mut doc, dir.path()).unwrap_err();
        assert!(matches!(err, Error::ImageLoad { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_no_images_leaves_buffers_alone() {
        let mut doc = GltfDocument::default();
        assert!(embed_images(&mut doc, Path::new(".")).unwrap().is_empty());
        assert!(doc.buffers.is_empty());
    }
}
