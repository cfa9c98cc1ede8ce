// SPDX-License-Identifier: MPL-2.0
//! Decoded source images.

use std::sync::Arc;

use image_rs::RgbaImage;

use super::metadata::{read_capture_metadata, CaptureMetadata};
use crate::error::{ImageError, Result};

/// A full-resolution source bitmap and its capture metadata.
///
/// Pixels are shared: cloning a `SourceImage` does not copy the bitmap.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: Arc<RgbaImage>,
    metadata: CaptureMetadata,
}

impl SourceImage {
    /// Decodes encoded bytes (JPEG, PNG) and reads their EXIF metadata.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidImage`] if the bytes cannot be decoded or
    /// the bitmap has no pixels.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let pixels = image_rs::load_from_memory(bytes)?.into_rgba8();
        Self::with_metadata(pixels, read_capture_metadata(bytes))
    }

    /// Wraps an already decoded bitmap without metadata.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidImage`] if the bitmap has no pixels.
    pub fn from_rgba(pixels: RgbaImage) -> Result<Self> {
        Self::with_metadata(pixels, CaptureMetadata::default())
    }

    /// Wraps a decoded bitmap with known metadata.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidImage`] if the bitmap has no pixels.
    pub fn with_metadata(pixels: RgbaImage, metadata: CaptureMetadata) -> Result<Self> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(ImageError::InvalidImage("image has no pixels".into()).into());
        }
        Ok(Self {
            pixels: Arc::new(pixels),
            metadata,
        })
    }

    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Shared handle to the pixels, for worker tasks.
    #[must_use]
    pub fn shared_pixels(&self) -> Arc<RgbaImage> {
        Arc::clone(&self.pixels)
    }

    #[must_use]
    pub fn metadata(&self) -> &CaptureMetadata {
        &self.metadata
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use image_rs::{ImageFormat, Rgba};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("encode png");
        bytes
    }

    #[test]
    fn decode_reads_pixels() {
        let source = SourceImage::decode(&png_bytes(6, 4)).expect("decode");
        assert_eq!(source.dimensions(), (6, 4));
        assert_eq!(source.pixels().get_pixel(0, 0).0, [10, 20, 30, 255]);
        assert!(source.metadata().is_empty());
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = SourceImage::decode(b"definitely not an image").expect_err("should fail");
        assert!(matches!(err, Error::Image(ImageError::InvalidImage(_))));
    }

    #[test]
    fn empty_bitmap_is_invalid() {
        let err = SourceImage::from_rgba(RgbaImage::new(0, 3)).expect_err("should fail");
        assert!(matches!(err, Error::Image(ImageError::InvalidImage(_))));
    }

    #[test]
    fn clones_share_pixels() {
        let source = SourceImage::from_rgba(RgbaImage::new(2, 2)).expect("valid");
        let copy = source.clone();
        assert!(Arc::ptr_eq(&source.shared_pixels(), &copy.shared_pixels()));
    }
}
