// SPDX-License-Identifier: MPL-2.0
//! JPEG encoding for uploads.
//!
//! Uploads are resized to fit the configured dimension and compressed at a
//! starting quality that is lowered step by step while the output is over
//! the byte cap, down to a quality floor. The last attempt is returned even
//! if it is still over the cap.

use image_rs::codecs::jpeg::JpegEncoder;
use image_rs::{DynamicImage, RgbaImage};

use super::image_transform::resize_to_fit;
use crate::config::{
    UploadConfig, DEFAULT_JPEG_QUALITY_STEP, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_MIN_JPEG_QUALITY,
    DEFAULT_THUMBNAIL_DIMENSION, DEFAULT_THUMBNAIL_QUALITY, DEFAULT_UPLOAD_DIMENSION,
};
use crate::domain::editing::JpegQuality;
use crate::error::{ImageError, Result};

/// Resize and compression rules for an uploaded image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionPolicy {
    pub max_dimension: u32,
    pub quality: JpegQuality,
    pub min_quality: f32,
    pub quality_step: f32,
    pub max_bytes: usize,
}

impl Default for CompressionPolicy {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_UPLOAD_DIMENSION,
            quality: JpegQuality::default(),
            min_quality: DEFAULT_MIN_JPEG_QUALITY,
            quality_step: DEFAULT_JPEG_QUALITY_STEP,
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl CompressionPolicy {
    #[must_use]
    pub fn from_config(config: &UploadConfig) -> Self {
        Self {
            max_dimension: config.dimension(),
            quality: config.quality(),
            min_quality: config.min_quality(),
            quality_step: config.quality_step(),
            max_bytes: config.max_bytes(),
        }
    }
}

/// Resize and quality of thumbnails.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbnailPolicy {
    pub max_dimension: u32,
    pub quality: JpegQuality,
}

impl Default for ThumbnailPolicy {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_THUMBNAIL_DIMENSION,
            quality: JpegQuality::new(DEFAULT_THUMBNAIL_QUALITY),
        }
    }
}

impl ThumbnailPolicy {
    #[must_use]
    pub fn from_config(config: &UploadConfig) -> Self {
        Self {
            max_dimension: config.thumbnail_dimension(),
            quality: config.thumbnail_quality(),
        }
    }
}

/// JPEG bytes with the dimensions and quality they were encoded at.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub quality: JpegQuality,
}

impl EncodedImage {
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Encodes `image` as baseline JPEG. Alpha is dropped.
///
/// # Errors
///
/// Returns [`ImageError::CompressionFailed`] if the encoder fails.
pub fn encode_jpeg(image: &RgbaImage, quality: JpegQuality) -> Result<Vec<u8>> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ImageError::InvalidImage("image has no pixels".into()).into());
    }

    let rgb = DynamicImage::ImageRgba8(image.clone()).into_rgb8();
    let mut bytes = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut bytes, quality.as_percent());
    encoder
        .encode_image(&rgb)
        .map_err(|e| ImageError::CompressionFailed(e.to_string()))?;
    Ok(bytes)
}

/// Resizes and compresses `image` for upload according to `policy`.
///
/// # Errors
///
/// Returns an error if the image is empty or the encoder fails.
pub fn compress_for_upload(image: &RgbaImage, policy: &CompressionPolicy) -> Result<EncodedImage> {
    let resized = resize_to_fit(image, policy.max_dimension);
    let mut quality = policy.quality;
    let mut bytes = encode_jpeg(&resized, quality)?;

    while bytes.len() > policy.max_bytes {
        let Some(next) = quality.step_down(policy.quality_step, policy.min_quality) else {
            break;
        };
        quality = next;
        bytes = encode_jpeg(&resized, quality)?;
    }

    Ok(EncodedImage {
        bytes,
        width: resized.width(),
        height: resized.height(),
        quality,
    })
}

/// Builds the thumbnail for `image` according to `policy`.
///
/// # Errors
///
/// Returns an error if the image is empty or the encoder fails.
pub fn make_thumbnail(image: &RgbaImage, policy: &ThumbnailPolicy) -> Result<EncodedImage> {
    let resized = resize_to_fit(image, policy.max_dimension);
    let bytes = encode_jpeg(&resized, policy.quality)?;
    Ok(EncodedImage {
        bytes,
        width: resized.width(),
        height: resized.height(),
        quality: policy.quality,
    })
}
