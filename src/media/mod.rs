// SPDX-License-Identifier: MPL-2.0
//! Pixel-level processing: decoding, the filter chain and its CPU
//! primitives, geometric transforms, capture metadata and JPEG encoding.

pub mod catalog;
pub mod chain;
pub mod encode;
pub mod image_transform;
pub mod metadata;
pub mod primitives;
pub mod source;

// Re-export commonly used types
pub use catalog::{filter_operations, tool_operations};
pub use chain::{FilterChain, RenderContext, RenderReport, Stage};
pub use encode::{
    compress_for_upload, encode_jpeg, make_thumbnail, CompressionPolicy, EncodedImage,
    ThumbnailPolicy,
};
pub use image_transform::{apply_transform, fit_dimensions, resize_to_fit};
pub use metadata::{read_capture_metadata, CaptureMetadata};
pub use primitives::CpuPrimitives;
pub use source::SourceImage;
