// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! This module serves as the single source of truth for default values
//! used across the crate. Constants are organized by category.
//!
//! # Categories
//!
//! - **Preview**: Working image sizes and fast preview throttle
//! - **Analysis**: Downsample sizes and color counts for sky analysis
//! - **Upload**: Resize, JPEG quality and size cap for uploaded images
//! - **Retry**: Exponential backoff for storage operations
//! - **Diagnostics**: Event buffer capacity

use crate::domain::diagnostics::buffer_capacity_bounds;
use crate::domain::editing::newtypes::{preview_dimension_bounds, throttle_bounds};

// ==========================================================================
// Preview Defaults
// ==========================================================================

/// Longest side of the cached working image used by fast previews.
pub const DEFAULT_FAST_PREVIEW_DIMENSION: u32 = preview_dimension_bounds::DEFAULT;

/// Longest side of standalone previews.
///
/// Equal to the fast preview size; kept as a separate setting so the two
/// can diverge.
pub const DEFAULT_PREVIEW_DIMENSION: u32 = preview_dimension_bounds::DEFAULT;

/// Minimum spacing between fast preview renders (~30 fps).
pub const DEFAULT_PREVIEW_THROTTLE_MS: u64 = throttle_bounds::DEFAULT_MS;

// ==========================================================================
// Analysis Defaults
// ==========================================================================

/// Longest side of the downsample used for color extraction and temperature.
pub const DEFAULT_ANALYSIS_DIMENSION: u32 = 512;

/// Longest side of the downsample used for sky classification.
pub const DEFAULT_CLASSIFIER_DIMENSION: u32 = 256;

/// Number of dominant colors attached to a post.
pub const DEFAULT_SKY_COLOR_COUNT: usize = 5;

/// Upper bound of the dominant color grid (n x n cells).
pub const MAX_COLOR_GRID: usize = 5;

/// Neutral color temperature returned when the estimate is undefined.
pub const NEUTRAL_COLOR_TEMPERATURE: u32 = 5500;

/// Lowest reported color temperature in Kelvin.
pub const MIN_COLOR_TEMPERATURE: u32 = 2000;

/// Highest reported color temperature in Kelvin.
pub const MAX_COLOR_TEMPERATURE: u32 = 10000;

// ==========================================================================
// Upload Defaults
// ==========================================================================

/// Longest side of an uploaded image.
pub const DEFAULT_UPLOAD_DIMENSION: u32 = 2048;

/// Initial JPEG quality for uploads.
pub const DEFAULT_JPEG_QUALITY: f32 = 0.85;

/// Lowest JPEG quality tried before giving up on the size cap.
pub const DEFAULT_MIN_JPEG_QUALITY: f32 = 0.5;

/// Quality decrement per compression attempt.
pub const DEFAULT_JPEG_QUALITY_STEP: f32 = 0.1;

/// Upload size cap in bytes (5 MB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Longest side of a thumbnail.
pub const DEFAULT_THUMBNAIL_DIMENSION: u32 = 512;

/// JPEG quality of thumbnails.
pub const DEFAULT_THUMBNAIL_QUALITY: f32 = 0.80;

// ==========================================================================
// Retry Defaults
// ==========================================================================

/// Attempts per storage operation, including the first.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Minimum retry attempts.
pub const MIN_RETRY_ATTEMPTS: u32 = 1;

/// Maximum retry attempts.
pub const MAX_RETRY_ATTEMPTS: u32 = 10;

/// Delay before the first retry; doubles after each failure.
pub const DEFAULT_RETRY_INITIAL_DELAY_MS: u64 = 1000;

// ==========================================================================
// Diagnostics Defaults
// ==========================================================================

/// Default diagnostic event buffer capacity.
pub const DEFAULT_DIAGNOSTICS_BUFFER_CAPACITY: usize = buffer_capacity_bounds::DEFAULT;

/// Minimum diagnostic event buffer capacity.
pub const MIN_DIAGNOSTICS_BUFFER_CAPACITY: usize = buffer_capacity_bounds::MIN;

/// Maximum diagnostic event buffer capacity.
pub const MAX_DIAGNOSTICS_BUFFER_CAPACITY: usize = buffer_capacity_bounds::MAX;
