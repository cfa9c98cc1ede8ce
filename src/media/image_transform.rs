// SPDX-License-Identifier: MPL-2.0
//! Geometric transforms applied before filtering: quarter-turn rotation,
//! flips and aspect-preserving downscale.

use crate::domain::editing::TransformState;
use image_rs::{imageops, imageops::FilterType, RgbaImage};

// ==========================================================================
// Orientation
// ==========================================================================

/// Applies `transform` to `image`: rotation first, then flips.
#[must_use]
pub fn apply_transform(image: &RgbaImage, transform: &TransformState) -> RgbaImage {
    let mut output = match transform.quarter_turns() % 4 {
        1 => imageops::rotate90(image),
        2 => imageops::rotate180(image),
        3 => imageops::rotate270(image),
        _ => image.clone(),
    };
    if transform.flip_horizontal() {
        imageops::flip_horizontal_in_place(&mut output);
    }
    if transform.flip_vertical() {
        imageops::flip_vertical_in_place(&mut output);
    }
    output
}

// ==========================================================================
// Resize
// ==========================================================================

/// Dimensions that fit within `max_dimension` on the longest side while
/// preserving the aspect ratio. Never upscales; both sides stay >= 1.
#[must_use]
pub fn fit_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let max_dimension = max_dimension.max(1);
    let longest = width.max(height);
    if longest <= max_dimension || longest == 0 {
        return (width, height);
    }

    let scale = f64::from(max_dimension) / f64::from(longest);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let scaled = |side: u32| ((f64::from(side) * scale).round() as u32).clamp(1, max_dimension);
    (scaled(width), scaled(height))
}

/// Downscales `image` to fit within `max_dimension`. Images already small
/// enough are returned as a copy.
#[must_use]
pub fn resize_to_fit(image: &RgbaImage, max_dimension: u32) -> RgbaImage {
    let (width, height) = fit_dimensions(image.width(), image.height(), max_dimension);
    if (width, height) == image.dimensions() {
        return image.clone();
    }
    imageops::resize(image, width, height, FilterType::Triangle)
}
