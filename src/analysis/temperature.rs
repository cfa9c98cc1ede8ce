// SPDX-License-Identifier: MPL-2.0
//! Correlated color temperature estimate (McCamy's approximation).

use image_rs::RgbaImage;

use super::color::{average_color, ensure_not_empty};
use crate::config::{
    DEFAULT_ANALYSIS_DIMENSION, MAX_COLOR_TEMPERATURE, MIN_COLOR_TEMPERATURE,
    NEUTRAL_COLOR_TEMPERATURE,
};
use crate::error::AnalysisError;
use crate::media::primitives::srgb_to_linear;
use crate::media::resize_to_fit;

/// McCamy epicenter chromaticity.
const EPICENTER_X: f64 = 0.3320;
const EPICENTER_Y: f64 = 0.1858;

/// Divisors closer to zero than this fall back to the neutral temperature.
const DIVISOR_EPSILON: f64 = 1e-6;

/// Estimates the color temperature of `image` in Kelvin.
///
/// # Errors
///
/// Returns [`AnalysisError::EmptyImage`] for an image without pixels.
pub fn estimate_color_temperature(image: &RgbaImage) -> Result<u32, AnalysisError> {
    estimate_color_temperature_at(image, DEFAULT_ANALYSIS_DIMENSION)
}

/// [`estimate_color_temperature`] with an explicit downsample size.
///
/// # Errors
///
/// Returns [`AnalysisError::EmptyImage`] for an image without pixels.
pub fn estimate_color_temperature_at(
    image: &RgbaImage,
    max_dimension: u32,
) -> Result<u32, AnalysisError> {
    ensure_not_empty(image)?;
    let sample = resize_to_fit(image, max_dimension);
    let average = average_color(&sample).ok_or(AnalysisError::EmptyImage)?;
    Ok(color_temperature_from_rgb(average))
}

/// Color temperature of an average sRGB color (channels 0..=255), clamped
/// to the supported range.
///
/// Achromatic colors, black included, and degenerate chromaticities return
/// exactly [`NEUTRAL_COLOR_TEMPERATURE`].
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn color_temperature_from_rgb(rgb: [f64; 3]) -> u32 {
    if is_achromatic(rgb) {
        return NEUTRAL_COLOR_TEMPERATURE;
    }

    let [r, g, b] = rgb.map(|c| f64::from(srgb_to_linear((c / 255.0) as f32)));

    // Linear sRGB (D65) to CIE XYZ.
    let x = 0.4124 * r + 0.3576 * g + 0.1805 * b;
    let y = 0.2126 * r + 0.7152 * g + 0.0722 * b;
    let z = 0.0193 * r + 0.1192 * g + 0.9505 * b;
    let sum = x + y + z;
    if sum <= DIVISOR_EPSILON {
        return NEUTRAL_COLOR_TEMPERATURE;
    }

    let (cx, cy) = (x / sum, y / sum);
    let divisor = EPICENTER_Y - cy;
    if divisor.abs() < DIVISOR_EPSILON {
        return NEUTRAL_COLOR_TEMPERATURE;
    }

    let n = (cx - EPICENTER_X) / divisor;
    let kelvin = 449.0 * n.powi(3) + 3525.0 * n.powi(2) + 6823.3 * n + 5520.33;
    if !kelvin.is_finite() {
        return NEUTRAL_COLOR_TEMPERATURE;
    }

    kelvin.round().clamp(
        f64::from(MIN_COLOR_TEMPERATURE),
        f64::from(MAX_COLOR_TEMPERATURE),
    ) as u32
}

/// True when the channels agree at 8-bit precision.
fn is_achromatic(rgb: [f64; 3]) -> bool {
    let [r, g, b] = rgb.map(f64::round);
    r == g && g == b
}
