// SPDX-License-Identifier: MPL-2.0
//! Grid-sampled color statistics.
//!
//! The image is split into an `n x n` grid; each cell contributes its
//! average color. Averages are quantized so near-identical cells merge, then
//! ranked by how many cells share them.

use image_rs::RgbaImage;

use crate::config::{DEFAULT_ANALYSIS_DIMENSION, MAX_COLOR_GRID};
use crate::error::AnalysisError;
use crate::media::resize_to_fit;

/// Quantization step shared by the extractor and the sky classifier.
pub const QUANTIZATION_STEP: u8 = 8;

/// Hue (degrees, 0..360), saturation and value (0..=1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub hue: f64,
    pub saturation: f64,
    pub value: f64,
}

impl Hsv {
    /// Converts 8-bit RGB channels.
    #[must_use]
    pub fn from_rgb(rgb: [u8; 3]) -> Self {
        Self::from_unit_rgb(rgb.map(|c| f64::from(c) / 255.0))
    }

    /// Converts RGB channels in 0..=1.
    #[must_use]
    pub fn from_unit_rgb([r, g, b]: [f64; 3]) -> Self {
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let mut hue = if delta == 0.0 {
            0.0
        } else if max == r {
            60.0 * (((g - b) / delta) % 6.0)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };
        if hue < 0.0 {
            hue += 360.0;
        }

        Self {
            hue,
            saturation: if max == 0.0 { 0.0 } else { delta / max },
            value: max,
        }
    }
}

/// Extracts up to `count` dominant colors as `#RRGGBB` strings, most
/// frequent first.
///
/// # Errors
///
/// Returns [`AnalysisError::EmptyImage`] for an image without pixels.
pub fn extract_dominant_colors(
    image: &RgbaImage,
    count: usize,
) -> Result<Vec<String>, AnalysisError> {
    extract_dominant_colors_at(image, count, DEFAULT_ANALYSIS_DIMENSION)
}

/// [`extract_dominant_colors`] with an explicit downsample size.
///
/// # Errors
///
/// Returns [`AnalysisError::EmptyImage`] for an image without pixels.
pub fn extract_dominant_colors_at(
    image: &RgbaImage,
    count: usize,
    max_dimension: u32,
) -> Result<Vec<String>, AnalysisError> {
    ensure_not_empty(image)?;
    if count == 0 {
        return Ok(Vec::new());
    }

    let sample = resize_to_fit(image, max_dimension);
    let grid = count.min(MAX_COLOR_GRID) as u32;
    let quantized = cell_averages(&sample, grid, grid)
        .into_iter()
        .map(|average| quantize_rounded(average, QUANTIZATION_STEP));

    Ok(rank_by_frequency(quantized)
        .into_iter()
        .take(count)
        .map(|(color, _)| to_hex(color))
        .collect())
}

/// Returns an error when `image` has no pixels.
pub(crate) fn ensure_not_empty(image: &RgbaImage) -> Result<(), AnalysisError> {
    if image.width() == 0 || image.height() == 0 {
        Err(AnalysisError::EmptyImage)
    } else {
        Ok(())
    }
}

/// Average RGB (0..=255) of every pixel, alpha ignored.
#[must_use]
pub fn average_color(image: &RgbaImage) -> Option<[f64; 3]> {
    region_average(image, 0, 0, image.width(), image.height())
}

/// Average color of each cell of a `columns x rows` grid, row by row from
/// the top. Cells without pixels are skipped.
#[must_use]
pub fn cell_averages(image: &RgbaImage, columns: u32, rows: u32) -> Vec<[f64; 3]> {
    let (width, height) = image.dimensions();
    let mut averages = Vec::with_capacity((columns * rows) as usize);

    for row in 0..rows {
        let y0 = row * height / rows;
        let y1 = (row + 1) * height / rows;
        for column in 0..columns {
            let x0 = column * width / columns;
            let x1 = (column + 1) * width / columns;
            if let Some(average) = region_average(image, x0, y0, x1, y1) {
                averages.push(average);
            }
        }
    }
    averages
}

fn region_average(image: &RgbaImage, x0: u32, y0: u32, x1: u32, y1: u32) -> Option<[f64; 3]> {
    let mut sum = [0u64; 3];
    let mut pixels = 0u64;
    for y in y0..y1 {
        for x in x0..x1 {
            let [r, g, b, _] = image.get_pixel(x, y).0;
            sum[0] += u64::from(r);
            sum[1] += u64::from(g);
            sum[2] += u64::from(b);
            pixels += 1;
        }
    }
    (pixels > 0).then(|| sum.map(|channel| channel as f64 / pixels as f64))
}

/// Rounds each channel to the nearest multiple of `step`, capped at 255.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn quantize_rounded(color: [f64; 3], step: u8) -> [u8; 3] {
    let step = f64::from(step.max(1));
    color.map(|channel| ((channel / step).round() * step).clamp(0.0, 255.0) as u8)
}

/// Rounds each channel down to a multiple of `step`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn quantize_floor(color: [f64; 3], step: u8) -> [u8; 3] {
    let step = step.max(1);
    color.map(|channel| {
        let channel = channel.clamp(0.0, 255.0) as u8;
        channel / step * step
    })
}

/// Counts occurrences and sorts by count, descending. Ties keep the order
/// in which colors were first seen.
#[must_use]
pub fn rank_by_frequency(colors: impl IntoIterator<Item = [u8; 3]>) -> Vec<([u8; 3], usize)> {
    let mut counts: Vec<([u8; 3], usize)> = Vec::new();
    for color in colors {
        match counts.iter_mut().find(|(seen, _)| *seen == color) {
            Some((_, count)) => *count += 1,
            None => counts.push((color, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

#[must_use]
pub fn to_hex([r, g, b]: [u8; 3]) -> String {
    format!("#{r:02X}{g:02X}{b:02X}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_abs_diff_eq;
    use image_rs::Rgba;

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([rgb[0], rgb[1], rgb[2], 255]))
    }

    #[test]
    fn solid_red_yields_single_red_color() {
        let colors = extract_dominant_colors(&solid(64, 64, [255, 0, 0]), 3).expect("colors");
        assert_eq!(colors, vec!["#FF0000".to_string()]);
    }

    #[test]
    fn zero_count_returns_empty_list() {
        let colors = extract_dominant_colors(&solid(8, 8, [10, 20, 30]), 0).expect("colors");
        assert!(colors.is_empty());
    }

    #[test]
    fn empty_image_is_an_error() {
        assert_eq!(
            extract_dominant_colors(&RgbaImage::new(0, 0), 3),
            Err(AnalysisError::EmptyImage)
        );
    }

    #[test]
    fn majority_color_ranks_first() {
        // Top two thirds blue, bottom third white: a 3x3 grid sees 6 blue cells.
        let mut image = solid(90, 90, [250, 250, 250]);
        for y in 0..60 {
            for x in 0..90 {
                image.put_pixel(x, y, Rgba([40, 96, 200, 255]));
            }
        }
        let colors = extract_dominant_colors(&image, 3).expect("colors");
        assert_eq!(colors, vec!["#2860C8".to_string(), "#F8F8F8".to_string()]);
    }

    #[test]
    fn result_never_exceeds_count() {
        let mut image = solid(50, 50, [0, 0, 0]);
        for y in 0..50 {
            for x in 0..50 {
                let shade = ((x / 10) * 50) as u8;
                image.put_pixel(x, y, Rgba([shade, 255 - shade, 128, 255]));
            }
        }
        let colors = extract_dominant_colors(&image, 2).expect("colors");
        assert_eq!(colors.len(), 2);
    }

    #[test]
    fn quantize_rounds_to_step_and_caps() {
        assert_eq!(quantize_rounded([3.9, 4.0, 254.0], 8), [0, 8, 255]);
        assert_eq!(quantize_rounded([12.0, 100.0, 251.0], 8), [16, 104, 248]);
    }

    #[test]
    fn quantize_floor_truncates() {
        assert_eq!(quantize_floor([15.9, 16.0, 255.0], 8), [8, 16, 248]);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let ranked = rank_by_frequency([[1, 1, 1], [2, 2, 2], [2, 2, 2], [1, 1, 1], [3, 3, 3]]);
        let order: Vec<_> = ranked.iter().map(|(color, _)| color[0]).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn cell_averages_skip_empty_cells() {
        assert_eq!(cell_averages(&solid(2, 2, [9, 9, 9]), 4, 4).len(), 4);
        assert_eq!(cell_averages(&solid(8, 8, [9, 9, 9]), 4, 4).len(), 16);
    }

    #[test]
    fn hsv_of_primaries() {
        let red = Hsv::from_rgb([255, 0, 0]);
        assert_abs_diff_eq!(red.hue, 0.0);
        assert_abs_diff_eq!(red.saturation, 1.0);

        let blue = Hsv::from_rgb([0, 0, 255]);
        assert_abs_diff_eq!(blue.hue, 240.0);

        let magenta = Hsv::from_rgb([255, 0, 255]);
        assert_abs_diff_eq!(magenta.hue, 300.0);

        let gray = Hsv::from_rgb([128, 128, 128]);
        assert_abs_diff_eq!(gray.saturation, 0.0);
        assert_abs_diff_eq!(gray.value, 128.0 / 255.0);
    }
}
