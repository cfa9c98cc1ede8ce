// SPDX-License-Identifier: MPL-2.0
//! Rule-based sky type classifier.
//!
//! The upper part of the photo is treated as sky. Its grid colors are
//! bucketed by hue, and the bucket shares, the average HSV, the color
//! temperature and an optional time-of-day hint feed one score per
//! [`SkyType`]. The best score wins.

use image_rs::{imageops, RgbaImage};
use serde::{Deserialize, Serialize};

use super::color::{
    average_color, cell_averages, ensure_not_empty, quantize_floor, rank_by_frequency, to_hex,
    Hsv, QUANTIZATION_STEP,
};
use super::temperature::color_temperature_from_rgb;
use crate::config::{DEFAULT_CLASSIFIER_DIMENSION, DEFAULT_SKY_COLOR_COUNT};
use crate::domain::sky::{ColorCategory, SkyType, TimeOfDay};
use crate::error::AnalysisError;
use crate::media::resize_to_fit;

/// Share of the image height, from the top, sampled as sky.
pub const SKY_REGION_FRACTION: f64 = 0.6;

/// The sky region is sampled on a `SKY_GRID x SKY_GRID` grid.
pub const SKY_GRID: u32 = 4;

/// Below this top score the result is ambiguous and falls back to clear.
pub const AMBIGUOUS_SCORE: f64 = 0.25;

/// Temperatures below this add to the sunset score.
const WARM_LIGHT_KELVIN: u32 = 4000;

/// A quantized color of the sky region and its share of grid cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionColor {
    pub hex: String,
    /// Share of grid cells (0..=1).
    pub percentage: f64,
    pub category: ColorCategory,
}

/// Summed cell shares per color family.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColorDistribution {
    pub blue: f64,
    pub warm: f64,
    pub pink_purple: f64,
    pub gray: f64,
    pub white: f64,
    pub dark: f64,
}

impl ColorDistribution {
    #[must_use]
    pub fn from_colors(colors: &[RegionColor]) -> Self {
        let mut distribution = Self::default();
        for color in colors {
            let share = color.percentage;
            match color.category {
                ColorCategory::Blue | ColorCategory::Cyan => distribution.blue += share,
                ColorCategory::Orange | ColorCategory::Yellow | ColorCategory::Red => {
                    distribution.warm += share;
                }
                ColorCategory::Pink | ColorCategory::Purple => distribution.pink_purple += share,
                ColorCategory::Gray => distribution.gray += share,
                ColorCategory::White => distribution.white += share,
                ColorCategory::Black => distribution.dark += share,
            }
        }
        distribution
    }
}

/// Per-category scores, each in 0..=1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SkyScores {
    pub clear: f64,
    pub cloudy: f64,
    pub sunset: f64,
    pub sunrise: f64,
    pub storm: f64,
}

impl SkyScores {
    #[must_use]
    pub fn get(&self, sky_type: SkyType) -> f64 {
        match sky_type {
            SkyType::Clear => self.clear,
            SkyType::Cloudy => self.cloudy,
            SkyType::Sunset => self.sunset,
            SkyType::Sunrise => self.sunrise,
            SkyType::Storm => self.storm,
        }
    }

    /// Categories by descending score. Ties keep [`SkyType::ALL`] order.
    #[must_use]
    pub fn ranked(&self) -> Vec<(SkyType, f64)> {
        let mut ranked: Vec<_> = SkyType::ALL
            .iter()
            .map(|sky_type| (*sky_type, self.get(*sky_type)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// Winning category and its confidence.
    #[must_use]
    pub fn decide(&self) -> (SkyType, f64) {
        let ranked = self.ranked();
        let (best, top) = ranked[0];
        let second = ranked[1].1;
        let confidence = (top * (1.0 + (top - second))).min(1.0);

        if top < AMBIGUOUS_SCORE {
            (SkyType::Clear, confidence)
        } else {
            (best, confidence)
        }
    }
}

/// Full classifier output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkyClassification {
    pub sky_type: SkyType,
    pub confidence: f64,
    pub scores: SkyScores,
    /// Most frequent region colors, most frequent first.
    pub colors: Vec<RegionColor>,
    pub color_temperature: u32,
    pub used_time_of_day: bool,
}

impl SkyClassification {
    /// Confidence as a whole percentage.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn confidence_percentage(&self) -> u8 {
        (self.confidence.clamp(0.0, 1.0) * 100.0) as u8
    }
}

/// Classifies the sky in `image`.
///
/// # Errors
///
/// Returns [`AnalysisError::EmptyImage`] for an image without pixels and
/// [`AnalysisError::RegionTooSmall`] when the sky region cannot fill the grid.
pub fn classify_sky_type(
    image: &RgbaImage,
    time_of_day: Option<TimeOfDay>,
) -> Result<SkyType, AnalysisError> {
    classify_sky_detailed(image, time_of_day).map(|classification| classification.sky_type)
}

/// Classifies the sky and returns scores, confidence and region colors.
///
/// # Errors
///
/// See [`classify_sky_type`].
pub fn classify_sky_detailed(
    image: &RgbaImage,
    time_of_day: Option<TimeOfDay>,
) -> Result<SkyClassification, AnalysisError> {
    classify_sky_detailed_at(
        image,
        time_of_day,
        DEFAULT_CLASSIFIER_DIMENSION,
        DEFAULT_SKY_COLOR_COUNT,
    )
}

/// [`classify_sky_detailed`] with explicit sample size and color count.
///
/// # Errors
///
/// See [`classify_sky_type`].
pub fn classify_sky_detailed_at(
    image: &RgbaImage,
    time_of_day: Option<TimeOfDay>,
    max_dimension: u32,
    color_count: usize,
) -> Result<SkyClassification, AnalysisError> {
    ensure_not_empty(image)?;
    let sample = resize_to_fit(image, max_dimension);
    let region = sky_region(&sample)?;

    let colors = region_colors(&region, color_count);
    let average = average_color(&region).ok_or(AnalysisError::EmptyImage)?;
    let hsv = Hsv::from_rgb(average.map(round_channel));
    let color_temperature = color_temperature_from_rgb(average);

    let scores = score_sky(
        &ColorDistribution::from_colors(&colors),
        hsv,
        color_temperature,
        time_of_day,
    );
    let (sky_type, confidence) = scores.decide();

    Ok(SkyClassification {
        sky_type,
        confidence,
        scores,
        colors,
        color_temperature,
        used_time_of_day: time_of_day.is_some(),
    })
}

/// Scores every category from the region statistics.
#[must_use]
pub fn score_sky(
    distribution: &ColorDistribution,
    average: Hsv,
    color_temperature: u32,
    time_of_day: Option<TimeOfDay>,
) -> SkyScores {
    let Hsv {
        hue,
        saturation,
        value,
    } = average;

    let mut clear = distribution.blue * 0.6;
    if saturation > 0.3 {
        clear += 0.2;
    }
    if value > 0.4 && value < 0.95 {
        clear += 0.2;
    }
    if (180.0..=260.0).contains(&hue) {
        clear += 0.2;
    }

    let mut cloudy = (distribution.gray + distribution.white) * 0.5;
    if saturation < 0.2 {
        cloudy += 0.3;
    } else if saturation < 0.35 {
        cloudy += 0.15;
    }
    if value > 0.3 && value < 0.85 {
        cloudy += 0.2;
    }

    let mut sunset = distribution.warm * 0.5;
    if hue <= 60.0 || hue >= 300.0 {
        sunset += 0.25;
    }
    if saturation > 0.3 {
        sunset += 0.15;
    }
    if time_of_day == Some(TimeOfDay::Evening) {
        sunset += 0.2;
    }
    sunset += distribution.pink_purple * 0.2;
    if color_temperature < WARM_LIGHT_KELVIN {
        sunset += 0.1;
    }

    let mut sunrise = distribution.warm * 0.3 + distribution.pink_purple * 0.3;
    if hue <= 45.0 || hue >= 280.0 {
        sunrise += 0.2;
    }
    if time_of_day == Some(TimeOfDay::Morning) {
        sunrise += 0.25;
    }
    if value > 0.5 {
        sunrise += 0.1;
    }

    let mut storm = distribution.dark * 0.4 + distribution.gray * 0.3;
    if value < 0.35 {
        storm += 0.3;
    } else if value < 0.5 {
        storm += 0.15;
    }
    if saturation < 0.3 {
        storm += 0.15;
    }

    SkyScores {
        clear: clear.min(1.0),
        cloudy: cloudy.min(1.0),
        sunset: sunset.min(1.0),
        sunrise: sunrise.min(1.0),
        storm: storm.min(1.0),
    }
}

/// Top `SKY_REGION_FRACTION` of the image.
fn sky_region(image: &RgbaImage) -> Result<RgbaImage, AnalysisError> {
    let (width, height) = image.dimensions();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let region_height = (f64::from(height) * SKY_REGION_FRACTION).round() as u32;

    if width < SKY_GRID || region_height < SKY_GRID {
        return Err(AnalysisError::RegionTooSmall {
            width,
            height: region_height,
        });
    }
    Ok(imageops::crop_imm(image, 0, 0, width, region_height).to_image())
}

fn region_colors(region: &RgbaImage, color_count: usize) -> Vec<RegionColor> {
    let cells: Vec<[u8; 3]> = cell_averages(region, SKY_GRID, SKY_GRID)
        .into_iter()
        .map(|average| quantize_floor(average, QUANTIZATION_STEP))
        .collect();
    let total = cells.len().max(1) as f64;

    rank_by_frequency(cells)
        .into_iter()
        .take(color_count)
        .map(|(color, count)| {
            let hsv = Hsv::from_rgb(color);
            RegionColor {
                hex: to_hex(color),
                percentage: count as f64 / total,
                category: ColorCategory::from_hsv(hsv.hue, hsv.saturation, hsv.value),
            }
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_channel(channel: f64) -> u8 {
    channel.round().clamp(0.0, 255.0) as u8
}
