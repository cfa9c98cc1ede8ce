// SPDX-License-Identifier: MPL-2.0
//! Color and sky analysis of source photos.
//!
//! Analysis always runs on a downsample of the original source, never on
//! the edited output, so later edits do not change the derived metadata.
//!
//! - [`color`]: Dominant color extraction and HSV helpers
//! - [`temperature`]: Color temperature estimate
//! - [`sky`]: Sky type classifier
//! - [`matching`]: Hex parsing and color-distance search filtering

pub mod color;
pub mod matching;
pub mod sky;
pub mod temperature;

pub use color::{extract_dominant_colors, Hsv};
pub use matching::{filter_by_color_distance, hex_to_rgb, rgb_distance};
pub use sky::{classify_sky_detailed, classify_sky_type, SkyClassification, SkyScores};
pub use temperature::estimate_color_temperature;

use image_rs::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::domain::sky::{SkyType, TimeOfDay};
use crate::error::AnalysisError;
use crate::media::SourceImage;

/// Metadata derived from one source photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnalysis {
    /// Dominant colors as `#RRGGBB`, most frequent first.
    pub sky_colors: Vec<String>,
    /// Estimated color temperature in Kelvin.
    pub color_temperature: u32,
    pub sky_type: SkyType,
}

/// Runs all three heuristics with the given sampling settings.
#[derive(Debug, Clone, Default)]
pub struct SkyAnalyzer {
    config: AnalysisConfig,
}

impl SkyAnalyzer {
    #[must_use]
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Analyzes a decoded bitmap.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::EmptyImage`] if the image has no pixels. An
    /// image whose sky region is too small to classify is reported as
    /// [`SkyType::Clear`]; its colors and temperature are still measured.
    pub fn analyze(
        &self,
        image: &RgbaImage,
        time_of_day: Option<TimeOfDay>,
    ) -> Result<ImageAnalysis, AnalysisError> {
        let dimension = self.config.dimension();
        let sky_colors =
            color::extract_dominant_colors_at(image, self.config.color_count(), dimension)?;
        let color_temperature = temperature::estimate_color_temperature_at(image, dimension)?;
        let sky_type = match sky::classify_sky_detailed_at(
            image,
            time_of_day,
            self.config.classifier_dimension(),
            self.config.color_count(),
        ) {
            Ok(classification) => classification.sky_type,
            Err(AnalysisError::RegionTooSmall { .. }) => SkyType::Clear,
            Err(err) => return Err(err),
        };

        Ok(ImageAnalysis {
            sky_colors,
            color_temperature,
            sky_type,
        })
    }

    /// Analyzes a source, using its capture time as the time-of-day hint.
    ///
    /// # Errors
    ///
    /// See [`SkyAnalyzer::analyze`].
    pub fn analyze_source(&self, source: &SourceImage) -> Result<ImageAnalysis, AnalysisError> {
        self.analyze(source.pixels(), source.metadata().time_of_day())
    }
}
