// SPDX-License-Identifier: MPL-2.0
//! Metadata attached to a published post.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::analysis::ImageAnalysis;
use crate::config::MAX_COLOR_GRID;
use crate::domain::editing::EditSettings;
use crate::domain::sky::{SkyType, TimeOfDay};
use crate::media::CaptureMetadata;

/// One uploaded image of a post, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostImage {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub width: u32,
    pub height: u32,
    pub order: usize,
}

/// Derived metadata of a post.
///
/// Analysis fields come from the first source photo and are absent when
/// analysis was skipped. `edit_settings` holds the settings document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sky_colors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_temperature: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sky_type: Option<SkyType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<TimeOfDay>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub edit_settings: Map<String, Value>,
}

impl PostMetadata {
    #[must_use]
    pub fn new(
        analysis: Option<&ImageAnalysis>,
        capture: &CaptureMetadata,
        settings: &EditSettings,
    ) -> Self {
        Self {
            sky_colors: analysis.map(|analysis| {
                analysis
                    .sky_colors
                    .iter()
                    .take(MAX_COLOR_GRID)
                    .cloned()
                    .collect()
            }),
            color_temperature: analysis.map(|analysis| analysis.color_temperature),
            sky_type: analysis.map(|analysis| analysis.sky_type),
            captured_at: capture.captured_at,
            time_of_day: capture.time_of_day(),
            edit_settings: settings.to_document(),
        }
    }

    /// Settings decoded back from the stored document.
    #[must_use]
    pub fn settings(&self) -> EditSettings {
        EditSettings::from_document(&self.edit_settings)
    }
}
