// SPDX-License-Identifier: MPL-2.0
//! This module handles the editing core's configuration, loaded from and
//! saved to a `settings.toml` file.
//!
//! Every field is optional; accessors resolve missing values to the
//! constants in [`defaults`] and clamp present ones through the bounded
//! domain newtypes.
//!
//! # Examples
//!
//! ```no_run
//! use soramoyou_edit::config::{self, Config};
//!
//! let mut config = config::load().unwrap_or_default();
//! config.preview.throttle_ms = Some(16);
//! config::save(&config).expect("Failed to save config");
//!
//! assert_eq!(config.preview.throttle().millis(), 16);
//! ```

pub mod defaults;

pub use defaults::*;

use crate::diagnostics::BufferCapacity;
use crate::domain::editing::{JpegQuality, PreviewDimension, ThrottleInterval};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "settings.toml";
const APP_NAME: &str = "Soramoyou";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

// ==========================================================================
// Sections
// ==========================================================================

/// Preview cache and throttle settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreviewConfig {
    #[serde(default)]
    pub fast_max_dimension: Option<u32>,
    #[serde(default)]
    pub max_dimension: Option<u32>,
    #[serde(default)]
    pub throttle_ms: Option<u64>,
}

impl PreviewConfig {
    #[must_use]
    pub fn fast_dimension(&self) -> PreviewDimension {
        PreviewDimension::new(
            self.fast_max_dimension
                .unwrap_or(DEFAULT_FAST_PREVIEW_DIMENSION),
        )
    }

    #[must_use]
    pub fn dimension(&self) -> PreviewDimension {
        PreviewDimension::new(self.max_dimension.unwrap_or(DEFAULT_PREVIEW_DIMENSION))
    }

    #[must_use]
    pub fn throttle(&self) -> ThrottleInterval {
        ThrottleInterval::new(self.throttle_ms.unwrap_or(DEFAULT_PREVIEW_THROTTLE_MS))
    }
}

/// Sky analysis settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub max_dimension: Option<u32>,
    #[serde(default)]
    pub classifier_dimension: Option<u32>,
    #[serde(default)]
    pub color_count: Option<usize>,
}

impl AnalysisConfig {
    #[must_use]
    pub fn dimension(&self) -> u32 {
        self.max_dimension
            .unwrap_or(DEFAULT_ANALYSIS_DIMENSION)
            .max(1)
    }

    #[must_use]
    pub fn classifier_dimension(&self) -> u32 {
        self.classifier_dimension
            .unwrap_or(DEFAULT_CLASSIFIER_DIMENSION)
            .max(1)
    }

    #[must_use]
    pub fn color_count(&self) -> usize {
        self.color_count.unwrap_or(DEFAULT_SKY_COLOR_COUNT)
    }
}

/// Upload encoding settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default)]
    pub max_dimension: Option<u32>,
    #[serde(default)]
    pub jpeg_quality: Option<f32>,
    #[serde(default)]
    pub min_jpeg_quality: Option<f32>,
    #[serde(default)]
    pub quality_step: Option<f32>,
    #[serde(default)]
    pub max_bytes: Option<usize>,
    #[serde(default)]
    pub thumbnail_dimension: Option<u32>,
    #[serde(default)]
    pub thumbnail_quality: Option<f32>,
}

impl UploadConfig {
    #[must_use]
    pub fn dimension(&self) -> u32 {
        self.max_dimension.unwrap_or(DEFAULT_UPLOAD_DIMENSION).max(1)
    }

    #[must_use]
    pub fn quality(&self) -> JpegQuality {
        JpegQuality::new(self.jpeg_quality.unwrap_or(DEFAULT_JPEG_QUALITY))
    }

    #[must_use]
    pub fn min_quality(&self) -> f32 {
        JpegQuality::new(self.min_jpeg_quality.unwrap_or(DEFAULT_MIN_JPEG_QUALITY)).value()
    }

    #[must_use]
    pub fn quality_step(&self) -> f32 {
        self.quality_step
            .unwrap_or(DEFAULT_JPEG_QUALITY_STEP)
            .clamp(0.01, 0.5)
    }

    #[must_use]
    pub fn max_bytes(&self) -> usize {
        self.max_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }

    #[must_use]
    pub fn thumbnail_dimension(&self) -> u32 {
        self.thumbnail_dimension
            .unwrap_or(DEFAULT_THUMBNAIL_DIMENSION)
            .max(1)
    }

    #[must_use]
    pub fn thumbnail_quality(&self) -> JpegQuality {
        JpegQuality::new(self.thumbnail_quality.unwrap_or(DEFAULT_THUMBNAIL_QUALITY))
    }
}

/// Retry settings for storage operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub initial_delay_ms: Option<u64>,
}

impl RetryConfig {
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
            .unwrap_or(DEFAULT_RETRY_ATTEMPTS)
            .clamp(MIN_RETRY_ATTEMPTS, MAX_RETRY_ATTEMPTS)
    }

    #[must_use]
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(
            self.initial_delay_ms
                .unwrap_or(DEFAULT_RETRY_INITIAL_DELAY_MS),
        )
    }
}

/// Diagnostics settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    #[serde(default)]
    pub buffer_capacity: Option<usize>,
}

impl DiagnosticsConfig {
    #[must_use]
    pub fn buffer_capacity(&self) -> BufferCapacity {
        BufferCapacity::new(
            self.buffer_capacity
                .unwrap_or(DEFAULT_DIAGNOSTICS_BUFFER_CAPACITY),
        )
    }
}

// ==========================================================================
// Load / Save
// ==========================================================================

fn get_default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path.push(CONFIG_FILE);
        path
    })
}

pub fn load() -> Result<Config> {
    if let Some(path) = get_default_config_path() {
        if path.exists() {
            return load_from_path(&path);
        }
    }
    Ok(Config::default())
}

pub fn save(config: &Config) -> Result<()> {
    if let Some(path) = get_default_config_path() {
        return save_to_path(config, &path);
    }
    Ok(())
}

/// Loads a config file. Invalid TOML yields the default configuration.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content).unwrap_or_default())
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}
