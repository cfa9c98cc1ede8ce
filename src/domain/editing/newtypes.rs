// SPDX-License-Identifier: MPL-2.0
//! Editing newtypes.
//!
//! This module provides type-safe wrappers for editing values,
//! ensuring they are always within valid ranges.

use std::time::Duration;

// =============================================================================
// Tool Value Bounds
// =============================================================================

/// Edit tool value bounds (-1.0 to +1.0).
pub mod tool_value_bounds {
    /// Minimum tool value.
    pub const MIN: f32 = -1.0;
    /// Maximum tool value.
    pub const MAX: f32 = 1.0;
    /// Default (neutral) tool value.
    pub const DEFAULT: f32 = 0.0;
}

// =============================================================================
// ToolValue
// =============================================================================

/// Slider value of an edit tool, guaranteed to be within [-1.0, 1.0].
///
/// Every tool mapping in the catalog assumes its input is already clamped,
/// so all values reach the catalog through this type. Non-finite input
/// collapses to the neutral value.
///
/// # Example
///
/// ```ignore
/// let value = ToolValue::new(1.7);
/// assert_eq!(value.value(), 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct ToolValue(f32);

impl ToolValue {
    /// Creates a new tool value, clamping to the valid range.
    #[must_use]
    pub fn new(value: f32) -> Self {
        if value.is_finite() {
            Self(value.clamp(tool_value_bounds::MIN, tool_value_bounds::MAX))
        } else {
            Self(tool_value_bounds::DEFAULT)
        }
    }

    /// Returns the raw value.
    #[must_use]
    pub fn value(self) -> f32 {
        self.0
    }

    /// Returns whether this represents no adjustment (value is 0).
    #[must_use]
    pub fn is_neutral(self) -> bool {
        self.0.abs() < f32::EPSILON
    }

    /// Returns whether the value is at the minimum.
    #[must_use]
    pub fn is_min(self) -> bool {
        self.0 <= tool_value_bounds::MIN
    }

    /// Returns whether the value is at the maximum.
    #[must_use]
    pub fn is_max(self) -> bool {
        self.0 >= tool_value_bounds::MAX
    }
}

impl From<f32> for ToolValue {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

// =============================================================================
// Preview Dimension Bounds
// =============================================================================

/// Preview dimension bounds (64 to 4096 pixels on the longest side).
pub mod preview_dimension_bounds {
    /// Minimum preview dimension.
    pub const MIN: u32 = 64;
    /// Maximum preview dimension.
    pub const MAX: u32 = 4096;
    /// Default preview dimension.
    pub const DEFAULT: u32 = 750;
}

// =============================================================================
// PreviewDimension
// =============================================================================

/// Longest-side bound for a downsampled preview image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewDimension(u32);

impl PreviewDimension {
    /// Creates a new preview dimension, clamping to the valid range.
    #[must_use]
    pub fn new(value: u32) -> Self {
        Self(value.clamp(
            preview_dimension_bounds::MIN,
            preview_dimension_bounds::MAX,
        ))
    }

    /// Returns the raw value in pixels.
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for PreviewDimension {
    fn default() -> Self {
        Self(preview_dimension_bounds::DEFAULT)
    }
}

// =============================================================================
// Throttle Interval Bounds
// =============================================================================

/// Fast preview throttle bounds in milliseconds (8 to 250 ms).
pub mod throttle_bounds {
    /// Minimum throttle interval.
    pub const MIN_MS: u64 = 8;
    /// Maximum throttle interval.
    pub const MAX_MS: u64 = 250;
    /// Default throttle interval (~30 fps).
    pub const DEFAULT_MS: u64 = 33;
}

// =============================================================================
// ThrottleInterval
// =============================================================================

/// Minimum spacing between two fast preview renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleInterval(u64);

impl ThrottleInterval {
    /// Creates a new throttle interval, clamping to the valid range.
    #[must_use]
    pub fn new(millis: u64) -> Self {
        Self(millis.clamp(throttle_bounds::MIN_MS, throttle_bounds::MAX_MS))
    }

    /// Returns the interval in milliseconds.
    #[must_use]
    pub fn millis(self) -> u64 {
        self.0
    }

    /// Returns the interval as a [`Duration`].
    #[must_use]
    pub fn as_duration(self) -> Duration {
        Duration::from_millis(self.0)
    }
}

impl Default for ThrottleInterval {
    fn default() -> Self {
        Self(throttle_bounds::DEFAULT_MS)
    }
}

// =============================================================================
// JPEG Quality Bounds
// =============================================================================

/// JPEG quality bounds (0.1 to 1.0).
pub mod jpeg_quality_bounds {
    /// Minimum quality.
    pub const MIN: f32 = 0.1;
    /// Maximum quality.
    pub const MAX: f32 = 1.0;
    /// Default upload quality.
    pub const DEFAULT: f32 = 0.85;
}

// =============================================================================
// JpegQuality
// =============================================================================

/// JPEG compression quality as a fraction of the encoder's maximum.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct JpegQuality(f32);

impl JpegQuality {
    /// Creates a new quality, clamping to the valid range.
    #[must_use]
    pub fn new(value: f32) -> Self {
        if value.is_finite() {
            Self(value.clamp(jpeg_quality_bounds::MIN, jpeg_quality_bounds::MAX))
        } else {
            Self(jpeg_quality_bounds::DEFAULT)
        }
    }

    /// Returns the raw fraction.
    #[must_use]
    pub fn value(self) -> f32 {
        self.0
    }

    /// Returns the quality on the encoder's 1-100 scale.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn as_percent(self) -> u8 {
        // Clamped to 0.1..=1.0, so the product fits in 10..=100.
        (self.0 * 100.0).round() as u8
    }

    /// Returns a quality lowered by `step`, or `None` once the current
    /// quality is at or below `floor`. The lowered value itself may land
    /// under the floor.
    #[must_use]
    pub fn step_down(self, step: f32, floor: f32) -> Option<Self> {
        // Tolerance keeps an accumulated 0.5000001 from counting as above 0.5.
        if self.0 <= floor + 1e-4 {
            None
        } else {
            Some(Self::new(self.0 - step))
        }
    }
}

impl Default for JpegQuality {
    fn default() -> Self {
        Self(jpeg_quality_bounds::DEFAULT)
    }
}

// =============================================================================
// Tests
// =============================================================================
