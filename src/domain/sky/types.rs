// SPDX-License-Identifier: MPL-2.0
//! Sky classification value types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sky category derived from the original (unedited) photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkyType {
    #[default]
    Clear,
    Cloudy,
    Sunset,
    Sunrise,
    Storm,
}

impl SkyType {
    /// All categories. Earlier entries win score ties.
    pub const ALL: [SkyType; 5] = [
        SkyType::Clear,
        SkyType::Cloudy,
        SkyType::Sunset,
        SkyType::Sunrise,
        SkyType::Storm,
    ];

    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            SkyType::Clear => "clear",
            SkyType::Cloudy => "cloudy",
            SkyType::Sunset => "sunset",
            SkyType::Sunrise => "sunrise",
            SkyType::Storm => "storm",
        }
    }

    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|sky| sky.id() == id)
    }
}

impl fmt::Display for SkyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Capture-time bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// Buckets a wall-clock hour (0-23): 5-11 morning, 12-16 afternoon,
    /// 17-19 evening, anything else night.
    #[must_use]
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=19 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Bucket of a sampled color by hue, or by value when nearly unsaturated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorCategory {
    Blue,
    Cyan,
    Orange,
    Red,
    Yellow,
    Pink,
    Purple,
    Gray,
    White,
    Black,
}

impl ColorCategory {
    /// Categorizes an HSV color (hue in degrees, saturation and value in 0..=1).
    #[must_use]
    pub fn from_hsv(hue: f64, saturation: f64, value: f64) -> Self {
        if saturation < 0.1 {
            return if value > 0.9 {
                ColorCategory::White
            } else if value < 0.2 {
                ColorCategory::Black
            } else {
                ColorCategory::Gray
            };
        }

        match hue {
            h if !(15.0..345.0).contains(&h) => ColorCategory::Red,
            h if h < 45.0 => ColorCategory::Orange,
            h if h < 70.0 => ColorCategory::Yellow,
            h if h < 200.0 => ColorCategory::Cyan,
            h if h < 260.0 => ColorCategory::Blue,
            h if h < 290.0 => ColorCategory::Purple,
            _ => ColorCategory::Pink,
        }
    }

    /// Blue-sky hues.
    #[must_use]
    pub fn is_blue(self) -> bool {
        matches!(self, ColorCategory::Blue | ColorCategory::Cyan)
    }

    /// Sunset/sunrise hues.
    #[must_use]
    pub fn is_warm(self) -> bool {
        matches!(
            self,
            ColorCategory::Orange | ColorCategory::Yellow | ColorCategory::Red
        )
    }

    #[must_use]
    pub fn is_pink_purple(self) -> bool {
        matches!(self, ColorCategory::Pink | ColorCategory::Purple)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_of_day_boundaries() {
        assert_eq!(TimeOfDay::from_hour(4), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(11), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(16), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(19), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(20), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(0), TimeOfDay::Night);
    }

    #[test]
    fn sky_type_ids_round_trip() {
        for sky in SkyType::ALL {
            assert_eq!(SkyType::from_id(sky.id()), Some(sky));
        }
        assert_eq!(SkyType::default(), SkyType::Clear);
    }

    #[test]
    fn unsaturated_colors_bucket_by_value() {
        assert_eq!(ColorCategory::from_hsv(0.0, 0.0, 0.95), ColorCategory::White);
        assert_eq!(ColorCategory::from_hsv(0.0, 0.05, 0.1), ColorCategory::Black);
        assert_eq!(ColorCategory::from_hsv(120.0, 0.05, 0.5), ColorCategory::Gray);
    }

    #[test]
    fn hue_bands() {
        assert_eq!(ColorCategory::from_hsv(5.0, 0.8, 0.8), ColorCategory::Red);
        assert_eq!(ColorCategory::from_hsv(350.0, 0.8, 0.8), ColorCategory::Red);
        assert_eq!(ColorCategory::from_hsv(30.0, 0.8, 0.8), ColorCategory::Orange);
        assert_eq!(ColorCategory::from_hsv(60.0, 0.8, 0.8), ColorCategory::Yellow);
        assert_eq!(ColorCategory::from_hsv(180.0, 0.8, 0.8), ColorCategory::Cyan);
        assert_eq!(ColorCategory::from_hsv(220.0, 0.8, 0.8), ColorCategory::Blue);
        assert_eq!(ColorCategory::from_hsv(275.0, 0.8, 0.8), ColorCategory::Purple);
        assert_eq!(ColorCategory::from_hsv(320.0, 0.8, 0.8), ColorCategory::Pink);
    }

    #[test]
    fn category_groups() {
        assert!(ColorCategory::Cyan.is_blue());
        assert!(ColorCategory::Yellow.is_warm());
        assert!(ColorCategory::Purple.is_pink_purple());
        assert!(!ColorCategory::Gray.is_warm());
    }
}
