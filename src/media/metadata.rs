// SPDX-License-Identifier: MPL-2.0
//! Capture metadata extraction from EXIF.
//!
//! Extraction is best-effort: bytes without EXIF, or with a corrupt EXIF
//! block, yield an empty [`CaptureMetadata`] rather than an error.

use std::io::Cursor;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::domain::sky::TimeOfDay;

/// EXIF timestamp layout, e.g. `2025:12:06 17:42:05`.
pub const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Camera information recorded when the photo was taken.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureMetadata {
    /// Local capture time from `DateTimeOriginal`.
    pub captured_at: Option<NaiveDateTime>,
    /// Camera model (e.g. "iPhone 15 Pro")
    pub camera_model: Option<String>,
    pub iso: Option<u32>,
    /// Shutter speed (e.g. "1/250")
    pub shutter_speed: Option<String>,
    /// Aperture f-number (e.g. "f/1.8")
    pub aperture: Option<String>,
    /// Focal length (e.g. "24mm")
    pub focal_length: Option<String>,
}

impl CaptureMetadata {
    /// Returns true when no field was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Time of day of the capture, if the capture time is known.
    #[must_use]
    pub fn time_of_day(&self) -> Option<TimeOfDay> {
        self.captured_at
            .map(|captured_at| TimeOfDay::from_hour(captured_at.hour()))
    }
}

/// Reads capture metadata from encoded image bytes.
#[must_use]
pub fn read_capture_metadata(bytes: &[u8]) -> CaptureMetadata {
    let mut metadata = CaptureMetadata::default();

    let exif_reader = exif::Reader::new();
    let Ok(exif) = exif_reader.read_from_container(&mut Cursor::new(bytes)) else {
        return metadata;
    };

    // Date taken
    if let Some(field) = exif.get_field(exif::Tag::DateTimeOriginal, exif::In::PRIMARY) {
        metadata.captured_at = ascii_value(&field.value).and_then(|text| parse_capture_time(&text));
    }

    // Camera info
    if let Some(field) = exif.get_field(exif::Tag::Model, exif::In::PRIMARY) {
        metadata.camera_model = ascii_value(&field.value).filter(|model| !model.is_empty());
    }

    // Exposure settings
    if let Some(field) = exif.get_field(exif::Tag::PhotographicSensitivity, exif::In::PRIMARY) {
        metadata.iso = field.value.get_uint(0);
    }

    if let Some(field) = exif.get_field(exif::Tag::ExposureTime, exif::In::PRIMARY) {
        metadata.shutter_speed = rational_value(&field.value).and_then(format_shutter_speed);
    }

    if let Some(field) = exif.get_field(exif::Tag::FNumber, exif::In::PRIMARY) {
        metadata.aperture = rational_value(&field.value).and_then(format_aperture);
    }

    // Lens info
    if let Some(field) = exif.get_field(exif::Tag::FocalLength, exif::In::PRIMARY) {
        metadata.focal_length = rational_value(&field.value).and_then(format_focal_length);
    }

    metadata
}

/// Parses an EXIF timestamp. Trailing NULs and whitespace are ignored.
#[must_use]
pub fn parse_capture_time(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    NaiveDateTime::parse_from_str(trimmed, EXIF_DATE_FORMAT).ok()
}

/// Formats an exposure time in seconds as `1/N`.
#[must_use]
pub fn format_shutter_speed(seconds: f64) -> Option<String> {
    (seconds.is_finite() && seconds > 0.0).then(|| format!("1/{:.0}", 1.0 / seconds))
}

/// Formats an f-number as `f/X.Y`.
#[must_use]
pub fn format_aperture(f_number: f64) -> Option<String> {
    (f_number.is_finite() && f_number > 0.0).then(|| format!("f/{f_number:.1}"))
}

/// Formats a focal length in millimeters as `Nmm`.
#[must_use]
pub fn format_focal_length(millimeters: f64) -> Option<String> {
    (millimeters.is_finite() && millimeters > 0.0).then(|| format!("{millimeters:.0}mm"))
}

fn ascii_value(value: &exif::Value) -> Option<String> {
    match value {
        exif::Value::Ascii(strings) => strings.first().map(|bytes| {
            String::from_utf8_lossy(bytes)
                .trim_matches(|c: char| c == '\0' || c.is_whitespace())
                .to_string()
        }),
        _ => None,
    }
}

fn rational_value(value: &exif::Value) -> Option<f64> {
    match value {
        exif::Value::Rational(rationals) => rationals
            .first()
            .filter(|rational| rational.denom != 0)
            .map(exif::Rational::to_f64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn bytes_without_exif_yield_empty_metadata() {
        assert!(read_capture_metadata(b"not an image").is_empty());
        assert!(read_capture_metadata(&[]).is_empty());
    }

    #[test]
    fn parse_capture_time_reads_exif_layout() {
        let parsed = parse_capture_time("2025:12:06 17:42:05\0").expect("valid timestamp");
        let expected = NaiveDate::from_ymd_opt(2025, 12, 6)
            .and_then(|date| date.and_hms_opt(17, 42, 5))
            .expect("valid date");
        assert_eq!(parsed, expected);
    }

    #[test]
    fn parse_capture_time_rejects_other_layouts() {
        assert!(parse_capture_time("2025-12-06 17:42:05").is_none());
        assert!(parse_capture_time("").is_none());
    }

    #[test]
    fn shutter_speed_is_reciprocal() {
        assert_eq!(format_shutter_speed(0.004).as_deref(), Some("1/250"));
        assert_eq!(format_shutter_speed(0.5).as_deref(), Some("1/2"));
        assert!(format_shutter_speed(0.0).is_none());
    }

    #[test]
    fn aperture_and_focal_length_formats() {
        assert_eq!(format_aperture(1.78).as_deref(), Some("f/1.8"));
        assert_eq!(format_focal_length(6.86).as_deref(), Some("7mm"));
        assert!(format_aperture(f64::NAN).is_none());
    }

    #[test]
    fn time_of_day_follows_capture_hour() {
        let metadata = CaptureMetadata {
            captured_at: parse_capture_time("2025:06:01 18:10:00"),
            ..CaptureMetadata::default()
        };
        assert_eq!(metadata.time_of_day(), Some(TimeOfDay::Evening));
        assert_eq!(CaptureMetadata::default().time_of_day(), None);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let metadata = CaptureMetadata {
            camera_model: Some("Pixel 8".into()),
            shutter_speed: Some("1/120".into()),
            ..CaptureMetadata::default()
        };
        let json = serde_json::to_value(&metadata).expect("serialize");
        assert_eq!(json["cameraModel"], "Pixel 8");
        assert_eq!(json["shutterSpeed"], "1/120");
    }
}
