// SPDX-License-Identifier: MPL-2.0
//! Domain error types.
//!
//! These errors describe failures of the editing core itself. Storage and
//! configuration failures live with their ports and the crate-level
//! [`Error`](crate::error::Error).

use std::fmt;

// =============================================================================
// ImageError
// =============================================================================

/// Failures while decoding, resizing or encoding a bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// The bytes are not a decodable image, or the bitmap has no pixels.
    InvalidImage(String),

    /// A resize produced no output.
    ResizeFailed,

    /// JPEG encoding failed.
    CompressionFailed(String),

    /// A background processing task did not complete.
    ProcessingFailed(String),
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::InvalidImage(msg) => write!(f, "Invalid image: {msg}"),
            ImageError::ResizeFailed => write!(f, "Image resize failed"),
            ImageError::CompressionFailed(msg) => write!(f, "Image compression failed: {msg}"),
            ImageError::ProcessingFailed(msg) => write!(f, "Image processing failed: {msg}"),
        }
    }
}

impl std::error::Error for ImageError {}

// =============================================================================
// AnalysisError
// =============================================================================

/// Failures of the color and sky analysis heuristics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The image has no pixels to sample.
    EmptyImage,

    /// The sampled region is too small to partition into the analysis grid.
    RegionTooSmall { width: u32, height: u32 },

    /// The analysis task did not complete.
    TaskFailed(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::EmptyImage => write!(f, "Image has no pixels to analyze"),
            AnalysisError::RegionTooSmall { width, height } => {
                write!(f, "Analysis region too small: {width}x{height}")
            }
            AnalysisError::TaskFailed(msg) => write!(f, "Analysis task failed: {msg}"),
        }
    }
}

impl std::error::Error for AnalysisError {}

// =============================================================================
// SessionError
// =============================================================================

/// Invalid requests made to an editing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A selection must contain at least one image.
    EmptySelection,

    /// The requested image index is outside the selection.
    IndexOutOfRange { index: usize, len: usize },

    /// The session was closed while a render was pending.
    Closed,

    /// The session was created outside a Tokio runtime.
    NoRuntime,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::EmptySelection => write!(f, "No images selected"),
            SessionError::IndexOutOfRange { index, len } => {
                write!(f, "Image index {index} out of range for {len} images")
            }
            SessionError::Closed => write!(f, "Editing session closed"),
            SessionError::NoRuntime => write!(f, "No async runtime available"),
        }
    }
}

impl std::error::Error for SessionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_error_display() {
        let err = ImageError::InvalidImage("truncated".into());
        assert_eq!(err.to_string(), "Invalid image: truncated");
    }

    #[test]
    fn analysis_error_display_includes_dimensions() {
        let err = AnalysisError::RegionTooSmall {
            width: 2,
            height: 1,
        };
        assert!(err.to_string().contains("2x1"));
    }

    #[test]
    fn session_error_display() {
        let err = SessionError::IndexOutOfRange { index: 3, len: 2 };
        assert_eq!(err.to_string(), "Image index 3 out of range for 2 images");
    }
}
