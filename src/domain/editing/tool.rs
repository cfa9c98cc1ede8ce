// SPDX-License-Identifier: MPL-2.0
//! Edit tool identifiers.
//!
//! [`EditTool`] is the closed set of continuous edit parameters. Each tool
//! has a stable position in [`EditTool::ALL`], which the settings storage
//! and the operation catalog use as a table index instead of per-tool
//! match arms.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A continuous edit parameter driven by a slider in [-1.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditTool {
    Exposure,
    Brightness,
    Contrast,
    Tone,
    Brilliance,
    Highlight,
    Shadow,
    BlackPoint,
    Saturation,
    NaturalSaturation,
    Warmth,
    Tint,
    ColorTemperature,
    WhiteBalance,
    Sharpness,
    Texture,
    Clarity,
    Dehaze,
    Grain,
    Fade,
    NoiseReduction,
    Curves,
    Hsl,
    Vignette,
    LensCorrection,
    DoubleExposure,
    CropAndRotate,
}

impl EditTool {
    /// Number of tools.
    pub const COUNT: usize = 27;

    /// All tools, in table order.
    pub const ALL: [EditTool; Self::COUNT] = [
        EditTool::Exposure,
        EditTool::Brightness,
        EditTool::Contrast,
        EditTool::Tone,
        EditTool::Brilliance,
        EditTool::Highlight,
        EditTool::Shadow,
        EditTool::BlackPoint,
        EditTool::Saturation,
        EditTool::NaturalSaturation,
        EditTool::Warmth,
        EditTool::Tint,
        EditTool::ColorTemperature,
        EditTool::WhiteBalance,
        EditTool::Sharpness,
        EditTool::Texture,
        EditTool::Clarity,
        EditTool::Dehaze,
        EditTool::Grain,
        EditTool::Fade,
        EditTool::NoiseReduction,
        EditTool::Curves,
        EditTool::Hsl,
        EditTool::Vignette,
        EditTool::LensCorrection,
        EditTool::DoubleExposure,
        EditTool::CropAndRotate,
    ];

    /// Tools applied by the filter chain, in application order.
    ///
    /// The order is observable in the output and must not change.
    /// `CropAndRotate` is geometric and not part of the chain.
    pub const CHAIN_ORDER: [EditTool; Self::COUNT - 1] = [
        EditTool::Exposure,
        EditTool::Brightness,
        EditTool::Contrast,
        EditTool::Tone,
        EditTool::Brilliance,
        EditTool::Highlight,
        EditTool::Shadow,
        EditTool::BlackPoint,
        EditTool::Saturation,
        EditTool::NaturalSaturation,
        EditTool::Warmth,
        EditTool::Tint,
        EditTool::ColorTemperature,
        EditTool::WhiteBalance,
        EditTool::Sharpness,
        EditTool::Texture,
        EditTool::Clarity,
        EditTool::Dehaze,
        EditTool::Grain,
        EditTool::Fade,
        EditTool::NoiseReduction,
        EditTool::Curves,
        EditTool::Hsl,
        EditTool::Vignette,
        EditTool::LensCorrection,
        EditTool::DoubleExposure,
    ];

    /// Position of this tool in [`EditTool::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable identifier used in persisted documents.
    #[must_use]
    pub fn id(self) -> &'static str {
        TOOL_IDS[self.index()]
    }

    /// Parses a persisted identifier. Unknown identifiers return `None`.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        TOOL_IDS
            .iter()
            .position(|candidate| *candidate == id)
            .map(|index| Self::ALL[index])
    }

    /// Returns true for tools that participate in the filter chain.
    #[must_use]
    pub fn is_chain_stage(self) -> bool {
        self != EditTool::CropAndRotate
    }
}

const TOOL_IDS: [&str; EditTool::COUNT] = [
    "exposure",
    "brightness",
    "contrast",
    "tone",
    "brilliance",
    "highlight",
    "shadow",
    "blackPoint",
    "saturation",
    "naturalSaturation",
    "warmth",
    "tint",
    "colorTemperature",
    "whiteBalance",
    "sharpness",
    "texture",
    "clarity",
    "dehaze",
    "grain",
    "fade",
    "noiseReduction",
    "curves",
    "hsl",
    "vignette",
    "lensCorrection",
    "doubleExposure",
    "cropAndRotate",
];

impl fmt::Display for EditTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
