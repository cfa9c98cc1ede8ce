// SPDX-License-Identifier: MPL-2.0
//! Primitive image operations with their native parameters.
//!
//! Tools and filters are expressed as short lists of these operations. The
//! parameters use each primitive's own units (EV stops, Kelvin, degrees,
//! multipliers), not slider values.

/// Axis used by [`Operation::MirrorBlend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorAxis {
    Horizontal,
    Vertical,
}

/// A single primitive image operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    /// Additive brightness, contrast around mid-gray, and saturation
    /// relative to luminance. Neutral: `0, 1, 1`.
    ColorControls {
        brightness: f32,
        contrast: f32,
        saturation: f32,
    },

    /// Linear gain of `2^ev`.
    Exposure { ev: f32 },

    /// Per-channel power curve. Neutral: `1`.
    Gamma { power: f32 },

    /// Lifts or recovers tones weighted by luminance. Both in [-1, 1].
    HighlightShadow { highlight: f32, shadow: f32 },

    /// Moves the black point. Positive crushes shadows, negative lifts them.
    BlackPoint { offset: f32 },

    /// Saturation boost that favors muted colors.
    Vibrance { amount: f32 },

    /// White point adaptation from `neutral` to `target` Kelvin, plus a
    /// green/magenta `tint` shift.
    TemperatureTint { neutral: f32, target: f32, tint: f32 },

    /// Independent channel multipliers.
    ChannelGains { red: f32, green: f32, blue: f32 },

    /// Unsharp mask on luminance only.
    SharpenLuminance { amount: f32, radius: f32 },

    /// Unsharp mask on all channels.
    UnsharpMask { radius: f32, intensity: f32 },

    /// Additive monochrome noise. Seeded per render.
    Grain { amount: f32 },

    /// Blend toward a lifted gray.
    Fade { amount: f32 },

    /// Blend toward a blurred copy.
    NoiseReduction { radius: u32, strength: f32 },

    /// Piecewise-linear tone curve through five control points.
    ToneCurve { points: [(f32, f32); 5] },

    /// Hue rotation in degrees.
    HueRotate { degrees: f32 },

    /// Radial darkening. `radius` is relative to the half diagonal.
    Vignette { intensity: f32, radius: f32 },

    /// Barrel (negative) or pincushion (positive) radial remap.
    RadialDistortion { k: f32 },

    /// Screen blend with a mirrored copy of the image.
    MirrorBlend { opacity: f32, axis: MirrorAxis },

    /// Rotation about the center keeping the canvas size.
    Straighten { degrees: f32 },

    /// Sepia tone blended by `intensity`.
    Sepia { intensity: f32 },

    /// Luminance grayscale.
    Monochrome,
}

impl Operation {
    /// Short name used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Operation::ColorControls { .. } => "color_controls",
            Operation::Exposure { .. } => "exposure",
            Operation::Gamma { .. } => "gamma",
            Operation::HighlightShadow { .. } => "highlight_shadow",
            Operation::BlackPoint { .. } => "black_point",
            Operation::Vibrance { .. } => "vibrance",
            Operation::TemperatureTint { .. } => "temperature_tint",
            Operation::ChannelGains { .. } => "channel_gains",
            Operation::SharpenLuminance { .. } => "sharpen_luminance",
            Operation::UnsharpMask { .. } => "unsharp_mask",
            Operation::Grain { .. } => "grain",
            Operation::Fade { .. } => "fade",
            Operation::NoiseReduction { .. } => "noise_reduction",
            Operation::ToneCurve { .. } => "tone_curve",
            Operation::HueRotate { .. } => "hue_rotate",
            Operation::Vignette { .. } => "vignette",
            Operation::RadialDistortion { .. } => "radial_distortion",
            Operation::MirrorBlend { .. } => "mirror_blend",
            Operation::Straighten { .. } => "straighten",
            Operation::Sepia { .. } => "sepia",
            Operation::Monochrome => "monochrome",
        }
    }

    /// Returns true for operations whose output depends on the render seed.
    #[must_use]
    pub fn is_stochastic(&self) -> bool {
        matches!(self, Operation::Grain { .. })
    }

    /// Returns false if any parameter is NaN or infinite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        let finite = |values: &[f32]| values.iter().all(|value| value.is_finite());
        match *self {
            Operation::ColorControls {
                brightness,
                contrast,
                saturation,
            } => finite(&[brightness, contrast, saturation]),
            Operation::Exposure { ev } => ev.is_finite(),
            Operation::Gamma { power } => power.is_finite(),
            Operation::HighlightShadow { highlight, shadow } => finite(&[highlight, shadow]),
            Operation::BlackPoint { offset } => offset.is_finite(),
            Operation::Vibrance { amount }
            | Operation::Grain { amount }
            | Operation::Fade { amount } => amount.is_finite(),
            Operation::TemperatureTint {
                neutral,
                target,
                tint,
            } => finite(&[neutral, target, tint]),
            Operation::ChannelGains { red, green, blue } => finite(&[red, green, blue]),
            Operation::SharpenLuminance { amount, radius } => finite(&[amount, radius]),
            Operation::UnsharpMask { radius, intensity } => finite(&[radius, intensity]),
            Operation::NoiseReduction { strength, .. } => strength.is_finite(),
            Operation::ToneCurve { points } => points
                .iter()
                .all(|(x, y)| x.is_finite() && y.is_finite()),
            Operation::HueRotate { degrees } | Operation::Straighten { degrees } => {
                degrees.is_finite()
            }
            Operation::Vignette { intensity, radius } => finite(&[intensity, radius]),
            Operation::RadialDistortion { k } => k.is_finite(),
            Operation::MirrorBlend { opacity, .. } => opacity.is_finite(),
            Operation::Sepia { intensity } => intensity.is_finite(),
            Operation::Monochrome => true,
        }
    }
}
