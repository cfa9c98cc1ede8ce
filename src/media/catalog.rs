// SPDX-License-Identifier: MPL-2.0
//! Mapping of edit tools and filters to primitive operations.
//!
//! Each tool owns one entry of [`TOOL_MAPPINGS`], indexed by
//! [`EditTool::index`]. An entry converts a clamped slider value into the
//! native parameters of one or more [`Operation`]s. There is no fallible
//! path: every tool has a mapping and values are clamped on the way in.

use crate::domain::editing::{EditTool, FilterType, MirrorAxis, Operation, ToolValue};

/// Converts a slider value in [-1, 1] to primitive operations.
pub type ToolMapping = fn(f32) -> Vec<Operation>;

/// Base white point for temperature-driven tools, in Kelvin.
pub const BASE_KELVIN: f32 = 6500.0;

/// Kelvin swing of the warmth slider at full deflection.
pub const WARMTH_RANGE_KELVIN: f32 = 2000.0;

/// Kelvin swing of the color temperature slider at full deflection.
pub const COLOR_TEMPERATURE_RANGE_KELVIN: f32 = 2500.0;

/// Straighten angle at full deflection of the crop/rotate slider.
pub const MAX_STRAIGHTEN_DEGREES: f32 = 15.0;

/// Mappings in [`EditTool::ALL`] order.
pub const TOOL_MAPPINGS: [ToolMapping; EditTool::COUNT] = [
    exposure,
    brightness,
    contrast,
    tone,
    brilliance,
    highlight,
    shadow,
    black_point,
    saturation,
    natural_saturation,
    warmth,
    tint,
    color_temperature,
    white_balance,
    sharpness,
    texture,
    clarity,
    dehaze,
    grain,
    fade,
    noise_reduction,
    curves,
    hsl,
    vignette,
    lens_correction,
    double_exposure,
    crop_and_rotate,
];

/// Operations for `tool` at `value`.
#[must_use]
pub fn tool_operations(tool: EditTool, value: ToolValue) -> Vec<Operation> {
    TOOL_MAPPINGS[tool.index()](value.value())
}

/// Operations of a filter preset, in application order.
#[must_use]
pub fn filter_operations(filter: FilterType) -> Vec<Operation> {
    match filter {
        FilterType::Natural => Vec::new(),
        FilterType::Clear => vec![color_controls(0.0, 1.05, 1.1)],
        FilterType::Drama => vec![color_controls(0.0, 1.3, 1.2)],
        FilterType::Soft => vec![color_controls(0.0, 0.9, 0.8)],
        FilterType::Warm => vec![temperature(BASE_KELVIN, 5500.0, 0.0)],
        FilterType::Cool => vec![temperature(BASE_KELVIN, 7500.0, 0.0)],
        FilterType::Vintage => vec![
            Operation::Sepia { intensity: 0.5 },
            Operation::Vignette {
                intensity: 0.5,
                radius: 1.0,
            },
        ],
        FilterType::Monochrome => vec![Operation::Monochrome],
        FilterType::Pastel => vec![color_controls(0.1, 0.9, 0.6)],
        FilterType::Vivid => vec![color_controls(0.0, 1.2, 1.5)],
    }
}

fn color_controls(brightness: f32, contrast: f32, saturation: f32) -> Operation {
    Operation::ColorControls {
        brightness,
        contrast,
        saturation,
    }
}

fn temperature(neutral: f32, target: f32, tint: f32) -> Operation {
    Operation::TemperatureTint {
        neutral,
        target,
        tint,
    }
}

// =============================================================================
// Tool mappings
// =============================================================================

fn exposure(v: f32) -> Vec<Operation> {
    vec![Operation::Exposure { ev: 2.0 * v }]
}

fn brightness(v: f32) -> Vec<Operation> {
    vec![color_controls(v, 1.0, 1.0)]
}

fn contrast(v: f32) -> Vec<Operation> {
    vec![color_controls(0.0, 1.0 + v, 1.0)]
}

fn tone(v: f32) -> Vec<Operation> {
    vec![Operation::Gamma {
        power: 1.0 - 0.5 * v,
    }]
}

fn brilliance(v: f32) -> Vec<Operation> {
    vec![Operation::HighlightShadow {
        highlight: -0.3 * v,
        shadow: 0.5 * v,
    }]
}

fn highlight(v: f32) -> Vec<Operation> {
    vec![Operation::HighlightShadow {
        highlight: v,
        shadow: 0.0,
    }]
}

fn shadow(v: f32) -> Vec<Operation> {
    vec![Operation::HighlightShadow {
        highlight: 0.0,
        shadow: v,
    }]
}

fn black_point(v: f32) -> Vec<Operation> {
    vec![Operation::BlackPoint { offset: 0.15 * v }]
}

fn saturation(v: f32) -> Vec<Operation> {
    vec![color_controls(0.0, 1.0, 1.0 + v)]
}

fn natural_saturation(v: f32) -> Vec<Operation> {
    vec![Operation::Vibrance { amount: v }]
}

fn warmth(v: f32) -> Vec<Operation> {
    vec![temperature(
        BASE_KELVIN,
        BASE_KELVIN + WARMTH_RANGE_KELVIN * v,
        0.0,
    )]
}

fn tint(v: f32) -> Vec<Operation> {
    vec![temperature(BASE_KELVIN, BASE_KELVIN, 100.0 * v)]
}

fn color_temperature(v: f32) -> Vec<Operation> {
    vec![temperature(
        BASE_KELVIN - COLOR_TEMPERATURE_RANGE_KELVIN * v,
        BASE_KELVIN,
        0.0,
    )]
}

fn white_balance(v: f32) -> Vec<Operation> {
    vec![Operation::ChannelGains {
        red: 1.0 + 0.08 * v,
        green: 1.0,
        blue: 1.0 - 0.08 * v,
    }]
}

fn sharpness(v: f32) -> Vec<Operation> {
    vec![Operation::SharpenLuminance {
        amount: v,
        radius: 1.5,
    }]
}

fn texture(v: f32) -> Vec<Operation> {
    vec![Operation::UnsharpMask {
        radius: 2.0,
        intensity: 0.5 * v,
    }]
}

fn clarity(v: f32) -> Vec<Operation> {
    vec![Operation::UnsharpMask {
        radius: 4.0,
        intensity: 0.8 * v,
    }]
}

fn dehaze(v: f32) -> Vec<Operation> {
    vec![
        color_controls(0.0, 1.0 + 0.25 * v, 1.0 + 0.15 * v),
        Operation::BlackPoint { offset: 0.05 * v },
    ]
}

fn grain(v: f32) -> Vec<Operation> {
    vec![Operation::Grain {
        amount: 0.15 * v.abs(),
    }]
}

fn fade(v: f32) -> Vec<Operation> {
    vec![Operation::Fade { amount: 0.3 * v }]
}

fn noise_reduction(v: f32) -> Vec<Operation> {
    vec![Operation::NoiseReduction {
        radius: 1,
        strength: v.max(0.0),
    }]
}

fn curves(v: f32) -> Vec<Operation> {
    vec![Operation::ToneCurve {
        points: [
            (0.0, 0.0),
            (0.25, 0.25 - 0.1 * v),
            (0.5, 0.5),
            (0.75, 0.75 + 0.1 * v),
            (1.0, 1.0),
        ],
    }]
}

fn hsl(v: f32) -> Vec<Operation> {
    vec![Operation::HueRotate { degrees: 30.0 * v }]
}

fn vignette(v: f32) -> Vec<Operation> {
    vec![Operation::Vignette {
        intensity: v.abs(),
        radius: 1.0 + v.abs(),
    }]
}

fn lens_correction(v: f32) -> Vec<Operation> {
    vec![Operation::RadialDistortion { k: 0.15 * v }]
}

fn double_exposure(v: f32) -> Vec<Operation> {
    let axis = if v >= 0.0 {
        MirrorAxis::Horizontal
    } else {
        MirrorAxis::Vertical
    };
    vec![Operation::MirrorBlend {
        opacity: 0.5 * v.abs(),
        axis,
    }]
}

fn crop_and_rotate(v: f32) -> Vec<Operation> {
    vec![Operation::Straighten {
        degrees: MAX_STRAIGHTEN_DEGREES * v,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_abs_diff_eq;

    fn single(tool: EditTool, value: f32) -> Operation {
        let operations = tool_operations(tool, ToolValue::new(value));
        assert_eq!(operations.len(), 1, "{tool} should map to one operation");
        operations[0]
    }

    #[test]
    fn every_tool_maps_to_at_least_one_operation() {
        for tool in EditTool::ALL {
            for value in [-1.0, 0.0, 0.5, 1.0] {
                assert!(!tool_operations(tool, ToolValue::new(value)).is_empty());
            }
        }
    }

    #[test]
    fn mapping_table_follows_tool_order() {
        // Spot-check that the table position matches the tool.
        assert!(matches!(single(EditTool::Exposure, 0.5), Operation::Exposure { .. }));
        assert!(matches!(single(EditTool::Tone, 0.5), Operation::Gamma { .. }));
        assert!(matches!(single(EditTool::BlackPoint, 0.5), Operation::BlackPoint { .. }));
        assert!(matches!(single(EditTool::Hsl, 0.5), Operation::HueRotate { .. }));
        assert!(matches!(
            single(EditTool::CropAndRotate, 0.5),
            Operation::Straighten { .. }
        ));
    }

    #[test]
    fn exposure_doubles_value_in_stops() {
        assert_eq!(single(EditTool::Exposure, 0.5), Operation::Exposure { ev: 1.0 });
    }

    #[test]
    fn values_are_clamped_before_mapping() {
        assert_eq!(single(EditTool::Exposure, 3.0), Operation::Exposure { ev: 2.0 });
        assert_eq!(
            single(EditTool::Contrast, -5.0),
            color_controls(0.0, 0.0, 1.0)
        );
    }

    #[test]
    fn warmth_moves_target_kelvin() {
        let Operation::TemperatureTint {
            neutral, target, ..
        } = single(EditTool::Warmth, -0.5)
        else {
            panic!("warmth should map to temperature/tint");
        };
        assert_abs_diff_eq!(neutral, 6500.0);
        assert_abs_diff_eq!(target, 5500.0);
    }

    #[test]
    fn color_temperature_moves_neutral_kelvin() {
        let Operation::TemperatureTint {
            neutral, target, ..
        } = single(EditTool::ColorTemperature, 1.0)
        else {
            panic!("color temperature should map to temperature/tint");
        };
        assert_abs_diff_eq!(neutral, 4000.0);
        assert_abs_diff_eq!(target, 6500.0);
    }

    #[test]
    fn dehaze_is_contrast_then_black_point() {
        let operations = tool_operations(EditTool::Dehaze, ToolValue::new(1.0));
        assert_eq!(operations.len(), 2);
        assert_eq!(operations[0], color_controls(0.0, 1.25, 1.15));
        assert_eq!(operations[1], Operation::BlackPoint { offset: 0.05 });
    }

    #[test]
    fn symmetric_tools_use_absolute_value() {
        assert_eq!(
            single(EditTool::Vignette, -0.4),
            Operation::Vignette {
                intensity: 0.4,
                radius: 1.4
            }
        );
        assert_eq!(single(EditTool::Grain, -1.0), Operation::Grain { amount: 0.15 });
    }

    #[test]
    fn double_exposure_axis_follows_sign() {
        assert_eq!(
            single(EditTool::DoubleExposure, 0.0),
            Operation::MirrorBlend {
                opacity: 0.0,
                axis: MirrorAxis::Horizontal
            }
        );
        assert_eq!(
            single(EditTool::DoubleExposure, -0.5),
            Operation::MirrorBlend {
                opacity: 0.25,
                axis: MirrorAxis::Vertical
            }
        );
    }

    #[test]
    fn negative_noise_reduction_is_inert() {
        assert_eq!(
            single(EditTool::NoiseReduction, -0.7),
            Operation::NoiseReduction {
                radius: 1,
                strength: 0.0
            }
        );
    }

    #[test]
    fn curves_bend_quarter_points() {
        let Operation::ToneCurve { points } = single(EditTool::Curves, 1.0) else {
            panic!("curves should map to a tone curve");
        };
        assert_abs_diff_eq!(points[1].1, 0.15, epsilon = 1e-6);
        assert_abs_diff_eq!(points[3].1, 0.85, epsilon = 1e-6);
        assert_eq!(points[2], (0.5, 0.5));
    }

    #[test]
    fn natural_filter_is_empty() {
        assert!(filter_operations(FilterType::Natural).is_empty());
    }

    #[test]
    fn filter_presets_match_documented_values() {
        assert_eq!(
            filter_operations(FilterType::Vivid),
            vec![color_controls(0.0, 1.2, 1.5)]
        );
        assert_eq!(
            filter_operations(FilterType::Pastel),
            vec![color_controls(0.1, 0.9, 0.6)]
        );
        assert_eq!(
            filter_operations(FilterType::Cool),
            vec![temperature(6500.0, 7500.0, 0.0)]
        );
        let vintage = filter_operations(FilterType::Vintage);
        assert_eq!(vintage.len(), 2);
        assert_eq!(vintage[0], Operation::Sepia { intensity: 0.5 });
    }

    #[test]
    fn every_filter_operation_is_finite() {
        for filter in FilterType::ALL {
            assert!(filter_operations(filter).iter().all(Operation::is_finite));
        }
    }
}
