// SPDX-License-Identifier: MPL-2.0
//! CPU implementation of the primitive image operations.
//!
//! Every operation maps an RGBA8 bitmap to a new bitmap of the same size.
//! Alpha is carried through untouched. Per-pixel work is split across rows
//! with rayon; neighborhood operations use the `image` crate's Gaussian blur.
//!
//! [`CpuPrimitives::apply`] returns `None` for an empty bitmap or for
//! parameters that are not finite; the filter chain then passes the stage
//! input through.

use crate::application::port::ImagePrimitives;
use crate::domain::editing::{MirrorAxis, Operation};
use image_rs::{imageops, RgbaImage};
use rayon::prelude::*;

/// Rec. 709 luma coefficients.
const LUMA: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Pure-Rust, multi-threaded primitive backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuPrimitives;

impl CpuPrimitives {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ImagePrimitives for CpuPrimitives {
    fn apply(&self, operation: &Operation, input: &RgbaImage, seed: u64) -> Option<RgbaImage> {
        if input.width() == 0 || input.height() == 0 || !operation.is_finite() {
            return None;
        }

        match *operation {
            Operation::ColorControls {
                brightness,
                contrast,
                saturation,
            } => map_pixels(input, move |rgb| {
                let rgb = rgb.map(|c| c + brightness);
                let rgb = scale_chroma(rgb, saturation);
                rgb.map(|c| (c - 0.5) * contrast + 0.5)
            }),
            Operation::Exposure { ev } => {
                let gain = ev.exp2();
                map_pixels(input, move |rgb| {
                    rgb.map(|c| linear_to_srgb(srgb_to_linear(c) * gain))
                })
            }
            Operation::Gamma { power } => {
                if power <= 0.0 {
                    return None;
                }
                map_pixels(input, move |rgb| rgb.map(|c| c.max(0.0).powf(power)))
            }
            Operation::HighlightShadow { highlight, shadow } => map_pixels(input, move |rgb| {
                let lum = luminance(rgb).clamp(0.0, 1.0);
                let shadow_weight = (1.0 - lum).powi(2);
                let highlight_weight = lum.powi(2);
                let shift = 0.5 * (shadow_weight * shadow + highlight_weight * highlight);
                rgb.map(|c| c + shift)
            }),
            Operation::BlackPoint { offset } => {
                let range = 1.0 - offset;
                if range <= f32::EPSILON {
                    return None;
                }
                map_pixels(input, move |rgb| rgb.map(|c| (c - offset) / range))
            }
            Operation::Vibrance { amount } => map_pixels(input, move |rgb| {
                let max = rgb[0].max(rgb[1]).max(rgb[2]);
                let min = rgb[0].min(rgb[1]).min(rgb[2]);
                let chroma = max - min;
                let boost = if amount >= 0.0 {
                    amount * (1.0 - chroma).powi(2)
                } else {
                    amount
                };
                scale_chroma(rgb, 1.0 + boost)
            }),
            Operation::TemperatureTint {
                neutral,
                target,
                tint,
            } => {
                let gains = white_point_gains(neutral, target, tint)?;
                map_pixels(input, move |rgb| {
                    [rgb[0] * gains[0], rgb[1] * gains[1], rgb[2] * gains[2]]
                })
            }
            Operation::ChannelGains { red, green, blue } => {
                map_pixels(input, move |rgb| [rgb[0] * red, rgb[1] * green, rgb[2] * blue])
            }
            Operation::SharpenLuminance { amount, radius } => {
                let blurred = imageops::blur(input, radius.max(0.1));
                zip_pixels(input, &blurred, move |sharp, soft| {
                    let detail = luminance(sharp) - luminance(soft);
                    sharp.map(|c| c + amount * detail)
                })
            }
            Operation::UnsharpMask { radius, intensity } => {
                let blurred = imageops::blur(input, radius.max(0.1));
                zip_pixels(input, &blurred, move |sharp, soft| {
                    [
                        sharp[0] + intensity * (sharp[0] - soft[0]),
                        sharp[1] + intensity * (sharp[1] - soft[1]),
                        sharp[2] + intensity * (sharp[2] - soft[2]),
                    ]
                })
            }
            Operation::Grain { amount } => map_pixels_at(input, move |x, y, rgb| {
                let noise = pixel_noise(seed, x, y);
                rgb.map(|c| c + amount * noise)
            }),
            Operation::Fade { amount } => map_pixels(input, move |rgb| {
                rgb.map(|c| c + amount * (0.25 + 0.5 * c - c))
            }),
            Operation::NoiseReduction { radius, strength } => {
                if radius == 0 {
                    return None;
                }
                let strength = strength.clamp(0.0, 1.0);
                #[allow(clippy::cast_precision_loss)] // Radius is a small pixel count
                let blurred = imageops::blur(input, radius as f32);
                zip_pixels(input, &blurred, move |noisy, smooth| {
                    [
                        lerp(noisy[0], smooth[0], strength),
                        lerp(noisy[1], smooth[1], strength),
                        lerp(noisy[2], smooth[2], strength),
                    ]
                })
            }
            Operation::ToneCurve { points } => {
                let lut = build_curve_lut(&points);
                map_pixels(input, move |rgb| rgb.map(|c| lookup(&lut, c)))
            }
            Operation::HueRotate { degrees } => {
                let matrix = hue_rotation_matrix(degrees);
                map_pixels(input, move |rgb| apply_matrix(&matrix, rgb))
            }
            Operation::Vignette { intensity, radius } => {
                let radius = radius.max(f32::EPSILON);
                let (center_x, center_y, half_diagonal) = geometry(input);
                map_pixels_at(input, move |x, y, rgb| {
                    #[allow(clippy::cast_precision_loss)]
                    let dx = x as f32 + 0.5 - center_x;
                    #[allow(clippy::cast_precision_loss)]
                    let dy = y as f32 + 0.5 - center_y;
                    let distance = (dx * dx + dy * dy).sqrt() / half_diagonal;
                    let falloff = (distance / radius).clamp(0.0, 1.0);
                    let factor = 1.0 - intensity * falloff * falloff;
                    rgb.map(|c| c * factor)
                })
            }
            Operation::RadialDistortion { k } => {
                let (center_x, center_y, half_diagonal) = geometry(input);
                remap(input, move |x, y| {
                    let dx = (x - center_x) / half_diagonal;
                    let dy = (y - center_y) / half_diagonal;
                    let scale = 1.0 + k * (dx * dx + dy * dy);
                    (
                        center_x + dx * scale * half_diagonal,
                        center_y + dy * scale * half_diagonal,
                    )
                })
            }
            Operation::MirrorBlend { opacity, axis } => {
                let mirrored = match axis {
                    MirrorAxis::Horizontal => imageops::flip_horizontal(input),
                    MirrorAxis::Vertical => imageops::flip_vertical(input),
                };
                zip_pixels(input, &mirrored, move |base, layer| {
                    let screen = |a: f32, b: f32| 1.0 - (1.0 - a) * (1.0 - b);
                    [
                        lerp(base[0], screen(base[0], layer[0]), opacity),
                        lerp(base[1], screen(base[1], layer[1]), opacity),
                        lerp(base[2], screen(base[2], layer[2]), opacity),
                    ]
                })
            }
            Operation::Straighten { degrees } => {
                let (center_x, center_y, _) = geometry(input);
                let (sin, cos) = degrees.to_radians().sin_cos();
                #[allow(clippy::cast_precision_loss)]
                let aspect = {
                    let (width, height) = (input.width() as f32, input.height() as f32);
                    (width / height).max(height / width)
                };
                // Zoom so the rotated frame still covers the whole canvas.
                let zoom = cos.abs() + sin.abs() * aspect;
                remap(input, move |x, y| {
                    let dx = (x - center_x) / zoom;
                    let dy = (y - center_y) / zoom;
                    (
                        center_x + dx * cos + dy * sin,
                        center_y - dx * sin + dy * cos,
                    )
                })
            }
            Operation::Sepia { intensity } => {
                let intensity = intensity.clamp(0.0, 1.0);
                map_pixels(input, move |rgb| {
                    let toned = apply_matrix(&SEPIA, rgb);
                    [
                        lerp(rgb[0], toned[0], intensity),
                        lerp(rgb[1], toned[1], intensity),
                        lerp(rgb[2], toned[2], intensity),
                    ]
                })
            }
            Operation::Monochrome => map_pixels(input, |rgb| {
                let lum = luminance(rgb);
                [lum, lum, lum]
            }),
        }
    }

    fn name(&self) -> &'static str {
        "cpu"
    }
}

// =============================================================================
// Color helpers
// =============================================================================

/// Converts an sRGB-encoded channel in [0, 1] to linear light.
#[must_use]
pub fn srgb_to_linear(value: f32) -> f32 {
    let value = value.max(0.0);
    if value <= 0.040_45 {
        value / 12.92
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}

/// Converts a linear-light channel to sRGB encoding.
#[must_use]
pub fn linear_to_srgb(value: f32) -> f32 {
    let value = value.max(0.0);
    if value <= 0.003_130_8 {
        value * 12.92
    } else {
        1.055 * value.powf(1.0 / 2.4) - 0.055
    }
}

/// Approximate RGB of a black body at `kelvin`, channels in [0, 1].
#[must_use]
pub fn kelvin_to_rgb(kelvin: f32) -> [f32; 3] {
    let temp = kelvin.clamp(1000.0, 40000.0) / 100.0;

    let red = if temp <= 66.0 {
        255.0
    } else {
        329.698_73 * (temp - 60.0).powf(-0.133_204_76)
    };
    let green = if temp <= 66.0 {
        99.470_8 * temp.ln() - 161.119_57
    } else {
        288.122_17 * (temp - 60.0).powf(-0.075_514_85)
    };
    let blue = if temp >= 66.0 {
        255.0
    } else if temp <= 19.0 {
        0.0
    } else {
        138.517_73 * (temp - 10.0).ln() - 305.044_8
    };

    [red, green, blue].map(|c| c.clamp(0.0, 255.0) / 255.0)
}

fn luminance(rgb: [f32; 3]) -> f32 {
    LUMA[0] * rgb[0] + LUMA[1] * rgb[1] + LUMA[2] * rgb[2]
}

fn scale_chroma(rgb: [f32; 3], factor: f32) -> [f32; 3] {
    let lum = luminance(rgb);
    rgb.map(|c| lum + (c - lum) * factor)
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Channel gains that re-light a scene shot under `neutral` as if it were
/// lit by `target`, with a green/magenta `tint` shift. Luminance is kept.
fn white_point_gains(neutral: f32, target: f32, tint: f32) -> Option<[f32; 3]> {
    let from = kelvin_to_rgb(neutral);
    let to = kelvin_to_rgb(target);
    if from.iter().any(|c| *c <= f32::EPSILON) {
        return None;
    }

    let mut gains = [to[0] / from[0], to[1] / from[1], to[2] / from[2]];
    gains[1] *= (1.0 - tint / 1000.0).max(0.0);

    let norm = luminance(gains);
    if norm <= f32::EPSILON {
        return None;
    }
    Some(gains.map(|gain| gain / norm))
}

const SEPIA: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

fn hue_rotation_matrix(degrees: f32) -> [[f32; 3]; 3] {
    let (sin, cos) = degrees.to_radians().sin_cos();
    [
        [
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
        ],
        [
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
        ],
        [
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
        ],
    ]
}

#[inline]
fn apply_matrix(matrix: &[[f32; 3]; 3], rgb: [f32; 3]) -> [f32; 3] {
    matrix.map(|row| row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2])
}

/// 256-entry lookup table through piecewise-linear control points.
fn build_curve_lut(points: &[(f32, f32); 5]) -> [f32; 256] {
    let mut sorted = *points;
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut lut = [0.0; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let x = i as f32 / 255.0;
        *entry = interpolate(&sorted, x).clamp(0.0, 1.0);
    }
    lut
}

fn interpolate(points: &[(f32, f32); 5], x: f32) -> f32 {
    if x <= points[0].0 {
        return points[0].1;
    }
    for pair in points.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if x <= x1 {
            let span = x1 - x0;
            if span <= f32::EPSILON {
                return y1;
            }
            return y0 + (y1 - y0) * (x - x0) / span;
        }
    }
    points[4].1
}

#[inline]
fn lookup(lut: &[f32; 256], value: f32) -> f32 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = (value.clamp(0.0, 1.0) * 255.0).round() as usize;
    lut[index.min(255)]
}

/// Deterministic per-pixel noise in [-1, 1] (splitmix64 finalizer).
fn pixel_noise(seed: u64, x: u32, y: u32) -> f32 {
    let mut z = seed ^ ((u64::from(y) << 32) | u64::from(x));
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    #[allow(clippy::cast_precision_loss)]
    let unit = (z >> 40) as f32 / (1u64 << 24) as f32;
    unit * 2.0 - 1.0
}

// =============================================================================
// Pixel iteration
// =============================================================================

#[inline]
fn to_unit(value: u8) -> f32 {
    f32::from(value) / 255.0
}

#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn from_unit(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

fn map_pixels<F>(input: &RgbaImage, transform: F) -> Option<RgbaImage>
where
    F: Fn([f32; 3]) -> [f32; 3] + Sync + Send,
{
    map_pixels_at(input, move |_, _, rgb| transform(rgb))
}

fn map_pixels_at<F>(input: &RgbaImage, transform: F) -> Option<RgbaImage>
where
    F: Fn(u32, u32, [f32; 3]) -> [f32; 3] + Sync + Send,
{
    let (width, height) = input.dimensions();
    let stride = width as usize * 4;
    let src = input.as_raw();
    let mut dst = vec![0u8; src.len()];

    dst.par_chunks_mut(stride)
        .zip(src.par_chunks(stride))
        .enumerate()
        .for_each(|(y, (row_out, row_in))| {
            #[allow(clippy::cast_possible_truncation)] // y < height: u32
            let y = y as u32;
            for (x, (out, px)) in row_out
                .chunks_exact_mut(4)
                .zip(row_in.chunks_exact(4))
                .enumerate()
            {
                #[allow(clippy::cast_possible_truncation)]
                let rgb = transform(x as u32, y, [to_unit(px[0]), to_unit(px[1]), to_unit(px[2])]);
                out[0] = from_unit(rgb[0]);
                out[1] = from_unit(rgb[1]);
                out[2] = from_unit(rgb[2]);
                out[3] = px[3];
            }
        });

    RgbaImage::from_raw(width, height, dst)
}

/// Combines two equally sized bitmaps pixel by pixel; alpha comes from `base`.
fn zip_pixels<F>(base: &RgbaImage, other: &RgbaImage, combine: F) -> Option<RgbaImage>
where
    F: Fn([f32; 3], [f32; 3]) -> [f32; 3] + Sync + Send,
{
    if base.dimensions() != other.dimensions() {
        return None;
    }
    let (width, height) = base.dimensions();
    let stride = width as usize * 4;
    let src = base.as_raw();
    let layer = other.as_raw();
    let mut dst = vec![0u8; src.len()];

    dst.par_chunks_mut(stride)
        .zip(src.par_chunks(stride).zip(layer.par_chunks(stride)))
        .for_each(|(row_out, (row_a, row_b))| {
            for ((out, a), b) in row_out
                .chunks_exact_mut(4)
                .zip(row_a.chunks_exact(4))
                .zip(row_b.chunks_exact(4))
            {
                let rgb = combine(
                    [to_unit(a[0]), to_unit(a[1]), to_unit(a[2])],
                    [to_unit(b[0]), to_unit(b[1]), to_unit(b[2])],
                );
                out[0] = from_unit(rgb[0]);
                out[1] = from_unit(rgb[1]);
                out[2] = from_unit(rgb[2]);
                out[3] = a[3];
            }
        });

    RgbaImage::from_raw(width, height, dst)
}

/// Center and half diagonal of the pixel grid.
#[allow(clippy::cast_precision_loss)]
fn geometry(input: &RgbaImage) -> (f32, f32, f32) {
    let width = input.width() as f32;
    let height = input.height() as f32;
    let half_diagonal = (width * width + height * height).sqrt() / 2.0;
    (width / 2.0, height / 2.0, half_diagonal.max(f32::EPSILON))
}

/// Inverse-maps every output pixel center to a source position and samples
/// it bilinearly, clamping at the edges.
fn remap<F>(input: &RgbaImage, source_of: F) -> Option<RgbaImage>
where
    F: Fn(f32, f32) -> (f32, f32) + Sync + Send,
{
    let (width, height) = input.dimensions();
    let stride = width as usize * 4;
    let mut dst = vec![0u8; stride * height as usize];

    dst.par_chunks_mut(stride).enumerate().for_each(|(y, row_out)| {
        for (x, out) in row_out.chunks_exact_mut(4).enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let (sx, sy) = source_of(x as f32 + 0.5, y as f32 + 0.5);
            out.copy_from_slice(&sample_bilinear(input, sx - 0.5, sy - 0.5));
        }
    });

    RgbaImage::from_raw(width, height, dst)
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn sample_bilinear(input: &RgbaImage, x: f32, y: f32) -> [u8; 4] {
    let max_x = (input.width() - 1) as f32;
    let max_y = (input.height() - 1) as f32;
    let x = if x.is_finite() { x.clamp(0.0, max_x) } else { 0.0 };
    let y = if y.is_finite() { y.clamp(0.0, max_y) } else { 0.0 };

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(input.width() - 1);
    let y1 = (y0 + 1).min(input.height() - 1);
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = input.get_pixel(x0, y0).0;
    let p10 = input.get_pixel(x1, y0).0;
    let p01 = input.get_pixel(x0, y1).0;
    let p11 = input.get_pixel(x1, y1).0;

    let mut out = [0u8; 4];
    for (channel, value) in out.iter_mut().enumerate() {
        let top = lerp(f32::from(p00[channel]), f32::from(p10[channel]), fx);
        let bottom = lerp(f32::from(p01[channel]), f32::from(p11[channel]), fx);
        *value = lerp(top, bottom, fy).round().clamp(0.0, 255.0) as u8;
    }
    out
}
