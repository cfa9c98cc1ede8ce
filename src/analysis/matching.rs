// SPDX-License-Identifier: MPL-2.0
//! Color matching for searching posts by sky color.

/// RGB channels in 0..=1.
pub type UnitRgb = [f64; 3];

/// Parses `#RRGGBB` or `RRGGBB`, ignoring surrounding whitespace.
#[must_use]
pub fn hex_to_rgb(hex: &str) -> Option<UnitRgb> {
    let digits = hex.trim();
    let digits = digits.strip_prefix('#').unwrap_or(digits);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let value = u32::from_str_radix(digits, 16).ok()?;
    let channel = |shift: u32| f64::from((value >> shift) & 0xFF) / 255.0;
    Some([channel(16), channel(8), channel(0)])
}

/// Euclidean distance between two colors, in 0..=sqrt(3).
#[must_use]
pub fn rgb_distance(a: UnitRgb, b: UnitRgb) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Keeps the items with at least one color within `threshold` of `target`.
///
/// Items without colors never match and unparsable colors are ignored. An
/// unparsable target keeps every item.
pub fn filter_by_color_distance<T, F, S>(
    items: Vec<T>,
    target: &str,
    threshold: f64,
    colors_of: F,
) -> Vec<T>
where
    F: Fn(&T) -> Option<&[S]>,
    S: AsRef<str>,
{
    let Some(target) = hex_to_rgb(target) else {
        return items;
    };

    items
        .into_iter()
        .filter(|item| {
            colors_of(item).is_some_and(|colors| {
                colors
                    .iter()
                    .filter_map(|color| hex_to_rgb(color.as_ref()))
                    .any(|color| rgb_distance(target, color) <= threshold)
            })
        })
        .collect()
}
