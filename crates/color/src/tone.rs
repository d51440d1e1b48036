//! Tonal variants and perceptual comparison.

use crate::Color;

/// Channel delta applied by [`dark_color`] and [`light_color`].
pub const TONE_DELTA: i16 = 70;

/// Nudge applied to the non-default muted variants.
const MUTE_NUDGE: i16 = 10;

fn add_to_channel(channel: u8, delta: i16) -> u8 {
    (channel as i16 + delta).clamp(0, 255) as u8
}

fn shift(color: Color, delta: i16) -> Color {
    Color::rgb(
        add_to_channel(color.red(), delta),
        add_to_channel(color.green(), delta),
        add_to_channel(color.blue(), delta),
    )
}

/// Darker opaque variant: every RGB channel minus [`TONE_DELTA`], clamped.
///
/// Status bars conventionally use a darkened primary color, so the theme
/// extractor derives status bar candidates from primary/accent attributes with
/// this transform.
pub fn dark_color(color: Color) -> Color {
    shift(color, -TONE_DELTA)
}

/// Lighter opaque variant: every RGB channel plus [`TONE_DELTA`], clamped.
pub fn light_color(color: Color) -> Color {
    shift(color, TONE_DELTA)
}

/// Muted variant averaged toward mid-gray, rotated by `variant % 3`.
///
/// Variant 0 is the plain average, 1 is nudged lighter, 2 darker. Callers
/// cycling through adjacent items use the rotation to keep neighbours apart.
pub fn mute_color(color: Color, variant: u32) -> Color {
    let mute = |channel: u8| ((127.5 + channel as f64) as i16 / 2) as u8;
    let muted = Color::rgb(mute(color.red()), mute(color.green()), mute(color.blue()));

    match variant % 3 {
        1 => shift(muted, MUTE_NUDGE),
        2 => shift(muted, -MUTE_NUDGE),
        _ => muted,
    }
}

/// Visible difference between two colors, between 0 and 255.
///
/// Luma-weighted absolute channel distance (0.299 / 0.587 / 0.114).
pub fn difference(a: Color, b: Color) -> f64 {
    let channel = |x: u8, y: u8, weight: f64| (weight * (x as f64 - y as f64)).abs();

    channel(a.red(), b.red(), 0.299)
        + channel(a.green(), b.green(), 0.587)
        + channel(a.blue(), b.blue(), 0.114)
}

/// Opaque average of a pixel buffer, or `None` when it is empty.
pub fn average_color(pixels: &[Color]) -> Option<Color> {
    if pixels.is_empty() {
        return None;
    }

    let (red, green, blue) = pixels.iter().fold((0u64, 0u64, 0u64), |(r, g, b), px| {
        (r + px.red() as u64, g + px.green() as u64, b + px.blue() as u64)
    });
    let count = pixels.len() as u64;

    Some(Color::rgb(
        (red / count) as u8,
        (green / count) as u8,
        (blue / count) as u8,
    ))
}
