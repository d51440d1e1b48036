//! Color values for tintbar.
//!
//! Colors are opaque 32-bit ARGB words, the same packing the overlay renderer
//! consumes. This crate is pure: no I/O, no platform dependencies.
//!
//! - [`Color`] - the ARGB value type with channel accessors and hex parsing
//! - [`tone`] - tonal variants (dark/light/muted) and perceptual difference

mod tone;

pub use tone::{
    average_color, dark_color, difference, light_color, mute_color, TONE_DELTA,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    #[error("color must start with '#': {0}")]
    MissingHash(String),

    #[error("color must have 6 or 8 hex digits: {0}")]
    InvalidLength(String),

    #[error("invalid hex digits in color: {0}")]
    InvalidHex(String),
}

/// A 32-bit ARGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr", into = "String")]
pub struct Color(u32);

impl Color {
    pub const BLACK: Color = Color(0xFF00_0000);
    pub const WHITE: Color = Color(0xFFFF_FFFF);
    pub const TRANSPARENT: Color = Color(0x0000_0000);

    pub const fn from_argb_u32(argb: u32) -> Self {
        Self(argb)
    }

    pub const fn from_argb(alpha: u8, red: u8, green: u8, blue: u8) -> Self {
        Self(
            (alpha as u32) << 24 | (red as u32) << 16 | (green as u32) << 8 | blue as u32,
        )
    }

    /// Fully opaque color from RGB channels.
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::from_argb(0xFF, red, green, blue)
    }

    pub const fn argb(self) -> u32 {
        self.0
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Same color with the alpha channel forced to 255.
    ///
    /// Theme resources frequently declare translucent status bar colors; the
    /// overlay always paints them opaque.
    pub const fn opaque(self) -> Self {
        Self(self.0 | 0xFF00_0000)
    }

    pub const fn is_opaque(self) -> bool {
        self.alpha() == 0xFF
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.0)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    /// Parses `#RRGGBB` (opaque) or `#AARRGGBB`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(s.to_string()))?;

        let value = u32::from_str_radix(digits, 16)
            .map_err(|_| ColorParseError::InvalidHex(s.to_string()))?;

        match digits.len() {
            6 => Ok(Self(value).opaque()),
            8 => Ok(Self(value)),
            _ => Err(ColorParseError::InvalidLength(s.to_string())),
        }
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl From<u32> for Color {
    fn from(argb: u32) -> Self {
        Self(argb)
    }
}

/// Wire representation: either a raw ARGB integer or a hex string.
#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Int(u32),
    Hex(String),
}

impl TryFrom<ColorRepr> for Color {
    type Error = ColorParseError;

    fn try_from(repr: ColorRepr) -> Result<Self, Self::Error> {
        match repr {
            ColorRepr::Int(argb) => Ok(Self(argb)),
            ColorRepr::Hex(hex) => hex.parse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_accessors() {
        let color = Color::from_argb(0x80, 0x12, 0x34, 0x56);
        assert_eq!(color.alpha(), 0x80);
        assert_eq!(color.red(), 0x12);
        assert_eq!(color.green(), 0x34);
        assert_eq!(color.blue(), 0x56);
        assert_eq!(color.argb(), 0x8012_3456);
    }

    #[test]
    fn test_opaque_forces_alpha() {
        let color = Color::from_argb_u32(0x0033_6699).opaque();
        assert_eq!(color, Color::rgb(0x33, 0x66, 0x99));
        assert!(color.is_opaque());
    }

    #[test]
    fn test_parse_short_form_is_opaque() {
        let color: Color = "#3F51B5".parse().unwrap();
        assert_eq!(color.argb(), 0xFF3F_51B5);
    }

    #[test]
    fn test_parse_long_form_keeps_alpha() {
        let color: Color = "#803F51B5".parse().unwrap();
        assert_eq!(color.alpha(), 0x80);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            "3F51B5".parse::<Color>(),
            Err(ColorParseError::MissingHash(_))
        ));
        assert!(matches!(
            "#3F51".parse::<Color>(),
            Err(ColorParseError::InvalidLength(_))
        ));
        assert!(matches!(
            "#GGGGGG".parse::<Color>(),
            Err(ColorParseError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_serde_accepts_int_and_hex() {
        let from_hex: Color = serde_json::from_str("\"#FF000000\"").unwrap();
        let from_int: Color = serde_json::from_str("4278190080").unwrap();
        assert_eq!(from_hex, Color::BLACK);
        assert_eq!(from_int, Color::BLACK);

        let json = serde_json::to_string(&Color::rgb(1, 2, 3)).unwrap();
        assert_eq!(json, "\"#FF010203\"");
    }
}
