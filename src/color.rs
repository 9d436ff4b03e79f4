//! Conversion between `#RRGGBB` / `#RGB` hex triplets and normalized RGBA
//! colors.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const HEX_MARKER: char = '#';

/// An RGBA color with every channel in `[0, 1]`.
#[derive(Debug, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ColorError {
    #[error("color does not start with '#'")]
    MissingMarker,
    #[error("expected 3 or 6 hex digits, found {0}")]
    InvalidLength(usize),
    #[error("invalid hex digit")]
    InvalidDigit,
}

impl Color {
    /// The color `none` decodes to.
    pub const TRANSPARENT: Color = Color::rgba(1.0, 1.0, 1.0, 0.0);

    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color from 8 bit channels.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
            1.0,
        )
    }

    /// Parse a hex triplet. The alpha channel is always 1.0, it is never
    /// encoded in the hex form.
    pub fn from_hex(text: &str) -> Result<Self, ColorError> {
        let digits = text
            .strip_prefix(HEX_MARKER)
            .ok_or(ColorError::MissingMarker)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidDigit);
        }
        let expanded: String = match digits.len() {
            6 => digits.to_string(),
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            n => return Err(ColorError::InvalidLength(n)),
        };
        let value = u32::from_str_radix(&expanded, 16).map_err(|_| ColorError::InvalidDigit)?;
        let [_, r, g, b] = value.to_be_bytes();
        Ok(Self::from_rgb8(r, g, b))
    }

    /// The 8 bit red, green and blue channels, rounded to the nearest value.
    pub fn to_rgb8(&self) -> (u8, u8, u8) {
        (channel_to_u8(self.r), channel_to_u8(self.g), channel_to_u8(self.b))
    }

    /// Encode as lowercase `#rrggbb`. Alpha is ignored.
    pub fn to_hex(&self) -> String {
        let (r, g, b) = self.to_rgb8();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn channel_to_u8(channel: f64) -> u8 {
    (channel.max(0.0).min(1.0) * 255.0).round() as u8
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_form() {
        let color = Color::from_hex("#ff8000").unwrap();
        assert_eq!(color.to_rgb8(), (255, 128, 0));
        assert_eq!(color.a, 1.0);
    }

    #[test]
    fn test_parse_shorthand() {
        let color = Color::from_hex("#ABC").unwrap();
        assert_eq!(color.to_rgb8(), (0xAA, 0xBB, 0xCC));
        assert_eq!(color.r, f64::from(0xAA) / 255.0);
        assert_eq!(color.a, 1.0);
        assert_eq!(color, Color::from_hex("#aabbcc").unwrap());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Color::from_hex("ff0000"), Err(ColorError::MissingMarker));
        assert_eq!(Color::from_hex("#ff00"), Err(ColorError::InvalidLength(4)));
        assert_eq!(Color::from_hex("#"), Err(ColorError::InvalidLength(0)));
        assert_eq!(Color::from_hex("#ggg"), Err(ColorError::InvalidDigit));
        assert_eq!(Color::from_hex("#+12345"), Err(ColorError::InvalidDigit));
        assert_eq!("red".parse::<Color>(), Err(ColorError::MissingMarker));
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(Color::rgba(1.0, 0.0, 0.0, 0.3).to_hex(), "#ff0000");
        assert_eq!(Color::from_hex("#ABC").unwrap().to_hex(), "#aabbcc");
        assert_eq!(Color::TRANSPARENT.to_hex(), "#ffffff");
        // Out of range channels are clamped
        assert_eq!(Color::rgba(1.5, -0.2, 0.5, 1.0).to_hex(), "#ff0080");
        assert_eq!(format!("{}", Color::from_rgb8(1, 2, 3)), "#010203");
    }

    #[test]
    fn test_hex_roundtrip_ignores_alpha() {
        let color = Color::rgba(0.2, 0.4, 0.6, 0.5);
        let parsed = Color::from_hex(&color.to_hex()).unwrap();
        assert_eq!(parsed.to_rgb8(), color.to_rgb8());
        assert!(parsed.is_opaque());
        assert!(!color.is_opaque());
    }
}
