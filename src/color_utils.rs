//! Color utility functions shared across the application.
//!
//! This module provides the marker color type together with the hex
//! conversions used by the settings form and the lightening used for
//! mode highlights.

use serde::{Deserialize, Serialize};

use crate::settings::SettingsError;

/// An sRGB marker color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const GREEN: Color = Color::new(0, 255, 0);
    pub const BLUE: Color = Color::new(0, 0, 255);
    pub const RED: Color = Color::new(255, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const LIGHT_CORAL: Color = Color::new(240, 128, 128);

    /// Create a color from its components.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#rrggbb` (or `rrggbb`) hex string.
    pub fn from_hex(hex: &str) -> Result<Self, SettingsError> {
        let trimmed = hex.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(SettingsError::invalid_color(hex));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| SettingsError::invalid_color(hex))
        };

        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Format as a lowercase `#rrggbb` string.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Move the color toward white by `factor` (0.0 = unchanged, 1.0 = white).
    pub fn lighten(&self, factor: f32) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        let lift = |c: u8| (f32::from(c) + (255.0 - f32::from(c)) * factor) as u8;
        Self::new(lift(self.r), lift(self.g), lift(self.b))
    }

    /// Convert to an `image` pixel.
    pub fn to_pixel(&self) -> image::Rgb<u8> {
        image::Rgb([self.r, self.g, self.b])
    }
}

impl TryFrom<String> for Color {
    type Error = SettingsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip() {
        let color = Color::from_hex("#1a2B3c").unwrap();
        assert_eq!(color, Color::new(0x1a, 0x2b, 0x3c));
        assert_eq!(color.to_hex(), "#1a2b3c");
    }

    #[test]
    fn test_hex_without_hash() {
        assert_eq!(Color::from_hex("00ff00").unwrap(), Color::GREEN);
    }

    #[test]
    fn test_invalid_hex() {
        assert!(Color::from_hex("#fff").is_err());
        assert!(Color::from_hex("#gg0000").is_err());
        assert!(Color::from_hex("").is_err());
        assert!(Color::from_hex("#00ff00ff").is_err());
    }

    #[test]
    fn test_lighten_red() {
        let light = Color::RED.lighten(0.6);
        assert_eq!(light.r, 255);
        assert_eq!(light.g, 153);
        assert_eq!(light.b, 153);
    }

    #[test]
    fn test_lighten_bounds() {
        assert_eq!(Color::BLUE.lighten(0.0), Color::BLUE);
        assert_eq!(Color::BLUE.lighten(1.0), Color::WHITE);
    }

    #[test]
    fn test_serde_as_hex_string() {
        let json = serde_json::to_string(&Color::GREEN).unwrap();
        assert_eq!(json, "\"#00ff00\"");
        let parsed: Color = serde_json::from_str("\"#0000ff\"").unwrap();
        assert_eq!(parsed, Color::BLUE);
        assert!(serde_json::from_str::<Color>("\"blue\"").is_err());
    }
}
