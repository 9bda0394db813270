//! Marker display settings.
//!
//! `DisplaySettings` is an immutable record: applying new settings replaces
//! the whole value held by the session rather than mutating fields in place.

use serde::{Deserialize, Serialize};

use crate::color_utils::Color;
use crate::constants::{
    DEFAULT_CALIBRATION_COLOR, DEFAULT_CALIBRATION_RADIUS, DEFAULT_DATA_COLOR, DEFAULT_DATA_RADIUS,
    MAX_MARKER_RADIUS,
};

/// Marker appearance used when rendering overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// Radius of calibration markers (source pixels, > 0)
    #[serde(default = "default_calibration_radius")]
    pub calibration_radius: u32,
    /// Radius of data markers (source pixels, > 0)
    #[serde(default = "default_data_radius")]
    pub data_radius: u32,
    /// Calibration marker color
    #[serde(default = "default_calibration_color")]
    pub calibration_color: Color,
    /// Data marker color
    #[serde(default = "default_data_color")]
    pub data_color: Color,
    /// Whether calibration markers are drawn at all
    #[serde(default = "default_show_calibration")]
    pub show_calibration_points: bool,
}

fn default_calibration_radius() -> u32 {
    DEFAULT_CALIBRATION_RADIUS
}

fn default_data_radius() -> u32 {
    DEFAULT_DATA_RADIUS
}

fn default_calibration_color() -> Color {
    DEFAULT_CALIBRATION_COLOR
}

fn default_data_color() -> Color {
    DEFAULT_DATA_COLOR
}

fn default_show_calibration() -> bool {
    true
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            calibration_radius: default_calibration_radius(),
            data_radius: default_data_radius(),
            calibration_color: default_calibration_color(),
            data_color: default_data_color(),
            show_calibration_points: default_show_calibration(),
        }
    }
}

impl DisplaySettings {
    /// Check the numeric invariants (radii in `1..=MAX_MARKER_RADIUS`).
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !radius_in_range(self.calibration_radius) {
            return Err(SettingsError::invalid_radius(
                "calibration",
                self.calibration_radius.to_string(),
            ));
        }
        if !radius_in_range(self.data_radius) {
            return Err(SettingsError::invalid_radius(
                "data",
                self.data_radius.to_string(),
            ));
        }
        Ok(())
    }

    /// Build new settings from raw form input, falling back to `self` for
    /// every field the form leaves empty.
    pub fn with_form(&self, form: &SettingsForm) -> Result<Self, SettingsError> {
        let calibration_radius = match form.calibration_radius.as_deref() {
            Some(text) => parse_radius("calibration", text)?,
            None => self.calibration_radius,
        };
        let data_radius = match form.data_radius.as_deref() {
            Some(text) => parse_radius("data", text)?,
            None => self.data_radius,
        };
        let calibration_color = match form.calibration_color.as_deref() {
            Some(text) => Color::from_hex(text)?,
            None => self.calibration_color,
        };
        let data_color = match form.data_color.as_deref() {
            Some(text) => Color::from_hex(text)?,
            None => self.data_color,
        };
        let show_calibration_points = match form.show_calibration_points.as_deref() {
            Some(text) => parse_flag(text)?,
            None => self.show_calibration_points,
        };

        Ok(Self {
            calibration_radius,
            data_radius,
            calibration_color,
            data_color,
            show_calibration_points,
        })
    }
}

/// Raw, unvalidated settings input. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsForm {
    pub calibration_radius: Option<String>,
    pub data_radius: Option<String>,
    pub calibration_color: Option<String>,
    pub data_color: Option<String>,
    pub show_calibration_points: Option<String>,
}

fn parse_radius(which: &'static str, text: &str) -> Result<u32, SettingsError> {
    match text.trim().parse::<u32>() {
        Ok(radius) if radius_in_range(radius) => Ok(radius),
        _ => Err(SettingsError::invalid_radius(which, text)),
    }
}

fn radius_in_range(radius: u32) -> bool {
    (1..=MAX_MARKER_RADIUS).contains(&radius)
}

fn parse_flag(text: &str) -> Result<bool, SettingsError> {
    match text.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "no" | "n" | "off" => Ok(false),
        _ => Err(SettingsError::InvalidFlag {
            input: text.to_string(),
        }),
    }
}

/// Errors produced while validating settings input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// Radius is not an integer in `1..=MAX_MARKER_RADIUS`
    #[error(
        "Invalid {which} radius '{input}': expected an integer from 1 to {max}",
        max = MAX_MARKER_RADIUS
    )]
    InvalidRadius { which: &'static str, input: String },

    /// Color is not a `#rrggbb` hex value
    #[error("Invalid color value '{input}': expected #rrggbb")]
    InvalidColor { input: String },

    /// Toggle is not a recognised boolean
    #[error("Invalid toggle value '{input}': expected yes or no")]
    InvalidFlag { input: String },
}

impl SettingsError {
    /// Create an invalid radius error.
    pub fn invalid_radius(which: &'static str, input: impl Into<String>) -> Self {
        Self::InvalidRadius {
            which,
            input: input.into(),
        }
    }

    /// Create an invalid color error.
    pub fn invalid_color(input: impl Into<String>) -> Self {
        Self::InvalidColor {
            input: input.into(),
        }
    }
}
