//! Global constants for the vclick application

use crate::color_utils::Color;

/// Initial display surface width before the shell reports a real size
pub const DEFAULT_SURFACE_WIDTH: u32 = 640;

/// Initial display surface height before the shell reports a real size
pub const DEFAULT_SURFACE_HEIGHT: u32 = 480;

/// Default calibration marker radius (source pixels)
pub const DEFAULT_CALIBRATION_RADIUS: u32 = 4;

/// Default data marker radius (source pixels)
pub const DEFAULT_DATA_RADIUS: u32 = 4;

/// Largest accepted marker radius (source pixels)
pub const MAX_MARKER_RADIUS: u32 = 1000;

/// Default calibration marker color
pub const DEFAULT_CALIBRATION_COLOR: Color = Color::GREEN;

/// Default data marker color
pub const DEFAULT_DATA_COLOR: Color = Color::BLUE;

/// How far mode highlight colors are moved toward white
pub const HIGHLIGHT_LIGHTEN_FACTOR: f32 = 0.6;

/// Number of calibration pairs used to compute the transform
pub const CALIBRATION_PAIRS: usize = 2;

/// Default synthetic video size used by the demo source
pub const DEFAULT_SYNTHETIC_WIDTH: u32 = 320;

/// Default synthetic video height used by the demo source
pub const DEFAULT_SYNTHETIC_HEIGHT: u32 = 240;

/// Default plot image size
pub const DEFAULT_PLOT_SIZE: (u32, u32) = (640, 480);
