//! Two-point pixel-to-real calibration.
//!
//! The mapping is a pure per-axis affine map: no rotation and no shear.
//! Two reference pairs are not enough to resolve rotation unambiguously,
//! and the tool only ever collects two.

use crate::constants::CALIBRATION_PAIRS;
use crate::model::{PixelPoint, RealPoint};

/// Image axis, used to report degenerate calibrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn name(&self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
        }
    }
}

/// Per-axis linear mapping from pixel space to real-world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationTransform {
    pub origin_pixel: PixelPoint,
    pub origin_real: RealPoint,
    pub scale_x: f64,
    pub scale_y: f64,
}

/// A freshly computed transform plus the axes that fell back to unit scale.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationReport {
    pub transform: CalibrationTransform,
    pub fallback_axes: Vec<Axis>,
}

impl CalibrationTransform {
    /// Compute the transform from two pixel/real reference pairs.
    ///
    /// When both pixel points share a coordinate on an axis the scale for
    /// that axis is `1.0`; the calibration is still accepted.
    pub fn from_pairs(
        p0: PixelPoint,
        p1: PixelPoint,
        r0: RealPoint,
        r1: RealPoint,
    ) -> CalibrationReport {
        let mut fallback_axes = Vec::new();

        let dx_img = p1.x - p0.x;
        let dy_img = p1.y - p0.y;

        let scale_x = if dx_img == 0.0 {
            log::warn!("Calibration image points have identical x; using scale_x=1.0");
            fallback_axes.push(Axis::X);
            1.0
        } else {
            (r1.x - r0.x) / dx_img
        };

        let scale_y = if dy_img == 0.0 {
            log::warn!("Calibration image points have identical y; using scale_y=1.0");
            fallback_axes.push(Axis::Y);
            1.0
        } else {
            (r1.y - r0.y) / dy_img
        };

        log::info!(
            "Computed linear transform: scale_x={:.6}, scale_y={:.6}",
            scale_x,
            scale_y
        );

        CalibrationReport {
            transform: Self {
                origin_pixel: p0,
                origin_real: r0,
                scale_x,
                scale_y,
            },
            fallback_axes,
        }
    }

    /// Map a pixel point to real-world coordinates.
    pub fn to_real(&self, pixel: PixelPoint) -> RealPoint {
        RealPoint::new(
            self.origin_real.x + (pixel.x - self.origin_pixel.x) * self.scale_x,
            self.origin_real.y + (pixel.y - self.origin_pixel.y) * self.scale_y,
        )
    }
}

/// Map a pixel point through an optional transform; `None` means unset.
pub fn to_real(pixel: PixelPoint, transform: Option<&CalibrationTransform>) -> Option<RealPoint> {
    transform.map(|t| t.to_real(pixel))
}

/// Compute the transform from collected calibration points.
///
/// Only the first two pairs are used. Returns `None` until two complete
/// pairs exist.
pub fn compute_transform(
    calib_pixel: &[PixelPoint],
    calib_real: &[RealPoint],
) -> Option<CalibrationReport> {
    if calib_pixel.len() < CALIBRATION_PAIRS || calib_real.len() < CALIBRATION_PAIRS {
        return None;
    }
    Some(CalibrationTransform::from_pairs(
        calib_pixel[0],
        calib_pixel[1],
        calib_real[0],
        calib_real[1],
    ))
}
