//! Marker overlays and display-surface composition.
//!
//! Markers are drawn on a copy of the source frame at source resolution, so
//! they scale together with the image when it is letterboxed.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;

use crate::color_utils::Color;
use crate::constants::MAX_MARKER_RADIUS;
use crate::model::PixelPoint;
use crate::settings::DisplaySettings;
use crate::viewport::{Size, Viewport};

/// Background color of the letterbox padding.
const SURFACE_BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Draw a filled marker circle centered on a pixel point.
///
/// The radius is capped at [`MAX_MARKER_RADIUS`].
pub fn draw_marker(image: &mut RgbImage, point: PixelPoint, radius: u32, color: Color) {
    let radius = radius.min(MAX_MARKER_RADIUS) as i32;
    draw_filled_circle_mut(
        image,
        (point.x as i32, point.y as i32),
        radius,
        color.to_pixel(),
    );
}

/// Return a copy of `frame` with calibration and data markers drawn on it.
///
/// Calibration markers are skipped when the settings hide them; data
/// markers are always drawn, on top of calibration markers.
pub fn draw_overlays(
    frame: &RgbImage,
    calibration_points: &[PixelPoint],
    data_points: &[PixelPoint],
    settings: &DisplaySettings,
) -> RgbImage {
    let mut image = frame.clone();

    if settings.show_calibration_points {
        for point in calibration_points {
            draw_marker(
                &mut image,
                *point,
                settings.calibration_radius,
                settings.calibration_color,
            );
        }
    }

    for point in data_points {
        draw_marker(&mut image, *point, settings.data_radius, settings.data_color);
    }

    image
}

/// Scale `frame` by the viewport and center it on a surface of `surface` size.
pub fn compose_display(frame: &RgbImage, viewport: &Viewport, surface: Size) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(
        surface.width.max(1),
        surface.height.max(1),
        SURFACE_BACKGROUND,
    );

    if viewport.scaled.width == 0 || viewport.scaled.height == 0 {
        return canvas;
    }

    let scaled = if viewport.scaled == viewport.image {
        frame.clone()
    } else {
        image::imageops::resize(
            frame,
            viewport.scaled.width,
            viewport.scaled.height,
            image::imageops::FilterType::Triangle,
        )
    };

    image::imageops::overlay(&mut canvas, &scaled, viewport.offset_x, viewport.offset_y);
    canvas
}
