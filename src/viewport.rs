//! Display-surface ↔ source-image mapping.
//!
//! The source frame is scaled to fit the surface while preserving its aspect
//! ratio and centered on integer offsets, leaving letterbox padding on one
//! axis. This module holds that mapping, extracted for testability.

use crate::model::PixelPoint;

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Scale-to-fit transform from source pixels to display coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scale: f64,
    pub offset_x: i64,
    pub offset_y: i64,
    /// Size of the scaled image on the surface.
    pub scaled: Size,
    /// Size of the source image.
    pub image: Size,
}

impl Viewport {
    /// Fit `image` into `surface`.
    ///
    /// A surface of 1 pixel or less on either axis (not yet laid out) keeps
    /// the image at scale 1.
    pub fn fit(surface: Size, image: Size) -> Self {
        let scale = if surface.width > 1 && surface.height > 1 && image.width > 0 && image.height > 0
        {
            let scale_w = f64::from(surface.width) / f64::from(image.width);
            let scale_h = f64::from(surface.height) / f64::from(image.height);
            scale_w.min(scale_h)
        } else {
            1.0
        };

        let scaled = Size::new(
            (f64::from(image.width) * scale) as u32,
            (f64::from(image.height) * scale) as u32,
        );

        let offset_x = (i64::from(surface.width) - i64::from(scaled.width)).div_euclid(2);
        let offset_y = (i64::from(surface.height) - i64::from(scaled.height)).div_euclid(2);

        log::debug!(
            "Viewport: surface {} image {} scale {:.4} offset ({}, {})",
            surface,
            image,
            scale,
            offset_x,
            offset_y
        );

        Self {
            scale,
            offset_x,
            offset_y,
            scaled,
            image,
        }
    }

    /// Map display coordinates to source pixel coordinates.
    ///
    /// The result may lie outside the image (a click in the padding).
    pub fn to_pixel(&self, display_x: f64, display_y: f64) -> PixelPoint {
        PixelPoint::new(
            (display_x - self.offset_x as f64) / self.scale,
            (display_y - self.offset_y as f64) / self.scale,
        )
    }

    /// Map a display click to a pixel point, or `None` if it landed in the
    /// letterbox padding.
    pub fn resolve(&self, display_x: f64, display_y: f64) -> Option<PixelPoint> {
        let pixel = self.to_pixel(display_x, display_y);
        pixel
            .is_within(self.image.width, self.image.height)
            .then_some(pixel)
    }

    /// Map source pixel coordinates to display coordinates.
    pub fn to_display(&self, pixel: PixelPoint) -> (f64, f64) {
        (
            pixel.x * self.scale + self.offset_x as f64,
            pixel.y * self.scale + self.offset_y as f64,
        )
    }
}
