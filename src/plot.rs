//! Scatter plot of one frame's click points.

use std::path::Path;

use ab_glyph::FontArc;
use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut, text_size,
};
use imageproc::rect::Rect;

use crate::format::{ClickData, CoordSpace};

const TITLE: &str = "Click Points on Frame";
const X_LABEL: &str = "X Coordinate";
const Y_LABEL: &str = "Y Coordinate";

const MARGIN: u32 = 40;
const GRID_DIVISIONS: u32 = 5;
const POINT_RADIUS: i32 = 3;
const TITLE_SCALE: f32 = 16.0;
const LABEL_SCALE: f32 = 13.0;
const TICK_SCALE: f32 = 11.0;
const TEXT_GAP: i32 = 3;

/// Fonts tried in order for plot text.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Helvetica.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const GRID_COLOR: Rgb<u8> = Rgb([220, 220, 220]);
const AXIS_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const POINT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Errors from building or writing a plot.
#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    #[error("Invalid frame index {frame} (file has {frame_count} frames)")]
    InvalidFrame { frame: usize, frame_count: usize },

    #[error("No points to plot on frame {frame}")]
    NoPoints { frame: usize },

    #[error("Failed to write plot: {0}")]
    Image(#[from] image::ImageError),
}

/// Data range on one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Range {
    min: f64,
    max: f64,
}

impl Range {
    fn of(values: impl Iterator<Item = f64>) -> Self {
        let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        // A single value (or identical values) gets a unit-wide range.
        if max - min < f64::EPSILON {
            return Self {
                min: min - 1.0,
                max: max + 1.0,
            };
        }
        let pad = (max - min) * 0.05;
        Self {
            min: min - pad,
            max: max + pad,
        }
    }

    /// Position of `value` within the range, 0.0 to 1.0.
    fn fraction(&self, value: f64) -> f64 {
        (value - self.min) / (self.max - self.min)
    }
}

/// The points of one frame, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPlot {
    pub frame: usize,
    pub space: CoordSpace,
    pub points: Vec<[f64; 2]>,
}

impl ScatterPlot {
    /// Select one frame of a click file.
    ///
    /// Unset real points are skipped, so a frame clicked only before
    /// calibration has nothing to plot in [`CoordSpace::Real`].
    pub fn for_frame(data: &ClickData, space: CoordSpace, frame: usize) -> Result<Self, PlotError> {
        let points = data
            .frame_points(space, frame)
            .ok_or(PlotError::InvalidFrame {
                frame,
                frame_count: data.frame_count(),
            })?;

        if points.is_empty() {
            return Err(PlotError::NoPoints { frame });
        }

        log::debug!("Plotting {} points of frame {}", points.len(), frame);
        Ok(Self {
            frame,
            space,
            points,
        })
    }

    pub fn title(&self) -> &'static str {
        TITLE
    }

    pub fn x_label(&self) -> &'static str {
        X_LABEL
    }

    pub fn y_label(&self) -> &'static str {
        Y_LABEL
    }

    /// Draw the plot with text from the first system font found.
    ///
    /// Without a usable font the plot is drawn unlabelled.
    pub fn render(&self, width: u32, height: u32) -> RgbImage {
        let font = load_system_font();
        if font.is_none() {
            log::warn!("No system font found, plot text is left out");
        }
        self.render_with_font(width, height, font.as_ref())
    }

    /// Draw the plot: grid, axis box and one red marker per point, plus
    /// title, axis labels and min/max tick values when `font` is given.
    ///
    /// The y axis grows upwards.
    pub fn render_with_font(&self, width: u32, height: u32, font: Option<&FontArc>) -> RgbImage {
        let width = width.max(2 * MARGIN + 1);
        let height = height.max(2 * MARGIN + 1);
        let mut canvas = RgbImage::from_pixel(width, height, BACKGROUND);

        let left = MARGIN as f32;
        let top = MARGIN as f32;
        let right = (width - MARGIN) as f32;
        let bottom = (height - MARGIN) as f32;
        let plot_w = right - left;
        let plot_h = bottom - top;

        for i in 1..GRID_DIVISIONS {
            let t = i as f32 / GRID_DIVISIONS as f32;
            let x = left + t * plot_w;
            let y = top + t * plot_h;
            draw_line_segment_mut(&mut canvas, (x, top), (x, bottom), GRID_COLOR);
            draw_line_segment_mut(&mut canvas, (left, y), (right, y), GRID_COLOR);
        }

        draw_hollow_rect_mut(
            &mut canvas,
            Rect::at(MARGIN as i32, MARGIN as i32).of_size(width - 2 * MARGIN, height - 2 * MARGIN),
            AXIS_COLOR,
        );

        let x_range = Range::of(self.points.iter().map(|p| p[0]));
        let y_range = Range::of(self.points.iter().map(|p| p[1]));

        for [x, y] in &self.points {
            let px = f64::from(left) + x_range.fraction(*x) * f64::from(plot_w);
            let py = f64::from(bottom) - y_range.fraction(*y) * f64::from(plot_h);
            draw_filled_circle_mut(
                &mut canvas,
                (px.round() as i32, py.round() as i32),
                POINT_RADIUS,
                POINT_COLOR,
            );
        }

        if let Some(font) = font {
            let area = Rect::at(MARGIN as i32, MARGIN as i32)
                .of_size(width - 2 * MARGIN, height - 2 * MARGIN);
            draw_labels(&mut canvas, font, area, x_range, y_range);
        }

        canvas
    }

    /// Render and write the plot as an image file (format from the extension).
    pub fn save(&self, path: &Path, width: u32, height: u32) -> Result<(), PlotError> {
        self.render(width, height).save(path)?;
        log::info!("Wrote plot of frame {} to {:?}", self.frame, path);
        Ok(())
    }
}

/// Title above the plot, x label below it, y label in the top-left
/// corner, and the range ends next to each axis.
fn draw_labels(canvas: &mut RgbImage, font: &FontArc, area: Rect, x: Range, y: Range) {
    let width = canvas.width() as i32;
    let height = canvas.height() as i32;

    let (title_w, _) = text_size(TITLE_SCALE, font, TITLE);
    let title_x = (width - title_w as i32) / 2;
    draw_text_mut(canvas, AXIS_COLOR, title_x, TEXT_GAP, TITLE_SCALE, font, TITLE);

    let (label_w, label_h) = text_size(LABEL_SCALE, font, X_LABEL);
    draw_text_mut(
        canvas,
        AXIS_COLOR,
        (width - label_w as i32) / 2,
        height - label_h as i32 - TEXT_GAP,
        LABEL_SCALE,
        font,
        X_LABEL,
    );

    let (_, label_h) = text_size(LABEL_SCALE, font, Y_LABEL);
    draw_text_mut(
        canvas,
        AXIS_COLOR,
        TEXT_GAP,
        area.top() - label_h as i32 - TEXT_GAP,
        LABEL_SCALE,
        font,
        Y_LABEL,
    );

    let below = area.bottom() + TEXT_GAP;
    let x_min = tick_label(x.min);
    let x_max = tick_label(x.max);
    let (x_max_w, _) = text_size(TICK_SCALE, font, &x_max);
    draw_text_mut(canvas, AXIS_COLOR, area.left(), below, TICK_SCALE, font, &x_min);
    draw_text_mut(
        canvas,
        AXIS_COLOR,
        area.right() - x_max_w as i32,
        below,
        TICK_SCALE,
        font,
        &x_max,
    );

    for (value, row) in [(y.max, area.top()), (y.min, area.bottom())] {
        let text = tick_label(value);
        let (text_w, text_h) = text_size(TICK_SCALE, font, &text);
        draw_text_mut(
            canvas,
            AXIS_COLOR,
            area.left() - text_w as i32 - TEXT_GAP,
            row - text_h as i32 / 2,
            TICK_SCALE,
            font,
            &text,
        );
    }
}

fn tick_label(value: f64) -> String {
    format!("{value:.1}")
}

fn load_system_font() -> Option<FontArc> {
    for path in FONT_CANDIDATES {
        if let Ok(bytes) = std::fs::read(path) {
            if let Ok(font) = FontArc::try_from_vec(bytes) {
                log::debug!("Plot font: {}", path);
                return Some(font);
            }
        }
    }

    None
}
