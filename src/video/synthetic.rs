//! Generated frames for demos and tests.
//!
//! Each frame is a diagonal gradient with a dark square marker that moves
//! across the image as the frame index grows, so stepping through frames
//! shows visible motion.

use image::{Rgb, RgbImage};

use super::{VideoError, VideoSource};
use crate::constants::{DEFAULT_SYNTHETIC_HEIGHT, DEFAULT_SYNTHETIC_WIDTH};
use crate::viewport::Size;

/// Half-width of the moving marker, in pixels.
const MARKER_HALF_SIZE: u32 = 4;

/// A deterministic in-memory video.
#[derive(Debug, Clone)]
pub struct SyntheticVideo {
    frame_count: usize,
    size: Size,
    /// Frame indices that fail to read, for exercising error paths.
    broken_frames: Vec<usize>,
}

impl SyntheticVideo {
    /// Create a synthetic video with `frame_count` frames of `width` x `height`.
    pub fn new(frame_count: usize, width: u32, height: u32) -> Self {
        Self {
            frame_count,
            size: Size::new(width, height),
            broken_frames: Vec::new(),
        }
    }

    /// Create a synthetic video at the default demo size.
    pub fn with_frames(frame_count: usize) -> Self {
        Self::new(frame_count, DEFAULT_SYNTHETIC_WIDTH, DEFAULT_SYNTHETIC_HEIGHT)
    }

    /// Make `index` fail with a decode error when read.
    pub fn with_broken_frame(mut self, index: usize) -> Self {
        self.broken_frames.push(index);
        self
    }

    /// Center of the moving marker on frame `index`.
    pub fn marker_position(&self, index: usize) -> (u32, u32) {
        let span = self.size.width.saturating_sub(2 * MARKER_HALF_SIZE).max(1);
        let steps = self.frame_count.max(1) as u32;
        let x = MARKER_HALF_SIZE + (index as u32 % steps) * span / steps;
        (x, self.size.height / 2)
    }
}

impl VideoSource for SyntheticVideo {
    fn frame_count(&self) -> usize {
        self.frame_count
    }

    fn frame_size(&self) -> Size {
        self.size
    }

    fn read_frame(&mut self, index: usize) -> Result<RgbImage, VideoError> {
        if index >= self.frame_count {
            return Err(VideoError::FrameOutOfRange {
                index,
                frame_count: self.frame_count,
            });
        }
        if self.broken_frames.contains(&index) {
            return Err(VideoError::decode(index, "synthetic frame marked broken"));
        }

        let width = self.size.width.max(1);
        let height = self.size.height.max(1);
        let (mx, my) = self.marker_position(index);

        Ok(RgbImage::from_fn(self.size.width, self.size.height, |x, y| {
            if x.abs_diff(mx) <= MARKER_HALF_SIZE && y.abs_diff(my) <= MARKER_HALF_SIZE {
                return Rgb([20, 20, 20]);
            }
            let r = (x * 255 / width) as u8;
            let g = (y * 255 / height) as u8;
            Rgb([r, g, 160])
        }))
    }

    fn describe(&self) -> String {
        format!("synthetic video, {} frames of {}", self.frame_count, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_have_declared_size() {
        let mut video = SyntheticVideo::new(3, 32, 16);
        let frame = video.read_frame(2).unwrap();
        assert_eq!((frame.width(), frame.height()), (32, 16));
        assert_eq!(video.frame_size(), Size::new(32, 16));
    }

    #[test]
    fn test_marker_moves() {
        let video = SyntheticVideo::new(10, 200, 50);
        assert!(video.marker_position(5).0 > video.marker_position(0).0);

        let mut video = video;
        let frame = video.read_frame(0).unwrap();
        let (mx, my) = video.marker_position(0);
        assert_eq!(frame.get_pixel(mx, my), &Rgb([20, 20, 20]));
    }

    #[test]
    fn test_out_of_range_and_broken() {
        let mut video = SyntheticVideo::new(2, 8, 8).with_broken_frame(1);
        assert!(video.read_frame(0).is_ok());
        assert!(matches!(video.read_frame(1), Err(VideoError::Decode { index: 1, .. })));
        assert!(matches!(
            video.read_frame(2),
            Err(VideoError::FrameOutOfRange { .. })
        ));
    }
}
