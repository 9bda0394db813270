//! Per-frame annotation storage.
//!
//! Each frame owns two parallel sequences: the clicked pixel points and the
//! real-world points derived from them. Both sequences always have the same
//! length; position is what ties a pixel point to its real point.

use crate::calibration::{CalibrationTransform, to_real};
use crate::model::{PixelPoint, RealPoint};

/// A point removed by [`AnnotationStore::remove_nearest`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemovedPoint {
    /// Position the point occupied in its frame (0-based).
    pub index: usize,
    pub pixel: PixelPoint,
    pub real: Option<RealPoint>,
}

/// Per-frame pixel and real point lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationStore {
    pixel_points: Vec<Vec<PixelPoint>>,
    real_points: Vec<Vec<Option<RealPoint>>>,
    /// Whether the store changed since the last save/load.
    dirty: bool,
}

impl AnnotationStore {
    /// Create an empty store with no frames.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with `frame_count` empty frames.
    pub fn with_frames(frame_count: usize) -> Self {
        let mut store = Self::new();
        store.resize(frame_count);
        store
    }

    /// Rebuild a store from already-paired sequences.
    ///
    /// Fails if the outer lengths or any frame's inner lengths differ.
    pub fn from_parts(
        pixel_points: Vec<Vec<PixelPoint>>,
        real_points: Vec<Vec<Option<RealPoint>>>,
    ) -> Result<Self, AnnotationError> {
        if pixel_points.len() != real_points.len() {
            return Err(AnnotationError::FrameCountMismatch {
                pixel_frames: pixel_points.len(),
                real_frames: real_points.len(),
            });
        }
        if let Some(frame) = pixel_points
            .iter()
            .zip(&real_points)
            .position(|(pixels, reals)| pixels.len() != reals.len())
        {
            return Err(AnnotationError::PointCountMismatch {
                frame,
                pixel_points: pixel_points[frame].len(),
                real_points: real_points[frame].len(),
            });
        }

        Ok(Self {
            pixel_points,
            real_points,
            dirty: false,
        })
    }

    /// Re-initialise to `frame_count` empty frames, dropping every point.
    pub fn resize(&mut self, frame_count: usize) {
        self.pixel_points = vec![Vec::new(); frame_count];
        self.real_points = vec![Vec::new(); frame_count];
        self.dirty = false;
    }

    /// Number of frames the store is sized for.
    pub fn frame_count(&self) -> usize {
        self.pixel_points.len()
    }

    /// Pixel points of one frame, in click order.
    pub fn pixel_points(&self, frame: usize) -> Result<&[PixelPoint], AnnotationError> {
        self.check_frame(frame)?;
        Ok(&self.pixel_points[frame])
    }

    /// Real points of one frame, in click order.
    pub fn real_points(&self, frame: usize) -> Result<&[Option<RealPoint>], AnnotationError> {
        self.check_frame(frame)?;
        Ok(&self.real_points[frame])
    }

    /// All frames' pixel points.
    pub fn all_pixel_points(&self) -> &[Vec<PixelPoint>] {
        &self.pixel_points
    }

    /// All frames' real points.
    pub fn all_real_points(&self) -> &[Vec<Option<RealPoint>>] {
        &self.real_points
    }

    /// Total number of points across all frames.
    pub fn total_points(&self) -> usize {
        self.pixel_points.iter().map(Vec::len).sum()
    }

    /// Verify that every frame's pixel and real lists have equal length.
    pub fn is_consistent(&self) -> bool {
        self.pixel_points.len() == self.real_points.len()
            && self
                .pixel_points
                .iter()
                .zip(&self.real_points)
                .all(|(pixels, reals)| pixels.len() == reals.len())
    }

    /// Check if there are unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag (after saving).
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Append a point to a frame. Returns the point's 1-based position.
    pub fn append(
        &mut self,
        frame: usize,
        pixel: PixelPoint,
        transform: Option<&CalibrationTransform>,
    ) -> Result<usize, AnnotationError> {
        self.check_frame(frame)?;
        self.pixel_points[frame].push(pixel);
        self.real_points[frame].push(to_real(pixel, transform));
        self.dirty = true;
        Ok(self.pixel_points[frame].len())
    }

    /// Remove the point closest to `query` from a frame.
    ///
    /// Ties go to the earliest inserted point. Returns `Ok(None)` when the
    /// frame has no points.
    pub fn remove_nearest(
        &mut self,
        frame: usize,
        query: PixelPoint,
    ) -> Result<Option<RemovedPoint>, AnnotationError> {
        self.check_frame(frame)?;

        let mut nearest: Option<(usize, f64)> = None;
        for (index, point) in self.pixel_points[frame].iter().enumerate() {
            let distance = point.distance_to(&query);
            match nearest {
                Some((_, best)) if distance >= best => {}
                _ => nearest = Some((index, distance)),
            }
        }

        let Some((index, _)) = nearest else {
            return Ok(None);
        };

        let pixel = self.pixel_points[frame].remove(index);
        let real = self.real_points[frame].remove(index);
        self.dirty = true;
        Ok(Some(RemovedPoint { index, pixel, real }))
    }

    /// Recompute every real point from its pixel point.
    ///
    /// Without a transform every real point becomes unset.
    pub fn recompute_real_from_pixel(&mut self, transform: Option<&CalibrationTransform>) {
        self.real_points = self
            .pixel_points
            .iter()
            .map(|pixels| pixels.iter().map(|p| to_real(*p, transform)).collect())
            .collect();
        self.dirty = true;
        log::info!("Recomputed real coordinates for {} points", self.total_points());
    }

    fn check_frame(&self, frame: usize) -> Result<(), AnnotationError> {
        if frame < self.frame_count() {
            Ok(())
        } else {
            Err(AnnotationError::FrameOutOfRange {
                frame,
                frame_count: self.frame_count(),
            })
        }
    }
}

/// Errors raised by [`AnnotationStore`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnnotationError {
    /// Frame index outside the store
    #[error("Frame {frame} is out of range (store has {frame_count} frames)")]
    FrameOutOfRange { frame: usize, frame_count: usize },

    /// Pixel and real sequences have different frame counts
    #[error("Frame count mismatch: {pixel_frames} pixel frames, {real_frames} real frames")]
    FrameCountMismatch {
        pixel_frames: usize,
        real_frames: usize,
    },

    /// A frame's pixel and real sequences have different lengths
    #[error(
        "Point count mismatch in frame {frame}: {pixel_points} pixel points, {real_points} real points"
    )]
    PointCountMismatch {
        frame: usize,
        pixel_points: usize,
        real_points: usize,
    },
}
