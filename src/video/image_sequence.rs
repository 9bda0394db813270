//! Frame source backed by a sorted list of image files.

use std::path::{Path, PathBuf};

use image::RgbImage;

use super::{VideoError, VideoSource};
use crate::viewport::Size;

/// Supported frame image extensions
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "tif", "webp"];

/// Check if a path has a supported image extension
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// A "video" made of one image file per frame.
///
/// The first frame fixes the frame size; later frames of a different size
/// fail to read.
#[derive(Debug)]
pub struct ImageSequence {
    frames: Vec<PathBuf>,
    size: Size,
    /// Most recently decoded frame, reused on redraws of the same index.
    cached: Option<(usize, RgbImage)>,
}

impl ImageSequence {
    /// Discover frame images in a folder, non-recursively, sorted by name.
    pub fn from_folder(folder: &Path) -> Result<Self, VideoError> {
        let mut frames: Vec<PathBuf> = std::fs::read_dir(folder)
            .map_err(|e| VideoError::open(folder, format!("failed to read folder: {e}")))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_image_file(path))
            .collect();

        if frames.is_empty() {
            return Err(VideoError::NoFrames {
                path: folder.to_path_buf(),
            });
        }

        // Sort by filename for consistent ordering
        frames.sort();

        log::info!("Found {} frame images in {:?}", frames.len(), folder);
        Self::from_files(frames)
    }

    /// Use an explicit, already-ordered list of frame images.
    pub fn from_files(frames: Vec<PathBuf>) -> Result<Self, VideoError> {
        let Some(first) = frames.first() else {
            return Err(VideoError::NoFrames {
                path: PathBuf::new(),
            });
        };

        let first_image = decode(first, 0)?;
        let size = Size::new(first_image.width(), first_image.height());

        Ok(Self {
            frames,
            size,
            cached: Some((0, first_image)),
        })
    }

    /// Path of frame `index`, if it exists.
    pub fn frame_path(&self, index: usize) -> Option<&Path> {
        self.frames.get(index).map(PathBuf::as_path)
    }
}

impl VideoSource for ImageSequence {
    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn frame_size(&self) -> Size {
        self.size
    }

    fn read_frame(&mut self, index: usize) -> Result<RgbImage, VideoError> {
        if let Some((_, image)) = self.cached.as_ref().filter(|(i, _)| *i == index) {
            return Ok(image.clone());
        }

        let path = self
            .frames
            .get(index)
            .ok_or(VideoError::FrameOutOfRange {
                index,
                frame_count: self.frames.len(),
            })?;

        let image = decode(path, index)?;
        let found = Size::new(image.width(), image.height());
        if found != self.size {
            return Err(VideoError::FrameSizeMismatch {
                index,
                expected: self.size,
                found,
            });
        }

        self.cached = Some((index, image.clone()));
        Ok(image)
    }

    fn describe(&self) -> String {
        format!("{} frame images of {}", self.frames.len(), self.size)
    }
}

fn decode(path: &Path, index: usize) -> Result<RgbImage, VideoError> {
    log::debug!("Decoding frame {} from {:?}", index, path);
    image::open(path)
        .map(|img| img.to_rgb8())
        .map_err(|e| VideoError::decode(index, format!("{path:?}: {e}")))
}
