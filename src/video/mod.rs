//! Frame sources.
//!
//! The session reads frames through the [`VideoSource`] trait and never
//! decodes anything itself. Three sources ship with the crate:
//!
//! - [`ImageSequence`]: a folder of frame images (PNG, JPEG, BMP, TIFF, WebP),
//!   or a single still image treated as a one-frame video
//! - [`FfmpegVideo`]: a video file, decoded by `ffprobe`/`ffmpeg` on `PATH`
//! - [`SyntheticVideo`]: generated frames for demos and tests

mod ffmpeg;
mod image_sequence;
mod synthetic;

use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::viewport::Size;

pub use ffmpeg::FfmpegVideo;
pub use image_sequence::{IMAGE_EXTENSIONS, ImageSequence, is_image_file};
pub use synthetic::SyntheticVideo;

/// Random-access source of fixed-size RGB frames.
pub trait VideoSource {
    /// Total number of frames.
    fn frame_count(&self) -> usize;

    /// Size shared by every frame.
    fn frame_size(&self) -> Size;

    /// Decode frame `index`.
    fn read_frame(&mut self, index: usize) -> Result<RgbImage, VideoError>;

    /// Human-readable description for status output.
    fn describe(&self) -> String {
        format!("{} frames of {}", self.frame_count(), self.frame_size())
    }
}

/// Open a frame source for `path`.
///
/// Directories become image sequences; a single image file becomes a
/// one-frame sequence. Any other file is handed to ffmpeg.
pub fn open_video(path: &Path) -> Result<Box<dyn VideoSource>, VideoError> {
    if !path.exists() {
        return Err(VideoError::NotFound {
            path: path.to_path_buf(),
        });
    }

    if path.is_dir() {
        return Ok(Box::new(ImageSequence::from_folder(path)?));
    }

    if is_image_file(path) {
        return Ok(Box::new(ImageSequence::from_files(vec![path.to_path_buf()])?));
    }

    Ok(Box::new(FfmpegVideo::open(path)?))
}

/// Errors that can occur while opening or reading a frame source.
#[derive(Debug, thiserror::Error)]
pub enum VideoError {
    /// Path does not exist
    #[error("File not found: {path:?}")]
    NotFound { path: PathBuf },

    /// Path exists but could not be opened as a frame source
    #[error("Unable to open {path:?}: {message}")]
    Open { path: PathBuf, message: String },

    /// Source contains no frames
    #[error("No frames found in {path:?}")]
    NoFrames { path: PathBuf },

    /// An already-opened source reports zero frames
    #[error("Video has no frames")]
    Empty,

    /// A frame's size differs from the first frame
    #[error("Frame {index} is {found}, expected {expected}")]
    FrameSizeMismatch {
        index: usize,
        expected: Size,
        found: Size,
    },

    /// Frame index outside the source
    #[error("Frame {index} is out of range (source has {frame_count} frames)")]
    FrameOutOfRange { index: usize, frame_count: usize },

    /// Frame could not be decoded
    #[error("Failed to read frame {index}: {message}")]
    Decode { index: usize, message: String },
}

impl VideoError {
    /// Create an open error with a message.
    pub fn open(path: &Path, message: impl Into<String>) -> Self {
        Self::Open {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Create a decode error with a message.
    pub fn decode(index: usize, message: impl Into<String>) -> Self {
        Self::Decode {
            index,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_path() {
        let err = open_video(Path::new("/definitely/not/here.mp4")).err().unwrap();
        assert!(matches!(err, VideoError::NotFound { .. }));
    }

    #[test]
    fn test_open_undecodable_video_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"not really a video").unwrap();
        let err = open_video(&path).err().unwrap();
        assert!(matches!(err, VideoError::Open { .. }));
    }

    #[test]
    fn test_open_folder_and_still() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..3 {
            RgbImage::new(8, 6)
                .save(dir.path().join(format!("frame_{i:03}.png")))
                .unwrap();
        }

        let source = open_video(dir.path()).unwrap();
        assert_eq!(source.frame_count(), 3);
        assert_eq!(source.frame_size(), Size::new(8, 6));

        let still = open_video(&dir.path().join("frame_001.png")).unwrap();
        assert_eq!(still.frame_count(), 1);
    }
}
