//! Error types for click file operations.

use thiserror::Error;

use crate::model::AnnotationError;

/// Errors that can occur while saving or loading click files.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Required top-level field is missing
    #[error("Invalid click file: missing required field '{field}'")]
    MissingField {
        /// Name of the missing field
        field: String,
    },

    /// `coords_raw` and `coords_real` disagree on the number of frames
    #[error("Frame count mismatch: coords_raw has {raw} frames, coords_real has {real}")]
    FrameCountMismatch {
        /// Frames in `coords_raw`
        raw: usize,
        /// Frames in `coords_real`
        real: usize,
    },

    /// A frame's raw and real point lists have different lengths
    #[error(
        "Point count mismatch in frame {frame}: coords_raw has {raw} points, coords_real has {real}"
    )]
    PointCountMismatch {
        /// Frame index
        frame: usize,
        /// Points in `coords_raw[frame]`
        raw: usize,
        /// Points in `coords_real[frame]`
        real: usize,
    },

    /// Invalid coordinate values
    #[error("Invalid coordinates: {message}")]
    InvalidCoordinates {
        /// Description of the coordinate error
        message: String,
    },
}

impl FormatError {
    /// Create a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an invalid coordinates error.
    pub fn invalid_coordinates(message: impl Into<String>) -> Self {
        Self::InvalidCoordinates {
            message: message.into(),
        }
    }
}

impl From<AnnotationError> for FormatError {
    fn from(err: AnnotationError) -> Self {
        match err {
            AnnotationError::FrameCountMismatch {
                pixel_frames,
                real_frames,
            } => Self::FrameCountMismatch {
                raw: pixel_frames,
                real: real_frames,
            },
            AnnotationError::PointCountMismatch {
                frame,
                pixel_points,
                real_points,
            } => Self::PointCountMismatch {
                frame,
                raw: pixel_points,
                real: real_points,
            },
            other => Self::invalid_coordinates(other.to_string()),
        }
    }
}
