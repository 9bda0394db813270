//! Modes, click results and session errors.

use crate::calibration::CalibrationReport;
use crate::color_utils::Color;
use crate::constants::HIGHLIGHT_LIGHTEN_FACTOR;
use crate::format::FormatError;
use crate::model::{AnnotationError, PixelPoint, RealPoint, RemovedPoint};
use crate::settings::{DisplaySettings, SettingsError};
use crate::video::VideoError;

/// What a click does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// No mode selected yet; clicks are refused
    #[default]
    None,
    /// Clicks record calibration reference points
    Calibrating,
    /// Clicks add data points to the current frame
    Adding,
    /// Clicks delete the nearest data point on the current frame
    Deleting,
}

impl Mode {
    /// Get the display name for this mode.
    pub fn name(&self) -> &'static str {
        match self {
            Mode::None => "none",
            Mode::Calibrating => "calib",
            Mode::Adding => "add",
            Mode::Deleting => "del",
        }
    }

    /// Single-key shortcut that selects this mode.
    pub fn shortcut(&self) -> Option<char> {
        match self {
            Mode::None => None,
            Mode::Calibrating => Some('c'),
            Mode::Adding => Some('a'),
            Mode::Deleting => Some('d'),
        }
    }

    /// Highlight color for the active mode's button, derived from the
    /// marker colors so the highlight matches what the mode draws.
    pub fn highlight_color(&self, settings: &DisplaySettings) -> Option<Color> {
        match self {
            Mode::None => None,
            Mode::Calibrating => Some(
                settings
                    .calibration_color
                    .lighten(HIGHLIGHT_LIGHTEN_FACTOR),
            ),
            Mode::Adding => Some(settings.data_color.lighten(HIGHLIGHT_LIGHTEN_FACTOR)),
            Mode::Deleting => Some(Color::LIGHT_CORAL),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a click that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// No video is loaded; nothing happened
    NoVideo,
    /// The click landed in the letterbox padding; nothing happened
    OutsideImage { pixel: PixelPoint },
    /// A calibration pair was recorded; more are needed
    CalibrationPointRecorded {
        pixel: PixelPoint,
        real: RealPoint,
        collected: usize,
    },
    /// The real-coordinate prompt was dismissed; the pixel point was dropped
    CalibrationCancelled { pixel: PixelPoint },
    /// Calibration completed and the session switched to adding
    Calibrated(CalibrationReport),
    /// A data point was added
    PointAdded {
        frame: usize,
        /// 1-based position within the frame
        position: usize,
        pixel: PixelPoint,
        real: Option<RealPoint>,
    },
    /// The nearest data point was deleted
    PointRemoved { frame: usize, removed: RemovedPoint },
    /// Delete mode click on a frame with no points
    NothingToDelete { frame: usize },
}

impl ClickOutcome {
    /// Whether the click changed any state.
    pub fn changed_state(&self) -> bool {
        matches!(
            self,
            ClickOutcome::CalibrationPointRecorded { .. }
                | ClickOutcome::Calibrated(_)
                | ClickOutcome::PointAdded { .. }
                | ClickOutcome::PointRemoved { .. }
        )
    }
}

/// Broad class of a [`SessionError`], for how a shell should present it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed user input; nothing changed
    InvalidInput,
    /// Video or file could not be read or written
    Resource,
    /// A loaded file is structurally wrong
    Structural,
    /// Operation is not valid yet (guidance, not a failure)
    UsageOrder,
}

/// Errors reported by session operations. None of them end the session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No video has been loaded
    #[error("No video loaded")]
    NoVideoLoaded,

    /// A click arrived with no mode selected
    #[error("Click ignored: select a mode first")]
    NoModeSelected,

    /// Adding requires a calibration
    #[error("Not calibrated: please calibrate before entering add mode")]
    NotCalibrated,

    /// Calibration coordinate text is not `x,y`
    #[error("Invalid real-world coordinate '{input}': use x,y")]
    InvalidCoordinate { input: String },

    /// Jump target is not an integer
    #[error("Invalid frame number '{input}'")]
    InvalidFrameNumber { input: String },

    /// 1-based jump target outside the video
    #[error("Frame must be between 1 and {frame_count} (got {requested})")]
    JumpOutOfRange { requested: i64, frame_count: usize },

    /// 0-based frame index outside the video
    #[error("Frame index {index} is out of range (video has {frame_count} frames)")]
    FrameOutOfRange { index: usize, frame_count: usize },

    /// Loaded click file does not match the loaded video
    #[error("Click file has {file_frames} frames but the video has {video_frames}")]
    FrameCountMismatch {
        file_frames: usize,
        video_frames: usize,
    },

    #[error(transparent)]
    Video(#[from] VideoError),

    #[error(transparent)]
    Annotation(#[from] AnnotationError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl SessionError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::NoVideoLoaded
            | SessionError::NoModeSelected
            | SessionError::NotCalibrated => ErrorKind::UsageOrder,
            SessionError::InvalidCoordinate { .. }
            | SessionError::InvalidFrameNumber { .. }
            | SessionError::JumpOutOfRange { .. }
            | SessionError::FrameOutOfRange { .. }
            | SessionError::Settings(_) => ErrorKind::InvalidInput,
            SessionError::Video(_) | SessionError::Annotation(_) => ErrorKind::Resource,
            SessionError::Format(FormatError::Io(_)) => ErrorKind::Resource,
            SessionError::Format(_) | SessionError::FrameCountMismatch { .. } => {
                ErrorKind::Structural
            }
        }
    }
}
