//! vclick - click annotation for video frames
//!
//! Step through the frames of a video, calibrate pixel coordinates against
//! two reference points with known real-world positions, then click to
//! record points on each frame. Every point is kept in pixel and calibrated
//! coordinates and saved as a JSON click file.
//!
//! The [`Session`] state machine holds all annotation state and is driven by
//! a front end one event at a time; [`Shell`] is the text front end shipped
//! with the `vclick` binary.

pub mod calibration;
pub mod color_utils;
pub mod config;
pub mod constants;
pub mod format;
pub mod model;
pub mod overlay;
pub mod plot;
pub mod session;
pub mod settings;
pub mod shell;
pub mod video;
pub mod viewport;

pub use calibration::{CalibrationReport, CalibrationTransform, compute_transform, to_real};
pub use config::{AppConfig, ConfigError, LogLevel};
pub use format::{ClickData, CoordSpace, FormatError};
pub use model::{AnnotationStore, PixelPoint, RealPoint};
pub use plot::{PlotError, ScatterPlot};
pub use session::{ClickOutcome, FrameView, Mode, Prompt, ScriptedPrompt, Session, SessionError};
pub use settings::DisplaySettings;
pub use shell::{Shell, StreamPrompt};
pub use video::{VideoError, VideoSource};
pub use viewport::{Size, Viewport};
