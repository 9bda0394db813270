//! The interaction state machine.
//!
//! A [`Session`] owns everything the annotation workflow mutates: the
//! current mode, the current frame, the calibration points and transform,
//! the per-frame annotation store and the display settings. Presentation
//! shells hold a session and drive it one event at a time; the session never
//! touches a window or a file dialog itself.
//!
//! Modal questions (the real-world coordinate of a calibration point, a jump
//! target, settings values) go through the [`Prompt`] trait and block until
//! answered or dismissed.

mod outcome;
mod prompt;

use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::calibration::{CalibrationTransform, compute_transform};
use crate::constants::{CALIBRATION_PAIRS, DEFAULT_SURFACE_HEIGHT, DEFAULT_SURFACE_WIDTH};
use crate::format;
use crate::model::{AnnotationStore, PixelPoint, RealPoint};
use crate::overlay::{compose_display, draw_overlays};
use crate::settings::{DisplaySettings, SettingsForm};
use crate::video::{VideoError, VideoSource, open_video};
use crate::viewport::{Size, Viewport};

pub use outcome::{ClickOutcome, ErrorKind, Mode, SessionError};
pub use prompt::{Prompt, ScriptedPrompt};

/// Everything a shell needs to redraw the current frame.
#[derive(Debug, Clone)]
pub struct FrameView {
    /// Letterboxed display surface with the frame and its markers
    pub image: RgbImage,
    /// Mapping used to produce `image`
    pub viewport: Viewport,
    /// 0-based index of the shown frame
    pub frame_index: usize,
    pub frame_count: usize,
    /// Calibration markers (empty when hidden by the settings)
    pub calibration_points: Vec<PixelPoint>,
    /// Data markers of the shown frame
    pub data_points: Vec<PixelPoint>,
    pub mode: Mode,
}

impl FrameView {
    /// Frame counter text, 1-based.
    pub fn status(&self) -> String {
        format!("Frame: {}/{}", self.frame_index + 1, self.frame_count)
    }
}

/// Annotation session state.
pub struct Session {
    mode: Mode,
    video: Option<Box<dyn VideoSource>>,
    video_path: Option<PathBuf>,
    current_frame: usize,
    surface: Size,
    viewport: Option<Viewport>,
    calib_pixel: Vec<PixelPoint>,
    calib_real: Vec<RealPoint>,
    transform: Option<CalibrationTransform>,
    store: AnnotationStore,
    settings: DisplaySettings,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a session with no video and default settings.
    pub fn new() -> Self {
        Self::with_settings(DisplaySettings::default())
    }

    /// Create a session with no video and the given display settings.
    pub fn with_settings(settings: DisplaySettings) -> Self {
        Self {
            mode: Mode::None,
            video: None,
            video_path: None,
            current_frame: 0,
            surface: Size::new(DEFAULT_SURFACE_WIDTH, DEFAULT_SURFACE_HEIGHT),
            viewport: None,
            calib_pixel: Vec::new(),
            calib_real: Vec::new(),
            transform: None,
            store: AnnotationStore::new(),
            settings,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// 0-based index of the current frame.
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// Number of frames in the loaded video (0 without a video).
    pub fn frame_count(&self) -> usize {
        self.video.as_ref().map_or(0, |video| video.frame_count())
    }

    pub fn has_video(&self) -> bool {
        self.video.is_some()
    }

    pub fn video_path(&self) -> Option<&Path> {
        self.video_path.as_deref()
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn transform(&self) -> Option<&CalibrationTransform> {
        self.transform.as_ref()
    }

    pub fn is_calibrated(&self) -> bool {
        self.transform.is_some()
    }

    /// Calibration points collected since calibration mode was entered.
    pub fn calibration_points(&self) -> (&[PixelPoint], &[RealPoint]) {
        (&self.calib_pixel, &self.calib_real)
    }

    pub fn settings(&self) -> &DisplaySettings {
        &self.settings
    }

    /// Current display-to-pixel mapping, once a video is loaded.
    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    pub fn surface_size(&self) -> Size {
        self.surface
    }

    /// Size of the loaded video's frames.
    pub fn frame_size(&self) -> Option<Size> {
        self.video.as_ref().map(|video| video.frame_size())
    }

    /// One-line summary for status bars and logs.
    pub fn status_line(&self) -> String {
        if !self.has_video() {
            return format!("No video | Mode: {}", self.mode);
        }
        let points = self
            .store
            .pixel_points(self.current_frame)
            .map_or(0, <[PixelPoint]>::len);
        format!(
            "Frame: {}/{} | Mode: {} | Calibrated: {} | Points on frame: {} | Total points: {}",
            self.current_frame + 1,
            self.frame_count(),
            self.mode,
            if self.is_calibrated() { "yes" } else { "no" },
            points,
            self.store.total_points()
        )
    }

    // ------------------------------------------------------------------
    // Video
    // ------------------------------------------------------------------

    /// Open a video and start a fresh annotation session on it.
    ///
    /// On failure every piece of prior state is kept.
    pub fn load_video(&mut self, path: &Path) -> Result<(), SessionError> {
        log::info!("Opening {:?}", path);
        let source = open_video(path)?;
        self.attach_video(source)?;
        self.video_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Start a fresh annotation session on an already-opened source.
    ///
    /// Resets the store to one empty list per frame, drops the calibration
    /// and returns to calibration mode on frame 0.
    pub fn attach_video(&mut self, source: Box<dyn VideoSource>) -> Result<(), SessionError> {
        let frame_count = source.frame_count();
        if frame_count == 0 {
            return Err(VideoError::Empty.into());
        }

        log::info!("Video loaded: {}", source.describe());
        self.viewport = Some(Viewport::fit(self.surface, source.frame_size()));
        self.video = Some(source);
        self.video_path = None;
        self.current_frame = 0;
        self.store.resize(frame_count);
        self.enter_calibrating();
        Ok(())
    }

    /// Record a new display-surface size and refit the viewport.
    pub fn resize_surface(&mut self, width: u32, height: u32) {
        self.surface = Size::new(width, height);
        if let Some(image) = self.frame_size() {
            self.viewport = Some(Viewport::fit(self.surface, image));
        }
    }

    // ------------------------------------------------------------------
    // Modes
    // ------------------------------------------------------------------

    /// Start (or restart) calibration: clears collected points and the
    /// transform.
    ///
    /// Real points already in the store keep their values until the next
    /// calibration completes and recomputes them.
    pub fn enter_calibrating(&mut self) {
        self.mode = Mode::Calibrating;
        self.calib_pixel.clear();
        self.calib_real.clear();
        self.transform = None;
        log::info!(
            "Entered calibration mode: click {} image points and enter real coords",
            CALIBRATION_PAIRS
        );
    }

    /// Switch to adding points. Requires a calibration.
    pub fn enter_adding(&mut self) -> Result<(), SessionError> {
        if self.transform.is_none() {
            log::warn!("Add mode refused: not calibrated");
            return Err(SessionError::NotCalibrated);
        }
        self.mode = Mode::Adding;
        log::info!("Entered add mode: click to add points");
        Ok(())
    }

    /// Switch to deleting points.
    pub fn enter_deleting(&mut self) {
        self.mode = Mode::Deleting;
        log::info!("Entered delete mode: click near a point to delete it");
    }

    /// Drop back to no mode; clicks are refused until a mode is chosen.
    pub fn clear_mode(&mut self) {
        self.mode = Mode::None;
        log::debug!("Mode cleared");
    }

    // ------------------------------------------------------------------
    // Clicks
    // ------------------------------------------------------------------

    /// Handle a click at display-surface coordinates.
    pub fn click(
        &mut self,
        display_x: f64,
        display_y: f64,
        prompt: &mut dyn Prompt,
    ) -> Result<ClickOutcome, SessionError> {
        let Some(viewport) = self.viewport else {
            return Ok(ClickOutcome::NoVideo);
        };

        let Some(pixel) = viewport.resolve(display_x, display_y) else {
            log::debug!(
                "Click at ({:.1}, {:.1}) is outside the image",
                display_x,
                display_y
            );
            return Ok(ClickOutcome::OutsideImage {
                pixel: viewport.to_pixel(display_x, display_y),
            });
        };

        log::debug!(
            "Clicked at image coords ({:.1}, {:.1}) in mode {}",
            pixel.x,
            pixel.y,
            self.mode
        );

        match self.mode {
            Mode::None => {
                log::warn!("Click ignored: select a mode first");
                Err(SessionError::NoModeSelected)
            }
            Mode::Calibrating => self.handle_calibration_click(pixel, prompt),
            Mode::Adding => self.handle_add_click(pixel),
            Mode::Deleting => self.handle_delete_click(pixel),
        }
    }

    fn handle_calibration_click(
        &mut self,
        pixel: PixelPoint,
        prompt: &mut dyn Prompt,
    ) -> Result<ClickOutcome, SessionError> {
        self.calib_pixel.push(pixel);
        log::info!("Calibration image point recorded: {}", pixel);

        // Only a dismissed or empty answer cancels; blanks are bad input.
        let input = match prompt.ask_real_coordinate(pixel) {
            Some(text) if !text.is_empty() => text.trim().to_string(),
            _ => {
                self.calib_pixel.pop();
                log::info!("Calibration point discarded: no real coordinate given");
                return Ok(ClickOutcome::CalibrationCancelled { pixel });
            }
        };

        let Some(real) = RealPoint::parse(&input) else {
            self.calib_pixel.pop();
            log::warn!("Invalid real coordinate '{}', expected x,y", input);
            return Err(SessionError::InvalidCoordinate { input });
        };

        self.calib_real.push(real);
        log::info!("Calibration real point recorded: {}", real);

        if let Some(report) = compute_transform(&self.calib_pixel, &self.calib_real) {
            self.transform = Some(report.transform);
            self.store.recompute_real_from_pixel(self.transform.as_ref());
            self.enter_adding()?;
            log::info!("Calibration complete");
            return Ok(ClickOutcome::Calibrated(report));
        }

        Ok(ClickOutcome::CalibrationPointRecorded {
            pixel,
            real,
            collected: self.calib_real.len(),
        })
    }

    fn handle_add_click(&mut self, pixel: PixelPoint) -> Result<ClickOutcome, SessionError> {
        let frame = self.current_frame;
        let position = self.store.append(frame, pixel, self.transform.as_ref())?;
        let real = self
            .store
            .real_points(frame)?
            .last()
            .copied()
            .flatten();

        match real {
            Some(real) => log::info!("[{}] Added point real coords: {}", position, real),
            None => log::warn!("[{}] Added point without real coords: not calibrated", position),
        }

        Ok(ClickOutcome::PointAdded {
            frame,
            position,
            pixel,
            real,
        })
    }

    fn handle_delete_click(&mut self, pixel: PixelPoint) -> Result<ClickOutcome, SessionError> {
        let frame = self.current_frame;
        match self.store.remove_nearest(frame, pixel)? {
            Some(removed) => {
                log::info!(
                    "Deleted point raw {}, real {}",
                    removed.pixel,
                    removed
                        .real
                        .map_or_else(|| "unset".to_string(), |r| r.to_string())
                );
                Ok(ClickOutcome::PointRemoved { frame, removed })
            }
            None => {
                log::info!("No points to delete on this frame");
                Ok(ClickOutcome::NothingToDelete { frame })
            }
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Step back one frame, stopping at the first. `None` without a video.
    pub fn prev_frame(&mut self) -> Option<usize> {
        if self.frame_count() == 0 {
            return None;
        }
        self.current_frame = self.current_frame.saturating_sub(1);
        log::debug!("Showing frame {}/{}", self.current_frame + 1, self.frame_count());
        Some(self.current_frame)
    }

    /// Step forward one frame, stopping at the last. `None` without a video.
    pub fn next_frame(&mut self) -> Option<usize> {
        let frame_count = self.frame_count();
        if frame_count == 0 {
            return None;
        }
        self.current_frame = (self.current_frame + 1).min(frame_count - 1);
        log::debug!("Showing frame {}/{}", self.current_frame + 1, frame_count);
        Some(self.current_frame)
    }

    /// Go to a 0-based frame index.
    pub fn set_frame(&mut self, index: usize) -> Result<usize, SessionError> {
        let frame_count = self.frame_count();
        if frame_count == 0 {
            return Err(SessionError::NoVideoLoaded);
        }
        if index >= frame_count {
            return Err(SessionError::FrameOutOfRange { index, frame_count });
        }
        self.current_frame = index;
        Ok(index)
    }

    /// Go to a 1-based frame number.
    pub fn jump_to_frame(&mut self, number: i64) -> Result<usize, SessionError> {
        let frame_count = self.frame_count();
        if frame_count == 0 {
            return Err(SessionError::NoVideoLoaded);
        }

        let index = usize::try_from(number)
            .ok()
            .and_then(|n| n.checked_sub(1))
            .filter(|index| *index < frame_count)
            .ok_or_else(|| {
                log::warn!("Frame must be between 1 and {}", frame_count);
                SessionError::JumpOutOfRange {
                    requested: number,
                    frame_count,
                }
            })?;

        self.current_frame = index;
        log::info!("Jumped to frame {}/{}", number, frame_count);
        Ok(index)
    }

    /// Ask for a frame number and jump to it. `Ok(None)` if dismissed.
    pub fn jump_dialog(&mut self, prompt: &mut dyn Prompt) -> Result<Option<usize>, SessionError> {
        let frame_count = self.frame_count();
        if frame_count == 0 {
            return Err(SessionError::NoVideoLoaded);
        }

        let Some(answer) = prompt.ask_jump_target(frame_count) else {
            return Ok(None);
        };
        let number = answer
            .trim()
            .parse::<i64>()
            .map_err(|_| SessionError::InvalidFrameNumber {
                input: answer.clone(),
            })?;

        self.jump_to_frame(number).map(Some)
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Read the current frame and build the display surface with markers.
    pub fn render(&mut self) -> Result<FrameView, SessionError> {
        let frame_count = self.frame_count();
        let video = self.video.as_mut().ok_or(SessionError::NoVideoLoaded)?;

        let frame = video.read_frame(self.current_frame).inspect_err(|e| {
            log::warn!("Failed to read frame: {}", e);
        })?;

        let viewport = Viewport::fit(self.surface, Size::new(frame.width(), frame.height()));
        self.viewport = Some(viewport);

        let data_points = self.store.pixel_points(self.current_frame)?.to_vec();
        let calibration_points = if self.settings.show_calibration_points {
            self.calib_pixel.clone()
        } else {
            Vec::new()
        };

        let overlaid = draw_overlays(&frame, &calibration_points, &data_points, &self.settings);
        let image = compose_display(&overlaid, &viewport, self.surface);

        Ok(FrameView {
            image,
            viewport,
            frame_index: self.current_frame,
            frame_count,
            calibration_points,
            data_points,
            mode: self.mode,
        })
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    /// Replace the display settings.
    pub fn apply_settings(&mut self, settings: DisplaySettings) -> Result<(), SessionError> {
        settings.validate()?;
        self.settings = settings;
        log::info!(
            "Updated settings: calib_r={}, data_r={}, calib_col={}, data_col={}, show_calib={}",
            settings.calibration_radius,
            settings.data_radius,
            settings.calibration_color,
            settings.data_color,
            settings.show_calibration_points
        );
        Ok(())
    }

    /// Ask for each setting in turn and apply them together.
    ///
    /// Dismissed or empty answers keep the current value. Any invalid
    /// answer rejects the whole form.
    pub fn edit_settings(
        &mut self,
        prompt: &mut dyn Prompt,
    ) -> Result<DisplaySettings, SessionError> {
        let current = self.settings;
        let form = SettingsForm {
            calibration_radius: non_empty(
                prompt.ask_radius("Calibration marker radius", current.calibration_radius),
            ),
            data_radius: non_empty(prompt.ask_radius("Data marker radius", current.data_radius)),
            calibration_color: non_empty(
                prompt.ask_color("Calibration marker color", current.calibration_color),
            ),
            data_color: non_empty(prompt.ask_color("Data marker color", current.data_color)),
            show_calibration_points: non_empty(
                prompt.ask_flag("Show calibration points", current.show_calibration_points),
            ),
        };

        let updated = current.with_form(&form).inspect_err(|e| {
            log::warn!("Settings rejected: {}", e);
        })?;
        self.apply_settings(updated)?;
        Ok(updated)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Save the annotation store.
    pub fn save(&mut self, path: &Path) -> Result<(), SessionError> {
        format::save_annotations(path, &self.store).inspect_err(|e| {
            log::warn!("Error saving: {}", e);
        })?;
        self.store.clear_dirty();
        Ok(())
    }

    /// Replace the annotation store with a saved one.
    ///
    /// With a video loaded, the file must cover the same number of frames.
    pub fn load(&mut self, path: &Path) -> Result<(), SessionError> {
        let store = format::load_annotations(path)?;

        if self.has_video() && store.frame_count() != self.frame_count() {
            return Err(SessionError::FrameCountMismatch {
                file_frames: store.frame_count(),
                video_frames: self.frame_count(),
            });
        }

        log::info!(
            "Loaded {} points over {} frames from {:?}",
            store.total_points(),
            store.frame_count(),
            path
        );
        self.store = store;
        Ok(())
    }
}

fn non_empty(answer: Option<String>) -> Option<String> {
    answer.filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests;
