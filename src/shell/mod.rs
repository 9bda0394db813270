//! Line-oriented front end for a [`Session`].
//!
//! The shell reads commands from an input stream and prints every outcome
//! and error to an output stream. Modal questions are asked on the same
//! streams through [`StreamPrompt`]. Nothing but `quit` or the end of input
//! ends the loop.

mod command;
mod prompt;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::session::{ClickOutcome, Mode, Session, SessionError};

pub use command::{COMMANDS, Command, CommandError, help_text};
pub use prompt::StreamPrompt;

/// Whether the loop should keep going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Text front end driving one session.
pub struct Shell<R, W> {
    session: Session,
    io: StreamPrompt<R, W>,
    config: AppConfig,
    /// Where to write the config back when preferences change
    config_path: Option<PathBuf>,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(session: Session, input: R, output: W) -> Self {
        Self {
            session,
            io: StreamPrompt::new(input, output),
            config: AppConfig::default(),
            config_path: None,
        }
    }

    /// Use `config` for remembered paths, writing it back to `path` on change.
    pub fn with_config(mut self, config: AppConfig, path: Option<PathBuf>) -> Self {
        self.config = config;
        self.config_path = path;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn into_parts(self) -> (Session, R, W) {
        let (input, output) = self.io.into_inner();
        (self.session, input, output)
    }

    /// Run until `quit` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        self.say("vclick: type 'help' for commands")?;
        if self.session.has_video() {
            self.show_status()?;
        }

        loop {
            write!(self.io.output(), "vclick> ")?;
            self.io.output().flush()?;

            let Some(line) = self.io.read_line()? else {
                self.say("")?;
                break;
            };

            let flow = match Command::parse(&line) {
                Ok(Some(command)) => self.execute(command)?,
                Ok(None) => Flow::Continue,
                Err(e) => {
                    self.say(&e.to_string())?;
                    Flow::Continue
                }
            };
            if flow == Flow::Quit {
                break;
            }
        }

        if self.session.store().is_dirty() {
            log::warn!("Exiting with unsaved clicks");
        }
        Ok(())
    }

    /// Execute one command.
    pub fn execute(&mut self, command: Command) -> io::Result<Flow> {
        log::debug!("Command: {:?}", command);
        match command {
            Command::Open(path) => self.open(&path)?,
            Command::Save(path) => self.save(path)?,
            Command::Load(path) => self.load(path)?,
            Command::Settings => self.edit_settings()?,
            Command::Help => {
                let help = help_text();
                self.say(&help)?;
            }
            Command::Calibrate => {
                self.session.enter_calibrating();
                self.say("Calibration mode: click 2 image points and enter real coords")?;
                self.show_modes()?;
            }
            Command::Add => match self.session.enter_adding() {
                Ok(()) => {
                    self.say("Add mode: click to add points")?;
                    self.show_modes()?;
                }
                Err(e) => self.report(&e)?,
            },
            Command::Delete => {
                self.session.enter_deleting();
                self.say("Delete mode: click near a point to delete it")?;
                self.show_modes()?;
            }
            Command::Prev => self.step(Session::prev_frame)?,
            Command::Next => self.step(Session::next_frame)?,
            Command::Jump(target) => {
                let result = match target {
                    Some(number) => self.session.jump_to_frame(number).map(Some),
                    None => self.session.jump_dialog(&mut self.io),
                };
                match result {
                    Ok(Some(_)) => self.show_status()?,
                    Ok(None) => self.say("Jump cancelled")?,
                    Err(e) => self.report(&e)?,
                }
            }
            Command::Click { x, y } => {
                match self.session.click(x, y, &mut self.io) {
                    Ok(outcome) => {
                        let text = describe_outcome(&outcome);
                        self.say(&text)?;
                        if matches!(outcome, ClickOutcome::Calibrated(_)) {
                            self.show_modes()?;
                        }
                    }
                    Err(e) => self.report(&e)?,
                }
            }
            Command::Resize { width, height } => {
                self.session.resize_surface(width, height);
                let text = match self.session.viewport() {
                    Some(viewport) => format!(
                        "Surface {}x{}: scale {:.3}, offset ({}, {})",
                        width, height, viewport.scale, viewport.offset_x, viewport.offset_y
                    ),
                    None => format!("Surface {}x{}", width, height),
                };
                self.say(&text)?;
            }
            Command::Render(path) => self.render(path)?,
            Command::Status => self.show_status()?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn open(&mut self, path: &Path) -> io::Result<()> {
        match self.session.load_video(path) {
            Ok(()) => {
                let size = self
                    .session
                    .frame_size()
                    .map_or_else(String::new, |size| size.to_string());
                let text = format!(
                    "Loaded video: {} frames, {}",
                    self.session.frame_count(),
                    size
                );
                self.say(&text)?;
                self.say("Calibration mode: click 2 image points and enter real coords")?;
                self.remember_video(path);
                self.show_status()
            }
            Err(e) => self.report(&e),
        }
    }

    fn save(&mut self, path: Option<PathBuf>) -> io::Result<()> {
        let Some(path) = path.or_else(|| self.config.preferences.last_save_path.clone()) else {
            return self.say("No save path yet: use save <path>");
        };
        match self.session.save(&path) {
            Ok(()) => {
                self.say(&format!("Saved to {}", path.display()))?;
                self.remember(|config| config.preferences.last_save_path = Some(path));
                Ok(())
            }
            Err(e) => self.report(&e),
        }
    }

    fn load(&mut self, path: Option<PathBuf>) -> io::Result<()> {
        let Some(path) = path.or_else(|| self.config.preferences.last_save_path.clone()) else {
            return self.say("No click file yet: use load <path>");
        };
        match self.session.load(&path) {
            Ok(()) => {
                let text = format!(
                    "Loaded {} points from {}",
                    self.session.store().total_points(),
                    path.display()
                );
                self.say(&text)?;
                self.remember(|config| config.preferences.last_save_path = Some(path));
                Ok(())
            }
            Err(e) => self.report(&e),
        }
    }

    fn edit_settings(&mut self) -> io::Result<()> {
        self.say("Press enter to keep a value")?;
        match self.session.edit_settings(&mut self.io) {
            Ok(settings) => {
                let text = format!(
                    "Settings: calib radius {}, data radius {}, calib color {}, data color {}, show calib {}",
                    settings.calibration_radius,
                    settings.data_radius,
                    settings.calibration_color,
                    settings.data_color,
                    if settings.show_calibration_points { "yes" } else { "no" }
                );
                self.say(&text)?;
                self.remember(|config| config.display = settings);
                self.show_modes()
            }
            Err(e) => self.report(&e),
        }
    }

    fn step(&mut self, step: fn(&mut Session) -> Option<usize>) -> io::Result<()> {
        match step(&mut self.session) {
            Some(_) => self.show_status(),
            None => self.report(&SessionError::NoVideoLoaded),
        }
    }

    fn render(&mut self, path: Option<PathBuf>) -> io::Result<()> {
        let view = match self.session.render() {
            Ok(view) => view,
            Err(e) => return self.report(&e),
        };

        let text = format!(
            "{} | {} data points | {} calibration points shown",
            view.status(),
            view.data_points.len(),
            view.calibration_points.len()
        );
        self.say(&text)?;

        if let Some(path) = path {
            match view.image.save(&path) {
                Ok(()) => self.say(&format!("Wrote {}", path.display()))?,
                Err(e) => self.say(&format!("Error writing {}: {}", path.display(), e))?,
            }
        }
        Ok(())
    }

    fn show_status(&mut self) -> io::Result<()> {
        let text = self.session.status_line();
        self.say(&text)
    }

    /// Print the mode buttons, marking the active one with its highlight color.
    fn show_modes(&mut self) -> io::Result<()> {
        let active = self.session.mode();
        let settings = *self.session.settings();
        let buttons: Vec<String> = [Mode::Calibrating, Mode::Adding, Mode::Deleting]
            .iter()
            .map(|mode| {
                let key = mode.shortcut().unwrap_or(' ');
                match mode.highlight_color(&settings) {
                    Some(color) if *mode == active => format!("*{key}:{mode} ({color})*"),
                    _ => format!("{key}:{mode}"),
                }
            })
            .collect();
        self.say(&buttons.join("  "))
    }

    fn report(&mut self, error: &SessionError) -> io::Result<()> {
        self.say(&format!("Error: {error}"))
    }

    fn say(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.io.output(), "{text}")
    }

    /// Record `path` as the last opened video and save the config.
    pub fn remember_video(&mut self, path: &Path) {
        self.remember(|config| {
            config.preferences.last_video_path = Some(path.to_path_buf());
        });
    }

    fn remember(&mut self, update: impl FnOnce(&mut AppConfig)) {
        update(&mut self.config);
        let Some(path) = &self.config_path else {
            return;
        };
        if let Err(e) = self.config.save_to(path) {
            log::warn!("Failed to save configuration: {}", e);
        }
    }
}

/// One-line description of a click outcome.
pub fn describe_outcome(outcome: &ClickOutcome) -> String {
    match outcome {
        ClickOutcome::NoVideo => "No video loaded".to_string(),
        ClickOutcome::OutsideImage { .. } => "Click is outside the image".to_string(),
        ClickOutcome::CalibrationPointRecorded {
            pixel,
            real,
            collected,
        } => format!("Calibration point {collected}: image {pixel} = real {real}"),
        ClickOutcome::CalibrationCancelled { pixel } => {
            format!("Calibration point {pixel} discarded")
        }
        ClickOutcome::Calibrated(report) => {
            let mut text = format!(
                "Calibration complete: scale_x={:.6}, scale_y={:.6}",
                report.transform.scale_x, report.transform.scale_y
            );
            for axis in &report.fallback_axes {
                text.push_str(&format!(
                    " (identical {} image coords, {} scale set to 1.0)",
                    axis.name(),
                    axis.name()
                ));
            }
            text.push_str(". Add mode: click to add points");
            text
        }
        ClickOutcome::PointAdded {
            position,
            pixel,
            real,
            ..
        } => match real {
            Some(real) => format!("[{position}] Added {pixel}, real {real}"),
            None => format!("[{position}] Added {pixel}, not calibrated"),
        },
        ClickOutcome::PointRemoved { removed, .. } => {
            format!("Deleted point {} at {}", removed.index + 1, removed.pixel)
        }
        ClickOutcome::NothingToDelete { .. } => "No points to delete on this frame".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::SyntheticVideo;

    fn run_script(session: Session, script: &str) -> (Session, String) {
        let mut shell = Shell::new(session, script.as_bytes(), Vec::new());
        shell.run().unwrap();
        let (session, _, output) = shell.into_parts();
        (session, String::from_utf8(output).unwrap())
    }

    fn session_with_video() -> Session {
        let mut session = Session::new();
        session
            .attach_video(Box::new(SyntheticVideo::new(3, 200, 100)))
            .unwrap();
        session
    }

    #[test]
    fn test_calibrate_add_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clicks.json");
        let script = format!(
            "resize 200 100\n\
             click 10 10\n0,0\n\
             click 110 10\n100,0\n\
             click 60 10\n\
             x\n\
             status\n\
             save {}\n\
             quit\n",
            path.display()
        );

        let (session, output) = run_script(session_with_video(), &script);

        assert!(output.contains("Calibration point 1"));
        assert!(output.contains("Calibration complete: scale_x=1.000000, scale_y=1.000000"));
        assert!(output.contains("identical y image coords"));
        assert!(output.contains("[1] Added (60.0, 10.0), real (50.000, 0.000)"));
        assert!(output.contains("Frame: 2/3"));
        assert!(output.contains("Saved to"));
        assert!(path.exists());
        assert_eq!(session.mode(), Mode::Adding);
        assert!(!session.store().is_dirty());
    }

    #[test]
    fn test_errors_do_not_end_the_session() {
        let script = "resize 200 100\nbogus\nadd\nclick 1\njump 99\nload\nclick 10 10\nnorth\nstatus\n";
        let (session, output) = run_script(session_with_video(), script);

        assert!(output.contains("Unknown command 'bogus'"));
        assert!(output.contains("Error: Not calibrated"));
        assert!(output.contains("Usage: click <x> <y>"));
        assert!(output.contains("Frame must be between 1 and 3"));
        assert!(output.contains("No click file yet"));
        assert!(output.contains("Invalid real-world coordinate 'north'"));
        assert!(output.contains("Mode: calib"));
        assert_eq!(session.current_frame(), 0);
    }

    #[test]
    fn test_commands_without_video() {
        let (_, output) = run_script(Session::new(), "x\nrender\nclick 1 1\n");
        assert!(output.contains("Error: No video loaded"));
        assert!(output.contains("No video loaded"));
    }

    #[test]
    fn test_jump_dialog_and_mode_bar() {
        let (session, output) = run_script(session_with_video(), "j\n3\nd\n");
        assert_eq!(session.current_frame(), 2);
        assert!(output.contains("Jump to frame (1-3):"));
        assert!(output.contains("*d:del (#f08080)*"));
    }

    #[test]
    fn test_settings_are_remembered() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");

        let mut shell = Shell::new(
            Session::new(),
            "settings\n9\n\n\n#ff0000\nno\n".as_bytes(),
            Vec::new(),
        )
        .with_config(AppConfig::default(), Some(config_path.clone()));
        shell.run().unwrap();

        assert_eq!(shell.session().settings().calibration_radius, 9);
        assert!(!shell.session().settings().show_calibration_points);

        let saved = AppConfig::load_from(&config_path).unwrap();
        assert_eq!(saved.display, *shell.session().settings());
    }

    #[test]
    fn test_video_given_at_startup_is_remembered() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        let frames = dir.path().join("frames");

        let mut shell = Shell::new(session_with_video(), "".as_bytes(), Vec::new())
            .with_config(AppConfig::default(), Some(config_path.clone()));
        shell.remember_video(&frames);

        let saved = AppConfig::load_from(&config_path).unwrap();
        assert_eq!(saved.preferences.last_video_path, Some(frames));
    }

    #[test]
    fn test_render_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("frame.png");
        let script = format!("render {}\n", png.display());

        let (_, output) = run_script(session_with_video(), &script);
        assert!(output.contains("Frame: 1/3"));
        assert!(png.exists());
    }
}
