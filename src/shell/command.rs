//! Text commands understood by the shell.
//!
//! Every command has a long word and, where the windowed tool had a keyboard
//! shortcut, a single-letter alias.

use std::path::PathBuf;

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Open a video (video file, folder of frames or a still image)
    Open(PathBuf),
    /// Save clicks; without a path, reuse the last one
    Save(Option<PathBuf>),
    /// Load clicks; without a path, reuse the last one
    Load(Option<PathBuf>),
    /// Edit marker settings interactively
    Settings,
    Help,
    Calibrate,
    Add,
    Delete,
    Prev,
    Next,
    /// Jump to a 1-based frame; without a number, ask for one
    Jump(Option<i64>),
    /// Click at display coordinates
    Click { x: f64, y: f64 },
    /// Resize the display surface
    Resize { width: u32, height: u32 },
    /// Render the current frame, optionally writing it to an image file
    Render(Option<PathBuf>),
    Status,
    Quit,
}

/// Errors from parsing a command line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command '{0}' (type 'help' for a list)")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),
}

/// One help line per command: (aliases, arguments, description).
pub const COMMANDS: &[(&str, &str, &str)] = &[
    ("o, open", "<path>", "Open a video file, a folder of frame images or an image"),
    ("s, save", "[path]", "Save clicks to a JSON file"),
    ("l, load", "[path]", "Load clicks from a JSON file"),
    ("e, settings", "", "Edit marker radii, colors and visibility"),
    ("h, help", "", "Show this help"),
    ("c, calib", "", "Calibration mode: click 2 points and enter real coords"),
    ("a, add", "", "Add mode: click to add points (requires calibration)"),
    ("d, del", "", "Delete mode: click near a point to delete it"),
    ("z, prev", "", "Previous frame"),
    ("x, next", "", "Next frame"),
    ("j, jump", "[frame]", "Jump to a frame (1-based)"),
    ("click", "<x> <y>", "Click at display coordinates"),
    ("resize", "<w> <h>", "Resize the display surface"),
    ("render", "[png]", "Draw the current frame, optionally to an image file"),
    ("status", "", "Show frame, mode and point counts"),
    ("q, quit", "", "Exit"),
];

impl Command {
    /// Parse one input line. Blank lines and `#` comments yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();

        let command = match word.to_ascii_lowercase().as_str() {
            "o" | "open" => {
                if rest.is_empty() {
                    return Err(CommandError::Usage("open <path>"));
                }
                Command::Open(PathBuf::from(rest))
            }
            "s" | "save" => Command::Save(optional_path(rest)),
            "l" | "load" => Command::Load(optional_path(rest)),
            "e" | "settings" => Command::Settings,
            "h" | "help" | "?" => Command::Help,
            "c" | "calib" => Command::Calibrate,
            "a" | "add" => Command::Add,
            "d" | "del" | "delete" => Command::Delete,
            "z" | "prev" => Command::Prev,
            "x" | "next" => Command::Next,
            "j" | "jump" => match args.as_slice() {
                [] => Command::Jump(None),
                [n] => Command::Jump(Some(
                    n.parse().map_err(|_| CommandError::Usage("jump [frame]"))?,
                )),
                _ => return Err(CommandError::Usage("jump [frame]")),
            },
            "click" => match args.as_slice() {
                [x, y] => Command::Click {
                    x: x.parse().map_err(|_| CommandError::Usage("click <x> <y>"))?,
                    y: y.parse().map_err(|_| CommandError::Usage("click <x> <y>"))?,
                },
                _ => return Err(CommandError::Usage("click <x> <y>")),
            },
            "resize" => match args.as_slice() {
                [w, h] => Command::Resize {
                    width: w.parse().map_err(|_| CommandError::Usage("resize <w> <h>"))?,
                    height: h.parse().map_err(|_| CommandError::Usage("resize <w> <h>"))?,
                },
                _ => return Err(CommandError::Usage("resize <w> <h>")),
            },
            "render" => Command::Render(optional_path(rest)),
            "status" => Command::Status,
            "q" | "quit" | "exit" => Command::Quit,
            _ => return Err(CommandError::Unknown(word.to_string())),
        };

        Ok(Some(command))
    }
}

fn optional_path(rest: &str) -> Option<PathBuf> {
    (!rest.is_empty()).then(|| PathBuf::from(rest))
}

/// Formatted help text.
pub fn help_text() -> String {
    COMMANDS
        .iter()
        .map(|(names, args, description)| format!("  {names:<12} {args:<8} {description}"))
        .collect::<Vec<_>>()
        .join("\n")
}
