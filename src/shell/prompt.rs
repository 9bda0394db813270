//! [`Prompt`] over a line-oriented input and output stream.

use std::io::{BufRead, Write};

use crate::color_utils::Color;
use crate::model::PixelPoint;
use crate::session::Prompt;

/// Asks questions on `output` and reads one line of `input` per answer.
///
/// End of input counts as dismissing the question. A blank line is returned
/// as an empty answer, which the session treats as "no value".
pub struct StreamPrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> StreamPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Read one line, without its line ending. `None` at end of input.
    pub fn read_line(&mut self) -> std::io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    /// Output stream, for messages that are not questions.
    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    fn ask(&mut self, question: &str) -> Option<String> {
        if let Err(e) = write!(self.output, "{question} ").and_then(|()| self.output.flush()) {
            log::warn!("Failed to write prompt: {}", e);
            return None;
        }
        match self.read_line() {
            Ok(answer) => answer,
            Err(e) => {
                log::warn!("Failed to read answer: {}", e);
                None
            }
        }
    }
}

impl<R: BufRead, W: Write> Prompt for StreamPrompt<R, W> {
    fn ask_real_coordinate(&mut self, pixel: PixelPoint) -> Option<String> {
        self.ask(&format!("Real-world coordinate for image point {pixel} (x,y):"))
    }

    fn ask_jump_target(&mut self, frame_count: usize) -> Option<String> {
        self.ask(&format!("Jump to frame (1-{frame_count}):"))
    }

    fn ask_radius(&mut self, label: &str, current: u32) -> Option<String> {
        self.ask(&format!("{label} [{current}]:"))
    }

    fn ask_color(&mut self, label: &str, current: Color) -> Option<String> {
        self.ask(&format!("{label} [{current}]:"))
    }

    fn ask_flag(&mut self, label: &str, current: bool) -> Option<String> {
        let current = if current { "yes" } else { "no" };
        self.ask(&format!("{label} (yes/no) [{current}]:"))
    }
}
