//! Blocking "ask and wait" input used by the session.
//!
//! Every method returns the raw text the user entered, or `None` if the
//! request was dismissed. The session validates the text itself.

use std::collections::VecDeque;

use crate::color_utils::Color;
use crate::model::PixelPoint;

/// Source of user answers for modal questions.
pub trait Prompt {
    /// Ask for the real-world coordinate of a calibration point as `"x,y"`.
    ///
    /// `pixel` is the point just clicked, so the shell can highlight it
    /// while waiting.
    fn ask_real_coordinate(&mut self, pixel: PixelPoint) -> Option<String>;

    /// Ask for a 1-based frame number to jump to.
    fn ask_jump_target(&mut self, frame_count: usize) -> Option<String>;

    /// Ask for a marker radius.
    fn ask_radius(&mut self, label: &str, current: u32) -> Option<String>;

    /// Ask for a marker color as `#rrggbb`.
    fn ask_color(&mut self, label: &str, current: Color) -> Option<String>;

    /// Ask for a yes/no toggle.
    fn ask_flag(&mut self, label: &str, current: bool) -> Option<String>;
}

/// A prompt that replays a fixed list of answers, in order.
///
/// Once the answers run out every question is treated as dismissed.
/// Useful for scripted sessions and tests.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<Option<String>>,
    /// Number of questions asked so far.
    asked: usize,
}

impl ScriptedPrompt {
    /// Create a prompt with no answers (every question is dismissed).
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an answer.
    pub fn answer(mut self, text: impl Into<String>) -> Self {
        self.answers.push_back(Some(text.into()));
        self
    }

    /// Queue a dismissal.
    pub fn dismiss(mut self) -> Self {
        self.answers.push_back(None);
        self
    }

    /// Number of questions asked so far.
    pub fn asked(&self) -> usize {
        self.asked
    }

    fn next(&mut self) -> Option<String> {
        self.asked += 1;
        self.answers.pop_front().flatten()
    }
}

impl Prompt for ScriptedPrompt {
    fn ask_real_coordinate(&mut self, _pixel: PixelPoint) -> Option<String> {
        self.next()
    }

    fn ask_jump_target(&mut self, _frame_count: usize) -> Option<String> {
        self.next()
    }

    fn ask_radius(&mut self, _label: &str, _current: u32) -> Option<String> {
        self.next()
    }

    fn ask_color(&mut self, _label: &str, _current: Color) -> Option<String> {
        self.next()
    }

    fn ask_flag(&mut self, _label: &str, _current: bool) -> Option<String> {
        self.next()
    }
}
