//! The engine's only view of the outside world while resolving: whether it
//! may ask, how to ask, and where log lines go.

use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

use crate::core::syntax::line_col;
use crate::error::Result;

/// Lines of context shown on each side of the line being changed.
pub const PREVIEW_CONTEXT_LINES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodePreview {
    pub file_path: String,
    /// 1-based line of the match.
    pub line_number: usize,
    pub before_lines: Vec<String>,
    pub change_line: String,
    pub after_lines: Vec<String>,
    /// Char columns of the match within `change_line`, end exclusive.
    pub highlight_start: usize,
    pub highlight_end: usize,
}

impl CodePreview {
    /// Preview of the `len` bytes at `offset` in `text`.
    pub fn build(text: &str, file_path: &str, offset: usize, len: usize) -> Self {
        let (line_number, column) = line_col(text, offset);
        let lines: Vec<&str> = text.split('\n').collect();
        let idx = (line_number - 1).min(lines.len().saturating_sub(1));
        let change_line = lines.get(idx).copied().unwrap_or("");

        let from = idx.saturating_sub(PREVIEW_CONTEXT_LINES);
        let to = (idx + 1 + PREVIEW_CONTEXT_LINES).min(lines.len());

        let highlight_start = column - 1;
        let match_chars = text
            .get(offset..(offset + len).min(text.len()))
            .map(|s| s.chars().count())
            .unwrap_or(0);

        Self {
            file_path: file_path.to_string(),
            line_number,
            before_lines: lines[from..idx].iter().map(|l| l.to_string()).collect(),
            change_line: change_line.to_string(),
            after_lines: lines[(idx + 1).min(to)..to]
                .iter()
                .map(|l| l.to_string())
                .collect(),
            highlight_start,
            highlight_end: highlight_start + match_chars,
        }
    }
}

/// Position of the current file within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressInfo {
    pub current_file: usize,
    pub total_files: usize,
    pub current_file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceRequest {
    pub question: String,
    pub options: Vec<ChoiceOption>,
    pub allow_skip: bool,
    pub code_preview: Option<CodePreview>,
    pub progress: Option<ProgressInfo>,
}

pub trait Interaction {
    fn is_interactive(&self) -> bool;

    /// Ask the user to pick one option. `None` means skip.
    fn ask_choice(&mut self, request: &ChoiceRequest) -> Result<Option<String>>;

    fn log(&mut self, message: &str, level: LogLevel);
}

/// Interaction with pre-scripted answers that records everything it sees.
///
/// Used for non-terminal runs and in tests.
#[derive(Debug, Default)]
pub struct ScriptedInteraction {
    interactive: bool,
    answers: VecDeque<Option<String>>,
    pub requests: Vec<ChoiceRequest>,
    pub logs: Vec<(LogLevel, String)>,
}

impl ScriptedInteraction {
    pub fn non_interactive() -> Self {
        Self::default()
    }

    pub fn with_answers<I>(answers: I) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        Self {
            interactive: true,
            answers: answers.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn logs_at(&self, level: LogLevel) -> Vec<&str> {
        self.logs
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.as_str())
            .collect()
    }
}

impl Interaction for ScriptedInteraction {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Runs out of answers as a skip.
    fn ask_choice(&mut self, request: &ChoiceRequest) -> Result<Option<String>> {
        self.requests.push(request.clone());
        Ok(self.answers.pop_front().flatten())
    }

    fn log(&mut self, message: &str, level: LogLevel) {
        self.logs.push((level, message.to_string()));
    }
}
