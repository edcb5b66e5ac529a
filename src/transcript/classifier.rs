//! Line classification of a mothur transcript.

use std::fmt;

use crate::transcript::markers::{
    contains_any, ERROR_MARKERS, HALT_MARKERS, PROMPT, QUERY_COMMAND, WARNING_MARKERS,
};

/// Number of trailing lines kept as the diagnostic when only the exit
/// status reveals a failure.
const EXIT_DIAGNOSTIC_TAIL: usize = 10;

/// Which part of the script produced a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Version banner and the bookkeeping commands injected before the
    /// user's command.
    Preamble,
    /// The user's command, from its prompt echo up to the next prompt.
    Command,
    /// The trailing `get.current()` query and anything after it.
    Query,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Info,
    Warning,
    Error,
    Halt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub text: String,
    pub kind: LineKind,
    pub section: Section,
    /// mothur's echo of a command (`mothur > name(...)`).
    pub is_prompt: bool,
}

/// Why a run counts as failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    ErrorMarker,
    HaltMarker,
    /// mothur printed nothing alarming but exited unsuccessfully.
    /// `None` when it was killed by a signal.
    ExitStatus(Option<i32>),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::ErrorMarker => write!(f, "an error"),
            FailureReason::HaltMarker => write!(f, "a halting condition"),
            FailureReason::ExitStatus(Some(code)) => write!(f, "exit status {}", code),
            FailureReason::ExitStatus(None) => write!(f, "termination by signal"),
        }
    }
}

/// A failed run and the lines that explain it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolFailure {
    pub reason: FailureReason,
    pub diagnostic: Vec<String>,
}

/// A classified transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    lines: Vec<TranscriptLine>,
    query_seen: bool,
}

impl Transcript {
    pub fn lines(&self) -> &[TranscriptLine] {
        &self.lines
    }

    /// Lines of one section, in order.
    pub fn section(&self, section: Section) -> impl Iterator<Item = &TranscriptLine> {
        self.lines.iter().filter(move |line| line.section == section)
    }

    /// Whether mothur echoed the trailing `get.current()` query.
    pub fn query_seen(&self) -> bool {
        self.query_seen
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .filter(|line| line.kind == LineKind::Warning)
            .map(|line| line.text.as_str())
    }

    /// Decide whether the run failed.
    ///
    /// Marker text wins over the exit status: mothur exits 0 after many
    /// errors it reports in text.
    pub fn failure(&self, exit_code: Option<i32>) -> Option<ToolFailure> {
        let marked = |kind: LineKind| -> Vec<String> {
            self.lines
                .iter()
                .filter(|line| line.kind == kind)
                .map(|line| line.text.clone())
                .collect()
        };

        let halts = marked(LineKind::Halt);
        let errors = marked(LineKind::Error);
        if !halts.is_empty() {
            let mut diagnostic = halts;
            diagnostic.extend(errors);
            return Some(ToolFailure {
                reason: FailureReason::HaltMarker,
                diagnostic,
            });
        }
        if !errors.is_empty() {
            return Some(ToolFailure {
                reason: FailureReason::ErrorMarker,
                diagnostic: errors,
            });
        }
        if exit_code != Some(0) {
            let start = self.lines.len().saturating_sub(EXIT_DIAGNOSTIC_TAIL);
            return Some(ToolFailure {
                reason: FailureReason::ExitStatus(exit_code),
                diagnostic: self.lines[start..]
                    .iter()
                    .map(|line| line.text.clone())
                    .collect(),
            });
        }
        None
    }
}

/// Classify raw output lines.
///
/// `command_index` is the zero-based position of the user's command in the
/// script; prompts before it belong to the preamble, prompts after it to the
/// query.
pub fn classify(lines: &[String], command_index: usize) -> Transcript {
    let mut classified = Vec::with_capacity(lines.len());
    let mut section = Section::Preamble;
    let mut prompts = 0usize;
    let mut query_seen = false;

    for text in lines {
        let is_prompt = text.trim_start().starts_with(PROMPT);
        if is_prompt {
            section = match prompts.cmp(&command_index) {
                std::cmp::Ordering::Less => Section::Preamble,
                std::cmp::Ordering::Equal => Section::Command,
                std::cmp::Ordering::Greater => Section::Query,
            };
            if section == Section::Query && text.contains(QUERY_COMMAND) {
                query_seen = true;
            }
            prompts += 1;
        }

        classified.push(TranscriptLine {
            text: text.clone(),
            kind: line_kind(text),
            section,
            is_prompt,
        });
    }

    Transcript {
        lines: classified,
        query_seen,
    }
}

fn line_kind(text: &str) -> LineKind {
    if contains_any(text, HALT_MARKERS) {
        LineKind::Halt
    } else if contains_any(text, ERROR_MARKERS) {
        LineKind::Error
    } else if contains_any(text, WARNING_MARKERS) {
        LineKind::Warning
    } else {
        LineKind::Info
    }
}
