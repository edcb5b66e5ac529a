//! Verbosity-gated echo of mothur's output.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::Verbosity;
use crate::transcript::classifier::{LineKind, Section, Transcript};

/// Destination for echoed transcript lines.
pub trait TranscriptEcho: Send + Sync {
    fn echo(&self, line: &str);
}

/// Prints to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutEcho;

impl TranscriptEcho for StdoutEcho {
    fn echo(&self, line: &str) {
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{}", line);
    }
}

/// Keeps echoed lines in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct CaptureEcho {
    lines: Arc<Mutex<Vec<String>>>,
}

impl CaptureEcho {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything echoed so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl TranscriptEcho for CaptureEcho {
    fn echo(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}

/// Echo the lines `verbosity` allows.
///
/// - `Quiet`: nothing.
/// - `Normal`: the user's command and its output, plus any warning, error
///   or halt line from elsewhere. The banner and injected bookkeeping stay
///   hidden.
/// - `Verbose`: every line.
pub fn echo_transcript(transcript: &Transcript, verbosity: Verbosity, echo: &dyn TranscriptEcho) {
    for line in transcript.lines() {
        let visible = match verbosity {
            Verbosity::Quiet => false,
            Verbosity::Normal => line.section == Section::Command || line.kind != LineKind::Info,
            Verbosity::Verbose => true,
        };
        if visible {
            echo.echo(&line.text);
        }
    }
}
