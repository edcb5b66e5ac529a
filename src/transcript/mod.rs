//! Reading mothur's console output.
//!
//! mothur has no structured output format. A transcript is split into
//! sections by its prompt echoes, each line is tagged by the markers mothur
//! uses for warnings and errors, and the bookkeeping report is parsed out of
//! the query section.

mod classifier;
mod echo;
pub mod markers;
mod report;

pub use classifier::{
    classify, FailureReason, LineKind, Section, ToolFailure, Transcript, TranscriptLine,
};
pub use echo::{echo_transcript, CaptureEcho, StdoutEcho, TranscriptEcho};
pub use report::{extension_key, parse_report, ReportError};
