//! Extraction of current files, current dirs and output files.

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;

use crate::session::SessionState;
use crate::transcript::classifier::{Section, Transcript, TranscriptLine};
use crate::transcript::markers::{CURRENT_FILES_HEADER, DIR_HEADERS, OUTPUT_FILES_HEADER};

/// mothur claimed success but its bookkeeping output is not what we expect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    #[error("bookkeeping query get.current() never ran ({lines} lines of output)")]
    MissingQuery { lines: usize },

    #[error("malformed current file entry '{line}', expected type=path")]
    MalformedCurrentFile { line: String },
}

/// Build the post-run state from a transcript that did not fail.
///
/// Every map starts empty: what mothur reports is the complete picture.
pub fn parse_report(transcript: &Transcript) -> Result<SessionState, ReportError> {
    if !transcript.query_seen() {
        return Err(ReportError::MissingQuery {
            lines: transcript.lines().len(),
        });
    }

    let query: Vec<&TranscriptLine> = transcript.section(Section::Query).collect();
    let command: Vec<&TranscriptLine> = transcript.section(Section::Command).collect();

    Ok(SessionState {
        current_files: parse_current_files(&query)?,
        current_dirs: parse_current_dirs(&query),
        output_files: parse_output_files(&command),
    })
}

fn parse_current_files(lines: &[&TranscriptLine]) -> Result<BTreeMap<String, String>, ReportError> {
    let mut files = BTreeMap::new();
    let mut in_block = false;

    for line in lines {
        let text = line.text.trim();
        if !in_block {
            in_block = text.starts_with(CURRENT_FILES_HEADER);
            continue;
        }
        if text.is_empty() || line.is_prompt || is_following_header(text) {
            in_block = false;
            continue;
        }
        match text.split_once('=') {
            Some((file_type, path)) if !file_type.trim().is_empty() => {
                files.insert(file_type.trim().to_string(), path.trim().to_string());
            }
            _ => {
                return Err(ReportError::MalformedCurrentFile {
                    line: line.text.clone(),
                })
            }
        }
    }

    Ok(files)
}

/// `Current working directory: /x` and friends end the files block.
fn is_following_header(text: &str) -> bool {
    text.starts_with("Current ") && text.contains(':') && !text.contains('=')
}

fn parse_current_dirs(lines: &[&TranscriptLine]) -> BTreeMap<String, String> {
    let mut dirs = BTreeMap::new();
    for line in lines {
        let text = line.text.trim();
        for (header, key) in DIR_HEADERS {
            if let Some(rest) = text.strip_prefix(header) {
                let dir = rest.trim();
                if !dir.is_empty() {
                    dirs.insert(key.to_string(), dir.to_string());
                }
            }
        }
    }
    dirs
}

fn parse_output_files(lines: &[&TranscriptLine]) -> BTreeMap<String, Vec<String>> {
    let mut outputs: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut in_block = false;

    for line in lines {
        let text = line.text.trim();
        if !in_block {
            in_block = text.starts_with(OUTPUT_FILES_HEADER);
            continue;
        }
        if text.is_empty() || line.is_prompt {
            in_block = false;
            continue;
        }
        outputs
            .entry(extension_key(text))
            .or_default()
            .push(text.to_string());
    }

    outputs
}

/// Group key for an output path: its extension, or the file name when it
/// has none.
pub fn extension_key(path: &str) -> String {
    let path = Path::new(path);
    path.extension()
        .or_else(|| path.file_name())
        .map(|part| part.to_string_lossy().into_owned())
        .unwrap_or_default()
}
