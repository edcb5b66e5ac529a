//! What the session remembers between mothur invocations.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key of the output directory in [`SessionState::current_dirs`].
pub const OUTPUT_DIR_KEY: &str = "output";

/// Errors reading or writing a persisted state file.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Failed to read state file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse state file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write state file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Current files, current directories and last-run output files.
///
/// A successful run replaces all three maps together; a failed run leaves
/// them untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// File type (`fasta`, `count`, ...) → path.
    #[serde(default)]
    pub current_files: BTreeMap<String, String>,
    /// Directory role (`input`, `output`, `tempdefault`) → path.
    #[serde(default)]
    pub current_dirs: BTreeMap<String, String>,
    /// Extension → paths written by the most recent run only.
    #[serde(default)]
    pub output_files: BTreeMap<String, Vec<String>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a current file, e.g. when resuming work from a known fasta.
    pub fn with_current_file(mut self, file_type: &str, path: &str) -> Self {
        self.current_files
            .insert(file_type.to_string(), path.to_string());
        self
    }

    /// Seed a current directory.
    pub fn with_current_dir(mut self, role: &str, path: &str) -> Self {
        self.current_dirs.insert(role.to_string(), path.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.current_files.is_empty()
            && self.current_dirs.is_empty()
            && self.output_files.is_empty()
    }

    /// mothur's current output directory, if one is set.
    pub fn output_dir(&self) -> Option<&str> {
        self.current_dirs
            .get(OUTPUT_DIR_KEY)
            .map(String::as_str)
            .filter(|dir| !dir.is_empty())
    }

    /// Load persisted state from a JSON file.
    pub fn load(path: &Path) -> Result<Self, StateError> {
        let content = fs::read_to_string(path).map_err(|e| StateError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| StateError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Like [`SessionState::load`], but a missing file is an empty state.
    pub fn load_or_default(path: &Path) -> Result<Self, StateError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Persist as pretty JSON. Written to a sibling temp file and renamed
    /// into place so a crash never leaves a half-written state file.
    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        let write_error = |source: std::io::Error| StateError::WriteError {
            path: path.to_path_buf(),
            source,
        };
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| write_error(std::io::Error::other(e)))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_error)?;
            }
        }

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, json).map_err(write_error)?;
        fs::rename(&tmp, path).map_err(write_error)
    }
}
