//! Running the mothur executable.
//!
//! The [`Executor`] trait is the seam between the session and the operating
//! system: production code uses [`ProcessExecutor`], tests substitute a
//! scripted implementation.

mod process;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

pub use process::ProcessExecutor;

/// One mothur process launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Executable name or path.
    pub program: String,
    /// The single batch-mode argument, `#cmd1; cmd2; ...`.
    pub argument: String,
    /// Working directory for the child; inherits ours when `None`.
    pub cwd: Option<PathBuf>,
}

/// Everything mothur printed, stdout and stderr interleaved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub lines: Vec<String>,
}

/// The executable could not be run at all.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("mothur executable '{program}' not found")]
    ExecutableNotFound { program: String },

    #[error("permission denied running mothur executable '{program}'")]
    PermissionDenied { program: String },

    #[error("I/O error running mothur executable '{program}': {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl LaunchError {
    /// Classify an `io::Error` raised while starting `program`.
    pub fn from_io(program: &str, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => LaunchError::ExecutableNotFound {
                program: program.to_string(),
            },
            std::io::ErrorKind::PermissionDenied => LaunchError::PermissionDenied {
                program: program.to_string(),
            },
            _ => LaunchError::Io {
                program: program.to_string(),
                source,
            },
        }
    }
}

/// Runs one mothur batch invocation to completion.
///
/// A non-zero exit status or error text in the output is returned as data;
/// only a failure to launch is an `Err`.
pub trait Executor: Send + Sync {
    fn execute(&self, invocation: &Invocation) -> Result<ExecOutput, LaunchError>;
}

impl<T: Executor + ?Sized> Executor for Arc<T> {
    fn execute(&self, invocation: &Invocation) -> Result<ExecOutput, LaunchError> {
        (**self).execute(invocation)
    }
}

impl<T: Executor + ?Sized> Executor for &T {
    fn execute(&self, invocation: &Invocation) -> Result<ExecOutput, LaunchError> {
        (**self).execute(invocation)
    }
}
