use thiserror::Error;

use crate::command::EncodeError;
use crate::executor::LaunchError;
use crate::transcript::{FailureReason, ReportError};

/// Errors returned by [`Session::run`](crate::session::Session::run).
///
/// The session state is left untouched whenever one of these is returned.
#[derive(Debug, Error)]
pub enum SessionError {
    /// mothur could not be started
    #[error("Launch failed: {0}")]
    Launch(#[from] LaunchError),

    /// mothur ran and reported a failure
    #[error("mothur reported {reason}: {}", .diagnostic.join(" | "))]
    ToolReported {
        reason: FailureReason,
        diagnostic: Vec<String>,
        exit_code: Option<i32>,
    },

    /// mothur claimed success but its bookkeeping report could not be read
    #[error("Unreadable mothur output: {0}")]
    OutputParse(#[from] ReportError),

    /// A parameter value has no mothur rendering
    #[error(transparent)]
    UnsupportedParameterType(#[from] EncodeError),
}

impl SessionError {
    /// Stable error tag for logs and machine-readable output
    pub fn error_type(&self) -> &'static str {
        match self {
            SessionError::Launch(LaunchError::ExecutableNotFound { .. }) => "executable_not_found",
            SessionError::Launch(LaunchError::PermissionDenied { .. }) => "permission_denied",
            SessionError::Launch(LaunchError::Io { .. }) => "launch_error",
            SessionError::ToolReported { .. } => "tool_reported_error",
            SessionError::OutputParse(_) => "output_parse_failure",
            SessionError::UnsupportedParameterType(_) => "unsupported_parameter_type",
        }
    }

    /// Lines explaining a tool-reported failure; empty for other variants.
    pub fn diagnostic(&self) -> &[String] {
        match self {
            SessionError::ToolReported { diagnostic, .. } => diagnostic,
            _ => &[],
        }
    }
}
