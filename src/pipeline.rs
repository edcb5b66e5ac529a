//! TOML pipelines: commands run one after another in one session.
//!
//! ```toml
//! [[step]]
//! command = "make.contigs"
//! params = { file = "stability.files", processors = 8 }
//!
//! [[step]]
//! command = "summary.seqs"
//! params = { fasta = "current" }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::command::{CommandLine, ParamValue, Params};
use crate::executor::Executor;
use crate::session::{Session, SessionError, StateError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to read pipeline file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse pipeline: {source}")]
    ParseError {
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid pipeline: {message}")]
    ValidationError { message: String },

    #[error("Step {index} ({command}) failed: {source}")]
    StepFailed {
        index: usize,
        command: String,
        #[source]
        source: SessionError,
    },

    #[error("Failed to save state after step {index}: {source}")]
    Checkpoint {
        index: usize,
        #[source]
        source: StateError,
    },
}

/// One command of a pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Step {
    /// Dotted mothur command name.
    pub command: String,
    /// Bare values rendered before the keyword parameters.
    #[serde(default)]
    pub args: Vec<ParamValue>,
    /// Keyword parameters, rendered in key order.
    #[serde(default)]
    pub params: BTreeMap<String, ParamValue>,
}

impl Step {
    pub fn line(&self) -> CommandLine {
        let params = self
            .args
            .iter()
            .cloned()
            .fold(Params::new(), |params, value| params.positional(value));
        let params = self
            .params
            .iter()
            .fold(params, |params, (key, value)| params.with(key.as_str(), value.clone()));
        CommandLine::new(self.command.as_str(), params)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Pipeline {
    #[serde(rename = "step", default)]
    pub steps: Vec<Step>,
}

impl Pipeline {
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let content = fs::read_to_string(path).map_err(|e| PipelineError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, PipelineError> {
        let pipeline: Pipeline =
            toml::from_str(content).map_err(|e| PipelineError::ParseError { source: e })?;
        pipeline.validate()?;
        Ok(pipeline)
    }

    fn validate(&self) -> Result<(), PipelineError> {
        if self.steps.is_empty() {
            return Err(PipelineError::ValidationError {
                message: "pipeline has no [[step]] entries".to_string(),
            });
        }
        for (index, step) in self.steps.iter().enumerate() {
            if step.command.trim().is_empty() {
                return Err(PipelineError::ValidationError {
                    message: format!("step {} has an empty command", index + 1),
                });
            }
        }
        Ok(())
    }

    /// Run every step in `session`, stopping at the first failure.
    ///
    /// `checkpoint` is called after each successful step (1-based index),
    /// typically to persist the session state.
    pub fn run<E, F>(&self, session: &mut Session<E>, mut checkpoint: F) -> Result<(), PipelineError>
    where
        E: Executor,
        F: FnMut(usize, &Session<E>) -> Result<(), StateError>,
    {
        for (offset, step) in self.steps.iter().enumerate() {
            let index = offset + 1;
            tracing::info!(step = index, total = self.steps.len(), command = %step.command, "Running pipeline step");

            session
                .run(&step.line())
                .map_err(|source| PipelineError::StepFailed {
                    index,
                    command: step.command.clone(),
                    source,
                })?;

            checkpoint(index, session).map_err(|source| PipelineError::Checkpoint { index, source })?;
        }
        Ok(())
    }
}
