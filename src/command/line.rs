//! One fully named mothur command with its parameters.

use crate::command::params::Params;
use crate::command::value::{EncodeError, ParamValue};

/// A mothur command ready to render, independent of any session.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandLine {
    name: String,
    params: Params,
}

impl CommandLine {
    pub fn new(name: impl Into<String>, params: Params) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// Dotted command name, e.g. `summary.seqs`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append `key=value` unless the caller already supplied `key`.
    pub fn with_default(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        if !self.params.contains_key(key) {
            self.params.insert(key, value);
        }
        self
    }

    /// Render as `name(key=value, ...)`.
    ///
    /// mothur requires the parentheses even without parameters.
    pub fn render(&self) -> Result<String, EncodeError> {
        Ok(format!("{}({})", self.name, self.params.render()?))
    }
}
