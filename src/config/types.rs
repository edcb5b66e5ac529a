use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub mothur: MothurConfig,
    #[serde(default)]
    pub session: SessionDefaults,
}

/// Where and how to run mothur.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MothurConfig {
    /// Executable name or path (default: `mothur`, looked up on `PATH`).
    #[serde(default = "default_executable")]
    pub executable: String,
    /// Directory mothur runs in (default: the caller's working directory).
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

/// Initial session settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDefaults {
    /// 0 = quiet, 1 = command output, 2 = everything.
    #[serde(default)]
    pub verbosity: Verbosity,
    /// Seed appended to commands that accept one.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Fixed logfile name; mothur picks a timestamped name when unset.
    #[serde(default)]
    pub logfile: Option<String>,
    /// Delete mothur's logfile after each successful command.
    #[serde(default)]
    pub suppress_logfile: bool,
    /// Where the command-line front-end persists session state.
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
}

/// How much of mothur's output is echoed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Verbosity {
    #[default]
    Quiet,
    Normal,
    Verbose,
}

impl TryFrom<u8> for Verbosity {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(Verbosity::Quiet),
            1 => Ok(Verbosity::Normal),
            2 => Ok(Verbosity::Verbose),
            other => Err(format!("verbosity must be 0, 1, or 2 (got {})", other)),
        }
    }
}

impl From<Verbosity> for u8 {
    fn from(verbosity: Verbosity) -> Self {
        match verbosity {
            Verbosity::Quiet => 0,
            Verbosity::Normal => 1,
            Verbosity::Verbose => 2,
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// Settings owned by a [`Session`](crate::session::Session).
///
/// Freely editable between commands, e.g. to give a cloned session its own
/// logfile name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub executable: String,
    pub working_dir: Option<PathBuf>,
    pub verbosity: Verbosity,
    pub seed: Option<u64>,
    pub logfile: Option<String>,
    pub suppress_logfile: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            working_dir: None,
            verbosity: Verbosity::Quiet,
            seed: None,
            logfile: None,
            suppress_logfile: false,
        }
    }
}

impl Config {
    /// Session settings derived from this configuration.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            executable: self.mothur.executable.clone(),
            working_dir: self.mothur.working_dir.clone(),
            verbosity: self.session.verbosity,
            seed: self.session.seed,
            logfile: self.session.logfile.clone(),
            suppress_logfile: self.session.suppress_logfile,
        }
    }
}

fn default_executable() -> String {
    "mothur".to_string()
}

fn default_state_file() -> PathBuf {
    PathBuf::from(".mothur-session.json")
}

impl Default for MothurConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            working_dir: None,
        }
    }
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::Quiet,
            seed: None,
            logfile: None,
            suppress_logfile: false,
            state_file: default_state_file(),
        }
    }
}
