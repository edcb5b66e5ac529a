//! Stateful session on top of the stateless mothur executable.
//!
//! Every command runs in a fresh mothur process. The session remembers what
//! mothur would have remembered between commands (current files and
//! directories), replays it in front of each command and reads it back from
//! mothur's report afterwards.

mod error;
mod logfile;
mod script;
mod state;

pub use error::SessionError;
pub use logfile::{search_dirs, unique_logfile_name, LogfileTracker, LOGFILE_SUFFIX};
pub use script::{accepts_seed, Script, ScriptAssembler, SEED_INCOMPATIBLE, STATEMENT_SEPARATOR};
pub use state::{SessionState, StateError, OUTPUT_DIR_KEY};

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::command::{CommandLine, CommandPath};
use crate::config::SessionConfig;
use crate::executor::{Executor, Invocation, ProcessExecutor};
use crate::transcript::{classify, echo_transcript, parse_report, StdoutEcho, TranscriptEcho};

/// Parameter name of the injected random seed.
const SEED_PARAM: &str = "seed";

/// Stages of a single [`Session::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Building,
    Executing,
    Parsing,
    Committed,
    Failed,
}

impl RunPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunPhase::Idle => "idle",
            RunPhase::Building => "building",
            RunPhase::Executing => "executing",
            RunPhase::Parsing => "parsing",
            RunPhase::Committed => "committed",
            RunPhase::Failed => "failed",
        }
    }
}

/// A mothur session: configuration, remembered state and the executor that
/// runs commands.
///
/// Cloning deep-copies the configuration and state, so a clone can diverge
/// from its original. Give the clone its own logfile name (see
/// [`Session::unique_logfile_name`]) if both will run in the same directory.
#[derive(Clone)]
pub struct Session<E: Executor = ProcessExecutor> {
    config: SessionConfig,
    state: SessionState,
    executor: E,
    echo: Arc<dyn TranscriptEcho>,
}

impl Session<ProcessExecutor> {
    /// A session that runs the real mothur executable.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_executor(config, ProcessExecutor::new())
    }
}

impl<E: Executor> Session<E> {
    pub fn with_executor(config: SessionConfig, executor: E) -> Self {
        Self {
            config,
            state: SessionState::default(),
            executor,
            echo: Arc::new(StdoutEcho),
        }
    }

    /// Start from previously saved state instead of an empty one.
    pub fn with_state(mut self, state: SessionState) -> Self {
        self.state = state;
        self
    }

    /// Send echoed output somewhere other than stdout.
    pub fn with_echo(mut self, echo: Arc<dyn TranscriptEcho>) -> Self {
        self.echo = echo;
        self
    }

    /// A fresh `mothur.<uuid>.logfile` name.
    pub fn unique_logfile_name() -> String {
        unique_logfile_name()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SessionConfig {
        &mut self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// File type → path that `current` resolves to.
    pub fn current_files(&self) -> &BTreeMap<String, String> {
        &self.state.current_files
    }

    /// Directory role (`input`, `output`, `tempdefault`) → path.
    pub fn current_dirs(&self) -> &BTreeMap<String, String> {
        &self.state.current_dirs
    }

    /// Files written by the last successful command, keyed by extension.
    pub fn output_files(&self) -> &BTreeMap<String, Vec<String>> {
        &self.state.output_files
    }

    /// Start a command by name; `name` may already be dotted.
    ///
    /// ```ignore
    /// session.command("summary").attr("seqs").call(Params::new().with("fasta", "current"))?;
    /// ```
    pub fn command(&mut self, name: &str) -> CommandPath<'_, E> {
        CommandPath::new(self, name)
    }

    /// Run one command in a fresh mothur process.
    ///
    /// On success the current files, current directories and output files
    /// are all replaced with what mothur reported. On any error the state is
    /// left exactly as it was.
    ///
    /// Blocks until mothur exits. There is no timeout: a mothur command that
    /// never finishes blocks the caller forever.
    pub fn run(&mut self, line: &CommandLine) -> Result<(), SessionError> {
        log_phase(RunPhase::Idle, line.name());
        let result = self.run_phases(line);
        if let Err(e) = &result {
            log_phase(RunPhase::Failed, line.name());
            tracing::debug!(
                command = %line.name(),
                error_type = e.error_type(),
                "mothur command failed"
            );
        }
        result
    }

    fn run_phases(&mut self, line: &CommandLine) -> Result<(), SessionError> {
        let name = line.name();
        log_phase(RunPhase::Building, name);

        let line = match self.config.seed {
            Some(seed) if accepts_seed(name) => line
                .clone()
                .with_default(SEED_PARAM, seed),
            _ => line.clone(),
        };
        let rendered = line.render()?;

        let logfile = self.config.logfile.clone();
        let tracker = self.config.suppress_logfile.then(|| {
            let dirs = search_dirs(self.config.working_dir.as_deref(), self.state.output_dir());
            LogfileTracker::prepare(logfile.as_deref(), &dirs)
        });

        let script = ScriptAssembler::new()
            .with_logfile(logfile.as_deref())
            .with_dirs(&self.state.current_dirs)
            .with_current_files(&self.state.current_files)
            .with_command(rendered)
            .with_query()
            .build();
        tracing::debug!(command = %name, script = %script.joined(), "Composed mothur script");

        log_phase(RunPhase::Executing, name);
        let invocation = Invocation {
            program: self.config.executable.clone(),
            argument: script.to_argument(),
            cwd: self.config.working_dir.clone(),
        };
        let output = self.executor.execute(&invocation)?;

        log_phase(RunPhase::Parsing, name);
        let transcript = classify(&output.lines, script.command_index());
        echo_transcript(&transcript, self.config.verbosity, self.echo.as_ref());

        for warning in transcript.warnings() {
            tracing::warn!(command = %name, "mothur: {}", warning);
        }

        if let Some(failure) = transcript.failure(output.exit_code) {
            return Err(SessionError::ToolReported {
                reason: failure.reason,
                diagnostic: failure.diagnostic,
                exit_code: output.exit_code,
            });
        }

        let state = parse_report(&transcript)?;
        self.state = state;
        log_phase(RunPhase::Committed, name);
        tracing::info!(
            command = %name,
            current_files = self.state.current_files.len(),
            output_files = self.state.output_files.values().map(Vec::len).sum::<usize>(),
            "mothur command completed"
        );

        if let Some(tracker) = tracker {
            let dirs = search_dirs(self.config.working_dir.as_deref(), self.state.output_dir());
            for removed in tracker.cleanup(&dirs) {
                tracing::debug!(path = %removed.display(), "Removed mothur logfile");
            }
        }

        Ok(())
    }
}

fn log_phase(phase: RunPhase, command: &str) {
    tracing::debug!(command = %command, phase = phase.as_str(), "Run phase");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Params;
    use crate::executor::{ExecOutput, LaunchError};
    use parking_lot::Mutex;

    /// Replies with a fixed transcript and remembers the invocations.
    struct Canned {
        lines: Vec<String>,
        seen: Mutex<Vec<Invocation>>,
    }

    impl Canned {
        fn new(lines: &[&str]) -> Self {
            Self {
                lines: lines.iter().map(|l| l.to_string()).collect(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Executor for Canned {
        fn execute(&self, invocation: &Invocation) -> Result<ExecOutput, LaunchError> {
            self.seen.lock().push(invocation.clone());
            Ok(ExecOutput {
                exit_code: Some(0),
                lines: self.lines.clone(),
            })
        }
    }

    const HELP_OK: &[&str] = &[
        "mothur v.1.48.0",
        "mothur > help()",
        "Valid commands are listed below.",
        "mothur > get.current()",
        "Current files saved by mothur:",
        "fasta=a.fasta",
        "",
    ];

    #[test]
    fn test_run_commits_reported_state() {
        let mut session = Session::with_executor(SessionConfig::default(), Canned::new(HELP_OK))
            .with_echo(Arc::new(crate::transcript::CaptureEcho::new()));
        session.run(&CommandLine::new("help", Params::new())).unwrap();
        assert_eq!(session.current_files().get("fasta").unwrap(), "a.fasta");

        let seen = session.executor().seen.lock();
        assert_eq!(seen[0].argument, "#help(); get.current()");
        assert_eq!(seen[0].program, "mothur");
    }

    #[test]
    fn test_seed_is_added_once() {
        let config = SessionConfig {
            seed: Some(42),
            ..SessionConfig::default()
        };
        let mut session = Session::with_executor(config, Canned::new(HELP_OK))
            .with_echo(Arc::new(crate::transcript::CaptureEcho::new()));

        let _ = session.run(&CommandLine::new("sub.sample", Params::new().with("size", 10)));
        let _ = session.run(&CommandLine::new("sub.sample", Params::new().with("seed", 7)));
        let _ = session.run(&CommandLine::new("help", Params::new()));

        let seen = session.executor().seen.lock();
        assert!(seen[0].argument.contains("sub.sample(size=10, seed=42)"));
        assert!(seen[1].argument.contains("sub.sample(seed=7)"));
        assert!(seen[2].argument.contains("help()"));
        assert!(!seen[2].argument.contains("seed"));
    }

    #[test]
    fn test_phases_have_stable_names() {
        assert_eq!(RunPhase::Idle.as_str(), "idle");
        assert_eq!(RunPhase::Committed.as_str(), "committed");
        assert_eq!(RunPhase::Failed.as_str(), "failed");
    }
}
