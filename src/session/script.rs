//! Script assembler: bookkeeping and the user command in one batch string.

use std::collections::BTreeMap;

use crate::transcript::markers::QUERY_COMMAND;

/// Separator between commands in mothur's batch mode.
pub const STATEMENT_SEPARATOR: &str = "; ";

/// Commands that must not receive an injected `seed=` parameter.
pub const SEED_INCOMPATIBLE: &[&str] = &[
    "help",
    "quit",
    "system",
    "get.current",
    "set.current",
    "set.dir",
    "set.logfile",
    "set.seed",
];

/// Whether `command` accepts the session's deterministic seed.
pub fn accepts_seed(command: &str) -> bool {
    !SEED_INCOMPATIBLE.contains(&command)
}

/// The commands of one mothur invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    commands: Vec<String>,
    command_index: usize,
}

impl Script {
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Position of the user's command among [`Script::commands`].
    pub fn command_index(&self) -> usize {
        self.command_index
    }

    /// Commands joined with [`STATEMENT_SEPARATOR`].
    pub fn joined(&self) -> String {
        self.commands.join(STATEMENT_SEPARATOR)
    }

    /// The single argument passed to mothur: `#cmd1; cmd2; ...`.
    pub fn to_argument(&self) -> String {
        format!("#{}", self.joined())
    }
}

/// Builder for the batch script sent to mothur.
///
/// The relative order of the pieces is fixed regardless of the order the
/// `with_*` calls are made in: logfile, directories, current files, the
/// user command, then the `get.current()` query.
#[derive(Debug, Clone, Default)]
pub struct ScriptAssembler {
    logfile: Option<String>,
    dirs: Option<String>,
    current_files: Option<String>,
    command: String,
    query: bool,
}

impl ScriptAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// `set.logfile(name=...)` so mothur writes a predictable logfile.
    pub fn with_logfile(mut self, name: Option<&str>) -> Self {
        self.logfile = name.map(|name| format!("set.logfile(name={})", name));
        self
    }

    /// `set.dir(...)` restoring the directories mothur forgot.
    pub fn with_dirs(mut self, dirs: &BTreeMap<String, String>) -> Self {
        self.dirs = key_value_command("set.dir", dirs);
        self
    }

    /// `set.current(...)` restoring the files `current` should resolve to.
    pub fn with_current_files(mut self, files: &BTreeMap<String, String>) -> Self {
        self.current_files = key_value_command("set.current", files);
        self
    }

    /// The rendered user command.
    pub fn with_command(mut self, rendered: String) -> Self {
        self.command = rendered;
        self
    }

    /// Append the `get.current()` report. Every command gets it: there is
    /// no way to know beforehand which commands change mothur's current
    /// files.
    pub fn with_query(mut self) -> Self {
        self.query = true;
        self
    }

    pub fn build(self) -> Script {
        let mut commands: Vec<String> = [self.logfile, self.dirs, self.current_files]
            .into_iter()
            .flatten()
            .collect();
        let command_index = commands.len();
        commands.push(self.command);
        if self.query {
            commands.push(QUERY_COMMAND.to_string());
        }
        Script {
            commands,
            command_index,
        }
    }
}

fn key_value_command(name: &str, entries: &BTreeMap<String, String>) -> Option<String> {
    if entries.is_empty() {
        return None;
    }
    let args: Vec<String> = entries
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();
    Some(format!("{}({})", name, args.join(", ")))
}
