//! Shared test utilities and a scripted stand-in for mothur.

#![allow(dead_code, unused_imports)]

use mothur_session::config::{SessionConfig, Verbosity};
use mothur_session::executor::{ExecOutput, Executor, Invocation, LaunchError};
use mothur_session::session::Session;
use mothur_session::transcript::CaptureEcho;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

pub const BANNER: &str = "mothur v.1.48.0";

/// What the fake prints for one user command.
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub lines: Vec<String>,
    pub outputs: Vec<String>,
    /// Current files mothur would set after this command.
    pub sets_current: Vec<(String, String)>,
    /// Directories the command changes (`set.dir` style roles).
    pub sets_dirs: Vec<(String, String)>,
    pub exit_code: Option<i32>,
    /// Stop before `get.current()` runs, as if mothur crashed mid-script.
    pub abort: bool,
}

impl Response {
    pub fn new() -> Self {
        Self {
            exit_code: Some(0),
            ..Self::default()
        }
    }

    pub fn line(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    pub fn output(mut self, path: &str) -> Self {
        self.outputs.push(path.to_string());
        self
    }

    pub fn sets(mut self, file_type: &str, path: &str) -> Self {
        self.sets_current.push((file_type.to_string(), path.to_string()));
        self
    }

    pub fn sets_dir(mut self, role: &str, path: &str) -> Self {
        self.sets_dirs.push((role.to_string(), path.to_string()));
        self
    }

    pub fn exit(mut self, code: Option<i32>) -> Self {
        self.exit_code = code;
        self
    }

    pub fn aborted(mut self) -> Self {
        self.abort = true;
        self
    }
}

/// Executor that interprets the batch script the way mothur would, with
/// canned responses for user commands. Every process starts with empty
/// memory, like the real tool.
#[derive(Debug, Default)]
pub struct FakeMothur {
    responses: Mutex<HashMap<String, Response>>,
    invocations: Mutex<Vec<Invocation>>,
    launch_failure: Mutex<Option<io::ErrorKind>>,
    /// Create `mothur.<n>.logfile` in the working directory when no
    /// logfile name is given.
    auto_logfile: bool,
}

impl FakeMothur {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auto_logfile() -> Self {
        Self {
            auto_logfile: true,
            ..Self::default()
        }
    }

    pub fn respond(&self, command: &str, response: Response) -> &Self {
        self.responses.lock().insert(command.to_string(), response);
        self
    }

    pub fn fail_launch(&self, kind: io::ErrorKind) {
        *self.launch_failure.lock() = Some(kind);
    }

    pub fn spawn_count(&self) -> usize {
        self.invocations.lock().len()
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().clone()
    }

    /// Script commands of the `n`-th invocation.
    pub fn script(&self, n: usize) -> Vec<String> {
        let invocations = self.invocations.lock();
        split_script(&invocations[n].argument)
    }

    pub fn last_script(&self) -> Vec<String> {
        let count = self.spawn_count();
        self.script(count - 1)
    }
}

impl Executor for FakeMothur {
    fn execute(&self, invocation: &Invocation) -> Result<ExecOutput, LaunchError> {
        self.invocations.lock().push(invocation.clone());
        if let Some(kind) = *self.launch_failure.lock() {
            return Err(LaunchError::from_io(&invocation.program, io::Error::from(kind)));
        }

        let mut current: BTreeMap<String, String> = BTreeMap::new();
        let mut dirs: BTreeMap<String, String> = BTreeMap::new();
        let mut lines = vec![BANNER.to_string(), String::new()];
        let mut exit_code = Some(0);
        let mut logfile_named = false;

        for command in split_script(&invocation.argument) {
            lines.push(format!("mothur > {}", command));
            let (name, args) = split_command(&command);
            match name.as_str() {
                "set.logfile" => {
                    logfile_named = true;
                    if let Some(file) = args.get("name") {
                        lines.push(format!("Setting logfile name to {}", file));
                        self.touch_logfile(invocation, file);
                    }
                }
                "set.dir" => {
                    for (role, path) in args {
                        lines.push(format!("Setting {} directory to {}", role, path));
                        dirs.insert(role, path);
                    }
                }
                "set.current" => {
                    current.extend(args);
                }
                "get.current" => {
                    lines.push("Current files saved by mothur:".to_string());
                    for (key, value) in &current {
                        lines.push(format!("{}={}", key, value));
                    }
                    lines.push(String::new());
                    for (role, header) in [
                        ("input", "input"),
                        ("output", "output"),
                        ("tempdefault", "default"),
                    ] {
                        if let Some(path) = dirs.get(role) {
                            lines.push(format!(
                                "Current {} directory saved by mothur: {}",
                                header, path
                            ));
                        }
                    }
                    lines.push(String::new());
                }
                _ => {
                    let missing: Vec<String> = args
                        .iter()
                        .filter(|(key, value)| value.as_str() == "current" && !current.contains_key(*key))
                        .map(|(key, _)| key.clone())
                        .collect();
                    if !missing.is_empty() {
                        for key in missing {
                            lines.push(format!("[ERROR]: You have no current {} file.", key));
                        }
                        continue;
                    }

                    let Some(response) = self.responses.lock().get(&name).cloned() else {
                        lines.push("Invalid command.".to_string());
                        continue;
                    };
                    lines.extend(response.lines.iter().cloned());
                    if !response.outputs.is_empty() {
                        lines.push(String::new());
                        lines.push("Output File Names:".to_string());
                        lines.extend(response.outputs.iter().cloned());
                        lines.push(String::new());
                    }
                    current.extend(response.sets_current.iter().cloned());
                    dirs.extend(response.sets_dirs.iter().cloned());
                    exit_code = response.exit_code;
                    if response.abort {
                        return Ok(ExecOutput { exit_code, lines });
                    }
                }
            }
        }

        if !logfile_named && self.auto_logfile {
            let name = format!("mothur.{}.logfile", self.spawn_count());
            self.touch_logfile(invocation, &name);
        }
        Ok(ExecOutput { exit_code, lines })
    }
}

impl FakeMothur {
    fn touch_logfile(&self, invocation: &Invocation, name: &str) {
        if let Some(cwd) = &invocation.cwd {
            fs::write(cwd.join(name), "logfile").expect("write fake logfile");
        }
    }
}

fn split_script(argument: &str) -> Vec<String> {
    argument
        .trim_start_matches('#')
        .split("; ")
        .map(String::from)
        .collect()
}

/// `name(k=v, k2=v2)` into the name and its keyword arguments.
fn split_command(command: &str) -> (String, BTreeMap<String, String>) {
    let Some((name, rest)) = command.split_once('(') else {
        return (command.to_string(), BTreeMap::new());
    };
    let inner = rest.trim_end_matches(')');
    let args = inner
        .split(", ")
        .filter_map(|arg| arg.split_once('='))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    (name.to_string(), args)
}

/// Session over a shared fake, echoing into memory.
pub fn fake_session(
    fake: &Arc<FakeMothur>,
    config: SessionConfig,
) -> (Session<Arc<FakeMothur>>, CaptureEcho) {
    let echo = CaptureEcho::new();
    let session = Session::with_executor(config, Arc::clone(fake)).with_echo(Arc::new(echo.clone()));
    (session, echo)
}

/// Config rooted in `dir` with everything else at defaults.
pub fn config_in(dir: &std::path::Path) -> SessionConfig {
    SessionConfig {
        working_dir: Some(dir.to_path_buf()),
        ..SessionConfig::default()
    }
}

/// Executor that ignores the script and replays one fixed transcript.
#[derive(Debug)]
pub struct CannedMothur {
    pub lines: Vec<String>,
    pub exit_code: Option<i32>,
    spawns: Mutex<usize>,
}

impl CannedMothur {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|line| line.to_string()).collect(),
            exit_code: Some(0),
            spawns: Mutex::new(0),
        }
    }

    pub fn with_exit_code(mut self, code: Option<i32>) -> Self {
        self.exit_code = code;
        self
    }

    pub fn spawn_count(&self) -> usize {
        *self.spawns.lock()
    }
}

impl Executor for CannedMothur {
    fn execute(&self, _invocation: &Invocation) -> Result<ExecOutput, LaunchError> {
        *self.spawns.lock() += 1;
        Ok(ExecOutput {
            exit_code: self.exit_code,
            lines: self.lines.clone(),
        })
    }
}

/// Quiet session over a canned transcript.
pub fn canned_session(canned: CannedMothur) -> Session<CannedMothur> {
    Session::with_executor(SessionConfig::default(), canned).with_echo(Arc::new(CaptureEcho::new()))
}
