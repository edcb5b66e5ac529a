//! `std::process` backed executor.

use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::executor::{ExecOutput, Executor, Invocation, LaunchError};

/// Spawns the real mothur binary.
///
/// stdout and stderr share one pipe so the transcript keeps mothur's own
/// interleaving. The call blocks until mothur exits; there is no timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Executor for ProcessExecutor {
    fn execute(&self, invocation: &Invocation) -> Result<ExecOutput, LaunchError> {
        let program = resolve_program(&invocation.program)?;
        let launch_error = |source: io::Error| LaunchError::from_io(&invocation.program, source);

        if let Some(cwd) = &invocation.cwd {
            if !cwd.is_dir() {
                return Err(LaunchError::Io {
                    program: invocation.program.clone(),
                    source: io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("working directory '{}' does not exist", cwd.display()),
                    ),
                });
            }
        }

        let (reader, writer) = io::pipe().map_err(launch_error)?;
        let mut command = Command::new(&program);
        command
            .arg(&invocation.argument)
            .stdin(Stdio::null())
            .stdout(writer.try_clone().map_err(launch_error)?)
            .stderr(writer);
        if let Some(cwd) = &invocation.cwd {
            command.current_dir(cwd);
        }

        tracing::debug!(program = %program.display(), "Spawning mothur");
        let mut child = command.spawn().map_err(launch_error)?;
        // The command still owns the write ends; the reader only sees EOF
        // once every copy is closed.
        drop(command);

        let lines = match read_lines(reader) {
            Ok(lines) => lines,
            Err(source) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(LaunchError::Io {
                    program: invocation.program.clone(),
                    source,
                });
            }
        };

        let status = child.wait().map_err(|source| LaunchError::Io {
            program: invocation.program.clone(),
            source,
        })?;

        tracing::debug!(
            exit_code = ?status.code(),
            lines = lines.len(),
            "mothur exited"
        );

        Ok(ExecOutput {
            exit_code: status.code(),
            lines,
        })
    }
}

/// Bare names are looked up on `PATH`; anything path-like is handed to the
/// OS as-is so it can report missing files and permission problems itself.
fn resolve_program(program: &str) -> Result<PathBuf, LaunchError> {
    let path = Path::new(program);
    if path.is_absolute() || path.components().count() > 1 {
        return Ok(path.to_path_buf());
    }
    which::which(program).map_err(|_| LaunchError::ExecutableNotFound {
        program: program.to_string(),
    })
}

fn read_lines(reader: impl Read) -> io::Result<Vec<String>> {
    let mut reader = BufReader::new(reader);
    let mut lines = Vec::new();
    let mut raw = Vec::new();
    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw)? == 0 {
            break;
        }
        lines.push(decode_line(&raw));
    }
    Ok(lines)
}

fn decode_line(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    text.trim_end_matches('\n').replace('\r', "")
}
