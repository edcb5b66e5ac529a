//! The real process executor against shell scripts standing in for mothur.

#![cfg(unix)]

use mothur_session::command::{ParamValue, Params};
use mothur_session::config::{SessionConfig, Verbosity};
use mothur_session::executor::{Executor, Invocation, LaunchError, ProcessExecutor};
use mothur_session::session::Session;
use mothur_session::transcript::CaptureEcho;
use parking_lot::Mutex;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Writing an executable while another test forks can fail with
/// "text file busy"; script tests run one at a time.
static SCRIPT_LOCK: Mutex<()> = Mutex::new(());

const FAKE_MOTHUR: &str = r##"#!/bin/sh
echo "mothur v.1.48.0"
echo ""
printf '%s\n' "${1#"#"}" | tr ';' '\n' | while read -r cmd; do
  echo "mothur > $cmd"
  case "$cmd" in
    set.logfile*)
      name=$(printf '%s' "$cmd" | sed 's/^set\.logfile(name=\(.*\))$/\1/')
      echo "log" > "$name"
      ;;
    summary.seqs*)
      echo "[WARNING]: short sequences" >&2
      echo "Output File Names:"
      echo "a.summary"
      echo ""
      ;;
    get.current*)
      echo "Current files saved by mothur:"
      echo "fasta=a.fasta"
      echo ""
      echo "Current default directory saved by mothur: $(pwd)/"
      ;;
  esac
done
exit 0
"##;

fn write_script(dir: &Path, name: &str, body: &str, mode: u32) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
    path
}

fn invocation(program: &Path, argument: &str) -> Invocation {
    Invocation {
        program: program.display().to_string(),
        argument: argument.to_string(),
        cwd: None,
    }
}

#[test]
fn test_missing_executable() {
    let err = ProcessExecutor::new()
        .execute(&Invocation {
            program: "mothur-not-installed-0d1e".to_string(),
            argument: "#help()".to_string(),
            cwd: None,
        })
        .unwrap_err();
    assert!(matches!(err, LaunchError::ExecutableNotFound { .. }));

    let dir = TempDir::new().unwrap();
    let err = ProcessExecutor::new()
        .execute(&invocation(&dir.path().join("mothur"), "#help()"))
        .unwrap_err();
    assert!(matches!(err, LaunchError::ExecutableNotFound { .. }));
}

#[test]
fn test_permission_denied() {
    let _guard = SCRIPT_LOCK.lock();
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "mothur", "#!/bin/sh\necho hi\n", 0o644);

    let err = ProcessExecutor::new()
        .execute(&invocation(&script, "#help()"))
        .unwrap_err();
    assert!(matches!(err, LaunchError::PermissionDenied { .. }));
}

#[test]
fn test_exit_status_is_data() {
    let _guard = SCRIPT_LOCK.lock();
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "mothur", "#!/bin/sh\necho \"$1\"\nexit 3\n", 0o755);

    let output = ProcessExecutor::new()
        .execute(&invocation(&script, "#help(); get.current()"))
        .unwrap();
    assert_eq!(output.exit_code, Some(3));
    assert_eq!(output.lines, vec!["#help(); get.current()"]);
}

#[test]
fn test_stdout_and_stderr_interleave_in_order() {
    let _guard = SCRIPT_LOCK.lock();
    let dir = TempDir::new().unwrap();
    let script = write_script(
        dir.path(),
        "mothur",
        "#!/bin/sh\necho one\necho two >&2\nprintf 'three\\r\\n'\necho four >&2\n",
        0o755,
    );

    let output = ProcessExecutor::new()
        .execute(&invocation(&script, "#help()"))
        .unwrap();
    assert_eq!(output.exit_code, Some(0));
    assert_eq!(output.lines, vec!["one", "two", "three", "four"]);
}

#[test]
fn test_runs_in_working_directory() {
    let _guard = SCRIPT_LOCK.lock();
    let bin = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let script = write_script(bin.path(), "mothur", "#!/bin/sh\npwd\n", 0o755);

    let mut call = invocation(&script, "#help()");
    call.cwd = Some(work.path().to_path_buf());
    let output = ProcessExecutor::new().execute(&call).unwrap();

    let reported = fs::canonicalize(&output.lines[0]).unwrap();
    assert_eq!(reported, fs::canonicalize(work.path()).unwrap());

    call.cwd = Some(work.path().join("gone"));
    assert!(matches!(
        ProcessExecutor::new().execute(&call),
        Err(LaunchError::Io { .. })
    ));
}

#[test]
fn test_full_session_against_script() {
    let _guard = SCRIPT_LOCK.lock();
    let bin = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let script = write_script(bin.path(), "mothur", FAKE_MOTHUR, 0o755);

    let config = SessionConfig {
        executable: script.display().to_string(),
        working_dir: Some(work.path().to_path_buf()),
        verbosity: Verbosity::Normal,
        logfile: Some("session.logfile".to_string()),
        suppress_logfile: true,
        ..SessionConfig::default()
    };
    let echo = CaptureEcho::new();
    let mut session = Session::new(config).with_echo(Arc::new(echo.clone()));

    session
        .command("summary.seqs")
        .call(Params::new().with("fasta", ParamValue::current()))
        .unwrap();

    assert_eq!(session.current_files()["fasta"], "a.fasta");
    assert_eq!(session.output_files()["summary"], vec!["a.summary"]);
    assert!(session.current_dirs()["tempdefault"].ends_with('/'));
    assert!(!work.path().join("session.logfile").exists());

    let echoed = echo.lines();
    assert!(echoed.contains(&"mothur > summary.seqs(fasta=current)".to_string()));
    assert!(echoed.contains(&"[WARNING]: short sequences".to_string()));
    assert!(!echoed.iter().any(|line| line.contains("set.logfile")));
}
