//! Cleanup of the logfile mothur writes on every run.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Suffix of every mothur logfile.
pub const LOGFILE_SUFFIX: &str = ".logfile";

/// Slack for filesystems with coarse modification times.
const MTIME_SLACK: Duration = Duration::from_secs(2);

/// A fresh `mothur.<uuid>.logfile` name, for giving cloned sessions
/// logfiles that cannot collide.
pub fn unique_logfile_name() -> String {
    format!("mothur.{}{}", uuid::Uuid::new_v4().simple(), LOGFILE_SUFFIX)
}

/// Directories mothur may leave its logfile in: the working directory and
/// the output directory (relative output directories are resolved against
/// the working directory).
pub fn search_dirs(working_dir: Option<&Path>, output_dir: Option<&str>) -> Vec<PathBuf> {
    let base = working_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let mut dirs = vec![base.clone()];
    if let Some(out) = output_dir {
        let out = base.join(out);
        if !dirs.contains(&out) {
            dirs.push(out);
        }
    }
    dirs
}

/// Remembers what is needed before a run to find that run's logfile after it.
#[derive(Debug, Clone)]
pub struct LogfileTracker {
    configured: Option<String>,
    known: BTreeSet<PathBuf>,
    started: SystemTime,
}

impl LogfileTracker {
    /// Take the pre-run snapshot. Without a configured name, every logfile
    /// already present in `dirs` is recorded so it is never mistaken for
    /// this run's.
    pub fn prepare(configured: Option<&str>, dirs: &[PathBuf]) -> Self {
        let known = match configured {
            Some(_) => BTreeSet::new(),
            None => dirs.iter().flat_map(|dir| logfiles_in(dir)).collect(),
        };
        Self {
            configured: configured.map(String::from),
            known,
            started: SystemTime::now(),
        }
    }

    /// Delete this run's logfile from `dirs`, returning what was removed.
    pub fn cleanup(&self, dirs: &[PathBuf]) -> Vec<PathBuf> {
        let candidates: BTreeSet<PathBuf> = match &self.configured {
            Some(name) => dirs
                .iter()
                .map(|dir| dir.join(name))
                .filter(|path| path.is_file())
                .collect(),
            None => dirs.iter().filter_map(|dir| self.newest_unknown(dir)).collect(),
        };

        let mut removed = Vec::new();
        for path in candidates {
            match fs::remove_file(&path) {
                Ok(()) => removed.push(path),
                Err(e) => tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Could not delete mothur logfile"
                ),
            }
        }

        if removed.is_empty() {
            tracing::warn!(
                logfile = self.configured.as_deref().unwrap_or("<auto>"),
                "Could not find mothur logfile to delete; remove it manually"
            );
        }
        removed
    }

    fn newest_unknown(&self, dir: &Path) -> Option<PathBuf> {
        let threshold = self.started.checked_sub(MTIME_SLACK).unwrap_or(self.started);
        logfiles_in(dir)
            .into_iter()
            .filter(|path| !self.known.contains(path))
            .filter_map(|path| {
                let modified = fs::metadata(&path).and_then(|m| m.modified()).ok()?;
                (modified >= threshold).then_some((modified, path))
            })
            .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
            .map(|(_, path)| path)
    }
}

fn logfiles_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.ends_with(LOGFILE_SUFFIX))
        })
        .collect()
}
