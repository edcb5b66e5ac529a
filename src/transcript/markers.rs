//! Fixed strings of mothur's console protocol.

/// Prefix mothur prints before echoing each batch command.
pub const PROMPT: &str = "mothur > ";

/// Lines containing any of these mean mothur hit an internal error.
pub const ERROR_MARKERS: &[&str] = &["[ERROR]", "***"];

/// Lines containing any of these mean mothur refused to run a command.
/// mothur reports an unknown command this way and still exits 0.
pub const HALT_MARKERS: &[&str] = &["Invalid command."];

/// Non-fatal warnings.
pub const WARNING_MARKERS: &[&str] = &["[WARNING]", "<^>", "<<<"];

/// Introduces `type=path` lines in the `get.current()` report.
pub const CURRENT_FILES_HEADER: &str = "Current files saved by mothur:";

/// Directory report lines and the state key each one fills.
pub const DIR_HEADERS: &[(&str, &str)] = &[
    ("Current input directory saved by mothur:", "input"),
    ("Current output directory saved by mothur:", "output"),
    ("Current default directory saved by mothur:", "tempdefault"),
];

/// Introduces the paths a command wrote, one per line.
pub const OUTPUT_FILES_HEADER: &str = "Output File Names:";

/// The bookkeeping query appended to every script.
pub const QUERY_COMMAND: &str = "get.current()";

pub(crate) fn contains_any(line: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| line.contains(marker))
}
