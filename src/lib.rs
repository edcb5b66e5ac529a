//! Drive the stateless mothur command-line tool as a stateful session.
//!
//! mothur forgets everything between invocations in batch mode. A
//! [`Session`] keeps the files and directories mothur would have remembered,
//! replays them before every command and reads the updated set back from
//! mothur's own report.

pub mod command;
pub mod config;
pub mod executor;
pub mod pipeline;
pub mod session;
pub mod transcript;

pub use command::{CommandLine, CommandPath, ParamValue, Params};
pub use config::{Config, SessionConfig, Verbosity};
pub use executor::{ExecOutput, Executor, Invocation, LaunchError, ProcessExecutor};
pub use pipeline::{Pipeline, PipelineError, Step};
pub use session::{Session, SessionError, SessionState};

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// Logs go to stderr so echoed mothur output on stdout stays clean.
/// Filtering follows `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();
}
