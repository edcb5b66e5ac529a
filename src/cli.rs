use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mothur_session::{Config, ParamValue, Params, Verbosity};

/// Run mothur commands as one stateful session.
#[derive(Debug, Parser)]
#[command(name = "mothur-session", version, about)]
pub struct Cli {
    /// Config file (default: <config dir>/mothur-session/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Session state file
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    /// mothur executable name or path
    #[arg(long, global = true)]
    pub executable: Option<String>,

    /// Directory mothur runs in
    #[arg(long, global = true)]
    pub working_dir: Option<PathBuf>,

    /// 0 = quiet, 1 = command output, 2 = everything
    #[arg(short, long, global = true, value_parser = parse_verbosity)]
    pub verbosity: Option<Verbosity>,

    /// Seed added to every command that accepts one
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Fixed mothur logfile name
    #[arg(long, global = true)]
    pub logfile: Option<String>,

    /// Delete mothur's logfile after each successful command
    #[arg(long, global = true)]
    pub suppress_logfile: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one mothur command, e.g. `run summary.seqs fasta=current`
    Run {
        /// Dotted mothur command name
        command: String,
        /// KEY=VALUE parameters; a token without `=` is passed positionally
        params: Vec<String>,
    },
    /// Run the [[step]] entries of a TOML pipeline file in order
    Pipeline { file: PathBuf },
    /// Print the saved session state as JSON
    State {
        /// Clear the saved state instead
        #[arg(long)]
        reset: bool,
    },
}

impl Cli {
    /// Layer command-line overrides on top of the file configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(state) = &self.state {
            config.session.state_file = state.clone();
        }
        if let Some(executable) = &self.executable {
            config.mothur.executable = executable.clone();
        }
        if let Some(dir) = &self.working_dir {
            config.mothur.working_dir = Some(dir.clone());
        }
        if let Some(verbosity) = self.verbosity {
            config.session.verbosity = verbosity;
        }
        if let Some(seed) = self.seed {
            config.session.seed = Some(seed);
        }
        if let Some(logfile) = &self.logfile {
            config.session.logfile = Some(logfile.clone());
        }
        if self.suppress_logfile {
            config.session.suppress_logfile = true;
        }
    }
}

/// Build parameters from `KEY=VALUE` tokens.
pub fn parse_params(tokens: &[String]) -> Params {
    tokens
        .iter()
        .fold(Params::new(), |params, token| match token.split_once('=') {
            Some((key, value)) => params.with(key.trim(), ParamValue::parse(value.trim())),
            None => params.positional(ParamValue::parse(token.trim())),
        })
}

fn parse_verbosity(value: &str) -> Result<Verbosity, String> {
    let level: u8 = value
        .parse()
        .map_err(|_| format!("verbosity must be 0, 1, or 2 (got {})", value))?;
    Verbosity::try_from(level)
}
