mod cli;

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use fs2::FileExt;
use mothur_session::session::SessionState;
use mothur_session::{CommandLine, Config, Pipeline, Session};

use crate::cli::{parse_params, Cli, Command};

fn main() -> ExitCode {
    mothur_session::init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    cli.apply(&mut config);
    config.validate()?;

    let state_path = config.session.state_file.clone();
    let _lock = lock_state(&state_path)?;

    match cli.command {
        Command::State { reset: true } => {
            SessionState::default().save(&state_path)?;
            tracing::info!(path = %state_path.display(), "Session state cleared");
        }
        Command::State { reset: false } => {
            let state = SessionState::load_or_default(&state_path)?;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        Command::Run { command, params } => {
            let mut session = open_session(&config, &state_path)?;
            let line = CommandLine::new(command.as_str(), parse_params(&params));
            session
                .run(&line)
                .with_context(|| format!("mothur command '{}' failed", command))?;
            session.state().save(&state_path)?;
        }
        Command::Pipeline { file } => {
            let pipeline = Pipeline::load(&file)?;
            let mut session = open_session(&config, &state_path)?;
            pipeline.run(&mut session, |index, session| {
                tracing::debug!(step = index, path = %state_path.display(), "Saving session state");
                session.state().save(&state_path)
            })?;
        }
    }

    Ok(())
}

fn open_session(config: &Config, state_path: &Path) -> anyhow::Result<Session> {
    let state = SessionState::load_or_default(state_path)?;
    Ok(Session::new(config.session_config()).with_state(state))
}

/// Exclusive lock on `<state>.lock`, held until the returned file is dropped.
fn lock_state(state_path: &Path) -> anyhow::Result<File> {
    let mut lock_path = state_path.as_os_str().to_owned();
    lock_path.push(".lock");

    if let Some(parent) = state_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create '{}'", parent.display()))?;
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)
        .with_context(|| format!("Failed to open lock file '{}'", Path::new(&lock_path).display()))?;
    file.lock_exclusive()
        .with_context(|| format!("Failed to lock '{}'", Path::new(&lock_path).display()))?;
    Ok(file)
}
