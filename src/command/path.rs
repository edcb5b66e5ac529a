//! Dotted command accumulator bound to a session.

use crate::command::line::CommandLine;
use crate::command::params::Params;
use crate::executor::Executor;
use crate::session::{Session, SessionError};

/// Name segments collected so far, plus the session that will run them.
///
/// Built with [`Session::command`] and extended with [`CommandPath::attr`];
/// each step consumes the previous path, so a path is never modified behind
/// the caller's back. [`CommandPath::call`] hands the command to the session.
pub struct CommandPath<'s, E: Executor> {
    session: &'s mut Session<E>,
    segments: Vec<String>,
}

impl<'s, E: Executor> CommandPath<'s, E> {
    pub(crate) fn new(session: &'s mut Session<E>, name: &str) -> Self {
        Self {
            session,
            segments: split_segments(name),
        }
    }

    /// Append one or more dotted segments.
    pub fn attr(mut self, segment: &str) -> Self {
        self.segments.extend(split_segments(segment));
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Joined command name, e.g. `summary.seqs`.
    pub fn name(&self) -> String {
        self.segments.join(".")
    }

    /// The command this path would run with `params`.
    pub fn line(&self, params: Params) -> CommandLine {
        CommandLine::new(self.name(), params)
    }

    /// Run the command in the owning session.
    ///
    /// Nothing is returned on success; read the session's current files,
    /// current dirs and output files afterwards.
    pub fn call(self, params: Params) -> Result<(), SessionError> {
        let line = self.line(params);
        self.session.run(&line)
    }
}

fn split_segments(name: &str) -> Vec<String> {
    name.split('.')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(String::from)
        .collect()
}
