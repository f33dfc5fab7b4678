//! Errors reported while processing a single command line.

use std::io;
use std::path::PathBuf;

/// Everything that can go wrong between reading a line and the next prompt.
///
/// None of these end the shell: the interpreter prints the message and moves
/// on. Only `exit` terminates the process, and it does so through
/// [`Outcome::Exit`](crate::command::Outcome::Exit), not through an error.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("{0}: command not found")]
    CommandNotFound(String),

    #[error("cd: {0}: No such file or directory")]
    InvalidTarget(String),

    #[error("{}: {source}", path.display())]
    RedirectIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("exit: {0}: numeric argument required")]
    MalformedExitCode(String),

    #[error("syntax error: expected a file name after `{0}`")]
    MissingRedirectTarget(String),

    #[error("{name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ShellError {
    /// Status recorded for the command that produced this error.
    pub fn status(&self) -> i32 {
        match self {
            ShellError::CommandNotFound(_) => 127,
            ShellError::MalformedExitCode(_) | ShellError::MissingRedirectTarget(_) => 2,
            ShellError::Spawn { .. } => 126,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, ShellError>;
