//! Turns a token list into a [`Command`]: name, arguments and an optional
//! output redirection.

use crate::error::{Result, ShellError};

/// Which output stream a redirection captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Output redirection attached to a command, e.g. `2>> errors.log`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectionSpec {
    pub stream: Stream,
    pub target: String,
    /// `>>` appends; `>` truncates first.
    pub append: bool,
}

/// A single command ready for dispatch.
///
/// `args` never contains a redirection operator or its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
    pub redirection: Option<RedirectionSpec>,
}

/// Every operator recognised, with the stream it selects and whether it appends.
const REDIRECTIONS: &[(&str, Stream, bool)] = &[
    (">", Stream::Stdout, false),
    ("1>", Stream::Stdout, false),
    ("2>", Stream::Stderr, false),
    (">>", Stream::Stdout, true),
    ("1>>", Stream::Stdout, true),
    ("2>>", Stream::Stderr, true),
];

fn redirection_operator(token: &str) -> Option<(Stream, bool)> {
    REDIRECTIONS
        .iter()
        .find(|(op, _, _)| *op == token)
        .map(|&(_, stream, append)| (stream, append))
}

/// Build a [`Command`] from tokens.
///
/// Only the first redirection operator is honoured. The operator, its target
/// and anything after the target are dropped from the argument list. Returns
/// `Ok(None)` for an empty line.
pub fn parse_command(mut tokens: Vec<String>) -> Result<Option<Command>> {
    let mut redirection = None;

    let found = tokens
        .iter()
        .enumerate()
        .find_map(|(i, t)| redirection_operator(t).map(|op| (i, op)));

    if let Some((pos, (stream, append))) = found {
        let target = match tokens.get(pos + 1) {
            Some(target) => target.clone(),
            None => return Err(ShellError::MissingRedirectTarget(tokens[pos].clone())),
        };
        tokens.truncate(pos);
        redirection = Some(RedirectionSpec {
            stream,
            target,
            append,
        });
    }

    let mut tokens = tokens.into_iter();
    let Some(name) = tokens.next() else {
        return Ok(None);
    };

    Ok(Some(Command {
        name,
        args: tokens.collect(),
        redirection,
    }))
}
