use crate::builtin::Builtin;
use crate::command::{ExitCode, Outcome, Streams};
use crate::completion::Completer;
use crate::editor::{LineEditor, Signal};
use crate::env::Environment;
use crate::error::{Result, ShellError};
use crate::external::ExternalCommand;
use crate::io_adapters::RedirectSink;
use crate::lexer;
use crate::parser::{self, Command};
use std::io::{Read, Write};

/// Prompt the line editor draws in front of every input line.
pub const PROMPT: &str = "$ ";

const EOF_HINT: &str = "Use \"exit\" to leave the shell.";

/// A minimal shell-like interpreter that can execute built-in and external commands.
///
/// The interpreter owns the [`Environment`] (working directory and variables)
/// and threads it through every command, so nothing here depends on the
/// process-wide working directory.
///
/// Example
/// ```
/// use minish::{Interpreter, Outcome};
/// let mut sh = Interpreter::default();
/// let mut out = Vec::new();
/// let mut err = Vec::new();
/// let outcome = sh.run_line("echo hello   'big  world'", &mut out, &mut err);
/// assert_eq!(outcome, Outcome::Continue(0));
/// assert_eq!(out, b"hello big  world\n");
/// ```
pub struct Interpreter {
    env: Environment,
    last_status: ExitCode,
}

impl Interpreter {
    pub fn new(env: Environment) -> Self {
        Self {
            env,
            last_status: 0,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// Exit status of the most recent command.
    pub fn last_status(&self) -> ExitCode {
        self.last_status
    }

    /// Tokenize and run one input line.
    pub fn run_line(
        &mut self,
        line: &str,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Outcome {
        self.run(lexer::split_into_tokens(line), stdout, stderr)
    }

    /// Run one command given as tokens.
    ///
    /// Any failure is reported on `stderr` and becomes a non-zero status; the
    /// only way out of the shell is [`Outcome::Exit`].
    pub fn run(
        &mut self,
        tokens: Vec<String>,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Outcome {
        let outcome = match self.try_run(tokens, stdout, stderr) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::debug!("command failed: {e:?}");
                if let Err(report) = writeln!(stderr, "{e}").and_then(|()| stderr.flush()) {
                    log::warn!("could not report error: {report}");
                }
                Outcome::Continue(e.status())
            }
        };
        self.last_status = outcome.status();
        outcome
    }

    fn try_run(
        &mut self,
        tokens: Vec<String>,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<Outcome> {
        let Some(Command {
            name,
            args,
            redirection,
        }) = parser::parse_command(tokens)?
        else {
            return Ok(Outcome::Continue(self.last_status));
        };

        let target = match Builtin::from_name(&name) {
            Some(builtin) => Target::Builtin(builtin, args),
            None => Target::External(
                ExternalCommand::resolve(&self.env, &name, args)
                    .ok_or(ShellError::CommandNotFound(name))?,
            ),
        };

        // Opened up front so a bad target stops the command before it runs.
        let mut sink = redirection
            .as_ref()
            .map(|spec| RedirectSink::open(spec, &self.env))
            .transpose()?;
        let mut streams = match sink.as_mut() {
            Some(sink) => sink.route(stdout, stderr),
            None => Streams::new(stdout, stderr),
        };

        let outcome = match target {
            Target::Builtin(builtin, args) => {
                log::debug!("builtin {}", builtin.name());
                builtin.execute(&args, &mut streams, &mut self.env)?
            }
            Target::External(command) => Outcome::Continue(command.execute(&mut streams, &self.env)?),
        };
        streams.flush()?;
        Ok(outcome)
    }

    /// Read-eval-print loop: read lines with `editor` until `exit` or the end
    /// of input, and return the code the process should exit with.
    pub fn repl<R: Read, W: Write>(
        &mut self,
        editor: &mut LineEditor<R, W>,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> anyhow::Result<ExitCode> {
        loop {
            let mut completer = Completer::new(self.env.search_path());
            match editor.read_line(PROMPT, &mut completer)? {
                Signal::Line(line) => {
                    if let Outcome::Exit(code) = self.run_line(&line, stdout, stderr) {
                        log::debug!("exit requested with {code}");
                        return Ok(code);
                    }
                }
                Signal::Interrupted => continue,
                Signal::EndOfInput if editor.is_closed() => return Ok(self.last_status),
                Signal::EndOfInput => {
                    writeln!(stdout, "{EOF_HINT}")?;
                    stdout.flush()?;
                }
            }
        }
    }
}

impl Default for Interpreter {
    /// Interpreter over a snapshot of the current process environment.
    fn default() -> Self {
        Self::new(Environment::new())
    }
}

/// What a command name resolved to.
enum Target {
    Builtin(Builtin, Vec<String>),
    External(ExternalCommand),
}
