use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// What the shell should do after a command has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Go back to the prompt; carries the command's exit status.
    Continue(ExitCode),
    /// Terminate the whole shell with the given code.
    Exit(ExitCode),
}

impl Outcome {
    pub fn status(self) -> ExitCode {
        match self {
            Outcome::Continue(code) | Outcome::Exit(code) => code,
        }
    }
}

/// The pair of output destinations a command writes to.
///
/// Normally both point at the terminal. When a line carries a redirection the
/// interpreter swaps one of them for the target file for the duration of a
/// single command.
pub struct Streams<'a> {
    pub stdout: &'a mut dyn Write,
    pub stderr: &'a mut dyn Write,
}

impl<'a> Streams<'a> {
    pub fn new(stdout: &'a mut dyn Write, stderr: &'a mut dyn Write) -> Self {
        Self { stdout, stderr }
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.stdout.flush()?;
        self.stderr.flush()
    }
}
