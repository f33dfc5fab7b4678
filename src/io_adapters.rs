use crate::command::Streams;
use crate::env::Environment;
use crate::error::{Result, ShellError};
use crate::parser::{RedirectionSpec, Stream};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// A redirect target opened for exactly one command.
///
/// The file is opened before the command runs, so a bad target aborts the
/// command without running it. It is closed when the sink is dropped, at the
/// end of that command, whatever the command did.
#[derive(Debug)]
pub struct RedirectSink {
    stream: Stream,
    file: File,
}

impl RedirectSink {
    /// Open `spec.target` relative to the shell's working directory,
    /// truncating it unless the redirection appends.
    pub fn open(spec: &RedirectionSpec, env: &Environment) -> Result<Self> {
        let path = env.resolve(&spec.target);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(spec.append)
            .truncate(!spec.append)
            .open(&path)
            .map_err(|source| ShellError::RedirectIo {
                path: PathBuf::from(&spec.target),
                source,
            })?;
        log::debug!(
            "redirecting {:?} to {} (append: {})",
            spec.stream,
            path.display(),
            spec.append
        );
        Ok(Self {
            stream: spec.stream,
            file,
        })
    }

    /// Output destinations for one command: the redirected stream writes to
    /// the file, the other one still reaches `stdout` / `stderr`.
    pub fn route<'a>(
        &'a mut self,
        stdout: &'a mut dyn Write,
        stderr: &'a mut dyn Write,
    ) -> Streams<'a> {
        match self.stream {
            Stream::Stdout => Streams::new(&mut self.file, stderr),
            Stream::Stderr => Streams::new(stdout, &mut self.file),
        }
    }
}
