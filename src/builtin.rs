use crate::command::{ExitCode, Outcome, Streams};
use crate::env::Environment;
use crate::error::{Result, ShellError};
use crate::external::find_command_path;
use argh::{EarlyExit, FromArgs};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Commands implemented inside the shell process.
///
/// The set is closed: dispatch is a `match`, so adding a builtin means adding a
/// variant here and the compiler points at every place that has to handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Echo,
    Exit,
    Type,
    Pwd,
    Cd,
}

impl Builtin {
    pub const ALL: [Builtin; 5] = [
        Builtin::Echo,
        Builtin::Exit,
        Builtin::Type,
        Builtin::Pwd,
        Builtin::Cd,
    ];

    /// Canonical name of the command, e.g. "echo" or "cd".
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Echo => "echo",
            Builtin::Exit => "exit",
            Builtin::Type => "type",
            Builtin::Pwd => "pwd",
            Builtin::Cd => "cd",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    pub fn is_builtin(name: &str) -> bool {
        Self::from_name(name).is_some()
    }

    /// Run the builtin with `args` (command name and redirection already removed).
    ///
    /// Usage errors are reported on `streams.stderr` and turned into a
    /// non-zero status; only I/O failures on the streams come back as `Err`.
    pub fn execute(
        self,
        args: &[String],
        streams: &mut Streams<'_>,
        env: &mut Environment,
    ) -> Result<Outcome> {
        match self.dispatch(args, streams, env) {
            Err(ShellError::Io(e)) => Err(ShellError::Io(e)),
            Err(e) => {
                writeln!(streams.stderr, "{e}")?;
                Ok(Outcome::Continue(e.status()))
            }
            outcome => outcome,
        }
    }

    fn dispatch(
        self,
        args: &[String],
        streams: &mut Streams<'_>,
        env: &mut Environment,
    ) -> Result<Outcome> {
        let status = match self {
            Builtin::Echo => echo(args, streams)?,
            Builtin::Exit => match parse_args::<ExitArgs>(self, args, streams)? {
                Ok(parsed) => return parsed.run(),
                Err(status) => status,
            },
            Builtin::Type => match parse_args::<TypeArgs>(self, args, streams)? {
                Ok(parsed) => parsed.run(streams, env)?,
                Err(status) => status,
            },
            Builtin::Pwd => match parse_args::<PwdArgs>(self, args, streams)? {
                Ok(PwdArgs {}) => pwd(streams, env)?,
                Err(status) => status,
            },
            Builtin::Cd => match parse_args::<CdArgs>(self, args, streams)? {
                Ok(parsed) => parsed.run(env)?,
                Err(status) => status,
            },
        };
        Ok(Outcome::Continue(status))
    }
}

/// Parse builtin arguments with argh.
///
/// Every operand is positional, so `-1`, `-x` or `help` reach the builtin
/// as-is; only a lone `--help` asks for the usage text. When argh has
/// something to say instead (help text or a usage error) it is written to the
/// matching stream and the inner `Err` carries the status.
fn parse_args<T: FromArgs>(
    builtin: Builtin,
    args: &[String],
    streams: &mut Streams<'_>,
) -> Result<std::result::Result<T, ExitCode>> {
    let args: Vec<&str> = match args {
        [only] if only == "--help" => vec![only.as_str()],
        _ => std::iter::once("--")
            .chain(args.iter().map(String::as_str))
            .collect(),
    };
    match T::from_args(&[builtin.name()], &args) {
        Ok(parsed) => Ok(Ok(parsed)),
        Err(EarlyExit { output, status }) => {
            if status.is_ok() {
                write!(streams.stdout, "{output}")?;
                Ok(Err(0))
            } else {
                write!(streams.stderr, "{output}")?;
                Ok(Err(1))
            }
        }
    }
}

/// `echo` takes no options: every argument is printed as-is.
fn echo(args: &[String], streams: &mut Streams<'_>) -> Result<ExitCode> {
    writeln!(streams.stdout, "{}", args.join(" "))?;
    Ok(0)
}

fn pwd(streams: &mut Streams<'_>, env: &Environment) -> Result<ExitCode> {
    writeln!(streams.stdout, "{}", env.current_dir.display())?;
    Ok(0)
}

#[derive(FromArgs)]
/// Exit the shell.
struct ExitArgs {
    #[argh(positional)]
    /// exit status, 0 when omitted.
    code: Option<String>,
}

impl ExitArgs {
    fn run(self) -> Result<Outcome> {
        let code = match self.code {
            None => 0,
            Some(raw) => raw
                .parse::<ExitCode>()
                .map_err(|_| ShellError::MalformedExitCode(raw))?,
        };
        Ok(Outcome::Exit(code))
    }
}

#[derive(FromArgs)]
/// Describe how each name would be interpreted as a command.
struct TypeArgs {
    #[argh(positional, greedy)]
    /// command names to look up.
    names: Vec<String>,
}

impl TypeArgs {
    fn run(self, streams: &mut Streams<'_>, env: &Environment) -> Result<ExitCode> {
        let mut status = 0;
        for name in &self.names {
            if Builtin::is_builtin(name) {
                writeln!(streams.stdout, "{name} is a shell builtin")?;
            } else if let Some(path) = find_command_path(env, name) {
                writeln!(streams.stdout, "{name} is {}", path.display())?;
            } else {
                writeln!(streams.stdout, "{name}: not found")?;
                status = 1;
            }
        }
        Ok(status)
    }
}

#[derive(FromArgs)]
/// Print the current working directory.
struct PwdArgs {}

#[derive(FromArgs)]
/// Change the current working directory.
/// With no target, switches to the directory in HOME.
struct CdArgs {
    #[argh(positional)]
    /// directory to switch to; absolute, relative to the current directory, or starting with `~`.
    target: Option<String>,
}

impl CdArgs {
    fn run(self, env: &mut Environment) -> Result<ExitCode> {
        let home = env.home().map(str::to_owned);
        let target = match (self.target, home) {
            (Some(t), Some(home)) if t == "~" => PathBuf::from(home),
            (Some(t), Some(home)) if t.starts_with("~/") => PathBuf::from(home).join(&t[2..]),
            (Some(t), _) if !t.is_empty() => PathBuf::from(t),
            (_, Some(home)) => PathBuf::from(home),
            (_, None) => return Err(ShellError::InvalidTarget("~".into())),
        };

        let display = target.display().to_string();
        let new_dir = env.resolve(&target);
        let canonical = match fs::canonicalize(&new_dir) {
            Ok(dir) if dir.is_dir() => dir,
            _ => return Err(ShellError::InvalidTarget(display)),
        };

        env.current_dir = canonical;
        Ok(0)
    }
}
