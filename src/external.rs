use crate::command::{ExitCode, Streams};
use crate::env::Environment;
use crate::error::{Result, ShellError};
use nix::sys::signal::{SigHandler, Signal, signal};
use nix::unistd::{AccessFlags, access};
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::io::Write;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

/// Command that is not a builtin: a program found on disk.
#[derive(Debug)]
pub struct ExternalCommand {
    /// Name as typed; becomes `argv[0]` of the child.
    name: String,
    program: PathBuf,
    args: Vec<String>,
}

impl ExternalCommand {
    pub fn new(name: String, program: PathBuf, args: Vec<String>) -> Self {
        Self {
            name,
            program,
            args,
        }
    }

    /// Resolve `name` and build the command, or `None` if no program matches.
    pub fn resolve(env: &Environment, name: &str, args: Vec<String>) -> Option<Self> {
        let program = find_command_path(env, name)?;
        log::debug!("resolved {name} to {}", program.display());
        Some(Self::new(name.to_string(), program, args))
    }

    /// Run the program to completion and relay what it printed.
    ///
    /// Both output streams are captured and handed over in one write each once
    /// the child has exited, to whatever `streams` currently points at.
    pub fn execute(self, streams: &mut Streams<'_>, env: &Environment) -> Result<ExitCode> {
        let child = std::process::Command::new(&self.program)
            .arg0(&self.name)
            .args(&self.args)
            .env_clear()
            .envs(&env.vars)
            .current_dir(&env.current_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ShellError::Spawn {
                name: self.name.clone(),
                source,
            })?;
        log::debug!("spawned {} (pid {})", self.name, child.id());

        let output = {
            let _guard = InterruptGuard::ignore();
            child.wait_with_output()?
        };

        streams.stdout.write_all(&output.stdout)?;
        streams.stderr.write_all(&output.stderr)?;
        streams.flush()?;

        let code = match output.status.code() {
            Some(x) => x,
            None => terminated_by_signal(output.status),
        };
        log::debug!("{} exited with {code}", self.name);
        Ok(code)
    }
}

/// Keeps Ctrl-C from killing the shell while a child runs in the foreground.
///
/// The child was spawned before this is installed, so it still gets the
/// default disposition and dies on SIGINT as usual.
struct InterruptGuard {
    previous: Option<SigHandler>,
}

impl InterruptGuard {
    fn ignore() -> Self {
        // SAFETY: SIG_IGN runs no handler code in this process.
        let previous = unsafe { signal(Signal::SIGINT, SigHandler::SigIgn) }.ok();
        Self { previous }
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous {
            // SAFETY: restores the disposition that was in place before `ignore`.
            if let Err(e) = unsafe { signal(Signal::SIGINT, previous) } {
                log::warn!("could not restore SIGINT disposition: {e}");
            }
        }
    }
}

fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

/// Resolve a command name the way a typical shell would.
///
/// A name containing `/` is taken as a path (relative to the shell's working
/// directory) and must be executable. Anything else is looked up in `PATH`
/// with [`find_executable`].
pub fn find_command_path(env: &Environment, name: &str) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }
    if name.contains('/') {
        let path = env.resolve(name);
        return is_executable(&path).then_some(path);
    }
    find_executable(env.search_path(), name)
}

/// Search each `PATH` directory, in order, for an executable named `name`.
///
/// Within one directory entries are visited in listing order, not sorted.
/// Directories that don't exist or can't be listed are skipped.
pub fn find_executable(search_paths: Option<&str>, name: &str) -> Option<PathBuf> {
    let search_paths = search_paths?;
    for dir in std::env::split_paths(OsStr::new(search_paths)) {
        let Some(entries) = list_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            if entry.file_name() != OsStr::new(name) {
                continue;
            }
            let path = entry.path();
            if is_executable(&path) {
                return Some(path);
            }
        }
    }
    None
}

/// Names of every executable reachable through `PATH`, deduplicated.
pub fn executables_in_path(search_paths: Option<&str>) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let Some(search_paths) = search_paths else {
        return names;
    };
    for dir in std::env::split_paths(OsStr::new(search_paths)) {
        let Some(entries) = list_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !names.contains(&name) && is_executable(&entry.path()) {
                names.insert(name);
            }
        }
    }
    names
}

fn list_dir(dir: &Path) -> Option<fs::ReadDir> {
    if !dir.is_dir() {
        return None;
    }
    match fs::read_dir(dir) {
        Ok(entries) => Some(entries),
        Err(e) => {
            log::debug!("skipping {}: {e}", dir.display());
            None
        }
    }
}

/// A non-directory the current user may execute.
fn is_executable(path: &Path) -> bool {
    !path.is_dir() && path.exists() && access(path, AccessFlags::X_OK).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, mode: u32) -> PathBuf {
        let path = dir.join(name);
        File::create(&path).expect("create file");
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).expect("chmod");
        path
    }

    fn join_paths(dirs: &[&Path]) -> String {
        std::env::join_paths(dirs)
            .expect("join paths")
            .into_string()
            .expect("utf-8 paths")
    }

    #[test]
    fn no_path_variable_finds_nothing() {
        assert_eq!(find_executable(None, "sh"), None);
    }

    #[test]
    fn finds_executable_in_path() {
        let dir = TempDir::new().unwrap();
        let tool = touch(dir.path(), "my_tool", 0o755);
        let path = join_paths(&[dir.path()]);
        assert_eq!(find_executable(Some(&path), "my_tool"), Some(tool));
    }

    #[test]
    fn skips_files_without_execute_bit() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "plain", 0o644);
        let path = join_paths(&[dir.path()]);
        assert_eq!(find_executable(Some(&path), "plain"), None);
    }

    #[test]
    fn earlier_directory_wins() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let expected = touch(first.path(), "dup", 0o755);
        touch(second.path(), "dup", 0o755);
        let path = join_paths(&[first.path(), second.path()]);
        assert_eq!(find_executable(Some(&path), "dup"), Some(expected));
    }

    #[test]
    fn falls_through_non_executable_to_later_directory() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        touch(first.path(), "tool", 0o644);
        let expected = touch(second.path(), "tool", 0o755);
        let path = join_paths(&[first.path(), second.path()]);
        assert_eq!(find_executable(Some(&path), "tool"), Some(expected));
    }

    #[test]
    fn missing_directories_are_skipped() {
        let dir = TempDir::new().unwrap();
        let expected = touch(dir.path(), "tool", 0o755);
        let missing = dir.path().join("does-not-exist");
        let path = join_paths(&[&missing, dir.path()]);
        assert_eq!(find_executable(Some(&path), "tool"), Some(expected));
    }

    #[test]
    fn directories_are_not_executables() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("subdir")).unwrap();
        let path = join_paths(&[dir.path()]);
        assert_eq!(find_executable(Some(&path), "subdir"), None);
    }

    #[test]
    fn slash_names_resolve_against_current_dir() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("bin")).unwrap();
        let expected = touch(&dir.path().join("bin"), "run", 0o755);
        let env = Environment::empty(dir.path());
        assert_eq!(find_command_path(&env, "bin/run"), Some(expected));
        assert_eq!(find_command_path(&env, "./nothing"), None);
        assert_eq!(find_command_path(&env, ""), None);
    }

    #[test]
    fn lists_executables_across_path() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        touch(first.path(), "cat", 0o755);
        touch(first.path(), "notes.txt", 0o644);
        touch(second.path(), "cp", 0o755);
        touch(second.path(), "cat", 0o755);
        let path = join_paths(&[first.path(), second.path()]);
        let names: Vec<_> = executables_in_path(Some(&path)).into_iter().collect();
        assert_eq!(names, vec!["cat", "cp"]);
    }

    #[test]
    fn execute_captures_both_streams() {
        let env = Environment::new();
        let cmd = ExternalCommand::resolve(
            &env,
            "sh",
            vec!["-c".into(), "echo out; echo err >&2; exit 3".into()],
        )
        .expect("sh on PATH");

        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = cmd
            .execute(&mut Streams::new(&mut out, &mut err), &env)
            .unwrap();

        assert_eq!(code, 3);
        assert_eq!(out, b"out\n");
        assert_eq!(err, b"err\n");
    }

    #[test]
    fn argv0_is_the_typed_name() {
        let env = Environment::new();
        let cmd = ExternalCommand::resolve(&env, "sh", vec!["-c".into(), "echo $0".into()])
            .expect("sh on PATH");
        let mut out = Vec::new();
        let mut err = Vec::new();
        cmd.execute(&mut Streams::new(&mut out, &mut err), &env)
            .unwrap();
        assert_eq!(out, b"sh\n");
    }

    #[test]
    fn child_runs_in_shell_working_directory() {
        let dir = TempDir::new().unwrap();
        let mut env = Environment::new();
        env.current_dir = fs::canonicalize(dir.path()).unwrap();
        let cmd = ExternalCommand::resolve(&env, "sh", vec!["-c".into(), "pwd -P".into()])
            .expect("sh on PATH");
        let mut out = Vec::new();
        let mut err = Vec::new();
        cmd.execute(&mut Streams::new(&mut out, &mut err), &env)
            .unwrap();
        let printed = String::from_utf8(out).unwrap();
        assert_eq!(Path::new(printed.trim_end()), env.current_dir);
    }
}
