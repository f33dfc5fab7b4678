use std::collections::HashMap;
use std::env as stdenv;
use std::path::{Path, PathBuf};

/// Process state the shell threads through every command.
///
/// The environment contains:
/// - `vars`: environment variables handed to spawned programs and consulted for
///   `PATH` and `HOME`.
/// - `current_dir`: the working directory used by `pwd`, `cd`, redirect targets
///   and spawned programs.
///
/// It is a snapshot taken at startup; later changes go through this struct
/// rather than through `std::env`, so tests can build one without touching the
/// real process.
#[derive(Debug, Clone)]
pub struct Environment {
    pub vars: HashMap<String, String>,
    pub current_dir: PathBuf,
}

impl Environment {
    /// Capture the current process state.
    pub fn new() -> Self {
        let vars = stdenv::vars().collect();
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self { vars, current_dir }
    }

    /// An environment with no variables at all, rooted at `current_dir`.
    pub fn empty(current_dir: impl Into<PathBuf>) -> Self {
        Self {
            vars: HashMap::new(),
            current_dir: current_dir.into(),
        }
    }

    pub fn get_var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    #[cfg(test)]
    fn remove_var(&mut self, key: &str) {
        self.vars.remove(key);
    }

    /// The search path, if `PATH` is set.
    pub fn search_path(&self) -> Option<&str> {
        self.get_var("PATH")
    }

    pub fn home(&self) -> Option<&str> {
        self.get_var("HOME")
    }

    /// Resolve `path` against the shell's working directory.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.current_dir.join(path)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_set_and_get_var() {
        let mut env = Environment::empty(stdenv::temp_dir());

        assert_eq!(env.get_var("SOME_RANDOM_ENV_VAR_12345"), None);

        env.set_var("KEY", "VALUE");
        assert_eq!(env.get_var("KEY"), Some("VALUE"));

        env.remove_var("KEY");
        assert_eq!(env.get_var("KEY"), None);
    }

    #[test]
    fn test_empty_env_has_no_search_path() {
        let env = Environment::empty("/");
        assert_eq!(env.search_path(), None);
        assert_eq!(env.home(), None);
    }

    #[test]
    fn test_env_reads_from_process_env() {
        let env = Environment::new();
        assert_eq!(env.search_path(), stdenv::var("PATH").ok().as_deref());
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let env = Environment::empty("/work");
        assert_eq!(env.resolve("out.txt"), PathBuf::from("/work/out.txt"));
        assert_eq!(env.resolve("/tmp/out.txt"), PathBuf::from("/tmp/out.txt"));
    }
}
