//! Raw terminal mode for reading keystrokes one byte at a time.

use nix::sys::termios::{self, SetArg, Termios};
use std::io;
use std::os::fd::AsFd;

/// Puts the terminal on stdin into raw mode until dropped.
///
/// While held, the terminal neither echoes nor buffers lines, and Ctrl-C /
/// Ctrl-D arrive as plain bytes instead of signals. Dropping the guard puts
/// back the attributes that were in effect before, on every exit path.
pub struct RawMode {
    original: Termios,
}

impl RawMode {
    pub fn enable() -> io::Result<Self> {
        let stdin = io::stdin();
        let original = termios::tcgetattr(stdin.as_fd())?;
        let mut raw = original.clone();
        termios::cfmakeraw(&mut raw);
        termios::tcsetattr(stdin.as_fd(), SetArg::TCSANOW, &raw)?;
        log::trace!("terminal switched to raw mode");
        Ok(Self { original })
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let stdin = io::stdin();
        match termios::tcsetattr(stdin.as_fd(), SetArg::TCSANOW, &self.original) {
            Ok(()) => log::trace!("terminal attributes restored"),
            Err(e) => log::warn!("failed to restore terminal attributes: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::IsTerminal;

    #[test]
    fn enable_fails_without_a_terminal() {
        if io::stdin().is_terminal() {
            return;
        }
        assert!(RawMode::enable().is_err());
    }
}
