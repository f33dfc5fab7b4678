//! A small interactive shell.
//!
//! A line goes through three stages: the [`editor`] reads raw keystrokes
//! (with Tab completion from [`completion`]), the [`lexer`] splits the line
//! into tokens, and the [`Interpreter`] strips any output redirection and runs
//! either a [`builtin`] or a program found on `PATH`.
//!
//! The working directory and variables live in [`env::Environment`] and are
//! passed explicitly to every command rather than read from process globals.

pub mod builtin;
pub mod command;
pub mod completion;
pub mod editor;
pub mod env;
pub mod error;
pub mod external;
mod interpreter;
mod io_adapters;
pub mod lexer;
pub mod parser;
mod tty;

pub use command::{ExitCode, Outcome};
pub use editor::{LineEditor, Signal};
pub use error::ShellError;
pub use interpreter::{Interpreter, PROMPT};
