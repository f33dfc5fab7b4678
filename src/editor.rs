//! Reads one line of input from raw keystrokes.

use crate::completion::Completer;
use crate::tty::RawMode;
use std::io::{self, IsTerminal, Read, Stdin, Stdout, Write};

const CTRL_C: u8 = 0x03;
const CTRL_D: u8 = 0x04;
const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7f;
const BELL: &[u8] = b"\x07";
/// Erase from the cursor to the end of the line.
const CLEAR_TO_EOL: &[u8] = b"\x1b[K";

/// How a line read ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// Enter was pressed; the finished line without the newline.
    Line(String),
    /// Ctrl-C; the partial line was discarded.
    Interrupted,
    /// Ctrl-D on an empty line, or the input stream ended.
    EndOfInput,
}

/// A minimal line editor: append, backspace, Tab completion, Ctrl-C, Ctrl-D.
///
/// The cursor always sits at the end of the buffer. After every key the whole
/// line is redrawn as prompt plus buffer, so the screen matches the buffer
/// exactly.
pub struct LineEditor<R, W> {
    input: R,
    output: W,
    raw_mode: bool,
    closed: bool,
}

impl LineEditor<Stdin, Stdout> {
    /// Editor on the process's stdin and stdout. Raw mode is used only when
    /// stdin is a terminal; piped input is read byte by byte as is.
    pub fn stdio() -> Self {
        let input = io::stdin();
        let raw_mode = input.is_terminal();
        log::debug!("line editor on stdio (raw mode: {raw_mode})");
        Self {
            input,
            output: io::stdout(),
            raw_mode,
            closed: false,
        }
    }
}

impl<R: Read, W: Write> LineEditor<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            raw_mode: false,
            closed: false,
        }
    }

    /// True once the input stream has run dry; further reads return
    /// [`Signal::EndOfInput`] immediately.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[cfg(test)]
    fn output_mut(&mut self) -> &mut W {
        &mut self.output
    }

    /// Read one line, showing `prompt` in front of it.
    pub fn read_line(&mut self, prompt: &str, completer: &mut Completer) -> io::Result<Signal> {
        let _raw = if self.raw_mode {
            Some(RawMode::enable()?)
        } else {
            None
        };

        let mut buffer: Vec<u8> = Vec::new();
        loop {
            self.redraw(prompt, &buffer)?;

            let Some(byte) = self.next_byte()? else {
                self.closed = true;
                self.newline()?;
                return Ok(if buffer.is_empty() {
                    Signal::EndOfInput
                } else {
                    Signal::Line(into_string(buffer))
                });
            };
            log::trace!("key {byte:#04x}");

            match byte {
                b'\r' | b'\n' => {
                    self.newline()?;
                    return Ok(Signal::Line(into_string(buffer)));
                }
                b'\t' => {
                    let current = String::from_utf8_lossy(&buffer).into_owned();
                    match completer.complete(&current) {
                        Some(completed) => buffer = completed.into_bytes(),
                        None => self.bell()?,
                    }
                }
                BACKSPACE | DELETE => pop_char(&mut buffer),
                CTRL_C => {
                    self.output.write_all(b"^C")?;
                    self.newline()?;
                    return Ok(Signal::Interrupted);
                }
                CTRL_D => {
                    if buffer.is_empty() {
                        self.newline()?;
                        return Ok(Signal::EndOfInput);
                    }
                }
                other => buffer.push(other),
            }
        }
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        if self.closed {
            return Ok(None);
        }
        let mut byte = [0u8; 1];
        loop {
            match self.input.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn redraw(&mut self, prompt: &str, buffer: &[u8]) -> io::Result<()> {
        self.output.write_all(b"\r")?;
        self.output.write_all(prompt.as_bytes())?;
        self.output.write_all(buffer)?;
        self.output.write_all(CLEAR_TO_EOL)?;
        self.output.flush()
    }

    /// Raw mode turns off output post-processing, so a bare `\n` would not
    /// return the carriage.
    fn newline(&mut self) -> io::Result<()> {
        self.output.write_all(b"\r\n")?;
        self.output.flush()
    }

    fn bell(&mut self) -> io::Result<()> {
        self.output.write_all(BELL)?;
        self.output.flush()
    }
}

/// Remove the last character, which may span several UTF-8 bytes.
fn pop_char(buffer: &mut Vec<u8>) {
    while let Some(byte) = buffer.pop() {
        // Continuation bytes look like 0b10xx_xxxx; stop after the lead byte.
        if byte & 0xc0 != 0x80 {
            break;
        }
    }
}

fn into_string(buffer: Vec<u8>) -> String {
    String::from_utf8(buffer).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}
