//! Lexical analysis: splits a raw input line into argument tokens.
//!
//! Quoting follows POSIX shell rules closely enough for interactive use:
//! single quotes preserve everything literally, double quotes only honour
//! `\"`, `\$`, `\\` and `` \` ``, and an unquoted backslash escapes any
//! character. Nothing here ever fails; an unterminated quote simply ends the
//! last token at the end of the line.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    /// Between tokens, skipping whitespace.
    Start,
    /// Inside an unquoted part of a token.
    ReadingWord,
    ReadingSingleQuote,
    ReadingDoubleQuote,
}

/// Characters a backslash may escape inside double quotes.
const DOUBLE_QUOTE_ESCAPES: [char; 4] = ['"', '$', '\\', '`'];

struct LexingFSM {
    input: Vec<char>,
    pos: usize,
    state: LexingState,
    buffer: String,
}

impl LexingFSM {
    fn new(line: &str) -> Self {
        LexingFSM {
            input: line.chars().collect(),
            pos: 0,
            state: LexingState::Start,
            buffer: String::new(),
        }
    }

    /// Runs the machine over the whole input and returns the tokens in order.
    ///
    /// A token is emitted whenever unquoted whitespace follows a started word,
    /// including words made only of an empty quote pair such as `''`.
    fn make_tokens(mut self) -> Vec<String> {
        let mut out = Vec::new();

        while let Some(ch) = self.read_char() {
            match self.state {
                LexingState::Start => self.handle_start(ch),
                LexingState::ReadingWord => self.handle_word(ch, &mut out),
                LexingState::ReadingSingleQuote => self.handle_single_quote(ch),
                LexingState::ReadingDoubleQuote => self.handle_double_quote(ch),
            }
        }

        match self.state {
            LexingState::Start => {}
            LexingState::ReadingWord => out.push(self.buffer),
            // Unterminated quote: keep whatever was collected.
            LexingState::ReadingSingleQuote | LexingState::ReadingDoubleQuote => {
                if !self.buffer.is_empty() {
                    out.push(self.buffer);
                }
            }
        }

        out
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn handle_start(&mut self, ch: char) {
        if ch.is_whitespace() {
            return;
        }
        self.state = LexingState::ReadingWord;
        self.handle_unquoted(ch);
    }

    fn handle_word(&mut self, ch: char, out: &mut Vec<String>) {
        if ch.is_whitespace() {
            out.push(std::mem::take(&mut self.buffer));
            self.state = LexingState::Start;
        } else {
            self.handle_unquoted(ch);
        }
    }

    /// Shared by `Start` and `ReadingWord` once we know `ch` belongs to a word.
    fn handle_unquoted(&mut self, ch: char) {
        match ch {
            '\\' => match self.read_char() {
                Some(escaped) => self.buffer.push(escaped),
                None => self.buffer.push('\\'),
            },
            '\'' => self.state = LexingState::ReadingSingleQuote,
            '"' => self.state = LexingState::ReadingDoubleQuote,
            c => self.buffer.push(c),
        }
    }

    fn handle_single_quote(&mut self, ch: char) {
        match ch {
            '\'' => self.state = LexingState::ReadingWord,
            c => self.buffer.push(c),
        }
    }

    fn handle_double_quote(&mut self, ch: char) {
        match ch {
            '"' => self.state = LexingState::ReadingWord,
            '\\' => match self.peek_char() {
                Some(next) if DOUBLE_QUOTE_ESCAPES.contains(&next) => {
                    self.read_char();
                    self.buffer.push(next);
                }
                // Not an escape: the backslash stays and the next char is
                // handled on its own.
                _ => self.buffer.push('\\'),
            },
            c => self.buffer.push(c),
        }
    }
}

/// Splits `line` into tokens, applying quote and escape rules.
///
/// # Examples
/// ```
/// use minish::lexer::split_into_tokens;
/// assert_eq!(
///     split_into_tokens(r#"echo 'hello   world' "a\"b""#),
///     vec!["echo", "hello   world", "a\"b"]
/// );
/// ```
pub fn split_into_tokens(line: &str) -> Vec<String> {
    LexingFSM::new(line).make_tokens()
}
