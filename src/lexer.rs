//! Lexical analysis of command arguments.
//!
//! A command line such as `massrename "my photos" out show ...` is split into
//! its command name and an argument string; this module turns the argument
//! string into path tokens. Tokens are separated by whitespace, and a token
//! that starts with a double quote may contain whitespace. Inside quotes a
//! backslash escapes a following `"` or `\`; any other backslash is kept.

use thiserror::Error;

/// Errors that can occur during the lexical analysis process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    /// A closing quote was followed by something other than whitespace,
    /// as in `"a".txt`.
    #[error("illegal sequence at column {position}: a closing quote must be followed by whitespace")]
    IllegalSequence { position: usize },
    /// The input contained nothing but whitespace.
    #[error("no tokens in input")]
    NoTokens,
    /// A quoted token was still open at the end of the input.
    #[error("unterminated quote starting at column {position}")]
    UnterminatedQuote { position: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Start,
    ReadingWord,
    ReadingQuoted { opened_at: usize },
    AfterQuote,
}

struct LexingFSM {
    input: Vec<char>,
    pos: usize,
    state: LexingState,
    buffer: String,
}

impl LexingFSM {
    fn new(line: &str) -> Self {
        LexingFSM {
            input: line.trim().chars().collect(),
            pos: 0,
            state: LexingState::Start,
            buffer: String::new(),
        }
    }

    /// Runs the machine over the whole input.
    ///
    /// Each token is produced in input order. A quoted token is emitted as
    /// soon as its closing quote is read, so `""` yields an empty token.
    fn make_tokens(mut self) -> Result<Vec<String>, TokenizeError> {
        if self.input.is_empty() {
            return Err(TokenizeError::NoTokens);
        }

        let mut out = Vec::new();
        while let Some(ch) = self.read_char() {
            match self.state {
                LexingState::Start => self.handle_start(ch),
                LexingState::ReadingWord => self.handle_word(ch, &mut out),
                LexingState::ReadingQuoted { .. } => self.handle_quoted(ch, &mut out),
                LexingState::AfterQuote => self.handle_after_quote(ch)?,
            }
        }

        match self.state {
            LexingState::ReadingQuoted { opened_at } => {
                Err(TokenizeError::UnterminatedQuote { position: opened_at })
            }
            LexingState::ReadingWord => {
                out.push(std::mem::take(&mut self.buffer));
                Ok(out)
            }
            LexingState::Start | LexingState::AfterQuote => Ok(out),
        }
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
        match ch {
            c if c.is_whitespace() => {}
            '"' => {
                self.state = LexingState::ReadingQuoted {
                    opened_at: self.pos - 1,
                }
            }
            c => {
                self.buffer.push(c);
                self.state = LexingState::ReadingWord;
            }
        }
    }

    fn handle_word(&mut self, ch: char, out: &mut Vec<String>) {
        if ch.is_whitespace() {
            out.push(std::mem::take(&mut self.buffer));
            self.state = LexingState::Start;
        } else {
            self.buffer.push(ch);
        }
    }

    fn handle_quoted(&mut self, ch: char, out: &mut Vec<String>) {
        match ch {
            '\\' if matches!(self.peek_char(), Some('"' | '\\')) => {
                if let Some(escaped) = self.read_char() {
                    self.buffer.push(escaped);
                }
            }
            '"' => {
                out.push(std::mem::take(&mut self.buffer));
                self.state = LexingState::AfterQuote;
            }
            c => self.buffer.push(c),
        }
    }

    fn handle_after_quote(&mut self, ch: char) -> Result<(), TokenizeError> {
        if ch.is_whitespace() {
            self.state = LexingState::Start;
            Ok(())
        } else {
            Err(TokenizeError::IllegalSequence {
                position: self.pos - 1,
            })
        }
    }
}

/// Splits a raw argument string into path tokens.
///
/// The input is trimmed first. An input that is empty after trimming is
/// reported as [`TokenizeError::NoTokens`] so callers can tell "no arguments"
/// apart from a successful split.
pub fn split_into_tokens(line: &str) -> Result<Vec<String>, TokenizeError> {
    LexingFSM::new(line).make_tokens()
}
