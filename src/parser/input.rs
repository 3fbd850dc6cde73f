//! Lexer cursor state.

use crate::parser::queue::ByteQueue;
use crate::parser::token::Token;

/// Growth hint for token buffers.
pub const TOKEN_INC: usize = 110;
/// Growth hint for script buffers.
pub const SCRIPT_INC: usize = 1023;

/// Input frame of a session: the queued script text, the token being
/// assembled, one token of pushback and the line/column position.
///
/// Cloning an input frame produces an independent checkpoint that can later
/// be restored to resume lexing at exactly the same position.
#[derive(Debug, Clone)]
pub struct JsInput {
    pub(crate) tokbuf: ByteQueue,
    pub(crate) script: ByteQueue,
    pub(crate) putback: Option<Token>,
    pub(crate) line: Vec<u8>,
    pub(crate) line_number: usize,
    pub(crate) line_column: usize,
}

impl JsInput {
    pub fn new() -> Self {
        JsInput::with_capacity(SCRIPT_INC)
    }

    pub fn with_capacity(script_capacity: usize) -> Self {
        JsInput {
            tokbuf: ByteQueue::with_capacity(TOKEN_INC),
            script: ByteQueue::with_capacity(script_capacity),
            putback: None,
            line: Vec::new(),
            line_number: 1,
            line_column: 0,
        }
    }

    /// Load script text and reset the cursor.
    pub fn open_script(&mut self, script: &str) {
        self.script.flush();
        self.tokbuf.flush();
        self.script.put_bytes(script.as_bytes());
        self.putback = None;
        self.line.clear();
        self.line_number = 1;
        self.line_column = 0;
    }

    /// Discard the script and any pushed back token.
    pub fn close_script(&mut self) {
        self.script.flush();
        self.tokbuf.flush();
        self.putback = None;
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn line_column(&self) -> usize {
        self.line_column
    }

    /// Text of the current line consumed so far.
    pub fn current_line(&self) -> String {
        String::from_utf8_lossy(&self.line).into_owned()
    }

    pub(crate) fn getc(&mut self) -> Option<u8> {
        let c = self.script.getc()?;
        if c == b'\n' {
            self.line_number += 1;
            self.line_column = 0;
            self.line.clear();
        } else {
            self.line_column += 1;
            self.line.push(c);
        }
        Some(c)
    }

    pub(crate) fn peekc(&self) -> Option<u8> {
        self.script.peek()
    }
}

impl Default for JsInput {
    fn default() -> Self {
        Self::new()
    }
}
