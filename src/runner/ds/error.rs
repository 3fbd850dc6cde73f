use std::fmt;

use thiserror::Error;

/// Kinds of failure the engine reports.
///
/// None of these is fatal to the host: evaluation of the current script
/// stops and the error is handed back together with its message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JErrorType {
    #[error("Lexical error: {0}")]
    LexicalError(String),
    #[error("Syntax error: {0}")]
    SyntaxError(String),
    #[error("Reference error: {0}")]
    ReferenceError(String),
    #[error("Type error: {0}")]
    TypeError(String),
    #[error("Range error: {0}")]
    RangeError(String),
    #[error("Handle error: {0}")]
    HandleError(String),
    /// A script file could not be read.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl JErrorType {
    pub fn message(&self) -> &str {
        match self {
            JErrorType::LexicalError(m)
            | JErrorType::SyntaxError(m)
            | JErrorType::ReferenceError(m)
            | JErrorType::TypeError(m)
            | JErrorType::RangeError(m)
            | JErrorType::HandleError(m)
            | JErrorType::IoError(m) => m,
        }
    }
}

/// An engine error with the script line it was raised on.
///
/// `line` is 1-based; 0 means the error is not tied to script text (for
/// example a stale engine id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsError {
    pub kind: JErrorType,
    pub line: usize,
}

impl JsError {
    pub fn new(kind: JErrorType) -> Self {
        JsError { kind, line: 0 }
    }

    pub fn at_line(kind: JErrorType, line: usize) -> Self {
        JsError { kind, line }
    }

    /// Attach `line` unless a line is already known.
    pub fn or_line(mut self, line: usize) -> Self {
        if self.line == 0 {
            self.line = line;
        }
        self
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        JsError::new(JErrorType::SyntaxError(message.into()))
    }

    pub fn reference(message: impl Into<String>) -> Self {
        JsError::new(JErrorType::ReferenceError(message.into()))
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        JsError::new(JErrorType::TypeError(message.into()))
    }

    pub fn range(message: impl Into<String>) -> Self {
        JsError::new(JErrorType::RangeError(message.into()))
    }

    pub fn handle(message: impl Into<String>) -> Self {
        JsError::new(JErrorType::HandleError(message.into()))
    }

    pub fn io(message: impl Into<String>) -> Self {
        JsError::new(JErrorType::IoError(message.into()))
    }

    pub fn message(&self) -> &str {
        self.kind.message()
    }
}

impl fmt::Display for JsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(f, "{} (line {})", self.kind, self.line)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

impl std::error::Error for JsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl From<JErrorType> for JsError {
    fn from(kind: JErrorType) -> Self {
        JsError::new(kind)
    }
}
