//! Parser states and evaluation flags.

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

/// Grammatical positions of the parsing state machine.
///
/// The `*Done` states are what a sub-grammar reports back once it has been
/// fully consumed. `Eof` ends a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Eof,
    Cond,
    CondDone,
    RelExp,
    RelExpDone,
    Expr,
    ExprDone,
    Stmt,
    StmtDone,
    StmtBlockDone,
    ArgList,
    ArgListDone,
    DecList,
    DecListDone,
    Dec,
    DecDone,
    Ret,
}

impl State {
    pub const BEGIN: State = State::Stmt;

    /// Whether the lexer reports newlines as tokens in this state.
    /// Only positions that look for the end of a statement care.
    pub fn newline_is_token(&self) -> bool {
        matches!(self, State::Stmt | State::StmtDone)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Evaluation flags passed down the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags(u8);

impl Flags {
    pub const NONE: Flags = Flags(0);
    /// Execute statements. Without it the parser only scans.
    pub const EXE: Flags = Flags(0x1);

    pub fn is_exe(&self) -> bool {
        self.0 & Flags::EXE.0 != 0
    }

    /// Same flags with execution turned off.
    pub fn scan(self) -> Flags {
        self & !Flags::EXE
    }

    /// Keep execution only when `cond` holds.
    pub fn exe_if(self, cond: bool) -> Flags {
        if cond {
            self
        } else {
            self.scan()
        }
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl BitAnd for Flags {
    type Output = Flags;

    fn bitand(self, rhs: Flags) -> Flags {
        Flags(self.0 & rhs.0)
    }
}

impl Not for Flags {
    type Output = Flags;

    fn not(self) -> Flags {
        Flags(!self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        assert!(Flags::EXE.is_exe());
        assert!(!Flags::EXE.scan().is_exe());
        assert!(!Flags::NONE.is_exe());
        assert!(Flags::EXE.exe_if(true).is_exe());
        assert!(!Flags::EXE.exe_if(false).is_exe());
        assert!(!Flags::NONE.exe_if(true).is_exe());
    }

    #[test]
    fn test_newline_states() {
        assert!(State::Stmt.newline_is_token());
        assert!(State::StmtDone.newline_is_token());
        assert!(!State::Expr.newline_is_token());
        assert!(!State::Cond.newline_is_token());
        assert_eq!(State::BEGIN, State::Stmt);
    }
}
