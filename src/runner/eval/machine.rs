//! The parsing state machine.
//!
//! Every grammatical construct being parsed is a [`Frame`] on an explicit
//! stack. The driver repeatedly steps the top frame: a frame either asks for
//! a sub-construct to be parsed ([`Step::Push`]) or reports the state it
//! finished in ([`Step::Done`]), which is handed to the frame below it.
//! Values flow between frames through the session result.

use tracing::trace;

use crate::parser::state::{Flags, State};
use crate::runner::ds::error::JsError;
use crate::runner::eval::expression::{ArgListFrame, CallFrame, CondFrame, ExprFrame, RelExpFrame};
use crate::runner::eval::statement::{
    BlockFrame, DecFrame, DecListFrame, ForFrame, IfFrame, RetFrame, SimpleFrame, StmtFrame,
};
use crate::runner::session::Js;

pub(crate) enum Frame {
    Stmt(StmtFrame),
    Block(BlockFrame),
    If(IfFrame),
    For(ForFrame),
    Simple(SimpleFrame),
    DecList(DecListFrame),
    Dec(DecFrame),
    Ret(RetFrame),
    Cond(CondFrame),
    RelExp(RelExpFrame),
    Expr(ExprFrame),
    Call(CallFrame),
    ArgList(ArgListFrame),
}

pub(crate) enum Step {
    Push(Frame),
    Done(State),
}

impl Frame {
    /// The frame that parses from `state`.
    pub(crate) fn start(state: State, flags: Flags) -> Result<Frame, JsError> {
        Ok(match state {
            State::Stmt => Frame::Stmt(StmtFrame::new(flags)),
            State::Cond => Frame::Cond(CondFrame::new(flags, None, false)),
            State::RelExp => Frame::RelExp(RelExpFrame::new(flags, None, false)),
            State::Expr => Frame::Expr(ExprFrame::new(flags, None, false)),
            State::ArgList => Frame::ArgList(ArgListFrame::new(flags)),
            State::DecList => Frame::DecList(DecListFrame::new(flags, false)),
            State::Ret => Frame::Ret(RetFrame::new(flags)),
            other => {
                return Err(JsError::syntax(format!(
                    "Cannot start parsing in state {}",
                    other
                )))
            }
        })
    }

    fn name(&self) -> &'static str {
        match self {
            Frame::Stmt(_) => "stmt",
            Frame::Block(_) => "block",
            Frame::If(_) => "if",
            Frame::For(_) => "for",
            Frame::Simple(_) => "simple",
            Frame::DecList(_) => "declist",
            Frame::Dec(_) => "dec",
            Frame::Ret(_) => "return",
            Frame::Cond(_) => "cond",
            Frame::RelExp(_) => "relexp",
            Frame::Expr(_) => "expr",
            Frame::Call(_) => "call",
            Frame::ArgList(_) => "arglist",
        }
    }

    fn step(&mut self, js: &mut Js, child: Option<State>) -> Result<Step, JsError> {
        match self {
            Frame::Stmt(f) => f.step(js, child),
            Frame::Block(f) => f.step(js, child),
            Frame::If(f) => f.step(js, child),
            Frame::For(f) => f.step(js, child),
            Frame::Simple(f) => f.step(js, child),
            Frame::DecList(f) => f.step(js, child),
            Frame::Dec(f) => f.step(js, child),
            Frame::Ret(f) => f.step(js, child),
            Frame::Cond(f) => f.step(js, child),
            Frame::RelExp(f) => f.step(js, child),
            Frame::Expr(f) => f.step(js, child),
            Frame::Call(f) => f.step(js, child),
            Frame::ArgList(f) => f.step(js, child),
        }
    }
}

impl Js {
    /// Parse, and with [`Flags::EXE`] evaluate, one construct starting in
    /// `state`. Returns the state the construct finished in.
    ///
    /// Fails with a range error once more frames are live than the session's
    /// `max_depth` allows. Nested evaluations share the count.
    pub fn parse(&mut self, state: State, flags: Flags) -> Result<State, JsError> {
        let base = self.depth;
        let outcome = self.drive(state, flags);
        self.depth = base;
        outcome.map_err(|e| e.or_line(self.input.line_number()))
    }

    fn drive(&mut self, state: State, flags: Flags) -> Result<State, JsError> {
        let mut frames: Vec<Frame> = Vec::new();
        self.enter()?;
        frames.push(Frame::start(state, flags)?);
        let mut child = None;
        while let Some(frame) = frames.last_mut() {
            match frame.step(self, child.take())? {
                Step::Push(next) => {
                    self.enter()?;
                    trace!(from = frame.name(), to = next.name(), depth = self.depth, "push");
                    frames.push(next);
                }
                Step::Done(done) => {
                    trace!(frame = frame.name(), state = ?done, "done");
                    frames.pop();
                    self.depth -= 1;
                    if frames.is_empty() {
                        return Ok(done);
                    }
                    child = Some(done);
                }
            }
        }
        Ok(State::Eof)
    }

    fn enter(&mut self) -> Result<(), JsError> {
        if self.depth >= self.config.max_depth {
            return Err(JsError::range("Recursion limit exceeded"));
        }
        self.depth += 1;
        Ok(())
    }
}
