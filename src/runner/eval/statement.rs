//! Statement frames.

use tracing::trace;

use crate::parser::input::JsInput;
use crate::parser::state::{Flags, State};
use crate::parser::token::{CondOp, ExprOp, TokenId};
use crate::runner::ds::error::JsError;
use crate::runner::ds::operations::arithmetic::increment;
use crate::runner::ds::operations::type_conversion::to_boolean;
use crate::runner::ds::scope::BlockId;
use crate::runner::eval::expression::{lookahead_state, CondFrame};
use crate::runner::eval::machine::{Frame, Step};
use crate::runner::session::{describe, unexpected, Js};

fn condition(flags: Flags) -> Frame {
    Frame::Cond(CondFrame::new(flags, None, false))
}

// ==================== Statements ====================

#[derive(Clone, Copy)]
enum StmtStage {
    Start,
    Forward { terminated: bool },
}

/// One statement. Finishes in `StmtDone`, `StmtBlockDone` on a closing
/// brace, `Ret` after an executed `return`, or `Eof`.
pub(crate) struct StmtFrame {
    flags: Flags,
    stage: StmtStage,
}

impl StmtFrame {
    pub(crate) fn new(flags: Flags) -> Self {
        StmtFrame {
            flags,
            stage: StmtStage::Start,
        }
    }

    pub(crate) fn step(&mut self, js: &mut Js, child: Option<State>) -> Result<Step, JsError> {
        match self.stage {
            StmtStage::Start => loop {
                let token = js.next_token(State::Stmt)?;
                let (frame, terminated) = match token.id {
                    TokenId::Newline => continue,
                    TokenId::Semi => return Ok(Step::Done(State::StmtDone)),
                    TokenId::Eof => return Ok(Step::Done(State::Eof)),
                    TokenId::RBrace => return Ok(Step::Done(State::StmtBlockDone)),
                    TokenId::LBrace => (Frame::Block(BlockFrame::new(self.flags)), false),
                    TokenId::If => (Frame::If(IfFrame::new(self.flags)), false),
                    TokenId::For => (Frame::For(ForFrame::new(self.flags)), false),
                    TokenId::Var => (Frame::DecList(DecListFrame::new(self.flags, true)), true),
                    TokenId::Return => (Frame::Ret(RetFrame::new(self.flags)), true),
                    TokenId::Id
                    | TokenId::Function
                    | TokenId::Literal
                    | TokenId::LParen
                    | TokenId::Expr(ExprOp::Minus)
                    | TokenId::Logical(CondOp::Not) => {
                        js.putback(token);
                        (Frame::Simple(SimpleFrame::new(self.flags, true)), true)
                    }
                    _ => return Err(unexpected(&token)),
                };
                self.stage = StmtStage::Forward { terminated };
                return Ok(Step::Push(frame));
            },
            StmtStage::Forward { terminated } => match child {
                Some(State::Ret) => Ok(Step::Done(State::Ret)),
                _ if terminated => self.terminate(js),
                _ => Ok(Step::Done(State::StmtDone)),
            },
        }
    }

    /// Consume what ends a simple statement. A closing brace, `else` or the
    /// end of the script also end it but are left for the enclosing frame.
    fn terminate(&mut self, js: &mut Js) -> Result<Step, JsError> {
        let token = js.next_token(State::StmtDone)?;
        match token.id {
            TokenId::Semi | TokenId::Newline => Ok(Step::Done(State::StmtDone)),
            TokenId::RBrace | TokenId::Eof | TokenId::Else => {
                js.putback(token);
                Ok(Step::Done(State::StmtDone))
            }
            _ => Err(JsError::syntax(format!(
                "Expected ';' but found {}",
                describe(&token)
            ))),
        }
    }
}

// ==================== Blocks ====================

/// `{ ... }`, opening a scope while executing.
pub(crate) struct BlockFrame {
    flags: Flags,
    scope: Option<BlockId>,
}

impl BlockFrame {
    pub(crate) fn new(flags: Flags) -> Self {
        BlockFrame { flags, scope: None }
    }

    pub(crate) fn step(&mut self, js: &mut Js, child: Option<State>) -> Result<Step, JsError> {
        match child {
            None => {
                if self.flags.is_exe() {
                    let id = js.scopes.open();
                    trace!(block = %id, "enter brace scope");
                    self.scope = Some(id);
                }
                Ok(Step::Push(Frame::Stmt(StmtFrame::new(self.flags))))
            }
            Some(State::StmtDone) => Ok(Step::Push(Frame::Stmt(StmtFrame::new(self.flags)))),
            Some(State::StmtBlockDone) => {
                self.close(js)?;
                Ok(Step::Done(State::StmtBlockDone))
            }
            Some(State::Ret) => {
                self.close(js)?;
                Ok(Step::Done(State::Ret))
            }
            Some(_) => Err(JsError::syntax("Missing '}'")),
        }
    }

    fn close(&mut self, js: &mut Js) -> Result<(), JsError> {
        match self.scope.take() {
            Some(id) => js.scopes.close(id),
            None => Ok(()),
        }
    }
}

// ==================== if / else ====================

#[derive(Clone, Copy)]
enum IfStage {
    Open,
    AfterCond,
    AfterThen,
    AfterElse,
}

pub(crate) struct IfFrame {
    flags: Flags,
    stage: IfStage,
    taken: bool,
}

impl IfFrame {
    pub(crate) fn new(flags: Flags) -> Self {
        IfFrame {
            flags,
            stage: IfStage::Open,
            taken: false,
        }
    }

    pub(crate) fn step(&mut self, js: &mut Js, child: Option<State>) -> Result<Step, JsError> {
        match self.stage {
            IfStage::Open => {
                js.expect(State::Expr, TokenId::LParen)?;
                self.stage = IfStage::AfterCond;
                Ok(Step::Push(condition(self.flags)))
            }
            IfStage::AfterCond => {
                self.taken = self.flags.is_exe() && to_boolean(&js.result);
                js.expect(State::Expr, TokenId::RParen)?;
                self.stage = IfStage::AfterThen;
                Ok(Step::Push(Frame::Stmt(StmtFrame::new(
                    self.flags.exe_if(self.taken),
                ))))
            }
            IfStage::AfterThen => {
                if let Some(done) = branch_outcome(child, "if")? {
                    return Ok(Step::Done(done));
                }
                loop {
                    let token = js.next_token(State::Stmt)?;
                    match token.id {
                        TokenId::Newline => continue,
                        TokenId::Else => {
                            self.stage = IfStage::AfterElse;
                            return Ok(Step::Push(Frame::Stmt(StmtFrame::new(
                                self.flags.exe_if(!self.taken),
                            ))));
                        }
                        _ => {
                            js.putback(token);
                            return Ok(Step::Done(State::StmtDone));
                        }
                    }
                }
            }
            IfStage::AfterElse => Ok(Step::Done(
                branch_outcome(child, "else")?.unwrap_or(State::StmtDone),
            )),
        }
    }
}

/// Check what a branch or loop body finished in. `Some(Ret)` means an
/// executed `return` has to unwind further.
fn branch_outcome(child: Option<State>, keyword: &str) -> Result<Option<State>, JsError> {
    match child {
        Some(State::Ret) => Ok(Some(State::Ret)),
        Some(State::Eof) | Some(State::StmtBlockDone) | None => Err(JsError::syntax(format!(
            "Missing statement after '{}'",
            keyword
        ))),
        Some(_) => Ok(None),
    }
}

// ==================== for ====================

#[derive(Clone, Copy)]
enum ForStage {
    Open,
    AfterInit,
    AfterCond,
    AfterIncrScan,
    AfterBody,
    AfterIncr,
    AfterLoopCond,
}

/// `for (init; cond; incr) body`.
///
/// The first pass reads the header and the body once, checkpointing the
/// input at the condition, the increment, the body and the end. Later
/// iterations replay those checkpoints.
pub(crate) struct ForFrame {
    flags: Flags,
    stage: ForStage,
    running: bool,
    cond_at: Option<JsInput>,
    incr_at: Option<JsInput>,
    body_at: Option<JsInput>,
    end_at: Option<JsInput>,
}

impl ForFrame {
    pub(crate) fn new(flags: Flags) -> Self {
        ForFrame {
            flags,
            stage: ForStage::Open,
            running: false,
            cond_at: None,
            incr_at: None,
            body_at: None,
            end_at: None,
        }
    }

    pub(crate) fn step(&mut self, js: &mut Js, child: Option<State>) -> Result<Step, JsError> {
        match self.stage {
            ForStage::Open => {
                js.expect(State::Expr, TokenId::LParen)?;
                let token = js.next_token(State::Expr)?;
                match token.id {
                    TokenId::Semi => self.start_cond(js),
                    TokenId::Var => {
                        self.stage = ForStage::AfterInit;
                        Ok(Step::Push(Frame::DecList(DecListFrame::new(self.flags, false))))
                    }
                    _ => {
                        js.putback(token);
                        self.stage = ForStage::AfterInit;
                        Ok(Step::Push(Frame::Simple(SimpleFrame::new(self.flags, false))))
                    }
                }
            }
            ForStage::AfterInit => {
                js.expect(State::Expr, TokenId::Semi)?;
                self.start_cond(js)
            }
            ForStage::AfterCond => {
                self.running = self.flags.is_exe() && to_boolean(&js.result);
                js.expect(State::Expr, TokenId::Semi)?;
                self.start_incr(js)
            }
            ForStage::AfterIncrScan => {
                js.expect(State::Expr, TokenId::RParen)?;
                Ok(self.start_body(js))
            }
            ForStage::AfterBody => {
                if let Some(done) = branch_outcome(child, "for")? {
                    return Ok(Step::Done(done));
                }
                if self.end_at.is_none() {
                    self.end_at = Some(js.save_input_state());
                }
                if !self.running {
                    return Ok(self.finish(js));
                }
                if let Some(incr) = &self.incr_at {
                    js.restore_input_state(incr);
                    self.stage = ForStage::AfterIncr;
                    return Ok(Step::Push(Frame::Simple(SimpleFrame::new(self.flags, false))));
                }
                Ok(self.check_cond(js))
            }
            ForStage::AfterIncr => Ok(self.check_cond(js)),
            ForStage::AfterLoopCond => {
                self.running = to_boolean(&js.result);
                if self.running {
                    Ok(self.run_body(js))
                } else {
                    Ok(self.finish(js))
                }
            }
        }
    }

    fn start_cond(&mut self, js: &mut Js) -> Result<Step, JsError> {
        let checkpoint = js.save_input_state();
        let token = js.next_token(State::Expr)?;
        if token.id == TokenId::Semi {
            // No condition loops until `return`.
            self.running = self.flags.is_exe();
            return self.start_incr(js);
        }
        js.putback(token);
        self.cond_at = Some(checkpoint);
        self.stage = ForStage::AfterCond;
        Ok(Step::Push(condition(self.flags)))
    }

    fn start_incr(&mut self, js: &mut Js) -> Result<Step, JsError> {
        let checkpoint = js.save_input_state();
        let token = js.next_token(State::Expr)?;
        if token.id == TokenId::RParen {
            return Ok(self.start_body(js));
        }
        js.putback(token);
        self.incr_at = Some(checkpoint);
        self.stage = ForStage::AfterIncrScan;
        Ok(Step::Push(Frame::Simple(SimpleFrame::new(self.flags.scan(), false))))
    }

    fn start_body(&mut self, js: &mut Js) -> Step {
        self.body_at = Some(js.save_input_state());
        self.stage = ForStage::AfterBody;
        Step::Push(Frame::Stmt(StmtFrame::new(self.flags.exe_if(self.running))))
    }

    fn check_cond(&mut self, js: &mut Js) -> Step {
        if let Some(cond) = &self.cond_at {
            js.restore_input_state(cond);
            self.stage = ForStage::AfterLoopCond;
            return Step::Push(condition(self.flags));
        }
        self.run_body(js)
    }

    fn run_body(&mut self, js: &mut Js) -> Step {
        if let Some(body) = &self.body_at {
            js.restore_input_state(body);
        }
        self.stage = ForStage::AfterBody;
        Step::Push(Frame::Stmt(StmtFrame::new(self.flags)))
    }

    fn finish(&mut self, js: &mut Js) -> Step {
        if let Some(end) = self.end_at.take() {
            js.restore_input_state(&end);
        }
        Step::Done(State::StmtDone)
    }
}

// ==================== Simple statements ====================

enum SimpleStage {
    Start,
    Assign(String),
    Expr,
}

/// Assignment, `x++`/`x--`, or a bare expression.
pub(crate) struct SimpleFrame {
    flags: Flags,
    newline_ends: bool,
    stage: SimpleStage,
}

impl SimpleFrame {
    pub(crate) fn new(flags: Flags, newline_ends: bool) -> Self {
        SimpleFrame {
            flags,
            newline_ends,
            stage: SimpleStage::Start,
        }
    }

    pub(crate) fn step(&mut self, js: &mut Js, _child: Option<State>) -> Result<Step, JsError> {
        match std::mem::replace(&mut self.stage, SimpleStage::Expr) {
            SimpleStage::Start => {
                let token = js.next_token(State::Expr)?;
                if token.id != TokenId::Id {
                    js.putback(token);
                    return Ok(Step::Push(Frame::Cond(CondFrame::new(
                        self.flags,
                        None,
                        self.newline_ends,
                    ))));
                }
                let next = js.next_token(lookahead_state(self.newline_ends))?;
                match next.id {
                    TokenId::Assignment => {
                        self.stage = SimpleStage::Assign(token.text);
                        Ok(Step::Push(Frame::Cond(CondFrame::new(
                            self.flags,
                            None,
                            self.newline_ends,
                        ))))
                    }
                    TokenId::IncDec(op) => {
                        if self.flags.is_exe() {
                            let current = js.get_var(&token.text).ok_or_else(|| {
                                JsError::reference(format!("Undefined variable '{}'", token.text))
                            })?;
                            let value = increment(&current, op)?;
                            js.scopes.assign(&token.text, value.clone());
                            js.result = value;
                        }
                        Ok(Step::Done(State::ExprDone))
                    }
                    _ => {
                        // The name starts an expression: hand it over as the
                        // first token since only one token can be put back.
                        js.putback(next);
                        Ok(Step::Push(Frame::Cond(CondFrame::new(
                            self.flags,
                            Some(token),
                            self.newline_ends,
                        ))))
                    }
                }
            }
            SimpleStage::Assign(name) => {
                if self.flags.is_exe() {
                    js.scopes.assign(&name, js.result.clone());
                }
                Ok(Step::Done(State::ExprDone))
            }
            SimpleStage::Expr => Ok(Step::Done(State::ExprDone)),
        }
    }
}

// ==================== Declarations ====================

/// `var a, b = expr, ...` after the `var` keyword.
pub(crate) struct DecListFrame {
    flags: Flags,
    newline_ends: bool,
}

impl DecListFrame {
    pub(crate) fn new(flags: Flags, newline_ends: bool) -> Self {
        DecListFrame {
            flags,
            newline_ends,
        }
    }

    pub(crate) fn step(&mut self, js: &mut Js, child: Option<State>) -> Result<Step, JsError> {
        if child.is_some() {
            let token = js.next_token(lookahead_state(self.newline_ends))?;
            if token.id != TokenId::Comma {
                js.putback(token);
                return Ok(Step::Done(State::DecListDone));
            }
        }
        let token = js.next_token(State::DecList)?;
        if token.id != TokenId::Id {
            return Err(JsError::syntax(format!(
                "Expected variable name but found {}",
                describe(&token)
            )));
        }
        Ok(Step::Push(Frame::Dec(DecFrame::new(
            self.flags,
            token.text,
            self.newline_ends,
        ))))
    }
}

/// One `name` or `name = expr`, bound in the innermost scope.
pub(crate) struct DecFrame {
    flags: Flags,
    name: String,
    newline_ends: bool,
}

impl DecFrame {
    pub(crate) fn new(flags: Flags, name: String, newline_ends: bool) -> Self {
        DecFrame {
            flags,
            name,
            newline_ends,
        }
    }

    pub(crate) fn step(&mut self, js: &mut Js, child: Option<State>) -> Result<Step, JsError> {
        let value = match child {
            None => {
                let token = js.next_token(lookahead_state(self.newline_ends))?;
                if token.id == TokenId::Assignment {
                    return Ok(Step::Push(Frame::Cond(CondFrame::new(
                        self.flags,
                        None,
                        self.newline_ends,
                    ))));
                }
                js.putback(token);
                String::new()
            }
            Some(_) => js.result.clone(),
        };
        if self.flags.is_exe() {
            js.scopes.set_local(&self.name, value);
        }
        Ok(Step::Done(State::DecDone))
    }
}

// ==================== return ====================

pub(crate) struct RetFrame {
    flags: Flags,
}

impl RetFrame {
    pub(crate) fn new(flags: Flags) -> Self {
        RetFrame { flags }
    }

    pub(crate) fn step(&mut self, js: &mut Js, child: Option<State>) -> Result<Step, JsError> {
        if child.is_none() {
            let token = js.next_token(State::StmtDone)?;
            let bare = matches!(
                token.id,
                TokenId::Semi | TokenId::Newline | TokenId::RBrace | TokenId::Eof
            );
            js.putback(token);
            if !bare {
                return Ok(Step::Push(Frame::Cond(CondFrame::new(self.flags, None, true))));
            }
            if self.flags.is_exe() {
                js.result.clear();
            }
        }
        Ok(Step::Done(if self.flags.is_exe() {
            State::Ret
        } else {
            State::StmtDone
        }))
    }
}
