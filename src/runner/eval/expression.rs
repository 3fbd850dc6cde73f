//! Expression frames.
//!
//! Three tiers, loosest first: a conditional expression joins relational
//! expressions with `&&`/`||`, a relational expression joins arithmetic
//! expressions with comparison operators, and an arithmetic expression joins
//! terms with `+ - * / % << >>`. Within a tier operators apply left to right.

use tracing::debug;

use crate::parser::state::{Flags, State};
use crate::parser::token::{CondOp, ExprOp, Token, TokenId};
use crate::runner::ds::error::JsError;
use crate::runner::ds::operations::arithmetic::{
    apply_arithmetic, apply_logical, logical_not, negate,
};
use crate::runner::ds::operations::test_and_comparison::compare;
use crate::runner::ds::operations::type_conversion::{bool_to_string, to_boolean};
use crate::runner::eval::machine::{Frame, Step};
use crate::runner::plugin::types::{BuiltInFn, JsFun};
use crate::runner::session::{describe, unexpected, Js};

/// Lexer state for operator lookahead. Where a newline may end the
/// statement it has to surface as a token.
pub(crate) fn lookahead_state(newline_ends: bool) -> State {
    if newline_ends {
        State::StmtDone
    } else {
        State::Expr
    }
}

// ==================== Conditional ====================

pub(crate) struct CondFrame {
    flags: Flags,
    seed: Option<Token>,
    newline_ends: bool,
    acc: String,
    pending: Option<CondOp>,
    rhs_scanned: bool,
}

impl CondFrame {
    /// `seed` is a token already consumed by the caller that starts the
    /// expression.
    pub(crate) fn new(flags: Flags, seed: Option<Token>, newline_ends: bool) -> Self {
        CondFrame {
            flags,
            seed,
            newline_ends,
            acc: String::new(),
            pending: None,
            rhs_scanned: false,
        }
    }

    pub(crate) fn step(&mut self, js: &mut Js, child: Option<State>) -> Result<Step, JsError> {
        if child.is_none() {
            return Ok(Step::Push(Frame::RelExp(RelExpFrame::new(
                self.flags,
                self.seed.take(),
                self.newline_ends,
            ))));
        }
        let exe = self.flags.is_exe();
        if exe {
            self.acc = match self.pending.take() {
                None => std::mem::take(&mut js.result),
                // The right side was only scanned; the left decides.
                Some(_) if self.rhs_scanned => bool_to_string(to_boolean(&self.acc)),
                Some(op) => apply_logical(op, &self.acc, &js.result)?,
            };
        }
        let token = js.next_token(lookahead_state(self.newline_ends))?;
        match token.id {
            TokenId::Logical(op @ (CondOp::And | CondOp::Or)) => {
                let settled = exe
                    && match op {
                        CondOp::And => !to_boolean(&self.acc),
                        _ => to_boolean(&self.acc),
                    };
                self.pending = Some(op);
                self.rhs_scanned = settled;
                Ok(Step::Push(Frame::RelExp(RelExpFrame::new(
                    self.flags.exe_if(!settled),
                    None,
                    self.newline_ends,
                ))))
            }
            _ => {
                js.putback(token);
                if exe {
                    js.result = std::mem::take(&mut self.acc);
                }
                Ok(Step::Done(State::CondDone))
            }
        }
    }
}

// ==================== Relational ====================

pub(crate) struct RelExpFrame {
    flags: Flags,
    seed: Option<Token>,
    newline_ends: bool,
    acc: String,
    pending: Option<ExprOp>,
}

impl RelExpFrame {
    pub(crate) fn new(flags: Flags, seed: Option<Token>, newline_ends: bool) -> Self {
        RelExpFrame {
            flags,
            seed,
            newline_ends,
            acc: String::new(),
            pending: None,
        }
    }

    pub(crate) fn step(&mut self, js: &mut Js, child: Option<State>) -> Result<Step, JsError> {
        if child.is_none() {
            return Ok(Step::Push(Frame::Expr(ExprFrame::new(
                self.flags,
                self.seed.take(),
                self.newline_ends,
            ))));
        }
        let exe = self.flags.is_exe();
        if exe {
            self.acc = match self.pending.take() {
                None => std::mem::take(&mut js.result),
                Some(op) => bool_to_string(compare(op, &self.acc, &js.result)?),
            };
        }
        let token = js.next_token(lookahead_state(self.newline_ends))?;
        match token.id {
            TokenId::Expr(op) if op.is_relational() => {
                self.pending = Some(op);
                Ok(Step::Push(Frame::Expr(ExprFrame::new(
                    self.flags,
                    None,
                    self.newline_ends,
                ))))
            }
            _ => {
                js.putback(token);
                if exe {
                    js.result = std::mem::take(&mut self.acc);
                }
                Ok(Step::Done(State::RelExpDone))
            }
        }
    }
}

// ==================== Arithmetic ====================

#[derive(Clone, Copy)]
enum Unary {
    Minus,
    Not,
}

#[derive(Clone, Copy)]
enum ExprStage {
    Term,
    AfterParen,
    AfterCall,
}

pub(crate) struct ExprFrame {
    flags: Flags,
    seed: Option<Token>,
    newline_ends: bool,
    stage: ExprStage,
    acc: String,
    pending: Option<ExprOp>,
    unary: Vec<Unary>,
}

impl ExprFrame {
    pub(crate) fn new(flags: Flags, seed: Option<Token>, newline_ends: bool) -> Self {
        ExprFrame {
            flags,
            seed,
            newline_ends,
            stage: ExprStage::Term,
            acc: String::new(),
            pending: None,
            unary: Vec::new(),
        }
    }

    pub(crate) fn step(&mut self, js: &mut Js, _child: Option<State>) -> Result<Step, JsError> {
        loop {
            let value = match self.stage {
                ExprStage::Term => {
                    let token = match self.seed.take() {
                        Some(token) => token,
                        None => js.next_token(State::Expr)?,
                    };
                    match token.id {
                        TokenId::Literal => token.text,
                        TokenId::Id => self.read_variable(js, &token.text)?,
                        TokenId::Function => {
                            self.stage = ExprStage::AfterCall;
                            return Ok(Step::Push(Frame::Call(CallFrame::new(
                                self.flags, token.text,
                            ))));
                        }
                        TokenId::LParen => {
                            self.stage = ExprStage::AfterParen;
                            return Ok(Step::Push(Frame::Cond(CondFrame::new(
                                self.flags, None, false,
                            ))));
                        }
                        TokenId::Expr(ExprOp::Minus) => {
                            self.unary.push(Unary::Minus);
                            continue;
                        }
                        TokenId::Logical(CondOp::Not) => {
                            self.unary.push(Unary::Not);
                            continue;
                        }
                        _ => return Err(unexpected(&token)),
                    }
                }
                ExprStage::AfterParen => {
                    js.expect(State::Expr, TokenId::RParen)?;
                    self.child_value(js)
                }
                ExprStage::AfterCall => self.child_value(js),
            };
            self.combine(value)?;

            let token = js.next_token(lookahead_state(self.newline_ends))?;
            match token.id {
                TokenId::Expr(op) if op.is_arithmetic() => {
                    self.pending = Some(op);
                    self.stage = ExprStage::Term;
                }
                _ => {
                    js.putback(token);
                    if self.flags.is_exe() {
                        js.result = std::mem::take(&mut self.acc);
                    }
                    return Ok(Step::Done(State::ExprDone));
                }
            }
        }
    }

    fn child_value(&self, js: &mut Js) -> String {
        if self.flags.is_exe() {
            std::mem::take(&mut js.result)
        } else {
            String::new()
        }
    }

    fn read_variable(&self, js: &Js, name: &str) -> Result<String, JsError> {
        if !self.flags.is_exe() {
            return Ok(String::new());
        }
        js.get_var(name)
            .ok_or_else(|| JsError::reference(format!("Undefined variable '{}'", name)))
    }

    /// Apply pending unary operators to a finished term, then fold it into
    /// the running value.
    fn combine(&mut self, term: String) -> Result<(), JsError> {
        if !self.flags.is_exe() {
            self.unary.clear();
            self.pending = None;
            return Ok(());
        }
        let mut value = term;
        while let Some(op) = self.unary.pop() {
            value = match op {
                Unary::Minus => negate(&value)?,
                Unary::Not => logical_not(&value),
            };
        }
        self.acc = match self.pending.take() {
            Some(op) => apply_arithmetic(op, &self.acc, &value)?,
            None => value,
        };
        Ok(())
    }
}

// ==================== Function calls ====================

#[derive(Clone, Copy)]
enum CallStage {
    Open,
    Invoke,
}

pub(crate) struct CallFrame {
    flags: Flags,
    name: String,
    stage: CallStage,
    target: Option<BuiltInFn>,
    saved: Option<JsFun>,
}

impl CallFrame {
    pub(crate) fn new(flags: Flags, name: String) -> Self {
        CallFrame {
            flags,
            name,
            stage: CallStage::Open,
            target: None,
            saved: None,
        }
    }

    pub(crate) fn step(&mut self, js: &mut Js, _child: Option<State>) -> Result<Step, JsError> {
        match self.stage {
            CallStage::Open => {
                js.expect(State::Expr, TokenId::LParen)?;
                if self.flags.is_exe() {
                    // Resolve before any argument is evaluated.
                    let target = js.get_global_function(&self.name).ok_or_else(|| {
                        JsError::reference(format!("Function '{}' is not defined", self.name))
                    })?;
                    self.target = Some(target);
                    self.saved = js.func.replace(JsFun::new(self.name.as_str()));
                }
                self.stage = CallStage::Invoke;
                Ok(Step::Push(Frame::ArgList(ArgListFrame::new(self.flags))))
            }
            CallStage::Invoke => {
                if let Some(target) = self.target.take() {
                    let args = js.func.as_ref().map(|f| f.args.clone()).unwrap_or_default();
                    debug!(engine = %js.id(), name = %self.name, argc = args.len(), "native call");
                    js.result.clear();
                    let outcome = target.call(js, &args);
                    js.func = self.saved.take();
                    outcome?;
                }
                Ok(Step::Done(State::ExprDone))
            }
        }
    }
}

pub(crate) struct ArgListFrame {
    flags: Flags,
}

impl ArgListFrame {
    pub(crate) fn new(flags: Flags) -> Self {
        ArgListFrame { flags }
    }

    pub(crate) fn step(&mut self, js: &mut Js, child: Option<State>) -> Result<Step, JsError> {
        if child.is_none() {
            let token = js.next_token(State::ArgList)?;
            if token.id == TokenId::RParen {
                return Ok(Step::Done(State::ArgListDone));
            }
            js.putback(token);
            return Ok(Step::Push(self.argument()));
        }
        if self.flags.is_exe() {
            let value = std::mem::take(&mut js.result);
            if let Some(f) = js.func.as_mut() {
                f.args.push(value);
            }
        }
        let token = js.next_token(State::ArgList)?;
        match token.id {
            TokenId::Comma => Ok(Step::Push(self.argument())),
            TokenId::RParen => Ok(Step::Done(State::ArgListDone)),
            _ => Err(JsError::syntax(format!(
                "Expected ',' or ')' in argument list but found {}",
                describe(&token)
            ))),
        }
    }

    fn argument(&self) -> Frame {
        Frame::Cond(CondFrame::new(self.flags, None, false))
    }
}
