//! A single engine session.

use std::fmt;

use tracing::{debug, trace};

use crate::parser::input::JsInput;
use crate::parser::state::{Flags, State};
use crate::parser::token::{Token, TokenId};
use crate::runner::config::EngineConfig;
use crate::runner::ds::error::{JErrorType, JsError};
use crate::runner::ds::handle::Handle;
use crate::runner::ds::scope::{BlockId, BlockSerials, ScopeStack};
use crate::runner::ds::table::{OwnedTable, SharedVariableTable};
use crate::runner::plugin::registry::{FunctionTable, SharedFunctionTable};
use crate::runner::plugin::types::{BuiltInFn, JsFun, UserHandle};

/// Identifies an open session of an [`Engines`](crate::runner::api::Engines)
/// manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineId(pub(crate) Handle);

impl EngineId {
    /// The id as a plain integer the host can store. Never 0.
    pub fn as_raw(&self) -> u64 {
        self.0.as_raw()
    }

    pub fn from_raw(raw: u64) -> Self {
        EngineId(Handle::from_raw(raw))
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "engine {}", self.0)
    }
}

/// Session state: the input frame being evaluated, the symbol tables, the
/// call under construction and the last result and error.
pub struct Js {
    id: EngineId,
    pub(crate) input: JsInput,
    pub(crate) scopes: ScopeStack,
    functions: OwnedTable<FunctionTable>,
    pub(crate) func: Option<JsFun>,
    pub(crate) result: String,
    error: Option<String>,
    token: String,
    tid: TokenId,
    pub(crate) depth: usize,
    user_handle: Option<UserHandle>,
    pub(crate) config: EngineConfig,
}

impl Js {
    pub(crate) fn new(
        id: EngineId,
        variables: Option<SharedVariableTable>,
        functions: Option<SharedFunctionTable>,
        config: EngineConfig,
        block_serials: BlockSerials,
    ) -> Self {
        Js {
            id,
            input: JsInput::with_capacity(config.script_capacity),
            scopes: ScopeStack::new(OwnedTable::adopt_or_own(variables), block_serials),
            functions: OwnedTable::adopt_or_own(functions),
            func: None,
            result: String::new(),
            error: None,
            token: String::new(),
            tid: TokenId::Eof,
            depth: 0,
            user_handle: None,
            config,
        }
    }

    pub fn id(&self) -> EngineId {
        self.id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ==================== Evaluation ====================

    /// Evaluate `script` in the current scope and return the value of the
    /// last statement, or of the `return` that ended it.
    ///
    /// The input frame being evaluated, if any, is preserved, so a native
    /// function may call this on the session that invoked it.
    pub fn eval(&mut self, script: &str) -> Result<String, JsError> {
        debug!(engine = %self.id, len = script.len(), "eval");
        let saved_input = std::mem::replace(
            &mut self.input,
            JsInput::with_capacity(self.config.script_capacity),
        );
        let saved_func = self.func.take();
        let scope_depth = self.scopes.depth();

        self.input.open_script(script);
        self.result.clear();
        self.error = None;
        let outcome = self.run_script();
        if let Err(e) = &outcome {
            self.scopes.truncate(scope_depth);
            self.record_error(e);
            debug!(engine = %self.id, error = %e, "eval failed");
        }

        self.input = saved_input;
        self.func = saved_func;
        outcome.map(|()| self.result.clone())
    }

    /// Evaluate `script` inside a block of its own.
    pub fn eval_block(&mut self, script: &str) -> Result<String, JsError> {
        let block = self.open_block();
        let outcome = self.eval(script);
        self.scopes.truncate(block.depth() - 1);
        outcome
    }

    fn run_script(&mut self) -> Result<(), JsError> {
        loop {
            match self.parse(State::BEGIN, Flags::EXE)? {
                State::StmtDone => {}
                State::Eof | State::Ret => return Ok(()),
                State::StmtBlockDone => {
                    return Err(JsError::syntax("Unexpected '}'").or_line(self.line_number()))
                }
                other => {
                    return Err(JsError::syntax(format!("Unexpected parser state {}", other))
                        .or_line(self.line_number()))
                }
            }
        }
    }

    fn record_error(&mut self, e: &JsError) {
        let line = if e.line > 0 { e.line } else { self.input.line_number() };
        self.error = Some(format!(
            "{}\n At line {}, line => \n\n {}\n",
            e.kind,
            line,
            self.input.current_line()
        ));
    }

    /// Record a formatted error message on the session.
    pub fn set_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.error = Some(format!(
            "{}\n At line {}, line => \n\n {}\n",
            message,
            self.input.line_number(),
            self.input.current_line()
        ));
    }

    /// Message of the last failed evaluation.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn result(&self) -> &str {
        &self.result
    }

    pub fn set_result(&mut self, value: impl Into<String>) {
        self.result = value.into();
    }

    pub fn line_number(&self) -> usize {
        self.input.line_number()
    }

    // ==================== Scopes and variables ====================

    pub fn open_block(&mut self) -> BlockId {
        let id = self.scopes.open();
        debug!(engine = %self.id, block = %id, "open block");
        id
    }

    pub fn close_block(&mut self, id: BlockId) -> Result<(), JsError> {
        debug!(engine = %self.id, block = %id, "close block");
        self.scopes.close(id)
    }

    pub fn get_var(&self, name: &str) -> Option<String> {
        self.scopes.get(name)
    }

    /// Update the nearest binding of `name`, or create a global one.
    pub fn set_var(&mut self, name: &str, value: impl Into<String>) {
        self.scopes.assign(name, value.into());
    }

    pub fn set_local_var(&mut self, name: &str, value: impl Into<String>) {
        self.scopes.set_local(name, value.into());
    }

    pub fn set_global_var(&mut self, name: &str, value: impl Into<String>) {
        self.scopes.set_global(name, value.into());
    }

    /// The global variable table.
    pub fn variable_table(&self) -> SharedVariableTable {
        self.scopes.global_table()
    }

    // ==================== Functions ====================

    pub fn function_table(&self) -> SharedFunctionTable {
        self.functions.handle()
    }

    pub fn set_global_function(&mut self, name: &str, f: BuiltInFn) {
        debug!(engine = %self.id, name, "set global function");
        self.functions.borrow_mut().set(name, f);
    }

    pub fn remove_global_function(&mut self, name: &str) -> Option<BuiltInFn> {
        self.functions.borrow_mut().remove(name)
    }

    pub fn get_global_function(&self, name: &str) -> Option<BuiltInFn> {
        self.functions.borrow().get(name)
    }

    /// The call currently being made, while a native function runs.
    pub fn current_function(&self) -> Option<&JsFun> {
        self.func.as_ref()
    }

    pub fn user_handle(&self) -> Option<UserHandle> {
        self.user_handle.clone()
    }

    pub fn set_user_handle(&mut self, handle: Option<UserHandle>) {
        self.user_handle = handle;
    }

    // ==================== Lexer ====================

    /// Load `script` as the active input, replacing what was queued.
    pub fn open_script(&mut self, script: &str) {
        self.input.open_script(script);
    }

    pub fn close_script(&mut self) {
        self.input.close_script();
    }

    /// Read the next token in `state` and make it the current token.
    pub fn get_token(&mut self, state: State) -> TokenId {
        let token = self.input.get_token(state);
        trace!(?state, id = ?token.id, text = %token.text, "token");
        self.tid = token.id;
        self.token = token.text;
        self.tid
    }

    pub fn putback_token(&mut self, tid: TokenId, text: &str) {
        self.input.putback_token(Token::new(tid, text));
    }

    pub fn current_token(&self) -> (TokenId, &str) {
        (self.tid, &self.token)
    }

    /// Copy of the input frame, to resume lexing from here later.
    pub fn save_input_state(&self) -> JsInput {
        self.input.clone()
    }

    pub fn restore_input_state(&mut self, state: &JsInput) {
        self.input = state.clone();
    }

    pub fn free_input_state(&mut self, state: JsInput) {
        drop(state);
    }

    /// Next token for the parser; lexical errors become `Err`.
    pub(crate) fn next_token(&mut self, state: State) -> Result<Token, JsError> {
        let token = self.input.get_token(state);
        trace!(?state, id = ?token.id, text = %token.text, "token");
        self.tid = token.id;
        self.token.clone_from(&token.text);
        if token.id == TokenId::Err {
            return Err(JsError::at_line(
                JErrorType::LexicalError(token.text),
                self.input.line_number(),
            ));
        }
        Ok(token)
    }

    pub(crate) fn putback(&mut self, token: Token) {
        self.input.putback_token(token);
    }

    /// Read a token that has to be `id`.
    pub(crate) fn expect(&mut self, state: State, id: TokenId) -> Result<Token, JsError> {
        let token = self.next_token(state)?;
        if token.id == id {
            Ok(token)
        } else {
            Err(JsError::syntax(format!(
                "Expected '{}' but found {}",
                id,
                describe(&token)
            )))
        }
    }

    /// Tear down everything the session owns.
    pub(crate) fn release(&mut self) {
        self.input.close_script();
        self.scopes.release();
        self.functions.release();
        self.func = None;
        self.user_handle = None;
    }
}

/// How a token is named in error messages.
pub(crate) fn describe(token: &Token) -> String {
    match token.id {
        TokenId::Eof => "end of script".to_string(),
        TokenId::Newline => "end of line".to_string(),
        TokenId::Literal => format!("literal \"{}\"", token.text),
        _ => format!("'{}'", token.text),
    }
}

pub(crate) fn unexpected(token: &Token) -> JsError {
    JsError::syntax(format!("Unexpected {}", describe(token)))
}

impl fmt::Debug for Js {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Js")
            .field("id", &self.id)
            .field("result", &self.result)
            .field("error", &self.error)
            .field("depth", &self.depth)
            .field("blocks", &self.scopes.depth())
            .finish()
    }
}
