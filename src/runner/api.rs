//! Handle-addressed engine API.
//!
//! [`Engines`] owns every open session. Hosts address sessions by
//! [`EngineId`] and blocks by [`BlockId`]; both are plain `Copy` values that
//! convert to and from integers. Using an id after its session closed is a
//! [`JErrorType::HandleError`](crate::runner::ds::error::JErrorType), never
//! a crash.

use std::path::Path;
use std::rc::Rc;

use tracing::debug;

use crate::runner::config::EngineConfig;
use crate::runner::ds::error::JsError;
use crate::runner::ds::handle::HandleTable;
use crate::runner::ds::scope::{BlockId, BlockSerials};
use crate::runner::ds::table::SharedVariableTable;
use crate::runner::plugin::registry::SharedFunctionTable;
use crate::runner::plugin::types::{BuiltInFn, UserHandle};
use crate::runner::session::{EngineId, Js};

/// The session manager.
#[derive(Debug, Default)]
pub struct Engines {
    sessions: HandleTable<Js>,
    config: EngineConfig,
    block_serials: BlockSerials,
}

impl Engines {
    pub fn new() -> Self {
        Engines::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Engines {
            sessions: HandleTable::new(),
            config,
            block_serials: BlockSerials::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Open a session. Tables supplied by the host are shared and outlive the
    /// session; missing ones are allocated and owned by it.
    pub fn open_engine(
        &mut self,
        variables: Option<SharedVariableTable>,
        functions: Option<SharedFunctionTable>,
    ) -> EngineId {
        let config = self.config.clone();
        let serials = Rc::clone(&self.block_serials);
        let handle = self
            .sessions
            .insert_with(|h| Js::new(EngineId(h), variables, functions, config, serials));
        let id = EngineId(handle);
        debug!(engine = %id, "open engine");
        id
    }

    pub fn close_engine(&mut self, eid: EngineId) -> Result<(), JsError> {
        let mut js = self.sessions.remove(eid.0).ok_or_else(|| stale(eid))?;
        js.release();
        debug!(engine = %eid, "close engine");
        Ok(())
    }

    pub fn is_open(&self, eid: EngineId) -> bool {
        self.sessions.contains(eid.0)
    }

    /// Number of open sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn session(&self, eid: EngineId) -> Result<&Js, JsError> {
        self.sessions.get(eid.0).ok_or_else(|| stale(eid))
    }

    pub fn session_mut(&mut self, eid: EngineId) -> Result<&mut Js, JsError> {
        self.sessions.get_mut(eid.0).ok_or_else(|| stale(eid))
    }

    // ==================== Blocks ====================

    pub fn open_block(&mut self, eid: EngineId) -> Result<BlockId, JsError> {
        Ok(self.session_mut(eid)?.open_block())
    }

    pub fn close_block(&mut self, eid: EngineId, block: BlockId) -> Result<(), JsError> {
        self.session_mut(eid)?.close_block(block)
    }

    // ==================== Evaluation ====================

    /// Evaluate `script` in the session's current scope. On failure the
    /// formatted message is also available from [`Engines::get_error`].
    pub fn eval(&mut self, eid: EngineId, script: &str) -> Result<String, JsError> {
        self.session_mut(eid)?.eval(script)
    }

    /// Evaluate `script` inside a block of its own.
    pub fn eval_block(&mut self, eid: EngineId, script: &str) -> Result<String, JsError> {
        self.session_mut(eid)?.eval_block(script)
    }

    /// Read a script file and evaluate it like [`Engines::eval`].
    pub fn eval_file(&mut self, eid: EngineId, path: impl AsRef<Path>) -> Result<String, JsError> {
        let path = path.as_ref();
        let js = self.session_mut(eid)?;
        let script = std::fs::read_to_string(path).map_err(|e| {
            let message = format!("Cannot read {}: {}", path.display(), e);
            js.set_error(message.as_str());
            JsError::io(message)
        })?;
        js.eval(&script)
    }

    pub fn get_error(&self, eid: EngineId) -> Result<Option<String>, JsError> {
        Ok(self.session(eid)?.error().map(str::to_string))
    }

    pub fn get_line_number(&self, eid: EngineId) -> Result<usize, JsError> {
        Ok(self.session(eid)?.line_number())
    }

    pub fn get_result(&self, eid: EngineId) -> Result<String, JsError> {
        Ok(self.session(eid)?.result().to_string())
    }

    pub fn set_result(&mut self, eid: EngineId, value: &str) -> Result<(), JsError> {
        self.session_mut(eid)?.set_result(value);
        Ok(())
    }

    // ==================== Variables ====================

    pub fn get_var(&self, eid: EngineId, name: &str) -> Result<Option<String>, JsError> {
        Ok(self.session(eid)?.get_var(name))
    }

    pub fn set_var(&mut self, eid: EngineId, name: &str, value: &str) -> Result<(), JsError> {
        self.session_mut(eid)?.set_var(name, value);
        Ok(())
    }

    pub fn set_local_var(&mut self, eid: EngineId, name: &str, value: &str) -> Result<(), JsError> {
        self.session_mut(eid)?.set_local_var(name, value);
        Ok(())
    }

    pub fn set_global_var(&mut self, eid: EngineId, name: &str, value: &str) -> Result<(), JsError> {
        self.session_mut(eid)?.set_global_var(name, value);
        Ok(())
    }

    pub fn get_variable_table(&self, eid: EngineId) -> Result<SharedVariableTable, JsError> {
        Ok(self.session(eid)?.variable_table())
    }

    // ==================== Functions ====================

    pub fn get_function_table(&self, eid: EngineId) -> Result<SharedFunctionTable, JsError> {
        Ok(self.session(eid)?.function_table())
    }

    pub fn set_global_function(
        &mut self,
        eid: EngineId,
        name: &str,
        f: BuiltInFn,
    ) -> Result<(), JsError> {
        self.session_mut(eid)?.set_global_function(name, f);
        Ok(())
    }

    /// Unregister `name`. Returns whether it was registered.
    pub fn remove_global_function(&mut self, eid: EngineId, name: &str) -> Result<bool, JsError> {
        Ok(self.session_mut(eid)?.remove_global_function(name).is_some())
    }

    pub fn get_global_function(
        &self,
        eid: EngineId,
        name: &str,
    ) -> Result<Option<BuiltInFn>, JsError> {
        Ok(self.session(eid)?.get_global_function(name))
    }

    // ==================== User data ====================

    pub fn set_user_handle(
        &mut self,
        eid: EngineId,
        handle: Option<UserHandle>,
    ) -> Result<(), JsError> {
        self.session_mut(eid)?.set_user_handle(handle);
        Ok(())
    }

    pub fn get_user_handle(&self, eid: EngineId) -> Result<Option<UserHandle>, JsError> {
        Ok(self.session(eid)?.user_handle())
    }
}

fn stale(eid: EngineId) -> JsError {
    JsError::handle(format!("No open session for {}", eid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::error::JErrorType;

    #[test]
    fn test_open_close_engine() {
        let mut engines = Engines::new();
        let a = engines.open_engine(None, None);
        let b = engines.open_engine(None, None);
        assert_eq!(engines.len(), 2);
        engines.close_engine(a).unwrap();
        assert!(!engines.is_open(a));
        assert!(engines.is_open(b));
        let err = engines.close_engine(a).unwrap_err();
        assert!(matches!(err.kind, JErrorType::HandleError(_)));
        assert!(engines.eval(a, "1").is_err());
        assert_eq!(engines.eval(b, "1").unwrap(), "1");
    }

    #[test]
    fn test_eval_file() {
        let mut engines = Engines::new();
        let eid = engines.open_engine(None, None);
        let path = std::env::temp_dir().join(format!("ejs-eval-file-{}.js", std::process::id()));
        std::fs::write(&path, "var a = 2\na * 21").unwrap();
        assert_eq!(engines.eval_file(eid, &path).unwrap(), "42");
        std::fs::remove_file(&path).unwrap();

        let err = engines.eval_file(eid, &path).unwrap_err();
        assert!(matches!(err.kind, JErrorType::IoError(_)));
        assert!(engines.get_error(eid).unwrap().unwrap().contains("Cannot read"));
    }

    #[test]
    fn test_reused_slot_rejects_old_id() {
        let mut engines = Engines::new();
        let a = engines.open_engine(None, None);
        engines.close_engine(a).unwrap();
        let c = engines.open_engine(None, None);
        assert_ne!(a, c);
        assert!(engines.session(a).is_err());
        assert!(engines.session(c).is_ok());
        assert_eq!(EngineId::from_raw(c.as_raw()), c);
    }
}
