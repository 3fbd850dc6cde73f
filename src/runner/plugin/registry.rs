//! Function tables: name to native function.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use super::types::BuiltInFn;

/// A function table. One instance may serve several sessions.
#[derive(Debug, Default)]
pub struct FunctionTable {
    functions: HashMap<String, BuiltInFn>,
}

/// A function table the host can share between sessions.
pub type SharedFunctionTable = Rc<RefCell<FunctionTable>>;

impl FunctionTable {
    pub fn new() -> Self {
        FunctionTable {
            functions: HashMap::new(),
        }
    }

    /// Register `f` under `name`, replacing any previous entry.
    pub fn set(&mut self, name: &str, f: BuiltInFn) {
        self.functions.insert(name.to_string(), f);
    }

    pub fn remove(&mut self, name: &str) -> Option<BuiltInFn> {
        self.functions.remove(name)
    }

    /// A copy of the entry, so it can be called without holding the table.
    pub fn get(&self, name: &str) -> Option<BuiltInFn> {
        self.functions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// Register a function directly on a table, without going through a
/// session.
pub fn set_global_function_direct(table: &SharedFunctionTable, name: &str, f: BuiltInFn) {
    debug!(name, "registering function on table");
    table.borrow_mut().set(name, f);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::error::JsError;
    use crate::runner::session::Js;

    fn noop(_js: &mut Js, _args: &[String]) -> Result<(), JsError> {
        Ok(())
    }

    #[test]
    fn test_set_replace_remove() {
        let table: SharedFunctionTable = Rc::new(RefCell::new(FunctionTable::new()));
        set_global_function_direct(&table, "b", BuiltInFn::Native(noop));
        set_global_function_direct(&table, "a", BuiltInFn::from_closure(|_, _| Ok(())));
        assert_eq!(table.borrow().names(), vec!["a", "b"]);
        set_global_function_direct(&table, "a", BuiltInFn::Native(noop));
        assert_eq!(table.borrow().len(), 2);
        assert!(table.borrow_mut().remove("a").is_some());
        assert!(!table.borrow().contains("a"));
        assert!(table.borrow().get("b").is_some());
    }
}
