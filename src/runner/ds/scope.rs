//! The stack of open variable tables of a session.
//!
//! The outermost table is the global one; it may belong to the host. Every
//! block opened on top of it (by the host or by `{` in a script) pushes a
//! private table that disappears when the block closes.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::runner::ds::error::JsError;
use crate::runner::ds::table::{OwnedTable, SharedVariableTable, VariableTable};

/// Identifies an open block of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId {
    depth: u32,
    serial: u32,
}

impl BlockId {
    pub fn as_raw(&self) -> u64 {
        (u64::from(self.serial) << 32) | u64::from(self.depth)
    }

    pub fn from_raw(raw: u64) -> Self {
        BlockId {
            depth: raw as u32,
            serial: (raw >> 32) as u32,
        }
    }

    /// Nesting depth; the first block above the global table is 1.
    pub fn depth(&self) -> usize {
        self.depth as usize
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.depth, self.serial)
    }
}

/// Source of block serials. Sessions of one manager share it, so a block id
/// is never valid in two sessions.
pub type BlockSerials = Rc<Cell<u32>>;

#[derive(Debug)]
struct Scope {
    serial: u32,
    vars: VariableTable,
}

#[derive(Debug)]
pub struct ScopeStack {
    global: OwnedTable<VariableTable>,
    blocks: Vec<Scope>,
    serials: BlockSerials,
}

impl ScopeStack {
    pub fn new(global: OwnedTable<VariableTable>, serials: BlockSerials) -> Self {
        ScopeStack {
            global,
            blocks: Vec::new(),
            serials,
        }
    }

    /// Push an empty table and make it the innermost scope.
    pub fn open(&mut self) -> BlockId {
        let serial = self.serials.get().wrapping_add(1).max(1);
        self.serials.set(serial);
        self.blocks.push(Scope {
            serial,
            vars: VariableTable::new(),
        });
        BlockId {
            depth: self.blocks.len() as u32,
            serial,
        }
    }

    /// Pop `id`, which has to be the innermost open block.
    pub fn close(&mut self, id: BlockId) -> Result<(), JsError> {
        match self.blocks.last() {
            Some(top) if top.serial == id.serial && self.blocks.len() == id.depth() => {
                self.blocks.pop();
                Ok(())
            }
            _ if self.is_open(id) => Err(JsError::handle(format!(
                "Block {} is not the innermost open block",
                id
            ))),
            _ => Err(JsError::handle(format!("Block {} is not open", id))),
        }
    }

    pub fn is_open(&self, id: BlockId) -> bool {
        id.depth > 0
            && self
                .blocks
                .get(id.depth() - 1)
                .map_or(false, |s| s.serial == id.serial)
    }

    /// Number of open blocks above the global table.
    pub fn depth(&self) -> usize {
        self.blocks.len()
    }

    /// Close every block above `depth`.
    pub fn truncate(&mut self, depth: usize) {
        self.blocks.truncate(depth);
    }

    /// Look `name` up from the innermost scope outwards.
    pub fn get(&self, name: &str) -> Option<String> {
        self.blocks
            .iter()
            .rev()
            .find_map(|s| s.vars.get(name).cloned())
            .or_else(|| self.global.borrow().get(name).cloned())
    }

    /// Bind `name` in the innermost scope.
    pub fn set_local(&mut self, name: &str, value: String) {
        match self.blocks.last_mut() {
            Some(scope) => {
                scope.vars.insert(name.to_string(), value);
            }
            None => {
                self.global.borrow_mut().insert(name.to_string(), value);
            }
        }
    }

    /// Bind `name` in the global table.
    pub fn set_global(&mut self, name: &str, value: String) {
        self.global.borrow_mut().insert(name.to_string(), value);
    }

    /// Update the nearest existing binding of `name`, or bind it in the
    /// global table when there is none.
    pub fn assign(&mut self, name: &str, value: String) {
        if let Some(scope) = self
            .blocks
            .iter_mut()
            .rev()
            .find(|s| s.vars.contains_key(name))
        {
            scope.vars.insert(name.to_string(), value);
            return;
        }
        self.set_global(name, value);
    }

    pub fn global_table(&self) -> SharedVariableTable {
        self.global.handle()
    }

    /// Close all blocks and release the global table if the session owns it.
    pub fn release(&mut self) {
        self.blocks.clear();
        self.global.release();
    }
}
