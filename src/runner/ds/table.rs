//! Symbol tables and who is responsible for them.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::rc::Rc;

/// Variables of one scope: name to string value.
pub type VariableTable = HashMap<String, String>;

/// A variable table that can be handed to several sessions.
pub type SharedVariableTable = Rc<RefCell<VariableTable>>;

/// Who tears a table down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Allocated by the session and emptied when the session closes.
    Session,
    /// Supplied by the host, which keeps it alive and populated.
    Host,
}

/// A table plus its ownership tag.
#[derive(Debug)]
pub struct OwnedTable<T> {
    table: Rc<RefCell<T>>,
    ownership: Ownership,
}

impl<T: Default> OwnedTable<T> {
    /// A fresh, empty table owned by the session.
    pub fn owned() -> Self {
        OwnedTable {
            table: Rc::new(RefCell::new(T::default())),
            ownership: Ownership::Session,
        }
    }

    /// Adopt a host table.
    pub fn shared(table: Rc<RefCell<T>>) -> Self {
        OwnedTable {
            table,
            ownership: Ownership::Host,
        }
    }

    /// Adopt `table` if the host supplied one, otherwise allocate.
    pub fn adopt_or_own(table: Option<Rc<RefCell<T>>>) -> Self {
        match table {
            Some(t) => OwnedTable::shared(t),
            None => OwnedTable::owned(),
        }
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    /// Another reference to the same table.
    pub fn handle(&self) -> Rc<RefCell<T>> {
        Rc::clone(&self.table)
    }

    pub fn borrow(&self) -> Ref<'_, T> {
        self.table.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.table.borrow_mut()
    }

    /// Drop the contents if the session owns the table. Host tables are
    /// left untouched.
    pub fn release(&self) {
        if self.ownership == Ownership::Session {
            self.table.replace(T::default());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_respects_ownership() {
        let owned: OwnedTable<VariableTable> = OwnedTable::owned();
        owned.borrow_mut().insert("a".to_string(), "1".to_string());
        let outside = owned.handle();
        owned.release();
        assert!(outside.borrow().is_empty());

        let host: SharedVariableTable = Rc::new(RefCell::new(VariableTable::new()));
        host.borrow_mut().insert("b".to_string(), "2".to_string());
        let adopted = OwnedTable::adopt_or_own(Some(Rc::clone(&host)));
        assert_eq!(adopted.ownership(), Ownership::Host);
        adopted.release();
        assert_eq!(host.borrow().get("b").map(String::as_str), Some("2"));
    }
}
