//! Data structures shared by the evaluator and the session manager.
//!
//! - [`value`] - operator-facing view of script values
//! - [`error`] - error kinds reported by the engine
//! - [`handle`] - generation-checked handle arena
//! - [`table`] - variable tables and their ownership
//! - [`scope`] - the stack of open variable tables
//! - [`operations`] - coercion and operator semantics

pub mod error;
pub mod handle;
pub mod scope;
pub mod table;
pub mod value;

pub mod operations {
    pub mod arithmetic;
    pub mod test_and_comparison;
    pub mod type_conversion;
}
