//! Session manager tests: ids, blocks, symbol tables and limits.

extern crate ejs;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use ejs::runner::api::Engines;
use ejs::runner::config::EngineConfig;
use ejs::runner::ds::error::JErrorType;
use ejs::runner::ds::scope::BlockId;
use ejs::runner::plugin::types::UserHandle;
use ejs::runner::session::EngineId;
use pretty_assertions::assert_eq;

fn is_handle_error(kind: &JErrorType) -> bool {
    matches!(kind, JErrorType::HandleError(_))
}

// ============================================================================
// Sessions
// ============================================================================

#[test]
fn test_double_close_is_an_error() {
    let mut engines = Engines::new();
    let eid = engines.open_engine(None, None);
    engines.close_engine(eid).unwrap();
    let err = engines.close_engine(eid).unwrap_err();
    assert!(is_handle_error(&err.kind));
    assert!(engines.is_empty());
}

#[test]
fn test_closed_id_is_rejected_everywhere() {
    let mut engines = Engines::new();
    let eid = engines.open_engine(None, None);
    engines.close_engine(eid).unwrap();
    assert!(is_handle_error(&engines.eval(eid, "1").unwrap_err().kind));
    assert!(is_handle_error(&engines.get_var(eid, "x").unwrap_err().kind));
    assert!(is_handle_error(&engines.set_var(eid, "x", "1").unwrap_err().kind));
    assert!(is_handle_error(&engines.open_block(eid).unwrap_err().kind));
    assert!(is_handle_error(&engines.get_error(eid).unwrap_err().kind));
}

#[test]
fn test_ids_round_trip_through_integers() {
    let mut engines = Engines::new();
    let eid = engines.open_engine(None, None);
    let raw = eid.as_raw();
    assert_ne!(raw, 0);
    engines.set_var(EngineId::from_raw(raw), "x", "1").unwrap();
    assert_eq!(engines.get_var(eid, "x").unwrap().as_deref(), Some("1"));

    let block = engines.open_block(eid).unwrap();
    engines.close_block(eid, BlockId::from_raw(block.as_raw())).unwrap();
}

#[test]
fn test_sessions_are_independent() {
    let mut engines = Engines::new();
    let a = engines.open_engine(None, None);
    let b = engines.open_engine(None, None);
    engines.eval(a, "var x = 'a'").unwrap();
    engines.eval(b, "var x = 'b'").unwrap();
    assert_eq!(engines.get_var(a, "x").unwrap().as_deref(), Some("a"));
    assert_eq!(engines.get_var(b, "x").unwrap().as_deref(), Some("b"));
    assert_eq!(engines.len(), 2);
}

// ============================================================================
// Blocks
// ============================================================================

#[test]
fn test_blocks_close_innermost_first() {
    let mut engines = Engines::new();
    let eid = engines.open_engine(None, None);
    let other = engines.open_engine(None, None);
    let outer = engines.open_block(eid).unwrap();
    let inner = engines.open_block(eid).unwrap();

    let err = engines.close_block(eid, outer).unwrap_err();
    assert!(is_handle_error(&err.kind));
    assert_eq!(engines.eval(other, "1 + 1").unwrap(), "2");

    engines.close_block(eid, inner).unwrap();
    engines.close_block(eid, outer).unwrap();
    assert!(is_handle_error(&engines.close_block(eid, outer).unwrap_err().kind));
}

#[test]
fn test_block_locals_disappear_on_close() {
    let mut engines = Engines::new();
    let eid = engines.open_engine(None, None);
    let block = engines.open_block(eid).unwrap();
    engines.eval(eid, "var inner = 1; fresh = 2").unwrap();
    assert_eq!(engines.get_var(eid, "inner").unwrap().as_deref(), Some("1"));
    engines.close_block(eid, block).unwrap();
    assert_eq!(engines.get_var(eid, "inner").unwrap(), None);
    // Undeclared assignment lands in the global table.
    assert_eq!(engines.get_var(eid, "fresh").unwrap().as_deref(), Some("2"));
}

#[test]
fn test_block_of_other_session_is_rejected() {
    let mut engines = Engines::new();
    let a = engines.open_engine(None, None);
    let b = engines.open_engine(None, None);
    let in_a = engines.open_block(a).unwrap();
    let in_b = engines.open_block(b).unwrap();
    assert_ne!(in_a, in_b);
    engines.set_local_var(b, "k", "v").unwrap();

    let err = engines.close_block(b, in_a).unwrap_err();
    assert!(is_handle_error(&err.kind));
    assert_eq!(engines.get_var(b, "k").unwrap().as_deref(), Some("v"));

    engines.close_block(b, in_b).unwrap();
    engines.close_block(a, in_a).unwrap();
}

#[test]
fn test_local_shadows_global() {
    let mut engines = Engines::new();
    let eid = engines.open_engine(None, None);
    engines.set_global_var(eid, "x", "global").unwrap();
    let block = engines.open_block(eid).unwrap();
    engines.set_local_var(eid, "x", "local").unwrap();
    assert_eq!(engines.get_var(eid, "x").unwrap().as_deref(), Some("local"));

    engines.eval(eid, "x = 'changed'").unwrap();
    engines.set_global_var(eid, "y", "from block").unwrap();
    engines.close_block(eid, block).unwrap();

    assert_eq!(engines.get_var(eid, "x").unwrap().as_deref(), Some("global"));
    assert_eq!(engines.get_var(eid, "y").unwrap().as_deref(), Some("from block"));
}

#[test]
fn test_failed_eval_closes_its_blocks() {
    let mut engines = Engines::new();
    let eid = engines.open_engine(None, None);
    let err = engines.eval(eid, "{ var q = 1; missing }").unwrap_err();
    assert!(matches!(err.kind, JErrorType::ReferenceError(_)));
    assert!(matches!(
        engines.eval(eid, "q").unwrap_err().kind,
        JErrorType::ReferenceError(_)
    ));
}

// ============================================================================
// Symbol tables
// ============================================================================

#[test]
fn test_host_variable_table_outlives_session() {
    let vars = Rc::new(RefCell::new(HashMap::new()));
    vars.borrow_mut().insert("preset".to_string(), "10".to_string());

    let mut engines = Engines::new();
    let eid = engines.open_engine(Some(Rc::clone(&vars)), None);
    engines.eval(eid, "var shared = preset * 2").unwrap();
    engines.close_engine(eid).unwrap();

    assert_eq!(vars.borrow().get("shared").map(String::as_str), Some("20"));

    // A second session sees the same table.
    let next = engines.open_engine(Some(Rc::clone(&vars)), None);
    assert_eq!(engines.eval(next, "shared + 1").unwrap(), "21");
}

#[test]
fn test_owned_variable_table_is_released() {
    let mut engines = Engines::new();
    let eid = engines.open_engine(None, None);
    engines.eval(eid, "var a = 1").unwrap();
    let table = engines.get_variable_table(eid).unwrap();
    assert_eq!(table.borrow().len(), 1);
    engines.close_engine(eid).unwrap();
    assert!(table.borrow().is_empty());
}

#[test]
fn test_user_handle() {
    let mut engines = Engines::new();
    let eid = engines.open_engine(None, None);
    assert!(engines.get_user_handle(eid).unwrap().is_none());

    let data: UserHandle = Rc::new(42u32);
    engines.set_user_handle(eid, Some(data)).unwrap();
    let back = engines.get_user_handle(eid).unwrap().unwrap();
    assert_eq!(back.downcast_ref::<u32>(), Some(&42));

    engines.set_user_handle(eid, None).unwrap();
    assert!(engines.get_user_handle(eid).unwrap().is_none());
}

#[test]
fn test_result_accessors() {
    let mut engines = Engines::new();
    let eid = engines.open_engine(None, None);
    engines.eval(eid, "3 * 3").unwrap();
    assert_eq!(engines.get_result(eid).unwrap(), "9");
    engines.set_result(eid, "override").unwrap();
    assert_eq!(engines.get_result(eid).unwrap(), "override");
}

// ============================================================================
// Errors and limits
// ============================================================================

#[test]
fn test_error_message_names_line() {
    let mut engines = Engines::new();
    let eid = engines.open_engine(None, None);
    let err = engines.eval(eid, "var a = 1\nvar b = 2\nc").unwrap_err();
    assert_eq!(err.line, 3);
    let message = engines.get_error(eid).unwrap().unwrap();
    assert!(message.starts_with("Reference error: Undefined variable 'c'"));
    assert!(message.contains("At line 3"));

    // A successful eval clears it.
    engines.eval(eid, "a").unwrap();
    assert_eq!(engines.get_error(eid).unwrap(), None);
}

#[test]
fn test_recursion_ceiling() {
    let mut engines = Engines::new();
    let eid = engines.open_engine(None, None);
    let deep = format!("{}1{}", "(".repeat(200), ")".repeat(200));
    let err = engines.eval(eid, &deep).unwrap_err();
    assert_eq!(
        err.kind,
        JErrorType::RangeError("Recursion limit exceeded".to_string())
    );
    assert_eq!(engines.eval(eid, "1 + 1").unwrap(), "2");

    let shallow = format!("{}1{}", "(".repeat(20), ")".repeat(20));
    assert_eq!(engines.eval(eid, &shallow).unwrap(), "1");
}

#[test]
fn test_configured_depth() {
    let mut engines = Engines::with_config(EngineConfig::default().with_max_depth(10));
    let eid = engines.open_engine(None, None);
    assert_eq!(engines.eval(eid, "1").unwrap(), "1");
    assert!(matches!(
        engines.eval(eid, "((((1))))").unwrap_err().kind,
        JErrorType::RangeError(_)
    ));
}
