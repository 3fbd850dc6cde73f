//! Native function bridge tests.

extern crate ejs;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ejs::runner::api::Engines;
use ejs::runner::ds::error::{JErrorType, JsError};
use ejs::runner::plugin::args::js_args;
use ejs::runner::plugin::registry::{set_global_function_direct, FunctionTable};
use ejs::runner::plugin::types::BuiltInFn;
use ejs::runner::session::{EngineId, Js};
use pretty_assertions::assert_eq;

fn add(js: &mut Js, argv: &[String]) -> Result<(), JsError> {
    let args = js_args(argv, "%d %d")?;
    let a: i64 = args.take(0)?;
    let b: i64 = args.take(1)?;
    js.set_result((a + b).to_string());
    Ok(())
}

fn join(js: &mut Js, argv: &[String]) -> Result<(), JsError> {
    let args = js_args(argv, "%s, %*")?;
    let sep: String = args.take(0)?;
    js.set_result(args.rest().join(&sep));
    Ok(())
}

fn fail(_js: &mut Js, _argv: &[String]) -> Result<(), JsError> {
    Err(JsError::type_error("refused"))
}

fn with_natives() -> (Engines, EngineId) {
    let mut engines = Engines::new();
    let eid = engines.open_engine(None, None);
    engines.set_global_function(eid, "add", BuiltInFn::Native(add)).unwrap();
    engines.set_global_function(eid, "join", BuiltInFn::Native(join)).unwrap();
    engines.set_global_function(eid, "fail", BuiltInFn::Native(fail)).unwrap();
    (engines, eid)
}

#[test]
fn test_call_with_formatted_args() {
    let (mut engines, eid) = with_natives();
    assert_eq!(engines.eval(eid, "add(2, 3)").unwrap(), "5");
    assert_eq!(engines.eval(eid, "add(add(1, 1), '40') * 1").unwrap(), "42");
    assert_eq!(engines.eval(eid, "join('-', 'a', 'b', 1 + 1)").unwrap(), "a-b-2");
    assert_eq!(engines.eval(eid, "join(',')").unwrap(), "");
}

#[test]
fn test_argument_mismatch() {
    let (mut engines, eid) = with_natives();
    assert_eq!(
        engines.eval(eid, "add(1)").unwrap_err().kind,
        JErrorType::TypeError("Expected 2 arguments but got 1".to_string())
    );
    assert_eq!(
        engines.eval(eid, "add(1, 'x')").unwrap_err().kind,
        JErrorType::TypeError("Argument 2 should be an integer, got \"x\"".to_string())
    );
    assert!(engines.eval(eid, "join()").is_err());
}

#[test]
fn test_callback_error_propagates() {
    let (mut engines, eid) = with_natives();
    let err = engines.eval(eid, "var a = 1\nvar b = fail(a)").unwrap_err();
    assert_eq!(err.kind, JErrorType::TypeError("refused".to_string()));
    assert_eq!(err.line, 2);
    assert_eq!(engines.get_var(eid, "b").unwrap(), None);
    assert!(engines.get_error(eid).unwrap().unwrap().contains("refused"));
}

#[test]
fn test_unknown_function_evaluates_no_arguments() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let mut engines = Engines::new();
    let eid = engines.open_engine(None, None);
    engines
        .set_global_function(
            eid,
            "count",
            BuiltInFn::from_closure(move |js, _| {
                counter.set(counter.get() + 1);
                js.set_result(counter.get().to_string());
                Ok(())
            }),
        )
        .unwrap();

    assert_eq!(engines.eval(eid, "count()").unwrap(), "1");
    let err = engines.eval(eid, "missing(count())").unwrap_err();
    assert_eq!(
        err.kind,
        JErrorType::ReferenceError("Function 'missing' is not defined".to_string())
    );
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_native_sees_current_call() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    let mut engines = Engines::new();
    let eid = engines.open_engine(None, None);
    engines
        .set_global_function(
            eid,
            "probe",
            BuiltInFn::from_closure(move |js, args| {
                let current = js.current_function().cloned();
                if let Some(f) = current {
                    let argc = f.argc();
                    log.borrow_mut().push((f.name, argc, args.to_vec()));
                }
                Ok(())
            }),
        )
        .unwrap();

    assert_eq!(engines.eval(eid, "probe(1, 'two')").unwrap(), "");
    assert_eq!(
        *seen.borrow(),
        vec![(
            "probe".to_string(),
            2,
            vec!["1".to_string(), "two".to_string()]
        )]
    );
}

#[test]
fn test_native_can_set_variables() {
    let mut engines = Engines::new();
    let eid = engines.open_engine(None, None);
    engines
        .set_global_function(
            eid,
            "remember",
            BuiltInFn::from_closure(|js, args| {
                js.set_var("remembered", args.concat());
                Ok(())
            }),
        )
        .unwrap();
    engines.eval(eid, "remember('a', 'b')").unwrap();
    assert_eq!(
        engines.get_var(eid, "remembered").unwrap().as_deref(),
        Some("ab")
    );
}

#[test]
fn test_shared_function_table() {
    let table = Rc::new(RefCell::new(FunctionTable::new()));
    set_global_function_direct(&table, "add", BuiltInFn::Native(add));

    let mut engines = Engines::new();
    let a = engines.open_engine(None, Some(Rc::clone(&table)));
    let b = engines.open_engine(None, Some(Rc::clone(&table)));
    assert_eq!(engines.eval(a, "add(1, 2)").unwrap(), "3");
    assert_eq!(engines.eval(b, "add(3, 4)").unwrap(), "7");

    // Registering through one session is visible to the other.
    engines.set_global_function(a, "fail", BuiltInFn::Native(fail)).unwrap();
    assert!(engines.get_global_function(b, "fail").unwrap().is_some());

    engines.close_engine(a).unwrap();
    engines.close_engine(b).unwrap();
    assert_eq!(table.borrow().names(), vec!["add", "fail"]);
}

#[test]
fn test_remove_global_function() {
    let (mut engines, eid) = with_natives();
    assert!(engines.remove_global_function(eid, "add").unwrap());
    assert!(!engines.remove_global_function(eid, "add").unwrap());
    assert!(engines.get_global_function(eid, "add").unwrap().is_none());
    assert!(matches!(
        engines.eval(eid, "add(1, 2)").unwrap_err().kind,
        JErrorType::ReferenceError(_)
    ));
}

#[test]
fn test_owned_function_table_is_released() {
    let (mut engines, eid) = with_natives();
    let table = engines.get_function_table(eid).unwrap();
    assert_eq!(table.borrow().len(), 3);
    engines.close_engine(eid).unwrap();
    assert!(table.borrow().is_empty());
}
