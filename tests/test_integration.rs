//! End-to-end tests: loops, blocks, `return` and natives that evaluate
//! script themselves.

extern crate ejs;

use ejs::runner::api::Engines;
use ejs::runner::ds::error::JsError;
use ejs::runner::plugin::types::BuiltInFn;
use ejs::runner::session::{EngineId, Js};
use pretty_assertions::assert_eq;

/// Helper to run a script and read one variable afterwards.
fn run_get_var(code: &str, var_name: &str) -> Option<String> {
    let mut engines = Engines::new();
    let eid = engines.open_engine(None, None);
    if let Err(e) = engines.eval(eid, code) {
        panic!("{:?} failed: {}", code, e);
    }
    engines.get_var(eid, var_name).unwrap()
}

fn open() -> (Engines, EngineId) {
    let mut engines = Engines::new();
    let eid = engines.open_engine(None, None);
    (engines, eid)
}

// ============================================================================
// for loops
// ============================================================================

#[test]
fn test_for_loop_sum() {
    let code = "var x = 0\nfor (var i = 0; i < 3; i = i + 1) x = x + i;";
    assert_eq!(run_get_var(code, "x").as_deref(), Some("3"));
}

#[test]
fn test_for_loop_with_block_body() {
    let code = r#"
var a = 0;
var b = 1;
for (var i = 0; i < 20; i++) {
    var temp = a;
    a = b;
    b = temp + b;
}
"#;
    assert_eq!(run_get_var(code, "a").as_deref(), Some("6765"));
    // Declared inside the body's block.
    assert_eq!(run_get_var(code, "temp"), None);
}

#[test]
fn test_nested_for_loops() {
    let code = r#"
var count = 0;
for (var i = 0; i < 10; i++) {
    for (var j = 0; j < i; j++) {
        count++;
    }
}
"#;
    assert_eq!(run_get_var(code, "count").as_deref(), Some("45"));
}

#[test]
fn test_for_loop_that_never_runs() {
    let code = "var hits = 0; for (var i = 5; i < 3; i++) hits = missing(hits);";
    assert_eq!(run_get_var(code, "hits").as_deref(), Some("0"));
    assert_eq!(run_get_var(code, "i").as_deref(), Some("5"));
}

#[test]
fn test_for_loop_without_condition_ends_on_return() {
    let code = "var n = 0; for (;;) { n++; if (n == 4) return n; }";
    let (mut engines, eid) = open();
    assert_eq!(engines.eval(eid, code).unwrap(), "4");
}

#[test]
fn test_statements_after_loop() {
    let code = "var s = ''\nfor (var i = 0; i < 3; i++) s = s + i + ','\nvar done = s + '!'";
    assert_eq!(run_get_var(code, "done").as_deref(), Some("0,1,2,!"));
}

#[test]
fn test_prime_count() {
    let code = r#"
var count = 0;
for (var n = 2; n < 50; n = n + 1) {
    var isPrime = 1;
    for (var i = 2; i * i <= n && isPrime; i = i + 1) {
        if (n % i == 0) isPrime = 0;
    }
    if (isPrime) count = count + 1;
}
"#;
    assert_eq!(run_get_var(code, "count").as_deref(), Some("15"));
}

// ============================================================================
// Blocks and return
// ============================================================================

#[test]
fn test_nested_blocks_shadow() {
    let code = r#"
var x = 'outer';
var seen = '';
{
    var x = 'middle';
    {
        var x = 'inner';
        seen = seen + x;
    }
    seen = seen + x;
}
seen = seen + x;
"#;
    assert_eq!(run_get_var(code, "seen").as_deref(), Some("innermiddleouter"));
}

#[test]
fn test_assignment_in_branch_survives_block() {
    let code = "if (1)\n{\n v = 1\n}\nelse\n{\n v = 2\n}\nv";
    let (mut engines, eid) = open();
    assert_eq!(engines.eval(eid, code).unwrap(), "1");
    assert_eq!(engines.get_var(eid, "v").unwrap().as_deref(), Some("1"));
}

#[test]
fn test_loop_body_assignment_survives_block() {
    let code = "for (var i = 0; i < 5; i++) { if (i == 3) found = i; }";
    assert_eq!(run_get_var(code, "found").as_deref(), Some("3"));
}

#[test]
fn test_return_ends_script() {
    let (mut engines, eid) = open();
    assert_eq!(engines.eval(eid, "var a = 1; return a + 1; a = 5").unwrap(), "2");
    assert_eq!(engines.get_var(eid, "a").unwrap().as_deref(), Some("1"));
}

#[test]
fn test_return_from_inside_loop() {
    let (mut engines, eid) = open();
    let code = "var i; for (i = 0; i < 10; i++) { if (i == 3) return i; }";
    assert_eq!(engines.eval(eid, code).unwrap(), "3");
    // The block the loop was in is gone.
    assert_eq!(engines.eval(eid, "var after = 1").unwrap(), "1");
    assert_eq!(engines.get_var(eid, "after").unwrap().as_deref(), Some("1"));
}

#[test]
fn test_bare_return() {
    let (mut engines, eid) = open();
    assert_eq!(engines.eval(eid, "5; return;").unwrap(), "");
}

#[test]
fn test_state_persists_between_evals() {
    let (mut engines, eid) = open();
    engines.eval(eid, "var x = 1").unwrap();
    engines.eval(eid, "x = x + 1").unwrap();
    assert_eq!(engines.get_var(eid, "x").unwrap().as_deref(), Some("2"));
}

#[test]
fn test_eval_block_discards_locals() {
    let (mut engines, eid) = open();
    engines.eval(eid, "var kept = 1").unwrap();
    assert_eq!(engines.eval_block(eid, "var t = 1; kept = 2; t + 1").unwrap(), "2");
    assert_eq!(engines.get_var(eid, "t").unwrap(), None);
    assert_eq!(engines.get_var(eid, "kept").unwrap().as_deref(), Some("2"));
}

// ============================================================================
// Re-entrant evaluation
// ============================================================================

fn run(js: &mut Js, args: &[String]) -> Result<(), JsError> {
    let script = args.first().cloned().unwrap_or_default();
    let value = js.eval(&script)?;
    js.set_result(value);
    Ok(())
}

#[test]
fn test_native_can_eval_on_its_session() {
    let (mut engines, eid) = open();
    engines
        .set_global_function(eid, "run", BuiltInFn::Native(run))
        .unwrap();
    let result = engines
        .eval(eid, "var z = 0\nvar y = run('z = 5; 1 + 2') + 1\ny + z")
        .unwrap();
    assert_eq!(result, "9");
    assert_eq!(engines.get_var(eid, "y").unwrap().as_deref(), Some("4"));
}

#[test]
fn test_nested_eval_error_surfaces_in_caller() {
    let (mut engines, eid) = open();
    engines
        .set_global_function(eid, "run", BuiltInFn::Native(run))
        .unwrap();
    let err = engines.eval(eid, "var a = 1\nrun('nope')").unwrap_err();
    assert_eq!(err.line, 1);
    // The outer script can still be evaluated afterwards.
    assert_eq!(engines.eval(eid, "a + 1").unwrap(), "2");
}
