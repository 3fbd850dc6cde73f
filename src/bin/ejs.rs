//! Command-line front end for the ejs script engine.
//!
//! Usage:
//!   ejs <file>                  # Evaluate a script file
//!   ejs -e "code"               # Evaluate code
//!   ejs                         # Start REPL (interactive mode)
//!
//! Logging is controlled by `EJS_LOG` (e.g. `EJS_LOG=debug`).

use ejs::runner::api::Engines;
use ejs::runner::ds::error::JsError;
use ejs::runner::plugin::args::js_args;
use ejs::runner::plugin::types::BuiltInFn;
use ejs::runner::session::{EngineId, Js};
use std::env;
use std::io::{self, Write};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();
    let args: Vec<String> = env::args().collect();

    match args.len() {
        1 => run_repl(),
        2 => {
            let arg = &args[1];
            if arg == "-h" || arg == "--help" {
                print_usage();
                process::exit(0);
            }
            let (mut engines, eid) = open_session();
            let outcome = engines.eval_file(eid, arg);
            finish(&engines, eid, outcome);
        }
        3 if args[1] == "-e" || args[1] == "--eval" => {
            let (mut engines, eid) = open_session();
            let outcome = engines.eval(eid, &args[2]);
            finish(&engines, eid, outcome);
        }
        _ => {
            print_usage();
            process::exit(1);
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("EJS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn print_usage() {
    eprintln!("ejs - embeddable script engine");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  ejs <file>                  Evaluate a script file");
    eprintln!("  ejs -e \"code\"               Evaluate code");
    eprintln!("  ejs --eval \"code\"           Evaluate code");
    eprintln!("  ejs                         Start REPL (interactive mode)");
}

/// `write(a, b, ...)` prints its arguments separated by spaces.
fn write(js: &mut Js, args: &[String]) -> Result<(), JsError> {
    let args = js_args(args, "%*")?;
    println!("{}", args.rest().join(" "));
    js.set_result("");
    Ok(())
}

/// `strlen(s)` is the length of `s` in characters.
fn strlen(js: &mut Js, args: &[String]) -> Result<(), JsError> {
    let s: String = js_args(args, "%s")?.take(0)?;
    js.set_result(s.chars().count().to_string());
    Ok(())
}

fn open_session() -> (Engines, EngineId) {
    let mut engines = Engines::new();
    let eid = engines.open_engine(None, None);
    let natives: [(&str, BuiltInFn); 2] = [
        ("write", BuiltInFn::Native(write)),
        ("strlen", BuiltInFn::Native(strlen)),
    ];
    for (name, f) in natives {
        if let Err(e) = engines.set_global_function(eid, name, f) {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
    (engines, eid)
}

fn report(engines: &Engines, eid: EngineId, e: &JsError) {
    match engines.get_error(eid) {
        Ok(Some(message)) => eprint!("{}", message),
        _ => eprintln!("{}", e),
    }
}

fn finish(engines: &Engines, eid: EngineId, outcome: Result<String, JsError>) {
    match outcome {
        Ok(result) => {
            if !result.is_empty() {
                println!("{}", result);
            }
        }
        Err(e) => {
            report(engines, eid, &e);
            process::exit(1);
        }
    }
}

fn run_repl() {
    println!("ejs v0.1.0");
    println!("Type statements and press Enter. Type .exit to quit.");
    println!();

    let (mut engines, eid) = open_session();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        if stdout.flush().is_err() {
            break;
        }

        let mut input = String::new();
        match stdin.read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        }

        let input = input.trim();
        if input == ".exit" || input == ".quit" {
            break;
        }
        if input.is_empty() {
            continue;
        }

        match engines.eval(eid, input) {
            Ok(result) => {
                if !result.is_empty() {
                    println!("{}", result);
                }
            }
            Err(e) => report(&engines, eid, &e),
        }
    }

    println!("Goodbye!");
}
