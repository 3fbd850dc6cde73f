//! # ejs - embeddable string-valued script engine
//!
//! A small scripting language for hosts that want to let users write
//! conditions, loops and calls into host-provided functions:
//! - every value is a string; operators coerce numeric strings to numbers
//! - statements are parsed and evaluated in one pass by an explicit state
//!   machine, with a ceiling on nesting depth
//! - sessions and blocks are addressed through generation-checked ids
//! - host functions are registered by name and receive string arguments
//!
//! ## Quick Start
//!
//! ```
//! use ejs::runner::api::Engines;
//!
//! let mut engines = Engines::new();
//! let eid = engines.open_engine(None, None);
//! engines.eval(eid, "var x = 0").unwrap();
//! engines
//!     .eval(eid, "for (var i = 0; i < 3; i = i + 1) x = x + i;")
//!     .unwrap();
//! assert_eq!(engines.get_var(eid, "x").unwrap().as_deref(), Some("3"));
//! engines.close_engine(eid).unwrap();
//! ```
//!
//! ### Native Functions
//!
//! ```
//! use ejs::runner::api::Engines;
//! use ejs::runner::ds::error::JsError;
//! use ejs::runner::plugin::types::BuiltInFn;
//! use ejs::runner::session::Js;
//!
//! fn upper(js: &mut Js, args: &[String]) -> Result<(), JsError> {
//!     let joined: String = args.concat();
//!     js.set_result(joined.to_uppercase());
//!     Ok(())
//! }
//!
//! let mut engines = Engines::new();
//! let eid = engines.open_engine(None, None);
//! engines.set_global_function(eid, "upper", BuiltInFn::Native(upper)).unwrap();
//! assert_eq!(engines.eval(eid, "upper('a', \"b\") + 1").unwrap(), "AB1");
//! ```
//!
//! ### Errors
//!
//! ```
//! use ejs::runner::api::Engines;
//! use ejs::runner::ds::error::JErrorType;
//!
//! let mut engines = Engines::new();
//! let eid = engines.open_engine(None, None);
//! let err = engines.eval(eid, "x = 1;\ny = missing(2);").unwrap_err();
//! assert!(matches!(err.kind, JErrorType::ReferenceError(_)));
//! assert_eq!(err.line, 2);
//! assert!(engines.get_error(eid).unwrap().unwrap().contains("At line 2"));
//! ```
//!
//! ## Architecture
//!
//! - **[`parser`]** - byte queues, tokens, the lexer and numeric strings
//! - **[`runner`]** - sessions and the handle-addressed API
//!   - **[`runner::eval`]** - the parsing state machine
//!   - **[`runner::ds`]** - values, errors, handles, scopes, operators
//!   - **[`runner::plugin`]** - native functions and argument parsing

#[macro_use]
extern crate lazy_static;

pub mod parser;
pub mod runner;

#[cfg(test)]
pub(crate) mod test_utils {
    use std::sync::Once;

    static INIT: Once = Once::new();

    /// Route `tracing` output to the test harness. Filtered by `EJS_LOG`.
    pub fn init_test_logging() {
        INIT.call_once(|| {
            let filter = tracing_subscriber::EnvFilter::try_from_env("EJS_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_test_writer()
                .try_init();
        });
    }
}
