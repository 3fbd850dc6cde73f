//! Native function bridge.
//!
//! Host code exposes functionality to scripts by registering native
//! functions in a [`FunctionTable`]. A script call `name(a, b)` evaluates
//! its arguments to strings, looks `name` up in the session's table and
//! invokes the entry with the session and the argument list. The function
//! answers by setting the session result.
//!
//! ```
//! use ejs::runner::api::Engines;
//! use ejs::runner::plugin::args::js_args;
//! use ejs::runner::plugin::types::BuiltInFn;
//!
//! let mut engines = Engines::new();
//! let eid = engines.open_engine(None, None);
//! engines
//!     .set_global_function(eid, "twice", BuiltInFn::from_closure(|js, argv| {
//!         let n: i64 = js_args(argv, "%d")?.take(0)?;
//!         js.set_result((n * 2).to_string());
//!         Ok(())
//!     }))
//!     .unwrap();
//! assert_eq!(engines.eval(eid, "twice(21)").unwrap(), "42");
//! ```

pub mod args;
pub mod registry;
pub mod types;

pub use args::{js_args, ArgFormat, ArgKind, ArgValue, Args, FromArg};
pub use registry::{set_global_function_direct, FunctionTable, SharedFunctionTable};
pub use types::{BuiltInFn, JsFun, NativeFn, UserHandle};
