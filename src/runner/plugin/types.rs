//! Core types of the native function bridge.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::runner::ds::error::JsError;
use crate::runner::session::Js;

/// Function signature for native functions.
///
/// A native function receives the calling session and the evaluated
/// argument strings. It reports its value through [`Js::set_result`]; a
/// function that never sets one yields the empty string.
pub type NativeFn = fn(js: &mut Js, args: &[String]) -> Result<(), JsError>;

/// Opaque host data attached to a session and visible to every native call
/// it makes.
pub type UserHandle = Rc<dyn Any>;

/// A callable entry of a function table.
#[derive(Clone)]
pub enum BuiltInFn {
    /// Plain function pointer.
    Native(NativeFn),

    /// Closure supplied by the host, possibly capturing state.
    Plugin(Rc<dyn Fn(&mut Js, &[String]) -> Result<(), JsError>>),
}

impl BuiltInFn {
    pub fn from_closure(f: impl Fn(&mut Js, &[String]) -> Result<(), JsError> + 'static) -> Self {
        BuiltInFn::Plugin(Rc::new(f))
    }

    /// Execute this function.
    pub fn call(&self, js: &mut Js, args: &[String]) -> Result<(), JsError> {
        match self {
            BuiltInFn::Native(f) => f(js, args),
            BuiltInFn::Plugin(f) => f(js, args),
        }
    }
}

impl From<NativeFn> for BuiltInFn {
    fn from(f: NativeFn) -> Self {
        BuiltInFn::Native(f)
    }
}

impl fmt::Debug for BuiltInFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuiltInFn::Native(_) => write!(f, "Native(..)"),
            BuiltInFn::Plugin(_) => write!(f, "Plugin(..)"),
        }
    }
}

/// The call being assembled: function name and evaluated arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsFun {
    pub name: String,
    pub args: Vec<String>,
}

impl JsFun {
    pub fn new(name: impl Into<String>) -> Self {
        JsFun {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn argc(&self) -> usize {
        self.args.len()
    }
}
