//! Lexical layer of the engine.
//!
//! - [`input`] - the input frame (script queue, token buffer, pushback, position)
//! - [`lexer`] - tokenization of the input frame, driven by the parser state
//! - [`numeric`] - recognition of numeric strings for operator coercion
//! - [`state`] - parser states and evaluation flags

pub mod input;
pub mod lexer;
pub mod numeric;
pub mod queue;
pub mod state;
pub mod token;

pub use input::JsInput;
pub use numeric::{is_numeric_string, parse_numeric_string};
pub use queue::ByteQueue;
pub use state::{Flags, State};
pub use token::{CondOp, ExprOp, Token, TokenId};
