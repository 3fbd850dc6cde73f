//! Evaluation of scripts.
//!
//! Parsing and evaluation happen in one pass: each construct is evaluated
//! as soon as it has been read, and nothing is kept once a statement is
//! done. Constructs that are read without being executed (the untaken
//! branch of an `if`, the right side of a settled `&&`) are parsed with
//! execution turned off, which still reports lexical and syntax errors.

pub(crate) mod expression;
pub(crate) mod machine;
pub(crate) mod statement;
