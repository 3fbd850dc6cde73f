use std::fmt;
use std::fmt::{Display, Formatter};

use crate::parser::numeric::parse_numeric_string;

/// A script value seen through operator coercion.
///
/// Scripts store every value as a string. When an operator runs, each
/// operand is classified once: a string that is numeric in its entirety
/// becomes a `Number`, anything else stays a `String`.
#[derive(Debug, Clone, PartialEq)]
pub enum JsValue {
    String(String),
    Number(JsNumberType),
}

impl JsValue {
    pub fn from_script(s: &str) -> Self {
        match parse_numeric_string(s) {
            Some(n) => JsValue::Number(n),
            None => JsValue::String(s.to_string()),
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, JsValue::Number(_))
    }
}

impl Display for JsValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            JsValue::String(s) => write!(f, "{}", s),
            JsValue::Number(n) => write!(f, "{}", n),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JsNumberType {
    Integer(i64),
    Float(f64),
}

impl JsNumberType {
    pub fn as_f64(&self) -> f64 {
        match self {
            JsNumberType::Integer(i) => *i as f64,
            JsNumberType::Float(f) => *f,
        }
    }

    /// The integer value, if the number has no fractional part.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            JsNumberType::Integer(i) => Some(*i),
            JsNumberType::Float(f) => {
                if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
                    Some(*f as i64)
                } else {
                    None
                }
            }
        }
    }
}

/// Numbers render the way scripts expect to read them back: floats with no
/// fractional part print as integers.
impl Display for JsNumberType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            JsNumberType::Integer(i) => write!(f, "{}", i),
            JsNumberType::Float(nf) => {
                if nf.is_nan() {
                    write!(f, "NaN")
                } else if nf.is_infinite() {
                    write!(f, "{}", if *nf > 0.0 { "Infinity" } else { "-Infinity" })
                } else if nf.fract() == 0.0 && nf.abs() < 1.0e15 {
                    write!(f, "{}", *nf as i64)
                } else {
                    write!(f, "{}", nf)
                }
            }
        }
    }
}
