//! Format-driven argument extraction for native functions.
//!
//! A format is a sequence of `%s` (string), `%d` (integer), `%f` (float) and
//! `%b` (boolean), separated by optional spaces or commas. A trailing `%*`
//! accepts any number of further arguments as strings.
//!
//! ```
//! use ejs::runner::plugin::args::js_args;
//!
//! let argv = vec!["width".to_string(), "42".to_string()];
//! let args = js_args(&argv, "%s %d").unwrap();
//! let name: String = args.take(0).unwrap();
//! let value: i64 = args.take(1).unwrap();
//! assert_eq!((name.as_str(), value), ("width", 42));
//! ```

use std::fmt;

use pest::Parser;
use pest_derive::Parser;

use crate::runner::ds::error::JsError;
use crate::runner::ds::operations::type_conversion::to_number;

#[derive(Parser)]
#[grammar = "runner/plugin/format_grammar.pest"] // relative to src
struct FormatParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    String,
    Integer,
    Float,
    Boolean,
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArgKind::String => "a string",
            ArgKind::Integer => "an integer",
            ArgKind::Float => "a number",
            ArgKind::Boolean => "a boolean",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

/// A parsed format descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgFormat {
    kinds: Vec<ArgKind>,
    rest: bool,
}

impl ArgFormat {
    pub fn parse(format: &str) -> Result<Self, JsError> {
        let top = FormatParser::parse(Rule::format, format)
            .map_err(|_| JsError::type_error(format!("Invalid argument format \"{}\"", format)))?
            .next()
            .ok_or_else(|| JsError::type_error(format!("Invalid argument format \"{}\"", format)))?;
        let mut kinds = Vec::new();
        let mut rest = false;
        for pair in top.into_inner() {
            match pair.as_rule() {
                Rule::string_arg => kinds.push(ArgKind::String),
                Rule::integer_arg => kinds.push(ArgKind::Integer),
                Rule::float_arg => kinds.push(ArgKind::Float),
                Rule::boolean_arg => kinds.push(ArgKind::Boolean),
                Rule::rest_args => rest = true,
                _ => {}
            }
        }
        Ok(ArgFormat { kinds, rest })
    }

    pub fn kinds(&self) -> &[ArgKind] {
        &self.kinds
    }

    pub fn accepts_rest(&self) -> bool {
        self.rest
    }

    /// Match `argv` against the format and convert each argument.
    pub fn extract(&self, argv: &[String]) -> Result<Args, JsError> {
        let expected = self.kinds.len();
        if self.rest && argv.len() < expected {
            return Err(JsError::type_error(format!(
                "Expected at least {} arguments but got {}",
                expected,
                argv.len()
            )));
        }
        if !self.rest && argv.len() != expected {
            return Err(JsError::type_error(format!(
                "Expected {} arguments but got {}",
                expected,
                argv.len()
            )));
        }
        let values = self
            .kinds
            .iter()
            .zip(argv)
            .enumerate()
            .map(|(i, (kind, arg))| {
                convert(*kind, arg).ok_or_else(|| {
                    JsError::type_error(format!(
                        "Argument {} should be {}, got \"{}\"",
                        i + 1,
                        kind,
                        arg
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Args {
            values,
            rest: argv[expected..].to_vec(),
        })
    }
}

fn convert(kind: ArgKind, arg: &str) -> Option<ArgValue> {
    match kind {
        ArgKind::String => Some(ArgValue::String(arg.to_string())),
        ArgKind::Integer => to_number(arg)?.as_integer().map(ArgValue::Integer),
        ArgKind::Float => to_number(arg).map(|n| ArgValue::Float(n.as_f64())),
        ArgKind::Boolean => Some(ArgValue::Boolean(!matches!(arg, "" | "0" | "false"))),
    }
}

/// Converted arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    values: Vec<ArgValue>,
    rest: Vec<String>,
}

impl Args {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ArgValue> {
        self.values.get(index)
    }

    pub fn values(&self) -> &[ArgValue] {
        &self.values
    }

    /// Arguments matched by `%*`.
    pub fn rest(&self) -> &[String] {
        &self.rest
    }

    /// The argument at `index` as a Rust value.
    pub fn take<T: FromArg>(&self, index: usize) -> Result<T, JsError> {
        let value = self
            .values
            .get(index)
            .ok_or_else(|| JsError::type_error(format!("No argument at position {}", index + 1)))?;
        T::from_arg(value).ok_or_else(|| {
            JsError::type_error(format!(
                "Argument {} cannot be read as {}",
                index + 1,
                T::KIND
            ))
        })
    }
}

/// Rust types an [`ArgValue`] can be read as.
pub trait FromArg: Sized {
    const KIND: ArgKind;

    fn from_arg(value: &ArgValue) -> Option<Self>;
}

impl FromArg for String {
    const KIND: ArgKind = ArgKind::String;

    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromArg for i64 {
    const KIND: ArgKind = ArgKind::Integer;

    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromArg for f64 {
    const KIND: ArgKind = ArgKind::Float;

    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Float(f) => Some(*f),
            ArgValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl FromArg for bool {
    const KIND: ArgKind = ArgKind::Boolean;

    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

/// Parse `format` and match `argv` against it in one go.
pub fn js_args(argv: &[String], format: &str) -> Result<Args, JsError> {
    ArgFormat::parse(format)?.extract(argv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::error::JErrorType;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_format() {
        let f = ArgFormat::parse("%s, %d %f\t%b").unwrap();
        assert_eq!(
            f.kinds(),
            &[ArgKind::String, ArgKind::Integer, ArgKind::Float, ArgKind::Boolean]
        );
        assert!(!f.accepts_rest());
        assert!(ArgFormat::parse("%s %*").unwrap().accepts_rest());
        assert!(ArgFormat::parse("").unwrap().kinds().is_empty());
        assert!(ArgFormat::parse("%x").is_err());
        assert!(ArgFormat::parse("%* %s").is_err());
    }

    #[test]
    fn test_extract_typed_values() {
        let args = js_args(&argv(&["abc", "0x10", "2.5", "false"]), "%s %d %f %b").unwrap();
        assert_eq!(args.take::<String>(0).unwrap(), "abc");
        assert_eq!(args.take::<i64>(1).unwrap(), 16);
        assert_eq!(args.take::<f64>(2).unwrap(), 2.5);
        assert!(!args.take::<bool>(3).unwrap());
        assert!(args.take::<i64>(0).is_err());
        assert!(args.take::<String>(9).is_err());
    }

    #[test]
    fn test_count_mismatch() {
        let err = js_args(&argv(&["a"]), "%s %s").unwrap_err();
        assert_eq!(
            err.kind,
            JErrorType::TypeError("Expected 2 arguments but got 1".to_string())
        );
        assert!(js_args(&argv(&["a", "b"]), "%s").is_err());
        assert!(js_args(&argv(&[]), "%s %*").is_err());
    }

    #[test]
    fn test_conversion_mismatch() {
        let err = js_args(&argv(&["4.5"]), "%d").unwrap_err();
        assert_eq!(
            err.kind,
            JErrorType::TypeError("Argument 1 should be an integer, got \"4.5\"".to_string())
        );
        assert!(js_args(&argv(&["abc"]), "%f").is_err());
        assert_eq!(js_args(&argv(&["4.0"]), "%d").unwrap().take::<i64>(0).unwrap(), 4);
    }

    #[test]
    fn test_rest_arguments() {
        let args = js_args(&argv(&["x", "1", "2"]), "%s %*").unwrap();
        assert_eq!(args.len(), 1);
        assert_eq!(args.rest(), &argv(&["1", "2"])[..]);
    }
}
