//! Numeric string recognition.
//!
//! Script values are strings. Whether a value takes part in arithmetic as a
//! number is decided here: the whole string has to be a decimal integer, a
//! decimal with fraction and/or exponent, or a `0x` hex integer, each with an
//! optional sign. Surrounding white space makes a string non-numeric.

use pest::Parser;
use pest_derive::Parser;

use crate::runner::ds::value::JsNumberType;

#[derive(Parser)]
#[grammar = "parser/numeric_grammar.pest"] // relative to src
pub(crate) struct NumericParser;

/// Parse `s` as a number if, and only if, it is numeric in its entirety.
pub fn parse_numeric_string(s: &str) -> Option<JsNumberType> {
    let top = NumericParser::parse(Rule::numeric_string, s).ok()?.next()?;
    for pair in top.into_inner() {
        let text = pair.as_str();
        match pair.as_rule() {
            Rule::hex_integer => return parse_hex(text),
            Rule::decimal_float => return text.parse::<f64>().ok().map(JsNumberType::Float),
            Rule::decimal_integer => {
                return match text.parse::<i64>() {
                    Ok(i) => Some(JsNumberType::Integer(i)),
                    // Too large for an integer, still a number.
                    Err(_) => text.parse::<f64>().ok().map(JsNumberType::Float),
                };
            }
            _ => {}
        }
    }
    None
}

pub fn is_numeric_string(s: &str) -> bool {
    parse_numeric_string(s).is_some()
}

fn parse_hex(text: &str) -> Option<JsNumberType> {
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digits = &rest[2..];
    let number = match i64::from_str_radix(digits, 16) {
        Ok(i) => JsNumberType::Integer(if negative { -i } else { i }),
        // Too large for an integer, still a number.
        Err(_) => {
            let f = digits
                .chars()
                .try_fold(0f64, |acc, c| c.to_digit(16).map(|d| acc * 16.0 + f64::from(d)))?;
            JsNumberType::Float(if negative { -f } else { f })
        }
    };
    Some(number)
}
