use crate::runner::ds::value::{JsNumberType, JsValue};

pub const TRUE_STR: &str = "1";
pub const FALSE_STR: &str = "0";

/// Truthiness of a script value: the empty string and `"0"` are false.
pub fn to_boolean(v: &str) -> bool {
    !(v.is_empty() || v == FALSE_STR)
}

pub fn bool_to_string(b: bool) -> String {
    if b { TRUE_STR } else { FALSE_STR }.to_string()
}

pub fn to_number(v: &str) -> Option<JsNumberType> {
    match JsValue::from_script(v) {
        JsValue::Number(n) => Some(n),
        JsValue::String(_) => None,
    }
}

/// How a binary operator sees its operands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operands {
    /// Both sides are numeric strings.
    Numeric(JsNumberType, JsNumberType),
    /// At least one side is not numeric.
    Lexical,
}

/// The one coercion rule shared by every operator family: operands are
/// compared and combined numerically only if both are numeric in their
/// entirety, otherwise they are treated as strings.
pub fn coerce_operands(lhs: &str, rhs: &str) -> Operands {
    match (to_number(lhs), to_number(rhs)) {
        (Some(a), Some(b)) => Operands::Numeric(a, b),
        _ => Operands::Lexical,
    }
}
