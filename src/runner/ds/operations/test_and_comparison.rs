use std::cmp::Ordering;

use crate::parser::token::ExprOp;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::operations::type_conversion::{coerce_operands, Operands};
use crate::runner::ds::value::JsNumberType;

fn compare_numbers(a: JsNumberType, b: JsNumberType) -> Option<Ordering> {
    match (a, b) {
        (JsNumberType::Integer(x), JsNumberType::Integer(y)) => Some(x.cmp(&y)),
        _ => a.as_f64().partial_cmp(&b.as_f64()),
    }
}

/// Order two script values: numerically when both are numeric, byte-wise
/// otherwise.
pub fn order(lhs: &str, rhs: &str) -> Option<Ordering> {
    match coerce_operands(lhs, rhs) {
        Operands::Numeric(a, b) => compare_numbers(a, b),
        Operands::Lexical => Some(lhs.as_bytes().cmp(rhs.as_bytes())),
    }
}

/// Apply a relational operator.
pub fn compare(op: ExprOp, lhs: &str, rhs: &str) -> Result<bool, JErrorType> {
    let ordering = order(lhs, rhs);
    Ok(match op {
        ExprOp::Less => ordering == Some(Ordering::Less),
        ExprOp::LessEq => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        ExprOp::Greater => ordering == Some(Ordering::Greater),
        ExprOp::GreaterEq => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        ExprOp::Eq => ordering == Some(Ordering::Equal),
        ExprOp::NotEq => ordering != Some(Ordering::Equal),
        _ => {
            return Err(JErrorType::SyntaxError(format!(
                "'{}' is not a relational operator",
                op.symbol()
            )))
        }
    })
}
