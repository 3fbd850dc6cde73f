use crate::parser::token::{CondOp, ExprOp};
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::operations::type_conversion::{
    bool_to_string, coerce_operands, to_boolean, to_number, Operands,
};
use crate::runner::ds::value::JsNumberType;

fn divide_by_zero() -> JErrorType {
    JErrorType::RangeError("Divide by zero".to_string())
}

fn integer_op(op: ExprOp, x: i64, y: i64) -> Result<JsNumberType, JErrorType> {
    let float = |v: f64| JsNumberType::Float(v);
    Ok(match op {
        ExprOp::Plus => x
            .checked_add(y)
            .map_or_else(|| float(x as f64 + y as f64), JsNumberType::Integer),
        ExprOp::Minus => x
            .checked_sub(y)
            .map_or_else(|| float(x as f64 - y as f64), JsNumberType::Integer),
        ExprOp::Mul => x
            .checked_mul(y)
            .map_or_else(|| float(x as f64 * y as f64), JsNumberType::Integer),
        ExprOp::Div => {
            if y == 0 {
                return Err(divide_by_zero());
            }
            match (x.checked_rem(y), x.checked_div(y)) {
                (Some(0), Some(q)) => JsNumberType::Integer(q),
                _ => float(x as f64 / y as f64),
            }
        }
        ExprOp::Mod => {
            if y == 0 {
                return Err(divide_by_zero());
            }
            JsNumberType::Integer(x.checked_rem(y).unwrap_or(0))
        }
        ExprOp::LShift => JsNumberType::Integer(x.wrapping_shl((y & 63) as u32)),
        ExprOp::RShift => JsNumberType::Integer(x.wrapping_shr((y & 63) as u32)),
        _ => return Err(not_arithmetic(op)),
    })
}

fn float_op(op: ExprOp, x: f64, y: f64) -> Result<JsNumberType, JErrorType> {
    Ok(JsNumberType::Float(match op {
        ExprOp::Plus => x + y,
        ExprOp::Minus => x - y,
        ExprOp::Mul => x * y,
        ExprOp::Div | ExprOp::Mod if y == 0.0 => return Err(divide_by_zero()),
        ExprOp::Div => x / y,
        ExprOp::Mod => x % y,
        ExprOp::LShift | ExprOp::RShift => {
            return Err(JErrorType::TypeError(format!(
                "Operator '{}' requires integer operands",
                op.symbol()
            )))
        }
        _ => return Err(not_arithmetic(op)),
    }))
}

fn not_arithmetic(op: ExprOp) -> JErrorType {
    JErrorType::SyntaxError(format!("'{}' is not an arithmetic operator", op.symbol()))
}

pub fn numeric_op(op: ExprOp, a: JsNumberType, b: JsNumberType) -> Result<JsNumberType, JErrorType> {
    match (a, b) {
        (JsNumberType::Integer(x), JsNumberType::Integer(y)) => integer_op(op, x, y),
        _ => match (op, a.as_integer(), b.as_integer()) {
            (ExprOp::LShift | ExprOp::RShift, Some(x), Some(y)) => integer_op(op, x, y),
            _ => float_op(op, a.as_f64(), b.as_f64()),
        },
    }
}

/// Apply an arithmetic operator to two script values.
///
/// Numeric operands produce a rendered number. With a non-numeric operand
/// `+` concatenates and every other operator is a type error.
pub fn apply_arithmetic(op: ExprOp, lhs: &str, rhs: &str) -> Result<String, JErrorType> {
    match coerce_operands(lhs, rhs) {
        Operands::Numeric(a, b) => Ok(numeric_op(op, a, b)?.to_string()),
        Operands::Lexical if op == ExprOp::Plus => {
            let mut s = String::with_capacity(lhs.len() + rhs.len());
            s.push_str(lhs);
            s.push_str(rhs);
            Ok(s)
        }
        Operands::Lexical => Err(JErrorType::TypeError(format!(
            "Operator '{}' requires numeric operands, got \"{}\" and \"{}\"",
            op.symbol(),
            lhs,
            rhs
        ))),
    }
}

/// Apply `&&` or `||`. The result is `"1"` or `"0"`.
pub fn apply_logical(op: CondOp, lhs: &str, rhs: &str) -> Result<String, JErrorType> {
    let (l, r) = (to_boolean(lhs), to_boolean(rhs));
    match op {
        CondOp::And => Ok(bool_to_string(l && r)),
        CondOp::Or => Ok(bool_to_string(l || r)),
        CondOp::Not => Err(JErrorType::SyntaxError("'!' is a unary operator".to_string())),
    }
}

pub fn logical_not(v: &str) -> String {
    bool_to_string(!to_boolean(v))
}

/// Unary minus.
pub fn negate(v: &str) -> Result<String, JErrorType> {
    match to_number(v) {
        Some(n) => Ok(numeric_op(ExprOp::Minus, JsNumberType::Integer(0), n)?.to_string()),
        None => Err(JErrorType::TypeError(format!(
            "Operator '-' requires a numeric operand, got \"{}\"",
            v
        ))),
    }
}

/// `++` / `--` applied to a variable's current value.
pub fn increment(v: &str, op: ExprOp) -> Result<String, JErrorType> {
    let delta = match op {
        ExprOp::Inc => ExprOp::Plus,
        ExprOp::Dec => ExprOp::Minus,
        _ => return Err(not_arithmetic(op)),
    };
    match to_number(v) {
        Some(n) => Ok(numeric_op(delta, n, JsNumberType::Integer(1))?.to_string()),
        None => Err(JErrorType::TypeError(format!(
            "Operator '{}' requires a numeric operand, got \"{}\"",
            op.symbol(),
            v
        ))),
    }
}
