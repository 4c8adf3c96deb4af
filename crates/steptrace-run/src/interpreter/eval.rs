//! Pure operator evaluation.
//!
//! Everything here is a function of its operand values: binary and
//! unary operators, ordering, and element access, using checked
//! arithmetic with trap semantics for ints. Name lookup, calls, and
//! assignment need interpreter state and live in `state.rs`.

use steptrace_core::ast::{BinOp, UnOp};
use steptrace_core::value::Value;

use super::error::RuntimeError;

/// Applies a binary operator to two evaluated operands.
///
/// `and` and `or` are normally short-circuited by the interpreter
/// before operand evaluation; the arms here keep the operator table
/// total and enforce the same `bool` requirement.
pub(crate) fn binary_op(
    op: BinOp,
    lhs: Value,
    rhs: Value,
    line: u32,
) -> Result<Value, RuntimeError> {
    match op {
        BinOp::Add => match (lhs, rhs) {
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
            (Value::List(mut a), Value::List(b)) => {
                a.extend(b);
                Ok(Value::List(a))
            }
            (l, r) => arith(op, l, r, line, i64::checked_add, |a, b| a + b),
        },
        BinOp::Sub => arith(op, lhs, rhs, line, i64::checked_sub, |a, b| a - b),
        BinOp::Mul => arith(op, lhs, rhs, line, i64::checked_mul, |a, b| a * b),
        BinOp::Div => {
            // a zero rhs traps for ints and floats alike; float
            // division never produces inf
            if is_zero(&rhs) {
                return Err(RuntimeError::DivideByZero { line });
            }
            arith(op, lhs, rhs, line, i64::checked_div, |a, b| a / b)
        }
        BinOp::Mod => {
            if is_zero(&rhs) {
                return Err(RuntimeError::DivideByZero { line });
            }
            arith(op, lhs, rhs, line, i64::checked_rem, |a, b| a % b)
        }
        BinOp::Eq => Ok(Value::Bool(lhs == rhs)),
        BinOp::Ne => Ok(Value::Bool(lhs != rhs)),
        BinOp::Lt => ordered(op, lhs, rhs, line, std::cmp::Ordering::is_lt),
        BinOp::Le => ordered(op, lhs, rhs, line, std::cmp::Ordering::is_le),
        BinOp::Gt => ordered(op, lhs, rhs, line, std::cmp::Ordering::is_gt),
        BinOp::Ge => ordered(op, lhs, rhs, line, std::cmp::Ordering::is_ge),
        BinOp::And | BinOp::Or => match (lhs, rhs) {
            (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(match op {
                BinOp::And => a && b,
                _ => a || b,
            })),
            (Value::Bool(_), other) | (other, _) => Err(RuntimeError::LogicNotBool {
                op,
                got: other.type_name(),
                line,
            }),
        },
    }
}

/// Applies a unary operator to an evaluated operand.
pub(crate) fn unary_op(op: UnOp, operand: Value, line: u32) -> Result<Value, RuntimeError> {
    match (op, operand) {
        (UnOp::Neg, Value::Int(n)) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or(RuntimeError::IntegerOverflow { line }),
        (UnOp::Neg, Value::Float(x)) => Ok(Value::Float(-x)),
        (UnOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (op, other) => Err(RuntimeError::UnaryTypeMismatch {
            op,
            operand: other.type_name(),
            line,
        }),
    }
}

/// Reads `base[index]`. Lists yield the element, strings yield a
/// one-character string. Negative indices count from the end.
pub(crate) fn index_value(base: Value, index: Value, line: u32) -> Result<Value, RuntimeError> {
    let idx = match index {
        Value::Int(n) => n,
        other => {
            return Err(RuntimeError::IndexNotInt {
                got: other.type_name(),
                line,
            })
        }
    };
    match base {
        Value::List(items) => {
            let resolved = resolve_index(idx, items.len(), line)?;
            Ok(items[resolved].clone())
        }
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let resolved = resolve_index(idx, chars.len(), line)?;
            Ok(Value::Str(chars[resolved].to_string()))
        }
        other => Err(RuntimeError::NotIndexable {
            base: other.type_name(),
            line,
        }),
    }
}

/// Maps a possibly negative index into `0..len`, or errors with the
/// index as the script wrote it.
pub(crate) fn resolve_index(index: i64, len: usize, line: u32) -> Result<usize, RuntimeError> {
    let adjusted = if index < 0 {
        index + len as i64
    } else {
        index
    };
    if adjusted < 0 || adjusted as u64 >= len as u64 {
        return Err(RuntimeError::IndexOutOfRange { index, len, line });
    }
    Ok(adjusted as usize)
}

/// Numeric arithmetic with int/float promotion. Int results use the
/// checked operation and trap on overflow.
fn arith(
    op: BinOp,
    lhs: Value,
    rhs: Value,
    line: u32,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, RuntimeError> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => int_op(a, b)
            .map(Value::Int)
            .ok_or(RuntimeError::IntegerOverflow { line }),
        (Value::Int(a), Value::Float(b)) => Ok(Value::Float(float_op(a as f64, b))),
        (Value::Float(a), Value::Int(b)) => Ok(Value::Float(float_op(a, b as f64))),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(float_op(a, b))),
        (l, r) => Err(RuntimeError::BinaryTypeMismatch {
            op,
            lhs: l.type_name(),
            rhs: r.type_name(),
            line,
        }),
    }
}

fn is_zero(value: &Value) -> bool {
    match value {
        Value::Int(0) => true,
        Value::Float(x) => *x == 0.0,
        _ => false,
    }
}

/// Ordering comparisons. Ints and floats compare numerically across
/// the two types, strings compare lexicographically. A comparison
/// involving NaN is false, like the underlying float semantics.
fn ordered(
    op: BinOp,
    lhs: Value,
    rhs: Value,
    line: u32,
    test: fn(std::cmp::Ordering) -> bool,
) -> Result<Value, RuntimeError> {
    let ordering = match (&lhs, &rhs) {
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        (Value::Str(a), Value::Str(b)) => a.cmp(b),
        (Value::Int(a), Value::Float(b)) => match (*a as f64).partial_cmp(b) {
            Some(ordering) => ordering,
            None => return Ok(Value::Bool(false)),
        },
        (Value::Float(a), Value::Int(b)) => match a.partial_cmp(&(*b as f64)) {
            Some(ordering) => ordering,
            None => return Ok(Value::Bool(false)),
        },
        (Value::Float(a), Value::Float(b)) => match a.partial_cmp(b) {
            Some(ordering) => ordering,
            None => return Ok(Value::Bool(false)),
        },
        _ => {
            return Err(RuntimeError::BinaryTypeMismatch {
                op,
                lhs: lhs.type_name(),
                rhs: rhs.type_name(),
                line,
            })
        }
    };
    Ok(Value::Bool(test(ordering)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> Value {
        Value::Int(n)
    }

    fn float(x: f64) -> Value {
        Value::Float(x)
    }

    fn string(s: &str) -> Value {
        Value::Str(s.to_string())
    }

    #[test]
    fn int_arithmetic_is_checked() {
        assert_eq!(binary_op(BinOp::Add, int(2), int(3), 1), Ok(int(5)));
        assert_eq!(
            binary_op(BinOp::Add, int(i64::MAX), int(1), 1),
            Err(RuntimeError::IntegerOverflow { line: 1 })
        );
        assert_eq!(
            binary_op(BinOp::Mul, int(i64::MIN), int(-1), 2),
            Err(RuntimeError::IntegerOverflow { line: 2 })
        );
    }

    #[test]
    fn division_by_zero_traps_for_ints_and_floats() {
        assert_eq!(
            binary_op(BinOp::Div, int(1), int(0), 3),
            Err(RuntimeError::DivideByZero { line: 3 })
        );
        assert_eq!(
            binary_op(BinOp::Div, float(1.0), float(0.0), 3),
            Err(RuntimeError::DivideByZero { line: 3 })
        );
        assert_eq!(
            binary_op(BinOp::Mod, int(7), int(0), 3),
            Err(RuntimeError::DivideByZero { line: 3 })
        );
    }

    #[test]
    fn int_min_divided_by_minus_one_overflows() {
        assert_eq!(
            binary_op(BinOp::Div, int(i64::MIN), int(-1), 1),
            Err(RuntimeError::IntegerOverflow { line: 1 })
        );
    }

    #[test]
    fn mixed_numeric_operands_promote_to_float() {
        assert_eq!(binary_op(BinOp::Add, int(1), float(0.5), 1), Ok(float(1.5)));
        assert_eq!(binary_op(BinOp::Mul, float(2.0), int(3), 1), Ok(float(6.0)));
    }

    #[test]
    fn plus_concatenates_strings_and_lists() {
        assert_eq!(
            binary_op(BinOp::Add, string("ab"), string("cd"), 1),
            Ok(string("abcd"))
        );
        assert_eq!(
            binary_op(
                BinOp::Add,
                Value::List(vec![int(1)]),
                Value::List(vec![int(2)]),
                1
            ),
            Ok(Value::List(vec![int(1), int(2)]))
        );
    }

    #[test]
    fn mismatched_operands_report_both_types() {
        let err = binary_op(BinOp::Add, string("a"), int(1), 4).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported operand types for `+`: `str` and `int` at line 4"
        );
        let err = binary_op(BinOp::Sub, string("a"), string("b"), 4).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported operand types for `-`: `str` and `str` at line 4"
        );
    }

    #[test]
    fn equality_crosses_types_without_error() {
        assert_eq!(binary_op(BinOp::Eq, int(1), float(1.0), 1), Ok(Value::Bool(true)));
        assert_eq!(
            binary_op(BinOp::Eq, int(0), string("0"), 1),
            Ok(Value::Bool(false))
        );
        assert_eq!(
            binary_op(BinOp::Ne, Value::Nil, Value::Bool(false), 1),
            Ok(Value::Bool(true))
        );
    }

    #[test]
    fn ordering_works_for_numbers_and_strings() {
        assert_eq!(binary_op(BinOp::Lt, int(1), int(2), 1), Ok(Value::Bool(true)));
        assert_eq!(
            binary_op(BinOp::Ge, float(2.5), int(2), 1),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            binary_op(BinOp::Lt, string("apple"), string("banana"), 1),
            Ok(Value::Bool(true))
        );
        assert!(binary_op(BinOp::Lt, string("a"), int(1), 1).is_err());
    }

    #[test]
    fn nan_ordering_is_false_not_an_error() {
        assert_eq!(
            binary_op(BinOp::Lt, float(f64::NAN), float(1.0), 1),
            Ok(Value::Bool(false))
        );
        assert_eq!(
            binary_op(BinOp::Ge, float(f64::NAN), float(1.0), 1),
            Ok(Value::Bool(false))
        );
    }

    #[test]
    fn unary_operators_check_types() {
        assert_eq!(unary_op(UnOp::Neg, int(3), 1), Ok(int(-3)));
        assert_eq!(unary_op(UnOp::Neg, float(1.5), 1), Ok(float(-1.5)));
        assert_eq!(
            unary_op(UnOp::Neg, int(i64::MIN), 1),
            Err(RuntimeError::IntegerOverflow { line: 1 })
        );
        assert_eq!(unary_op(UnOp::Not, Value::Bool(true), 1), Ok(Value::Bool(false)));
        assert_eq!(
            unary_op(UnOp::Not, int(1), 2),
            Err(RuntimeError::UnaryTypeMismatch {
                op: UnOp::Not,
                operand: "int",
                line: 2,
            })
        );
    }

    #[test]
    fn indexing_lists_and_strings() {
        let list = Value::List(vec![int(10), int(20), int(30)]);
        assert_eq!(index_value(list.clone(), int(0), 1), Ok(int(10)));
        assert_eq!(index_value(list.clone(), int(-1), 1), Ok(int(30)));
        assert_eq!(
            index_value(list.clone(), int(3), 1),
            Err(RuntimeError::IndexOutOfRange {
                index: 3,
                len: 3,
                line: 1,
            })
        );
        assert_eq!(
            index_value(list, int(-4), 1),
            Err(RuntimeError::IndexOutOfRange {
                index: -4,
                len: 3,
                line: 1,
            })
        );
        assert_eq!(index_value(string("héllo"), int(1), 1), Ok(string("é")));
        assert_eq!(
            index_value(int(5), int(0), 2),
            Err(RuntimeError::NotIndexable {
                base: "int",
                line: 2,
            })
        );
        assert_eq!(
            index_value(Value::List(vec![]), string("0"), 2),
            Err(RuntimeError::IndexNotInt {
                got: "str",
                line: 2,
            })
        );
    }

    #[test]
    fn logic_operands_must_be_bool() {
        assert_eq!(
            binary_op(BinOp::And, Value::Bool(true), Value::Bool(false), 1),
            Ok(Value::Bool(false))
        );
        assert_eq!(
            binary_op(BinOp::Or, Value::Bool(false), Value::Bool(true), 1),
            Ok(Value::Bool(true))
        );
        let err = binary_op(BinOp::And, int(1), Value::Bool(true), 5).unwrap_err();
        assert_eq!(
            err.to_string(),
            "`and` requires `bool` operands, got `int` at line 5"
        );
    }
}
