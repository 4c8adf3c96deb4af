//! Runtime errors.
//!
//! Every failure during execution becomes one of these, and the report
//! carries only the rendered message. Except for `Raised`, whose text
//! is exactly what the script passed to `raise`, messages name the
//! 1-based line of the statement that was executing.

use steptrace_core::ast::{BinOp, UnOp};
use thiserror::Error;

/// An execution failure. Aborts the run; the trace and stdout captured
/// before the failing statement survive in the report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("undefined variable `{name}` at line {line}")]
    UndefinedVariable { name: String, line: u32 },

    #[error("unsupported operand types for `{op}`: `{lhs}` and `{rhs}` at line {line}")]
    BinaryTypeMismatch {
        op: BinOp,
        lhs: &'static str,
        rhs: &'static str,
        line: u32,
    },

    #[error("unsupported operand type for `{op}`: `{operand}` at line {line}")]
    UnaryTypeMismatch {
        op: UnOp,
        operand: &'static str,
        line: u32,
    },

    #[error("`{op}` requires `bool` operands, got `{got}` at line {line}")]
    LogicNotBool {
        op: BinOp,
        got: &'static str,
        line: u32,
    },

    #[error("condition must be `bool`, got `{got}` at line {line}")]
    ConditionNotBool { got: &'static str, line: u32 },

    #[error("divide by zero at line {line}")]
    DivideByZero { line: u32 },

    #[error("integer overflow at line {line}")]
    IntegerOverflow { line: u32 },

    #[error("cannot index into `{base}` at line {line}")]
    NotIndexable { base: &'static str, line: u32 },

    #[error("index must be `int`, got `{got}` at line {line}")]
    IndexNotInt { got: &'static str, line: u32 },

    #[error("index {index} out of range for length {len} at line {line}")]
    IndexOutOfRange { index: i64, len: usize, line: u32 },

    #[error("cannot assign into `{base}` at line {line}")]
    NotAssignable { base: &'static str, line: u32 },

    #[error("`{type_name}` is not callable at line {line}")]
    NotCallable { type_name: &'static str, line: u32 },

    #[error("wrong number of arguments for {name}(): expected {expected}, got {got} at line {line}")]
    WrongArity {
        name: String,
        expected: usize,
        got: usize,
        line: u32,
    },

    #[error("{name}() does not support `{got}` at line {line}")]
    BuiltinTypeMismatch {
        name: &'static str,
        got: &'static str,
        line: u32,
    },

    #[error("call depth {limit} exceeded at line {line}")]
    CallDepthExceeded { limit: usize, line: u32 },

    /// Produced by the `raise` statement. The message is the raised
    /// value's human form, verbatim.
    #[error("{message}")]
    Raised { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_line() {
        let err = RuntimeError::DivideByZero { line: 4 };
        assert_eq!(err.to_string(), "divide by zero at line 4");

        let err = RuntimeError::UndefinedVariable {
            name: "total".to_string(),
            line: 2,
        };
        assert_eq!(err.to_string(), "undefined variable `total` at line 2");

        let err = RuntimeError::BinaryTypeMismatch {
            op: BinOp::Add,
            lhs: "str",
            rhs: "int",
            line: 7,
        };
        assert_eq!(
            err.to_string(),
            "unsupported operand types for `+`: `str` and `int` at line 7"
        );
    }

    #[test]
    fn raised_message_is_verbatim() {
        let err = RuntimeError::Raised {
            message: "bad".to_string(),
        };
        assert_eq!(err.to_string(), "bad");
    }
}
