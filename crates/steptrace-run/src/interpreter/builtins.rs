//! Built-in functions.
//!
//! Builtins are pure here: `print` does not write anywhere itself, it
//! returns the text to append so the interpreter stays the only owner
//! of the captured stdout buffer.

use steptrace_core::repr::display;
use steptrace_core::value::{Builtin, Value};

use super::error::RuntimeError;

/// What a builtin call produced.
#[derive(Debug)]
pub(crate) struct BuiltinOutcome {
    /// The call's return value.
    pub(crate) value: Value,
    /// Text to append to captured stdout, if any.
    pub(crate) printed: Option<String>,
}

impl BuiltinOutcome {
    fn just(value: Value) -> Self {
        BuiltinOutcome {
            value,
            printed: None,
        }
    }
}

/// Evaluates a builtin call.
pub(crate) fn call_builtin(
    builtin: Builtin,
    args: &[Value],
    line: u32,
) -> Result<BuiltinOutcome, RuntimeError> {
    match builtin {
        // print takes any number of arguments, space-separated, in
        // human form, with a trailing newline
        Builtin::Print => {
            let mut text = String::new();
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    text.push(' ');
                }
                text.push_str(&display(arg));
            }
            text.push('\n');
            Ok(BuiltinOutcome {
                value: Value::Nil,
                printed: Some(text),
            })
        }
        Builtin::Len => {
            expect_arity(builtin, args, 1, line)?;
            let length = match &args[0] {
                Value::Str(s) => s.chars().count(),
                Value::List(items) => items.len(),
                other => {
                    return Err(RuntimeError::BuiltinTypeMismatch {
                        name: builtin.name(),
                        got: other.type_name(),
                        line,
                    })
                }
            };
            Ok(BuiltinOutcome::just(Value::Int(length as i64)))
        }
        Builtin::Str => {
            expect_arity(builtin, args, 1, line)?;
            Ok(BuiltinOutcome::just(Value::Str(display(&args[0]))))
        }
        Builtin::Type => {
            expect_arity(builtin, args, 1, line)?;
            Ok(BuiltinOutcome::just(Value::Str(
                args[0].type_name().to_string(),
            )))
        }
    }
}

fn expect_arity(
    builtin: Builtin,
    args: &[Value],
    expected: usize,
    line: u32,
) -> Result<(), RuntimeError> {
    if args.len() != expected {
        return Err(RuntimeError::WrongArity {
            name: builtin.name().to_string(),
            expected,
            got: args.len(),
            line,
        });
    }
    Ok(())
}
