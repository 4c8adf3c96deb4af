//! Text renderings of runtime values.
//!
//! Two forms exist. [`repr`] is the snapshot form recorded in trace
//! events: strings are quoted and escaped, floats always render in a
//! way no int can, so a reader of a locals map can tell `1`, `1.0`,
//! and `"1"` apart. [`display`] is the human form used by `print`,
//! `raise`, and the `str` builtin: identical except that a top-level
//! string renders as its raw text.
//!
//! Both forms are pure functions of the value. Functions render as
//! `<fn name>` with no addresses, so rendering the same state twice
//! yields identical text.

use std::fmt::Write as _;

use crate::value::Value;

/// Nesting depth at which list rendering stops and emits a placeholder.
const MAX_RENDER_DEPTH: usize = 32;

/// Renders the snapshot form of a value.
pub fn repr(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out
}

/// Renders the human form of a value.
pub fn display(value: &Value) -> String {
    match value {
        Value::Str(s) => s.clone(),
        other => repr(other),
    }
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    if depth > MAX_RENDER_DEPTH {
        out.push_str("...");
        return;
    }
    match value {
        Value::Int(n) => {
            let _ = write!(out, "{n}");
        }
        Value::Float(x) => write_float(out, *x),
        Value::Str(s) => {
            let _ = write!(out, "{s:?}");
        }
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Nil => out.push_str("nil"),
        Value::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item, depth + 1);
            }
            out.push(']');
        }
        Value::Fn(decl) => {
            let _ = write!(out, "<fn {}>", decl.name);
        }
        Value::Builtin(b) => {
            let _ = write!(out, "<builtin {}>", b.name());
        }
    }
}

/// Whole values below the precision threshold get an explicit `.0`,
/// larger magnitudes switch to exponent form. `Display` for `f64`
/// never does either on its own, so both cases are forced here.
fn write_float(out: &mut String, x: f64) {
    if !x.is_finite() {
        let _ = write!(out, "{x}");
    } else if x.abs() >= 1e16 {
        let _ = write!(out, "{x:e}");
    } else if x.fract() == 0.0 {
        let _ = write!(out, "{x:.1}");
    } else {
        let _ = write!(out, "{x}");
    }
}
