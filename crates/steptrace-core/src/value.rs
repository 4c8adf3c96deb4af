//! Runtime values.
//!
//! Lists are plain vectors with value semantics: assignment and element
//! writes copy, so no value can ever contain itself and snapshot
//! rendering needs no cycle detection.

use std::rc::Rc;

use smallvec::SmallVec;

use crate::ast::FnDecl;

/// Argument list for a call. Inline capacity covers typical scripts.
pub type Args = SmallVec<[Value; 4]>;

/// A value produced by evaluating an expression.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Nil,
    List(Vec<Value>),
    /// A user-defined function from a `fn` statement.
    Fn(Rc<FnDecl>),
    /// A built-in function such as `print`.
    Builtin(Builtin),
}

impl Value {
    /// Name used in error messages and returned by the `type` builtin.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bool(_) => "bool",
            Value::Nil => "nil",
            Value::List(_) => "list",
            Value::Fn(_) | Value::Builtin(_) => "fn",
        }
    }
}

/// Equality follows `==` in the script language: ints and floats
/// compare numerically across the two types, functions compare by
/// identity, and values of unrelated types are unequal rather than
/// an error.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                *a as f64 == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Fn(a), Value::Fn(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            _ => false,
        }
    }
}

/// The built-in functions. They resolve by name only after frame locals
/// and globals, so a script assigning `print = 1` shadows the builtin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// Writes its arguments to the captured stdout buffer.
    Print,
    /// Length of a string (in characters) or a list.
    Len,
    /// Human-form text of a value.
    Str,
    /// Type name of a value, as a string.
    Type,
}

impl Builtin {
    /// The name the builtin resolves under.
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Print => "print",
            Builtin::Len => "len",
            Builtin::Str => "str",
            Builtin::Type => "type",
        }
    }

    /// Resolves a name to a builtin, if one exists.
    pub fn lookup(name: &str) -> Option<Builtin> {
        match name {
            "print" => Some(Builtin::Print),
            "len" => Some(Builtin::Len),
            "str" => Some(Builtin::Str),
            "type" => Some(Builtin::Type),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names() {
        assert_eq!(Value::Int(1).type_name(), "int");
        assert_eq!(Value::Float(1.5).type_name(), "float");
        assert_eq!(Value::Str("a".to_string()).type_name(), "str");
        assert_eq!(Value::Bool(true).type_name(), "bool");
        assert_eq!(Value::Nil.type_name(), "nil");
        assert_eq!(Value::List(vec![]).type_name(), "list");
        assert_eq!(Value::Builtin(Builtin::Print).type_name(), "fn");
    }

    #[test]
    fn numeric_equality_crosses_int_and_float() {
        assert_eq!(Value::Int(2), Value::Float(2.0));
        assert_eq!(Value::Float(2.0), Value::Int(2));
        assert_ne!(Value::Int(2), Value::Float(2.5));
    }

    #[test]
    fn unrelated_types_are_unequal_not_an_error() {
        assert_ne!(Value::Int(0), Value::Str("0".to_string()));
        assert_ne!(Value::Nil, Value::Bool(false));
        assert_ne!(Value::List(vec![]), Value::Nil);
    }

    #[test]
    fn functions_compare_by_identity() {
        let decl = Rc::new(FnDecl {
            name: "f".to_string(),
            params: vec![],
            body: vec![],
            line: 1,
        });
        let a = Value::Fn(Rc::clone(&decl));
        let b = Value::Fn(Rc::clone(&decl));
        let other = Value::Fn(Rc::new(FnDecl {
            name: "f".to_string(),
            params: vec![],
            body: vec![],
            line: 1,
        }));
        assert_eq!(a, b);
        assert_ne!(a, other);
    }

    #[test]
    fn builtin_lookup_roundtrips_names() {
        for builtin in [Builtin::Print, Builtin::Len, Builtin::Str, Builtin::Type] {
            assert_eq!(Builtin::lookup(builtin.name()), Some(builtin));
        }
        assert_eq!(Builtin::lookup("input"), None);
    }
}
