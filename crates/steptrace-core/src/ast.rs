//! Abstract syntax tree for traced scripts.
//!
//! Every statement carries the 1-based source line of its first token.
//! That line is what the interpreter reports in trace events and what
//! runtime errors point at, so it is part of the semantics here, not
//! just diagnostics.

use std::fmt;
use std::rc::Rc;

/// A parsed script: the ordered top-level statements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

/// One statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `target = value`.
    Assign { target: Target, value: Expr, line: u32 },
    /// `target op= value` for `+=`, `-=`, `*=`, `/=`.
    AugAssign { target: Target, op: BinOp, value: Expr, line: u32 },
    /// A bare expression evaluated for its effect.
    Expr { expr: Expr, line: u32 },
    /// `if cond { ... }` with an optional else branch. An `else if`
    /// chain parses as a nested `If` inside `else_body`, so each arm
    /// keeps its own source line.
    If {
        cond: Expr,
        then_body: Vec<Stmt>,
        else_body: Option<Vec<Stmt>>,
        line: u32,
    },
    /// `while cond { ... }`.
    While { cond: Expr, body: Vec<Stmt>, line: u32 },
    /// `fn name(params) { ... }`. The declaration is shared with every
    /// value produced from it.
    FnDef { decl: Rc<FnDecl> },
    /// `return` with an optional value.
    Return { value: Option<Expr>, line: u32 },
    /// `raise message`.
    Raise { message: Expr, line: u32 },
    /// `break`.
    Break { line: u32 },
    /// `continue`.
    Continue { line: u32 },
}

impl Stmt {
    /// Source line of the statement's first token.
    pub fn line(&self) -> u32 {
        match self {
            Stmt::Assign { line, .. }
            | Stmt::AugAssign { line, .. }
            | Stmt::Expr { line, .. }
            | Stmt::If { line, .. }
            | Stmt::While { line, .. }
            | Stmt::Return { line, .. }
            | Stmt::Raise { line, .. }
            | Stmt::Break { line }
            | Stmt::Continue { line } => *line,
            Stmt::FnDef { decl } => decl.line,
        }
    }
}

/// An assignable place on the left of `=`.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// A plain variable.
    Name(String),
    /// An element of a list held in another target: `xs[i]`.
    Index { base: Box<Target>, index: Expr },
}

/// A function declaration, owned by its `fn` statement and referenced
/// by every `Value::Fn` created from it.
#[derive(Debug, PartialEq)]
pub struct FnDecl {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
    /// Line of the `fn` keyword.
    pub line: u32,
}

/// One expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Nil,
    /// A variable reference.
    Name(String),
    /// A list literal.
    List(Vec<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnOp,
        operand: Box<Expr>,
    },
    /// `base[index]`.
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    /// `callee(args)`.
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
}

/// Binary operators. `And` and `Or` short-circuit and are dispatched
/// before their right operand is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "and",
            BinOp::Or => "or",
        };
        f.write_str(symbol)
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

impl fmt::Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnOp::Neg => "-",
            UnOp::Not => "not",
        })
    }
}
