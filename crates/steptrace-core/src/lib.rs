//! Core data model for steptrace: the script AST, runtime values, the
//! text renderings used in snapshots, and the report types emitted to
//! the visualizer.
//!
//! This crate holds the passive data structures only. Lexing, parsing,
//! and execution live in `steptrace-run`; the JSON-printing front end
//! lives in `steptrace-cli`.

pub mod ast;
pub mod report;
pub mod repr;
pub mod trace;
pub mod value;

// Re-export commonly used types
pub use ast::{BinOp, Expr, FnDecl, Program, Stmt, Target, UnOp};
pub use report::{ExecutionReport, RunStatus};
pub use repr::{display, repr};
pub use trace::{TraceEvent, TraceKind};
pub use value::{Args, Builtin, Value};
