//! Tree-walking interpreter with per-statement tracing.
//!
//! Executes a parsed [`Program`](steptrace_core::ast::Program),
//! recording a step event before every statement and capturing
//! everything the script prints.
//!
//! # Architecture
//!
//! - [`Interpreter`] holds a reference to the program and owns all run
//!   state: the global scope, the frame stack, captured stdout, and
//!   the recorded trace.
//! - [`state`] drives statements and the stateful expression forms
//!   (name lookup, short-circuit logic, calls); the pure operator
//!   semantics live in [`eval`] and the builtin functions in
//!   [`builtins`].
//! - [`RuntimeError`] carries every trap with the line it occurred on;
//!   `raise` surfaces as [`RuntimeError::Raised`] with the rendered
//!   message.
//!
//! # Usage
//!
//! ```ignore
//! let program = parse(source)?;
//! let mut interp = Interpreter::new(&program, RunConfig::default());
//! let outcome = interp.run();
//! let (stdout, traces) = interp.into_parts();
//! ```

pub mod builtins;
pub mod error;
pub mod eval;
pub mod state;

pub use error::RuntimeError;
pub use state::{Interpreter, RunConfig};
