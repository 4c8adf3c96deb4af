//! Script execution for steptrace: lexer, parser, and the tracing
//! interpreter, plus the one-shot session entry points that turn a
//! script into an execution report.

pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod session;

// Re-export commonly used types
pub use error::ParseError;
pub use interpreter::{Interpreter, RunConfig, RuntimeError};
pub use parser::parse;
pub use session::{run_path, run_source};
