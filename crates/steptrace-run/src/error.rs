//! Errors raised while turning source text into a program.
//!
//! These are pre-execution failures: the run never starts, so a report
//! built from one of these carries empty traces and empty stdout.

use thiserror::Error;

/// A lexing or parsing failure, anchored to a 1-based source line.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("unexpected character `{ch}` at line {line}")]
    UnexpectedChar { ch: char, line: u32 },

    #[error("unterminated string literal at line {line}")]
    UnterminatedString { line: u32 },

    #[error("unknown escape sequence `\\{ch}` at line {line}")]
    InvalidEscape { ch: char, line: u32 },

    #[error("number literal `{lexeme}` out of range at line {line}")]
    NumberOutOfRange { lexeme: String, line: u32 },

    #[error("unexpected token `{found}` at line {line}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        line: u32,
    },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("cannot assign to this expression at line {line}")]
    InvalidAssignTarget { line: u32 },

    #[error("duplicate parameter `{name}` at line {line}")]
    DuplicateParam { name: String, line: u32 },

    #[error("`return` outside of a function at line {line}")]
    ReturnOutsideFunction { line: u32 },

    #[error("`break` outside of a loop at line {line}")]
    BreakOutsideLoop { line: u32 },

    #[error("`continue` outside of a loop at line {line}")]
    ContinueOutsideLoop { line: u32 },
}
