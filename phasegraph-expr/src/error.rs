//! Expression error types.

use thiserror::Error;

/// Errors raised while compiling a condition source string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("bad lexeme at byte {pos}: unterminated string literal")]
    UnterminatedString { pos: usize },

    #[error("bad lexeme at byte {pos}: malformed number '{text}'")]
    BadNumber { pos: usize, text: String },

    #[error("unexpected character '{ch}' at byte {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("parse error at byte {pos}: unexpected token '{found}'")]
    UnexpectedToken { pos: usize, found: String },

    #[error("parse error at byte {pos}: expected ')'")]
    UnmatchedParen { pos: usize },

    #[error("parse error at byte {pos}: trailing input '{found}'")]
    TrailingInput { pos: usize, found: String },
}

/// Errors raised while evaluating a compiled expression against a scope.
///
/// An absent name is only an error in comparison-operand position; in
/// boolean position it evaluates to false.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("unknown variable: {name}")]
    UnknownVar { name: String },

    #[error("unknown property: {name}")]
    UnknownProperty { name: String },

    #[error("non-numeric {type_name} operand in ordering comparison")]
    NonNumeric { type_name: &'static str },
}
