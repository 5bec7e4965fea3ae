// ABOUTME: Error types for the embedded expression language
// ABOUTME: Covers lexing, parsing and evaluation failures of a single expression

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("Unexpected character '{ch}' at offset {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("Unterminated string starting at offset {pos}")]
    UnterminatedString { pos: usize },

    #[error("Invalid number literal '{literal}'")]
    InvalidNumber { literal: String },

    #[error("Expected {expected} but found {found}")]
    UnexpectedToken { expected: String, found: String },

    #[error("Unexpected end of expression, expected {expected}")]
    UnexpectedEnd { expected: String },

    #[error("Unknown identifier '{0}'")]
    UnknownIdentifier(String),

    #[error("Unknown property '{property}' on {kind}")]
    UnknownProperty { property: String, kind: String },

    #[error("Unknown method '{method}' on {kind}")]
    UnknownMethod { method: String, kind: String },

    #[error("Method '{method}' expects {expected} argument(s), got {found}")]
    Arity {
        method: String,
        expected: String,
        found: usize,
    },

    #[error("Cannot apply '{op}' to {left} and {right}")]
    TypeMismatch {
        op: String,
        left: String,
        right: String,
    },

    #[error("Expected {expected}, found {found}")]
    InvalidArgument { expected: String, found: String },

    #[error("Index {index} out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Functions can only be passed to list transforms")]
    StrayLambda,

    #[error("Expression nested deeper than {limit} levels")]
    TooDeep { limit: usize },

    #[error("Expression result exceeds {limit} bytes")]
    OutputTooLarge { limit: usize },
}

pub type Result<T> = std::result::Result<T, ExprError>;
