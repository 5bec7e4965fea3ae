// ABOUTME: Error types for template rendering
// ABOUTME: Separates malformed templates from IO and cache readiness failures

use thiserror::Error;

use crate::cache::CacheError;
use crate::expr::ExprError;

#[derive(Error, Debug)]
pub enum MarkupError {
    #[error("Invalid expression '{expression}': {source}")]
    Expression {
        expression: String,
        source: ExprError,
    },

    #[error("Cyclic partial inclusion: {}", .chain.join(" -> "))]
    CyclicInclusion { chain: Vec<String> },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Cache error: {0}")]
    CacheError(#[from] CacheError),
}

pub type Result<T> = std::result::Result<T, MarkupError>;
