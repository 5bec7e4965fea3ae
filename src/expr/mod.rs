// ABOUTME: Embedded expression language evaluated inside <%= %> markers
// ABOUTME: Literals, arithmetic, string helpers and list transforms, with no host access

pub mod ast;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod value;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use error::{ExprError, Result};
pub use eval::evaluate;
pub use parser::parse;
pub use value::Value;

/// Parse and evaluate `source` in one step
pub fn eval_str(source: &str) -> Result<Value> {
    evaluate(&parse(source)?)
}
