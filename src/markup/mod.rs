// ABOUTME: Template rendering module for the markup engine
// ABOUTME: Exports the engine and the partial, expression and variable passes it runs

pub mod engine;
pub mod error;
pub mod expressions;
pub mod partials;
pub mod syntax;
pub mod variables;

pub use engine::{MarkupEngine, Variables};
pub use error::{MarkupError, Result};
pub use expressions::ExpressionEvaluator;
pub use partials::PartialResolver;
pub use variables::VariableSubstitutor;
