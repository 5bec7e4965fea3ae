// ABOUTME: Expression pass of the renderer
// ABOUTME: Substitutes %{name} references, evaluates each <%= %> marker and splices the result

use std::collections::HashMap;

use super::error::{MarkupError, Result};
use super::syntax::{try_replace_all, EMBEDDED_VAR, EVALUATE};
use crate::expr;
use crate::output::OutputSink;

pub struct ExpressionEvaluator<'a> {
    sink: &'a dyn OutputSink,
}

impl<'a> ExpressionEvaluator<'a> {
    pub fn new(sink: &'a dyn OutputSink) -> Self {
        Self { sink }
    }

    /// Replace every evaluation marker with its computed value.
    /// The first expression that fails to parse or evaluate aborts the pass.
    pub fn evaluate(&self, template: &str, vars: &HashMap<String, String>) -> Result<String> {
        try_replace_all(&EVALUATE, template, |caps| {
            let source = self.substitute_embedded(caps[1].trim(), vars);
            expr::eval_str(&source)
                .map(|value| value.to_string())
                .map_err(|e| MarkupError::Expression {
                    expression: source,
                    source: e,
                })
        })
    }

    /// `%{name}` references are spliced in as source text before parsing
    pub fn substitute_embedded(&self, expression: &str, vars: &HashMap<String, String>) -> String {
        EMBEDDED_VAR
            .replace_all(expression, |caps: &regex::Captures<'_>| {
                let name = caps[1].trim();
                match vars.get(name) {
                    Some(value) => value.clone(),
                    None => {
                        self.sink.warn(&format!(
                            "Tried to replace \"{}\" in an expression string, but the value was not set!",
                            name
                        ));
                        String::new()
                    }
                }
            })
            .into_owned()
    }
}
