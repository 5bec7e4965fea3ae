// ABOUTME: Plain variable pass of the renderer
// ABOUTME: Replaces <% name %> markers from the merged variable map

use regex::Captures;
use std::collections::HashMap;

use super::syntax::{RESERVED, VARIABLE};
use crate::output::OutputSink;

pub struct VariableSubstitutor<'a> {
    sink: &'a dyn OutputSink,
}

impl<'a> VariableSubstitutor<'a> {
    pub fn new(sink: &'a dyn OutputSink) -> Self {
        Self { sink }
    }

    /// Unknown names become empty strings. Markers whose content holds `=` or
    /// `&` belong to another pass and are left exactly as written.
    pub fn substitute(&self, template: &str, vars: &HashMap<String, String>) -> String {
        VARIABLE
            .replace_all(template, |caps: &Captures<'_>| {
                let name = caps[1].trim();
                if name.contains(RESERVED) {
                    return caps[0].to_string();
                }
                match vars.get(name) {
                    Some(value) => value.clone(),
                    None => {
                        self.sink.warn(&format!(
                            "Tried to replace \"{}\" but could not find it in the variables!",
                            name
                        ));
                        String::new()
                    }
                }
            })
            .into_owned()
    }
}
