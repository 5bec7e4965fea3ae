// ABOUTME: Partial inclusion pass of the renderer
// ABOUTME: Expands <%& name %> markers from the template cache, rejecting inclusion cycles

use std::path::Path;

use super::error::{MarkupError, Result};
use super::syntax::{partial_path, try_replace_all, INCLUDE};
use crate::cache::TemplateStore;
use crate::output::OutputSink;

/// Replaces every inclusion marker with the cached partial it names, expanding
/// partials inside partials until no inclusion marker is left.
///
/// A partial missing from the cache is logged and replaced with nothing. A
/// partial that includes itself, directly or through others, is an error.
pub struct PartialResolver<'a> {
    store: &'a TemplateStore,
    root: &'a Path,
    sink: &'a dyn OutputSink,
}

impl<'a> PartialResolver<'a> {
    pub fn new(store: &'a TemplateStore, root: &'a Path, sink: &'a dyn OutputSink) -> Self {
        Self { store, root, sink }
    }

    pub fn resolve(&self, template: &str) -> Result<String> {
        let mut chain = Vec::new();
        self.expand(template, &mut chain)
    }

    // `chain` holds the partials currently being expanded, outermost first
    fn expand(&self, template: &str, chain: &mut Vec<String>) -> Result<String> {
        try_replace_all(&INCLUDE, template, |caps| {
            let name = caps[1].trim();

            if chain.iter().any(|open| open == name) {
                let mut cycle = chain.clone();
                cycle.push(name.to_string());
                return Err(MarkupError::CyclicInclusion { chain: cycle });
            }

            let path = partial_path(self.root, name);
            match self.store.get(&path) {
                Some(content) => {
                    chain.push(name.to_string());
                    let expanded = self.expand(&content, chain);
                    chain.pop();
                    expanded
                }
                None => {
                    self.sink.warn(&format!(
                        "Could not find file \"{}\" in the cache!",
                        path.display()
                    ));
                    Ok(String::new())
                }
            }
        })
    }
}
