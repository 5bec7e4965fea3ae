// ABOUTME: Public rendering surface of the markup engine
// ABOUTME: Owns defaults and the partial cache, and sequences partials, expressions and variables

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::error::Result;
use super::expressions::ExpressionEvaluator;
use super::partials::PartialResolver;
use super::variables::VariableSubstitutor;
use crate::cache::{CacheLoader, FsSource, LoadStatus, TemplateSource, TemplateStore};
use crate::output::OutputSink;

/// Variable name to value
pub type Variables = HashMap<String, String>;

/// Server-side HTML renderer with a pre-warmed partial cache.
///
/// Building an engine with a non-empty template root starts an asynchronous
/// walk of that directory on the current Tokio runtime; partials become
/// available once [`cache_loaded`](Self::cache_loaded) reports true or
/// [`wait_until_loaded`](Self::wait_until_loaded) returns.
///
/// Rendering runs three passes in a fixed order: partial inclusion, then
/// expression evaluation, then plain variable substitution.
pub struct MarkupEngine {
    sink: Arc<dyn OutputSink>,
    source: Arc<dyn TemplateSource>,
    default_values: Variables,
    template_root: PathBuf,
    cache: Option<CacheLoader>,
    empty_store: TemplateStore,
    empty_status: LoadStatus,
}

impl MarkupEngine {
    /// Create an engine reading from the local filesystem
    pub fn new(
        sink: Arc<dyn OutputSink>,
        default_values: Variables,
        template_root: impl Into<PathBuf>,
    ) -> Result<Self> {
        Self::with_source(sink, default_values, template_root, Arc::new(FsSource::new()))
    }

    /// Create an engine reading templates through `source`
    pub fn with_source(
        sink: Arc<dyn OutputSink>,
        default_values: Variables,
        template_root: impl Into<PathBuf>,
        source: Arc<dyn TemplateSource>,
    ) -> Result<Self> {
        let template_root = template_root.into();

        let cache = if template_root.as_os_str().is_empty() {
            None
        } else {
            let loader = CacheLoader::new(Arc::clone(&source), Arc::clone(&sink))?;
            loader.start(template_root.clone());
            Some(loader)
        };

        Ok(Self {
            sink,
            source,
            default_values,
            template_root,
            cache,
            empty_store: TemplateStore::new(),
            empty_status: LoadStatus::new(),
        })
    }

    pub fn default_values(&self) -> &Variables {
        &self.default_values
    }

    pub fn set_default_values(&mut self, values: Variables) {
        self.default_values = values;
    }

    pub fn template_root(&self) -> &Path {
        &self.template_root
    }

    /// Partials are looked up under the new root from now on. The cache is not reloaded.
    pub fn set_template_root(&mut self, root: impl Into<PathBuf>) {
        self.template_root = root.into();
    }

    /// True once every file and directory found under the template root has finished loading
    pub fn cache_loaded(&self) -> bool {
        self.cache.as_ref().map_or(true, CacheLoader::is_loaded)
    }

    /// Wait for the partial cache, giving up after `timeout` when one is given
    pub async fn wait_until_loaded(&self, timeout: Option<Duration>) -> Result<()> {
        if let Some(cache) = &self.cache {
            cache.wait_until_loaded(timeout).await?;
        }
        Ok(())
    }

    /// Raw cache contents, keyed by file path
    pub fn template_cache(&self) -> &TemplateStore {
        self.cache
            .as_ref()
            .map_or(&self.empty_store, CacheLoader::store)
    }

    /// Per-path load completion
    pub fn load_status(&self) -> &LoadStatus {
        self.cache
            .as_ref()
            .map_or(&self.empty_status, CacheLoader::status)
    }

    /// Defaults overlaid with `overrides`; overrides win
    pub fn build_vars_from_defaults(&self, overrides: &Variables) -> Variables {
        let mut vars = self.default_values.clone();
        vars.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        vars
    }

    /// Expand inclusion markers from the cache. Expects the cache to be loaded.
    pub fn resolve_partials(&self, template: &str) -> Result<String> {
        PartialResolver::new(self.template_cache(), &self.template_root, self.sink.as_ref())
            .resolve(template)
    }

    /// Evaluate expressions, then substitute variables, using defaults merged with `vars`
    pub fn build_from_template(&self, template: &str, vars: &Variables) -> Result<String> {
        let vars = self.build_vars_from_defaults(vars);
        let evaluated = ExpressionEvaluator::new(self.sink.as_ref()).evaluate(template, &vars)?;
        Ok(VariableSubstitutor::new(self.sink.as_ref()).substitute(&evaluated, &vars))
    }

    /// Read `path` synchronously, expand its partials, then render it
    pub fn build_from_file_with_partials(
        &self,
        path: impl AsRef<Path>,
        vars: &Variables,
    ) -> Result<String> {
        let path = path.as_ref();
        self.sink
            .debug(&format!("Rendering {}", path.display()));
        let document = self.source.read_to_string_blocking(path)?;
        let expanded = self.resolve_partials(&document)?;
        self.build_from_template(&expanded, vars)
    }

    /// Wait for the cache, then render `path` with its partials
    pub async fn render_file_when_ready(
        &self,
        path: impl AsRef<Path>,
        vars: &Variables,
        timeout: Option<Duration>,
    ) -> Result<String> {
        self.wait_until_loaded(timeout).await?;
        self.build_from_file_with_partials(path, vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::ExprError;
    use crate::markup::MarkupError;
    use crate::output::MemorySink;
    use tempfile::tempdir;

    fn vars(pairs: &[(&str, &str)]) -> Variables {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn engine(defaults: Variables) -> MarkupEngine {
        MarkupEngine::new(Arc::new(MemorySink::new()), defaults, "").unwrap()
    }

    const PAGE_PRE: &str =
        "<!DOCTYPE html><html lang=\"en-US\"><head><meta charset=\"UTF-8\" /><title>";
    const PAGE_POST: &str = "</title></head><body><h1>Hello Markup</h1></body></html>";

    fn page(title: &str) -> String {
        format!("{}{}{}", PAGE_PRE, title, PAGE_POST)
    }

    #[test]
    fn test_getters_and_setters() {
        let mut engine = engine(Variables::new());
        assert!(engine.default_values().is_empty());

        engine.set_default_values(vars(&[("foo", "foo")]));
        assert_eq!(engine.default_values(), &vars(&[("foo", "foo")]));

        engine.set_template_root("foo");
        assert_eq!(engine.template_root(), Path::new("foo"));
    }

    #[test]
    fn test_empty_root_needs_no_runtime() {
        let engine = engine(Variables::new());
        assert!(engine.cache_loaded());
        assert!(engine.template_cache().is_empty());
        assert!(engine.load_status().is_empty());
    }

    #[test]
    fn test_non_empty_root_outside_runtime_fails() {
        let result = MarkupEngine::new(Arc::new(MemorySink::new()), Variables::new(), "templates");
        assert!(matches!(result, Err(MarkupError::CacheError(_))));
    }

    #[test]
    fn test_build_vars_from_defaults() {
        let engine = engine(vars(&[("foo", "foo"), ("bar", "bar")]));

        assert_eq!(
            engine.build_vars_from_defaults(&Variables::new()),
            vars(&[("foo", "foo"), ("bar", "bar")])
        );
        assert_eq!(
            engine.build_vars_from_defaults(&vars(&[("foobar", "foobar")])),
            vars(&[("foo", "foo"), ("bar", "bar"), ("foobar", "foobar")])
        );
        assert_eq!(
            engine.build_vars_from_defaults(&vars(&[("foo", "bar"), ("foobar", "foobar")])),
            vars(&[("foo", "bar"), ("bar", "bar"), ("foobar", "foobar")])
        );
        // defaults untouched
        assert_eq!(engine.default_values().get("foo").map(String::as_str), Some("foo"));
    }

    #[test]
    fn test_replaces_basic_variable() {
        let engine = engine(Variables::new());
        let template = page("<% title %>");
        let result = engine
            .build_from_template(&template, &vars(&[("title", "Hello Markup")]))
            .unwrap();
        assert_eq!(result, page("Hello Markup"));
    }

    #[test]
    fn test_replaces_same_variable_twice() {
        let engine = engine(Variables::new());
        let template = page("<% title %>") + "<% title %>";
        let result = engine
            .build_from_template(&template, &vars(&[("title", "Hello Markup")]))
            .unwrap();
        assert_eq!(result, page("Hello Markup") + "Hello Markup");
    }

    #[test]
    fn test_replaces_multiple_variables() {
        let engine = engine(Variables::new());
        let template = page("<% title %>") + "<%title%>-<% foo%>-<%bar %>";
        let result = engine
            .build_from_template(
                &template,
                &vars(&[("title", "Hello Markup"), ("foo", "foo"), ("bar", "bar")]),
            )
            .unwrap();
        assert_eq!(result, page("Hello Markup") + "Hello Markup-foo-bar");
    }

    #[test]
    fn test_defaults_fill_missing_overrides() {
        let engine = engine(vars(&[("site", "Docs"), ("title", "Default")]));
        let result = engine
            .build_from_template("<% title %> | <% site %>", &vars(&[("title", "Intro")]))
            .unwrap();
        assert_eq!(result, "Intro | Docs");
    }

    #[test]
    fn test_expressions_run_before_variables() {
        let engine = engine(vars(&[("n", "4")]));
        let result = engine
            .build_from_template("<%= %{n} * 2 %> <%= '<' + '% n %' + '>' %>", &Variables::new())
            .unwrap();
        assert_eq!(result, "8 4");
    }

    #[test]
    fn test_expression_failure_fails_render() {
        let engine = engine(Variables::new());
        let result = engine.build_from_template("<% a %><%= 1 / 0 %>", &Variables::new());
        assert!(matches!(result, Err(MarkupError::Expression { .. })));
    }

    #[test]
    fn test_hostile_expressions_fail_the_render() {
        let engine = engine(Variables::new());

        let deep = format!("<%= {}1{} %>", "(".repeat(5_000), ")".repeat(5_000));
        match engine.build_from_template(&deep, &Variables::new()) {
            Err(MarkupError::Expression { source, .. }) => {
                assert!(matches!(source, ExprError::TooDeep { .. }));
            }
            other => panic!("expected a nesting error, got {:?}", other),
        }

        let huge = "<%= 'ab'.repeat(100000).repeat(500).length %>";
        match engine.build_from_template(huge, &Variables::new()) {
            Err(MarkupError::Expression { source, .. }) => {
                assert!(matches!(source, ExprError::OutputTooLarge { .. }));
            }
            other => panic!("expected a size error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_render_file_with_partials() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path().join("_partials");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("child.html"), "X").unwrap();
        let index = temp_dir.path().join("index.html");
        std::fs::write(&index, "<p><%& child %> <% who %></p>").unwrap();

        let engine = MarkupEngine::new(
            Arc::new(MemorySink::new()),
            vars(&[("who", "world")]),
            &root,
        )
        .unwrap();

        let output = engine
            .render_file_when_ready(&index, &Variables::new(), Some(Duration::from_secs(5)))
            .await
            .unwrap();
        assert_eq!(output, "<p>X world</p>");
        assert!(engine.cache_loaded());
        assert_eq!(engine.template_cache().get(&root.join("child.html")).as_deref(), Some("X"));
    }

    #[test]
    fn test_missing_top_level_file_is_io_error() {
        let engine = engine(Variables::new());
        let result = engine.build_from_file_with_partials("does/not/exist.html", &Variables::new());
        assert!(matches!(result, Err(MarkupError::IoError(_))));
    }
}
