// ABOUTME: Common utilities and helpers for integration tests
// ABOUTME: Builds temporary template sites and a template source with slow reads

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use markup_lite::cache::{FsSource, SourceEntry, TemplateSource};
use markup_lite::{MarkupEngine, MemorySink, Variables};

pub const INDEX: &str = r#"<!DOCTYPE html><html lang="en-US"><%& head %><body><h1><% title %></h1>
<%& body/numbers %>
<%& body/letters %>
</body></html>"#;

pub const HEAD: &str = r#"<head><meta charset="UTF-8" /><title><% title %></title></head>"#;

pub const NUMBERS: &str =
    "<%= [1, 2, 3, 4, 5].map((v, i) => '<h3>' + v + '</h3>').join('') %>";

pub const LETTERS: &str = "<%= %{letterArray}.map(v => '<h3>' + v + '</h3>').join('') %>";

/// A temporary `html/` site with an `html/_partials/` template root
pub struct TestSite {
    pub temp_dir: TempDir,
}

impl TestSite {
    pub fn new() -> Self {
        let site = Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        };
        std::fs::create_dir_all(site.partials_root()).expect("Failed to create partials root");
        site
    }

    /// Site with a page, a head partial and two list partials one level down
    pub fn standard() -> Self {
        Self::new()
            .with_page("markup-index", INDEX)
            .with_partial("head", HEAD)
            .with_partial("body/numbers", NUMBERS)
            .with_partial("body/letters", LETTERS)
    }

    pub fn html_root(&self) -> PathBuf {
        self.temp_dir.path().join("html")
    }

    pub fn partials_root(&self) -> PathBuf {
        self.html_root().join("_partials")
    }

    pub fn page(&self, name: &str) -> PathBuf {
        self.html_root().join(format!("{}.html", name))
    }

    pub fn partial(&self, name: &str) -> PathBuf {
        self.partials_root().join(format!("{}.html", name))
    }

    pub fn with_page(self, name: &str, content: &str) -> Self {
        write_file(&self.page(name), content);
        self
    }

    pub fn with_partial(self, name: &str, content: &str) -> Self {
        write_file(&self.partial(name), content);
        self
    }

    pub fn engine(&self, defaults: Variables) -> (MarkupEngine, Arc<MemorySink>) {
        self.engine_with_source(defaults, Arc::new(FsSource::new()))
    }

    pub fn engine_with_source(
        &self,
        defaults: Variables,
        source: Arc<dyn TemplateSource>,
    ) -> (MarkupEngine, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let engine =
            MarkupEngine::with_source(sink.clone(), defaults, self.partials_root(), source)
                .expect("Failed to build engine");
        (engine, sink)
    }
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    std::fs::write(path, content).expect("Failed to write template");
}

pub fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Filesystem source whose reads of one file stall for `delay`
pub struct DelayedSource {
    inner: FsSource,
    slow_path: PathBuf,
    delay: Duration,
}

impl DelayedSource {
    pub fn new(slow_path: impl Into<PathBuf>, delay: Duration) -> Self {
        Self {
            inner: FsSource::new(),
            slow_path: slow_path.into(),
            delay,
        }
    }
}

#[async_trait]
impl TemplateSource for DelayedSource {
    async fn list_dir(&self, dir: &Path) -> io::Result<Vec<SourceEntry>> {
        self.inner.list_dir(dir).await
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        if path == self.slow_path {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.read_to_string(path).await
    }

    fn read_to_string_blocking(&self, path: &Path) -> io::Result<String> {
        self.inner.read_to_string_blocking(path)
    }
}

/// Filesystem source whose listing of one directory always fails
pub struct FailingListSource {
    inner: FsSource,
    broken_dir: PathBuf,
}

impl FailingListSource {
    pub fn new(broken_dir: impl Into<PathBuf>) -> Self {
        Self {
            inner: FsSource::new(),
            broken_dir: broken_dir.into(),
        }
    }
}

#[async_trait]
impl TemplateSource for FailingListSource {
    async fn list_dir(&self, dir: &Path) -> io::Result<Vec<SourceEntry>> {
        if dir == self.broken_dir {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "listing refused",
            ));
        }
        self.inner.list_dir(dir).await
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.inner.read_to_string(path).await
    }

    fn read_to_string_blocking(&self, path: &Path) -> io::Result<String> {
        self.inner.read_to_string_blocking(path)
    }
}
