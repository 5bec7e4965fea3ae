// ABOUTME: Shared maps populated by the cache loader
// ABOUTME: TemplateStore holds file contents, LoadStatus tracks per-path completion

use dashmap::DashMap;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Path to raw template text. Cloning shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    entries: Arc<DashMap<PathBuf, String>>,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last write for a path wins
    pub(crate) fn insert(&self, path: PathBuf, content: String) {
        self.entries.insert(path, content);
    }

    pub fn get(&self, path: &Path) -> Option<String> {
        self.entries.get(path).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached paths in sorted order
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.entries.iter().map(|e| e.key().clone()).collect();
        paths.sort();
        paths
    }

    /// Point-in-time copy of the whole cache
    pub fn snapshot(&self) -> BTreeMap<PathBuf, String> {
        self.entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }
}

/// Path to "has this listing or read finished". One entry per visited file and directory.
#[derive(Debug, Clone, Default)]
pub struct LoadStatus {
    entries: Arc<DashMap<PathBuf, bool>>,
}

impl LoadStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn mark_pending(&self, path: PathBuf) {
        self.entries.insert(path, false);
    }

    pub(crate) fn mark_completed(&self, path: PathBuf) {
        self.entries.insert(path, true);
    }

    /// `None` when the path was never visited
    pub fn is_completed(&self, path: &Path) -> Option<bool> {
        self.entries.get(path).map(|entry| *entry.value())
    }

    /// True once every visited path has finished. An empty status is trivially complete.
    pub fn all_completed(&self) -> bool {
        self.entries.iter().all(|entry| *entry.value())
    }

    pub fn pending_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self
            .entries
            .iter()
            .filter(|entry| !*entry.value())
            .map(|entry| entry.key().clone())
            .collect();
        paths.sort();
        paths
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
