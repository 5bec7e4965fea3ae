// ABOUTME: Recursive asynchronous walk that warms the partial template cache
// ABOUTME: Spawns a task per directory listing and per file read, tracking completion

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

use super::error::{CacheError, Result};
use super::source::{EntryKind, SourceEntry, TemplateSource};
use super::store::{LoadStatus, TemplateStore};
use super::tracker::LoadTracker;
use crate::output::OutputSink;

/// Populates a [`TemplateStore`] and its [`LoadStatus`] from a directory tree.
///
/// All listings and reads run concurrently on the Tokio runtime that was
/// current when the loader was created, with no ordering between siblings.
/// Failures are logged through the sink and only affect the path involved.
#[derive(Clone)]
pub struct CacheLoader {
    store: TemplateStore,
    status: LoadStatus,
    tracker: LoadTracker,
    source: Arc<dyn TemplateSource>,
    sink: Arc<dyn OutputSink>,
    runtime: Handle,
}

impl CacheLoader {
    /// Create a loader bound to the current Tokio runtime
    pub fn new(source: Arc<dyn TemplateSource>, sink: Arc<dyn OutputSink>) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| CacheError::NoRuntime)?;
        Ok(Self {
            store: TemplateStore::new(),
            status: LoadStatus::new(),
            tracker: LoadTracker::new(),
            source,
            sink,
            runtime,
        })
    }

    pub fn store(&self) -> &TemplateStore {
        &self.store
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn tracker(&self) -> &LoadTracker {
        &self.tracker
    }

    /// True once every discovered file and directory has finished loading
    pub fn is_loaded(&self) -> bool {
        self.status.all_completed()
    }

    /// Kick off the walk of `root`. Returns immediately; use
    /// [`wait_until_loaded`](Self::wait_until_loaded) to know when it is done.
    pub fn start(&self, root: impl Into<PathBuf>) {
        let root = root.into();
        self.sink
            .debug(&format!("Caching templates under {}", root.display()));
        self.status.mark_pending(root.clone());
        self.tracker.begin();
        self.runtime.spawn(self.clone().walk_dir(root));
    }

    /// Wait for the walk to finish, optionally bounded by `limit`
    pub async fn wait_until_loaded(&self, limit: Option<Duration>) -> Result<()> {
        match limit {
            None => {
                self.tracker.wait_idle().await;
                Ok(())
            }
            Some(limit) => {
                if self.tracker.wait_idle_for(limit).await {
                    Ok(())
                } else {
                    Err(CacheError::NotReady {
                        timeout: limit,
                        pending: self.status.pending_paths().len(),
                    })
                }
            }
        }
    }

    // Boxed so the recursive spawn has a nameable future type
    fn walk_dir(self, dir: PathBuf) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(async move {
            match self.source.list_dir(&dir).await {
                Ok(entries) => {
                    for entry in entries {
                        self.dispatch(entry);
                    }
                }
                Err(e) => {
                    self.sink.error(&format!(
                        "Could not list template directory {}: {}",
                        dir.display(),
                        e
                    ));
                }
            }

            // Children are registered above, before the directory reports done
            self.status.mark_completed(dir);
            self.tracker.finish();
        })
    }

    fn dispatch(&self, entry: SourceEntry) {
        let SourceEntry { path, kind } = entry;
        self.sink
            .trace(&format!("found file or dir: {}", path.display()));

        match kind {
            EntryKind::File => {
                self.status.mark_pending(path.clone());
                self.tracker.begin();
                self.runtime.spawn(self.clone().load_file(path));
            }
            EntryKind::Directory => {
                self.status.mark_pending(path.clone());
                self.tracker.begin();
                self.runtime.spawn(self.clone().walk_dir(path));
            }
            EntryKind::Other => {
                self.sink
                    .warn(&format!("Found unknown file type: {}", path.display()));
            }
        }
    }

    async fn load_file(self, path: PathBuf) {
        self.sink.trace(&format!("loading file: {}", path.display()));

        match self.source.read_to_string(&path).await {
            Ok(content) => {
                self.sink.trace(&format!(
                    "adding to cache: {} ({} bytes)",
                    path.display(),
                    content.len()
                ));
                self.store.insert(path.clone(), content);
            }
            Err(e) => {
                self.sink.error(&format!(
                    "Could not read template file {}: {}",
                    path.display(),
                    e
                ));
            }
        }

        self.status.mark_completed(path);
        self.tracker.finish();
    }
}
