// ABOUTME: Completion tracking for the concurrent cache walk
// ABOUTME: Counts outstanding listings and reads and lets callers await zero

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::timeout;

/// Outstanding-operation counter. Every spawned listing or read calls
/// [`begin`](Self::begin) before it is dispatched and [`finish`](Self::finish)
/// when it is done, whatever the outcome.
#[derive(Debug, Clone)]
pub struct LoadTracker {
    outstanding: Arc<watch::Sender<usize>>,
}

impl LoadTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            outstanding: Arc::new(tx),
        }
    }

    pub fn begin(&self) {
        self.outstanding.send_modify(|count| *count += 1);
    }

    pub fn finish(&self) {
        self.outstanding
            .send_modify(|count| *count = count.saturating_sub(1));
    }

    pub fn outstanding(&self) -> usize {
        *self.outstanding.borrow()
    }

    pub fn is_idle(&self) -> bool {
        self.outstanding() == 0
    }

    /// Resolves once the counter reaches zero
    pub async fn wait_idle(&self) {
        let mut rx = self.outstanding.subscribe();
        // The sender lives in self, so the channel cannot close while we wait
        let _ = rx.wait_for(|count| *count == 0).await;
    }

    /// Like [`wait_idle`](Self::wait_idle) but gives up after `limit`. Returns false on timeout.
    pub async fn wait_idle_for(&self, limit: Duration) -> bool {
        timeout(limit, self.wait_idle()).await.is_ok()
    }
}

impl Default for LoadTracker {
    fn default() -> Self {
        Self::new()
    }
}
