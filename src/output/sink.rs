// ABOUTME: Logging capability handed to every markup component at construction
// ABOUTME: Provides the tracing-backed sink and an in-memory sink for inspection

use std::sync::Mutex;
use tracing::Level;

/// Destination for diagnostics raised while caching and rendering templates.
///
/// Components never reach for a global logger; they are given an
/// `Arc<dyn OutputSink>` when they are built.
pub trait OutputSink: Send + Sync {
    fn trace(&self, message: &str);
    fn debug(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards everything to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

impl OutputSink for TracingSink {
    fn trace(&self, message: &str) {
        tracing::trace!("{}", message);
    }

    fn debug(&self, message: &str) {
        tracing::debug!("{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!("{}", message);
    }
}

/// Keeps every message in memory, in the order it was emitted.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<(Level, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: Level, message: &str) {
        let mut records = match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        records.push((level, message.to_string()));
    }

    /// All recorded messages
    pub fn records(&self) -> Vec<(Level, String)> {
        match self.records.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Messages recorded at exactly `level`
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages_at(Level::WARN)
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages_at(Level::ERROR)
    }
}

impl OutputSink for MemorySink {
    fn trace(&self, message: &str) {
        self.push(Level::TRACE, message);
    }

    fn debug(&self, message: &str) {
        self.push(Level::DEBUG, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::WARN, message);
    }

    fn error(&self, message: &str) {
        self.push(Level::ERROR, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_keeps_order_and_levels() {
        let sink = MemorySink::new();
        sink.trace("walking");
        sink.warn("missing title");
        sink.error("unreadable file");
        sink.warn("missing footer");

        assert_eq!(sink.records().len(), 4);
        assert_eq!(sink.warnings(), vec!["missing title", "missing footer"]);
        assert_eq!(sink.errors(), vec!["unreadable file"]);
        assert!(sink.messages_at(Level::DEBUG).is_empty());
    }

    #[test]
    fn test_sinks_are_object_safe() {
        let sinks: Vec<Box<dyn OutputSink>> =
            vec![Box::new(TracingSink::new()), Box::new(MemorySink::new())];
        for sink in &sinks {
            sink.debug("hello");
        }
    }
}
