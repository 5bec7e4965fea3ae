// ABOUTME: Partial template cache module for the markup engine
// ABOUTME: Walks a template root concurrently and tracks when every path has loaded

pub mod error;
pub mod loader;
pub mod source;
pub mod store;
pub mod tracker;

pub use error::{CacheError, Result};
pub use loader::CacheLoader;
pub use source::{EntryKind, FsSource, SourceEntry, TemplateSource};
pub use store::{LoadStatus, TemplateStore};
pub use tracker::LoadTracker;
