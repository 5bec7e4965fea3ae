// ABOUTME: Main library module for the markup-lite HTML templating engine
// ABOUTME: Exports all core modules and provides the public API

pub mod cache;
pub mod cli;
pub mod expr;
pub mod markup;
pub mod output;

// Re-export commonly used types
pub use cache::{CacheError, FsSource, TemplateSource, TemplateStore};
pub use cli::{App, Args, Config};
pub use markup::{MarkupEngine, MarkupError, Variables};
pub use output::{MemorySink, OutputSink, TracingSink};

// Error handling
pub type Result<T> = anyhow::Result<T>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
