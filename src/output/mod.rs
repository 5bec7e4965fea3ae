// ABOUTME: Output capability module for the markup engine
// ABOUTME: Exposes the injectable logging sink and its built-in implementations

pub mod sink;

pub use sink::{MemorySink, OutputSink, TracingSink};
