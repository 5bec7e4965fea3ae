// ABOUTME: Error types for partial cache population and readiness
// ABOUTME: Distinguishes an unfinished cache from runtime and IO failures

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Template cache not ready after {timeout:?}: {pending} path(s) still loading")]
    NotReady { timeout: Duration, pending: usize },

    #[error("Template caching requires a running Tokio runtime")]
    NoRuntime,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CacheError>;
