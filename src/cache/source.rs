// ABOUTME: Filesystem-read capability used to list and load template files
// ABOUTME: Defines the TemplateSource trait and its tokio-backed implementation

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// Symlinks, sockets, devices and anything else that is neither
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl SourceEntry {
    pub fn new(path: impl Into<PathBuf>, kind: EntryKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

#[async_trait]
pub trait TemplateSource: Send + Sync {
    /// List the direct children of `dir`. Entry paths are `dir` joined with the entry name.
    async fn list_dir(&self, dir: &Path) -> io::Result<Vec<SourceEntry>>;

    /// Read a whole file as UTF-8 text
    async fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Blocking read, used for top-level documents that are read on demand
    fn read_to_string_blocking(&self, path: &Path) -> io::Result<String>;
}

/// Reads templates straight from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSource;

impl FsSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TemplateSource for FsSource {
    async fn list_dir(&self, dir: &Path) -> io::Result<Vec<SourceEntry>> {
        let mut read_dir = fs::read_dir(dir).await?;
        let mut entries = Vec::new();

        while let Some(entry) = read_dir.next_entry().await? {
            // file_type() does not follow symlinks
            let file_type = entry.file_type().await?;
            let kind = if file_type.is_file() {
                EntryKind::File
            } else if file_type.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::Other
            };
            entries.push(SourceEntry::new(dir.join(entry.file_name()), kind));
        }

        Ok(entries)
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path).await
    }

    fn read_to_string_blocking(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}
