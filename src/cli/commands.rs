// ABOUTME: Command implementations for the markup-lite CLI
// ABOUTME: Handles rendering a template file and listing the partial cache

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::args::{Args, ListFormat};
use super::config::Config;
use crate::markup::MarkupEngine;
use crate::output::TracingSink;

#[derive(Debug, Serialize)]
struct CacheEntry {
    path: PathBuf,
    bytes: usize,
}

/// Render a template file with its partials
pub async fn render_file(
    file: PathBuf,
    root: Option<PathBuf>,
    vars: Vec<String>,
    output: Option<PathBuf>,
    timeout_ms: Option<u64>,
    config: &Config,
) -> Result<()> {
    let overrides = Args::parse_variables(&vars)?;
    let root = root
        .or_else(|| config.template_root.clone())
        .unwrap_or_default();
    let timeout = timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.cache_timeout());

    info!("Rendering {} with partials from {}", file.display(), root.display());

    let engine = MarkupEngine::new(
        Arc::new(TracingSink::new()),
        config.default_vars.clone(),
        root,
    )?;
    let html = engine
        .render_file_when_ready(&file, &overrides, Some(timeout))
        .await
        .with_context(|| format!("Failed to render {}", file.display()))?;

    match output {
        Some(path) => {
            tokio::fs::write(&path, html)
                .await
                .with_context(|| format!("Failed to write output file '{}'", path.display()))?;
            info!("Rendered HTML written to: {}", path.display());
        }
        None => print!("{}", html),
    }

    Ok(())
}

/// Load the partial cache and print what it holds
pub async fn list_cache(
    root: Option<PathBuf>,
    format: ListFormat,
    timeout_ms: Option<u64>,
    config: &Config,
) -> Result<()> {
    let root = root
        .or_else(|| config.template_root.clone())
        .context("No template root given and none configured")?;
    let timeout = timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.cache_timeout());

    let engine = MarkupEngine::new(Arc::new(TracingSink::new()), Default::default(), &root)?;
    engine
        .wait_until_loaded(Some(timeout))
        .await
        .with_context(|| format!("Failed to load partials from {}", root.display()))?;

    let entries: Vec<CacheEntry> = engine
        .template_cache()
        .snapshot()
        .into_iter()
        .map(|(path, content)| CacheEntry {
            path,
            bytes: content.len(),
        })
        .collect();

    match format {
        ListFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        ListFormat::Text => print!("{}", format_listing(&root, &entries)),
    }

    info!("Cached {} partials", entries.len());
    Ok(())
}

fn format_listing(root: &Path, entries: &[CacheEntry]) -> String {
    let mut listing = format!("{} partials under {}\n", entries.len(), root.display());
    for entry in entries {
        let shown = entry.path.strip_prefix(root).unwrap_or(&entry.path);
        listing.push_str(&format!("  {:>8}  {}\n", entry.bytes, shown.display()));
    }
    listing
}
