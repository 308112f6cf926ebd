//! Loading log batches from files, folders and remote log links.
//!
//! Each loader turns its input into raw lines and hands them to
//! [`LogCollection::parse_batch`]; several inputs are combined with
//! [`LogCollection::merge`].

pub mod file;
pub mod remote;

use std::path::Path;

use anyhow::{Context, Result};

use crate::adapters::HttpFetcher;
use crate::config::ResolvedConfig;
use crate::core::{BatchOptions, LogCollection};

// Re-export commonly used loaders
pub use file::{from_file, from_folder, parse_bytes};
pub use remote::{from_logs_link, is_logs_link, DEFAULT_LOG_FILES};

/// Load one source: an http(s) logs link, a folder or a single file
pub async fn load_source(
    source: &str,
    config: &ResolvedConfig,
    options: &BatchOptions,
) -> Result<LogCollection> {
    if is_logs_link(source) {
        let fetcher = HttpFetcher::new(config.fetch_timeout())
            .context("Failed to create HTTP client")?;
        return Ok(from_logs_link(source, &config.fetch_files, &fetcher, options).await);
    }

    let path = Path::new(source);
    if path.is_dir() {
        from_folder(path, options).await
    } else {
        from_file(path, None, options).await
    }
}

/// Load and collate several sources.
///
/// A single source is returned as loaded, keeping its own kind.
pub async fn load_sources<S: AsRef<str>>(
    sources: &[S],
    config: &ResolvedConfig,
    options: &BatchOptions,
) -> Result<LogCollection> {
    let mut collection: Option<LogCollection> = None;
    for source in sources {
        let source = source.as_ref();
        let loaded = load_source(source, config, options)
            .await
            .with_context(|| format!("Failed to load {}", source))?;
        match collection.as_mut() {
            Some(existing) => existing.merge(loaded),
            None => collection = Some(loaded),
        }
    }
    collection.context("No log sources given")
}
