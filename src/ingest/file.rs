//! Local file and folder loaders.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{info, warn};

use crate::core::{BatchOptions, CollectionError, LogCollection};
use crate::domain::SourceKind;

/// Parse raw bytes as a batch of log lines.
///
/// Fails when the bytes are not text logs at all: invalid UTF-8 or an
/// HTML document.
pub fn parse_bytes(
    bytes: &[u8],
    origin: &str,
    options: &BatchOptions,
) -> Result<LogCollection, CollectionError> {
    let unsupported = |reason: &str| CollectionError::UnsupportedBatchSource {
        origin: origin.to_string(),
        reason: reason.to_string(),
    };

    let text = std::str::from_utf8(bytes).map_err(|_| unsupported("not valid UTF-8"))?;

    let head: String = text.trim_start().chars().take(14).collect();
    let head = head.to_ascii_lowercase();
    if head.starts_with("<!doctype html") || head.starts_with("<html") {
        return Err(unsupported("HTML document"));
    }

    Ok(LogCollection::parse_batch(text.lines(), options))
}

/// Parse one log file.
///
/// Without an explicit `kind`, the kind is derived from the file name.
pub async fn from_file(
    path: &Path,
    kind: Option<SourceKind>,
    options: &BatchOptions,
) -> Result<LogCollection> {
    let origin = path.display().to_string();
    let is_html = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html"));
    if is_html {
        return Err(CollectionError::UnsupportedBatchSource {
            origin,
            reason: "HTML logs are not supported".to_string(),
        }
        .into());
    }

    let kind = kind.unwrap_or_else(|| {
        path.file_name()
            .map(|name| SourceKind::from_file_name(&name.to_string_lossy()))
            .unwrap_or_default()
    });

    let bytes = fs::read(path)
        .await
        .with_context(|| format!("Failed to read log file: {}", origin))?;

    let mut collection = parse_bytes(&bytes, &origin, &options.with_kind(kind))?;
    collection.set_source_label(origin);
    Ok(collection)
}

/// Parse every file in a folder into a single collection.
///
/// Unsupported files are skipped with a warning; any other failure aborts.
pub async fn from_folder(dir: &Path, options: &BatchOptions) -> Result<LogCollection> {
    if !dir.is_dir() {
        anyhow::bail!("Is not a folder: {}", dir.display());
    }

    let pattern = format!("{}/*", glob::Pattern::escape(&dir.to_string_lossy()));
    let paths = glob::glob(&pattern)
        .with_context(|| format!("Invalid folder pattern: {}", pattern))?;

    let mut collection = LogCollection::new();
    for path in paths {
        let path = path.context("Failed to read folder entry")?;
        if !path.is_file() {
            continue;
        }

        if !options.quiet {
            info!(file = %path.display(), "Parsing");
        }
        match from_file(&path, None, options).await {
            Ok(parsed) => collection.merge(parsed),
            Err(err) => match err.downcast_ref::<CollectionError>() {
                Some(CollectionError::UnsupportedBatchSource { .. }) => {
                    if !options.quiet {
                        warn!(file = %path.display(), "Not supported, skipping");
                    }
                }
                _ => return Err(err),
            },
        }
    }

    collection.set_source_label(dir.display().to_string());
    Ok(collection)
}
