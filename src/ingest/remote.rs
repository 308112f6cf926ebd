//! Remote log link loader.
//!
//! A logs link is a public directory listing for one round; each log kind
//! lives in its own file below it.

use tracing::{info, warn};

use super::file::parse_bytes;
use crate::adapters::Fetcher;
use crate::core::{BatchOptions, LogCollection};
use crate::domain::SourceKind;

/// Files fetched from a logs link when none are configured
pub const DEFAULT_LOG_FILES: &[&str] = &[
    "game.txt",
    "attack.txt",
    "pda.txt",
    "silicon.txt",
    "mecha.txt",
    "virus.txt",
    "telecomms.txt",
    "uplink.txt",
    "shuttle.txt",
];

/// Whether `source` looks like an http(s) logs link rather than a path
pub fn is_logs_link(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Fetch and collate `files` below `link`.
///
/// Files that cannot be retrieved or are not text logs are skipped with a
/// warning. The link becomes the collection's source label.
pub async fn from_logs_link<S: AsRef<str>>(
    link: &str,
    files: &[S],
    fetcher: &dyn Fetcher,
    options: &BatchOptions,
) -> LogCollection {
    let base = if link.ends_with('/') {
        link.to_string()
    } else {
        format!("{}/", link)
    };

    let mut collection = LogCollection::new();
    for file in files {
        let file = file.as_ref();
        let url = format!("{}{}", base, file);
        if !options.quiet {
            info!(url = %url, fetcher = fetcher.name(), "Retrieving");
        }

        let bytes = match fetcher.fetch(&url).await {
            Ok(bytes) => bytes,
            Err(err) => {
                if !options.quiet {
                    warn!("{}", err);
                }
                continue;
            }
        };

        let kind = SourceKind::from_file_name(file);
        match parse_bytes(&bytes, &url, &options.with_kind(kind)) {
            Ok(parsed) => collection.merge(parsed),
            Err(err) => {
                if !options.quiet {
                    warn!("{}", err);
                }
            }
        }
    }

    collection.set_source_label(link);
    collection
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_logs_link() {
        assert!(is_logs_link("https://tgstation13.org/parsed-logs/x"));
        assert!(is_logs_link("http://localhost/logs"));
        assert!(!is_logs_link("./logs/game.txt"));
    }
}
