//! Adapter interfaces for external systems.
//!
//! Adapters provide a unified interface for retrieving remote log files.
//! Retrieval is fail-fast: one attempt, bytes or a classified error.

pub mod http;

use async_trait::async_trait;
use thiserror::Error;

// Re-export the HTTP fetcher
pub use http::HttpFetcher;

/// Classified retrieval failure
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Error {status} while retrieving {url}")]
    Status { url: String, status: u16 },
}

/// Trait for remote log retrieval
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Human-readable fetcher name
    fn name(&self) -> &str;

    /// Retrieve the body at `url`
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}
