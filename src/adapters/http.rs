//! HTTP fetcher for public log links.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{FetchError, Fetcher};

/// Fetcher backed by a `reqwest` client
pub struct HttpFetcher {
    /// HTTP client
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let request_error = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(request_error)?;
        debug!(url, bytes = body.len(), "Fetched");
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_fetcher_creation() {
        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        assert_eq!(fetcher.name(), "http");
    }
}
