//! Page fetching.
//!
//! [`PageFetcher`] is the only way the rest of the crate reaches the network.
//! [`HttpFetcher`] is the real implementation; tests substitute an in-memory
//! one.

use crate::error::{Error, Result};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Fetch the body of a page by URL.
pub trait PageFetcher {
    /// Return the response body as text.
    ///
    /// # Errors
    ///
    /// [`Error::Transport`] if the request fails, times out, or the server
    /// answers with a non-success status.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// [`PageFetcher`] backed by a `reqwest` client with a fixed timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::ClientBuild(e.to_string()))?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<String> {
        let t0 = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| {
                warn!(elapsed_ms = t0.elapsed().as_millis(), error = %e, "Request failed");
                Error::transport(url, describe(&e))
            })?;

        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(url, describe(&e)))?;

        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis(),
            "Fetched page"
        );
        Ok(body)
    }
}

fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "timed out".to_string()
    } else if let Some(status) = e.status() {
        format!("HTTP status {status}")
    } else {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_fetcher_builds() {
        assert!(HttpFetcher::new(Duration::from_secs(10)).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let fetcher = HttpFetcher::new(Duration::from_secs(2)).unwrap();
        // Port 9 on localhost has nothing listening in test environments.
        let err = fetcher.fetch("http://127.0.0.1:9/").await.unwrap_err();
        assert_eq!(err.kind(), "TransportError");
        assert!(err.to_string().starts_with("request to http://127.0.0.1:9/ failed"));
    }
}
