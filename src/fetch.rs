//! Page fetching behind a trait so crawls can run against stub transports
//! in tests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;

/// Default per-request timeout for [`HttpFetcher`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from fetching a single page.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request could not be completed (connect, timeout, TLS, ...).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("unexpected status {0}")]
    Status(StatusCode),
}

/// A thing that can fetch the body of a URL.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetch the body of `url`. A non-success response is an error.
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// [`Fetch`] implementation over a shared `reqwest` client.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher with the default request timeout.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        Ok(response.text().await?)
    }
}
