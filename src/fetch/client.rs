//! HTTP client wrapper for list pages, detail pages and image bodies.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use super::constants::TIMEOUT_SECS;
use super::error::FetchError;
use crate::user_agent::DEFAULT_USER_AGENT;

/// GET client with a fixed identity header and timeout.
///
/// Created once per run and reused for every request so connections are
/// pooled. There is no retry: a failed fetch is returned to the caller, which
/// skips the affected unit of work.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Creates a fetcher with the default User-Agent and a 15 second timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] when the HTTP client cannot be built.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_settings(DEFAULT_USER_AGENT, Duration::from_secs(TIMEOUT_SECS))
    }

    /// Creates a fetcher with an explicit User-Agent and whole-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] when the HTTP client cannot be built.
    pub fn with_settings(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent.to_string())
            .gzip(true)
            .build()
            .map_err(|source| FetchError::ClientBuild { source })?;
        Ok(Self { client })
    }

    /// Fetches `url` and returns the full response body.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on network errors, timeouts and non-success
    /// status codes.
    #[instrument(level = "debug", skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::from_transport(url.as_str(), source))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(url.as_str(), status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::from_transport(url.as_str(), source))?;
        debug!(bytes = body.len(), "fetched");
        Ok(body.to_vec())
    }

    /// Parses `raw` and fetches it.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] when `raw` is not an absolute URL,
    /// otherwise the same errors as [`fetch`](Self::fetch).
    pub async fn fetch_str(&self, raw: &str) -> Result<Vec<u8>, FetchError> {
        let url = Url::parse(raw).map_err(|_| FetchError::invalid_url(raw))?;
        self.fetch(&url).await
    }
}
