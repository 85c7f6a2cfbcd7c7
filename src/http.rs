//! HTTP client wrapper for file-server requests.

use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;

use crate::error::{BrowseError, Result};

/// Shared transport for every file-server call. Cloning shares the
/// connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Route every request through `proxy` (`http://` or `https://`).
    pub fn with_proxy(proxy: &str) -> Result<Self> {
        let proxy = reqwest::Proxy::all(proxy)
            .map_err(|e| BrowseError::Custom(format!("Invalid proxy {}: {}", proxy, e)))?;
        Client::builder()
            .proxy(proxy)
            .build()
            .map(|client| Self { client })
            .map_err(BrowseError::from)
    }

    /// Access the underlying client to build a request.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Send a request and fail on any non-success status.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "response");
        if !status.is_success() {
            return Err(BrowseError::Http {
                status: status.as_u16(),
                reason: status
                    .canonical_reason()
                    .unwrap_or("Unknown status")
                    .to_string(),
            });
        }
        Ok(response)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}
