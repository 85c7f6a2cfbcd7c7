//! Client configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BrowseError, Result};

/// Default API root of the file server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/file-server/api";

/// Listing requests give up after this long.
pub const DEFAULT_LIST_TIMEOUT_MS: u64 = 16_000;

/// Upload bodies are streamed (and progress reported) in pieces of this size.
pub const DEFAULT_UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Settings for talking to the file server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    /// API root; endpoints are resolved below it (`{base_url}/file`)
    pub base_url: String,
    /// Timeout for directory listings, in milliseconds
    pub list_timeout_ms: u64,
    /// Optional proxy URL (e.g. "http://proxy:8080")
    pub proxy: Option<String>,
    /// Upload body piece size in bytes
    pub upload_chunk_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            list_timeout_ms: DEFAULT_LIST_TIMEOUT_MS,
            proxy: None,
            upload_chunk_size: DEFAULT_UPLOAD_CHUNK_SIZE,
        }
    }
}

impl ClientConfig {
    /// Configuration for a server at `base_url`, defaults elsewhere.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::default().with_base_url(base_url)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn with_list_timeout(mut self, timeout: Duration) -> Self {
        self.list_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn list_timeout(&self) -> Duration {
        Duration::from_millis(self.list_timeout_ms)
    }

    /// Chunk size, never zero.
    pub fn chunk_size(&self) -> usize {
        self.upload_chunk_size.max(1)
    }

    /// Load configuration from a JSON file. A missing file yields defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let json = std::fs::read_to_string(path)
            .map_err(|e| BrowseError::Custom(format!("Failed to read config: {}", e)))?;
        let config: Self = serde_json::from_str(&json)?;
        Ok(config.normalized())
    }

    /// Save configuration as pretty JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .map_err(|e| BrowseError::Custom(format!("Failed to write config: {}", e)))?;
        Ok(())
    }

    /// Defaults overridden by `FILEDECK_BASE_URL`, `FILEDECK_PROXY` and
    /// `FILEDECK_LIST_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self> {
        Self::default().merge_env(|key| std::env::var(key).ok())
    }

    fn merge_env(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = var("FILEDECK_BASE_URL") {
            self = self.with_base_url(url);
        }
        if let Some(proxy) = var("FILEDECK_PROXY") {
            self.proxy = Some(proxy);
        }
        if let Some(ms) = var("FILEDECK_LIST_TIMEOUT_MS") {
            self.list_timeout_ms = ms.trim().parse().map_err(|_| {
                BrowseError::Custom(format!("Invalid FILEDECK_LIST_TIMEOUT_MS: {}", ms))
            })?;
        }
        Ok(self)
    }

    fn normalized(self) -> Self {
        let base_url = self.base_url.clone();
        self.with_base_url(base_url)
    }
}
