//! File-server API: the [`FileApi`] seam and its HTTP implementation.

pub mod client;
#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;

use crate::error::Result;
use crate::fs::Entry;
use crate::path::RemotePath;
use crate::progress::ProgressCallback;
use crate::upload::PendingUpload;

pub use client::ApiClient;

/// Operations the remote file server offers.
///
/// [`ApiClient`] talks to a real server over HTTP; anything else
/// implementing this trait can stand in for it.
#[async_trait]
pub trait FileApi: Send + Sync {
    /// List the entries of a directory.
    async fn list(&self, path: &RemotePath) -> Result<Vec<Entry>>;

    /// Upload one file into `destination`, reporting progress as bytes are sent.
    async fn upload(
        &self,
        destination: &RemotePath,
        file: PendingUpload,
        progress: ProgressCallback,
    ) -> Result<()>;

    /// Move or rename `source` to `destination`.
    async fn rename(&self, source: &RemotePath, destination: &RemotePath) -> Result<()>;

    /// Remove a file or directory.
    async fn delete(&self, path: &RemotePath) -> Result<()>;

    /// Link that downloads `path` (directories arrive as zip archives).
    fn download_url(&self, path: &RemotePath) -> Result<String>;
}
