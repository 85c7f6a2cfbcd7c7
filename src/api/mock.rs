//! In-memory [`FileApi`] for tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::FileApi;
use crate::error::{BrowseError, Result};
use crate::fs::Entry;
use crate::path::RemotePath;
use crate::progress::{ProgressCallback, TransferProgress};
use crate::upload::PendingUpload;

/// Request seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    List(String),
    Upload { destination: String, file_name: String },
    Rename { source: String, destination: String },
    Delete(String),
}

/// Serves canned listings and records every call.
///
/// A listing for a path can be held back with [`MockApi::hold`] until
/// [`MockApi::release`] is called, to control the order in which fetches
/// resolve.
#[derive(Default)]
pub(crate) struct MockApi {
    listings: Mutex<HashMap<String, Vec<Entry>>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<Call>>,
}

fn not_found() -> BrowseError {
    BrowseError::Http {
        status: 404,
        reason: "Not Found".to_string(),
    }
}

fn server_error() -> BrowseError {
    BrowseError::Http {
        status: 500,
        reason: "Internal Server Error".to_string(),
    }
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_listing(&self, key: &str, entries: Vec<Entry>) {
        self.listings.lock().unwrap().insert(key.to_string(), entries);
    }

    /// Make listings, uploads (by file name), moves and deletes of `name` fail.
    pub fn fail(&self, name: &str) {
        self.failing.lock().unwrap().insert(name.to_string());
    }

    pub fn hold(&self, key: &str) {
        self.gates
            .lock()
            .unwrap()
            .insert(key.to_string(), Arc::new(Notify::new()));
    }

    pub fn release(&self, key: &str) {
        if let Some(gate) = self.gates.lock().unwrap().remove(key) {
            gate.notify_one();
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self, key: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::List(k) if k == key))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn is_failing(&self, name: &str) -> bool {
        self.failing.lock().unwrap().contains(name)
    }
}

#[async_trait]
impl FileApi for MockApi {
    async fn list(&self, path: &RemotePath) -> Result<Vec<Entry>> {
        let key = path.to_key();
        self.record(Call::List(key.clone()));

        let gate = self.gates.lock().unwrap().get(&key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.is_failing(&key) {
            return Err(server_error());
        }
        self.listings
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn upload(
        &self,
        destination: &RemotePath,
        file: PendingUpload,
        mut progress: ProgressCallback,
    ) -> Result<()> {
        self.record(Call::Upload {
            destination: destination.to_key(),
            file_name: file.file_name.clone(),
        });

        let (total, _) = file.source.open(64 * 1024).await?;
        progress(&TransferProgress::new(total / 2, total, file.file_name.clone()));
        tokio::task::yield_now().await;

        if self.is_failing(&file.file_name) {
            return Err(server_error());
        }
        progress(&TransferProgress::new(total, total, file.file_name.clone()));
        Ok(())
    }

    async fn rename(&self, source: &RemotePath, destination: &RemotePath) -> Result<()> {
        self.record(Call::Rename {
            source: source.to_key(),
            destination: destination.to_key(),
        });
        if self.is_failing(&source.to_key()) {
            return Err(server_error());
        }
        Ok(())
    }

    async fn delete(&self, path: &RemotePath) -> Result<()> {
        self.record(Call::Delete(path.to_key()));
        if self.is_failing(&path.to_key()) {
            return Err(server_error());
        }
        Ok(())
    }

    fn download_url(&self, path: &RemotePath) -> Result<String> {
        Ok(format!("mock://file?path={}&download=true", path.to_key()))
    }
}
