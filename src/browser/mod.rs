//! Per-session browser state.
//!
//! [`Browser`] owns everything a file-browser front end needs: the active
//! directory and its listing cache, the search text and sort choice, and the
//! upload queue. Methods take `&mut self` and never block on the network.
//! Fetches and transfers run as spawned tasks that report back through a
//! channel as [`BrowserEvent`] values; the owner applies them one at a time
//! with [`Browser::handle`], usually via [`Browser::next_event`] or
//! [`Browser::run_until_idle`].
//!
//! Requires a tokio runtime. The current-thread flavour matches the
//! single-threaded event loop this state machine was designed around.

mod browse;
mod mutate;
mod transfer;

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::api::{ApiClient, FileApi};
use crate::cache::{ListingCache, Resolution};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::fs::Entry;
use crate::path::RemotePath;
use crate::upload::{UploadEvent, UploadId, UploadOutcome, UploadQueue};
use crate::view::SortSpec;

/// Completion report from a background task.
#[derive(Debug)]
pub enum BrowserEvent {
    /// A listing fetch issued for `path` finished.
    Listed {
        path: RemotePath,
        result: Result<Vec<Entry>>,
    },
    Upload(UploadEvent),
}

/// Effect of handling one event.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    ListingStored(RemotePath),
    ListingFailed(RemotePath),
    /// Arrived for a path that was no longer active.
    ListingDiscarded(RemotePath),
    UploadProgressed(UploadId),
    UploadDone(UploadId),
    UploadFailed(UploadId),
    Ignored,
}

/// Client session against one file server.
pub struct Browser {
    api: Arc<dyn FileApi>,
    cache: ListingCache,
    uploads: UploadQueue,
    search: String,
    sort: Option<SortSpec>,
    tx: mpsc::UnboundedSender<BrowserEvent>,
    rx: mpsc::UnboundedReceiver<BrowserEvent>,
}

impl Browser {
    /// Create a session on top of any [`FileApi`]. Starts at the root with
    /// nothing loaded; call [`Browser::navigate`] or [`Browser::refresh`].
    pub fn new(api: Arc<dyn FileApi>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            api,
            cache: ListingCache::new(),
            uploads: UploadQueue::new(),
            search: String::new(),
            sort: None,
            tx,
            rx,
        }
    }

    /// Retain at most `capacity` directory listings; see [`ListingCache::with_capacity`].
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = ListingCache::with_capacity(capacity);
        self
    }

    /// Create a session talking HTTP to the server described by `config`.
    pub fn connect(config: ClientConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(ApiClient::new(config)?)))
    }

    pub fn cache(&self) -> &ListingCache {
        &self.cache
    }

    pub fn api(&self) -> &Arc<dyn FileApi> {
        &self.api
    }

    /// Apply one event to the session state.
    pub fn handle(&mut self, event: BrowserEvent) -> Outcome {
        match event {
            BrowserEvent::Listed { path, result } => match self.cache.resolve(&path, result) {
                Resolution::Stored => {
                    // Invalidated while the fetch was outstanding.
                    if self.cache.is_stale(&path) {
                        self.request(path.clone());
                    }
                    Outcome::ListingStored(path)
                }
                Resolution::Failed => Outcome::ListingFailed(path),
                Resolution::Discarded => Outcome::ListingDiscarded(path),
            },
            BrowserEvent::Upload(event) => match self.uploads.apply(event) {
                UploadOutcome::Progressed(id) => Outcome::UploadProgressed(id),
                UploadOutcome::Completed { id, destination } => {
                    info!(upload = %id, destination = %destination, "upload done");
                    self.invalidate(&destination);
                    Outcome::UploadDone(id)
                }
                UploadOutcome::Failed(id) => Outcome::UploadFailed(id),
                UploadOutcome::Ignored => Outcome::Ignored,
            },
        }
    }

    /// Wait for the next background event and apply it.
    pub async fn next_event(&mut self) -> Outcome {
        // `self` keeps a sender alive, so the channel never closes.
        match self.rx.recv().await {
            Some(event) => self.handle(event),
            None => Outcome::Ignored,
        }
    }

    /// Apply every event that is already waiting, without blocking.
    pub fn drain(&mut self) -> Vec<Outcome> {
        let mut outcomes = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            outcomes.push(self.handle(event));
        }
        outcomes
    }

    /// Whether any listing fetch or upload is still running.
    pub fn is_busy(&self) -> bool {
        self.cache.has_in_flight() || self.uploads.in_flight() > 0
    }

    /// Process events until no fetch or upload is outstanding.
    pub async fn run_until_idle(&mut self) -> Vec<Outcome> {
        let mut outcomes = Vec::new();
        while self.is_busy() {
            outcomes.push(self.next_event().await);
        }
        outcomes
    }

    /// Mark `path` out of date, refetching at once if it is on screen.
    pub(crate) fn invalidate(&mut self, path: &RemotePath) {
        self.cache.invalidate(path);
        if path == self.cache.active() {
            self.request(path.clone());
        }
    }

    fn sender(&self) -> mpsc::UnboundedSender<BrowserEvent> {
        self.tx.clone()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use chrono::Utc;

    pub(crate) fn file(name: &str) -> Entry {
        Entry {
            name: name.to_string(),
            size: 10,
            modified_time: Utc::now(),
            is_directory: false,
        }
    }

    pub(crate) fn dir(name: &str) -> Entry {
        Entry {
            name: name.to_string(),
            size: 0,
            modified_time: Utc::now(),
            is_directory: true,
        }
    }

    pub(crate) fn path(key: &str) -> RemotePath {
        RemotePath::parse(key).unwrap()
    }

    #[tokio::test]
    async fn test_handle_is_a_plain_reducer() {
        let api = MockApi::new();
        let mut browser = Browser::new(api.clone());

        // Nothing was requested, but the root is active: the result is stored.
        let outcome = browser.handle(BrowserEvent::Listed {
            path: RemotePath::root(),
            result: Ok(vec![file("a.txt")]),
        });
        assert_eq!(outcome, Outcome::ListingStored(RemotePath::root()));
        assert_eq!(browser.current().unwrap().entries.len(), 1);

        let outcome = browser.handle(BrowserEvent::Listed {
            path: path("elsewhere"),
            result: Ok(vec![]),
        });
        assert_eq!(outcome, Outcome::ListingDiscarded(path("elsewhere")));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_drain_without_events() {
        let mut browser = Browser::new(MockApi::new());
        assert!(browser.drain().is_empty());
        assert!(!browser.is_busy());
        assert!(browser.run_until_idle().await.is_empty());
    }

    #[tokio::test]
    async fn test_walking_many_directories_keeps_cache_bounded() {
        let api = MockApi::new();
        let mut browser = Browser::new(api.clone()).with_cache_capacity(3);
        for i in 0..50 {
            let key = format!("d{}", i);
            api.set_listing(&key, vec![file("a.txt")]);
            browser.navigate(path(&key));
            browser.run_until_idle().await;
        }
        assert_eq!(browser.cache().len(), 3);
        assert_eq!(browser.view().entries.len(), 1);

        // An evicted directory is simply fetched again.
        browser.navigate(path("d0"));
        browser.run_until_idle().await;
        assert_eq!(api.list_calls("d0"), 2);
        assert_eq!(browser.view().entries.len(), 1);
    }

    #[test]
    fn test_connect_builds_http_session() {
        let browser = Browser::connect(ClientConfig::new("http://files.local/api")).unwrap();
        assert!(browser.path().is_root());
        let url = browser.api().download_url(&path("a.txt")).unwrap();
        assert_eq!(url, "http://files.local/api/file?path=a.txt&download=true");
    }
}
