//! Navigation, listing and display helpers.

use std::sync::Arc;

use tracing::debug;

use super::{Browser, BrowserEvent};
use crate::cache::ListingStatus;
use crate::error::Result;
use crate::fs::Listing;
use crate::path::RemotePath;
use crate::view::{self, SortKey, SortSpec, View};

impl Browser {
    /// The active directory.
    pub fn path(&self) -> &RemotePath {
        self.cache.active()
    }

    /// Make `path` the active directory and fetch it fresh.
    pub fn navigate(&mut self, path: RemotePath) {
        debug!(path = %path, "navigate");
        self.cache.set_active(path.clone());
        self.cache.invalidate(&path);
        self.request(path);
    }

    /// Enter the subdirectory `name` of the active directory.
    pub fn open(&mut self, name: &str) -> Result<()> {
        let next = self.path().descend(name)?;
        self.navigate(next);
        Ok(())
    }

    /// Jump to the ancestor at `depth` (0 is the root), as a breadcrumb does.
    pub fn ascend_to(&mut self, depth: usize) -> Result<()> {
        let next = self.path().ascend_to(depth)?;
        self.navigate(next);
        Ok(())
    }

    /// Refetch the active directory.
    pub fn refresh(&mut self) {
        let path = self.path().clone();
        self.navigate(path);
    }

    /// Ask for the listing of `path`, fetching only when nothing fresh is
    /// cached and no fetch for it is already running.
    pub fn request(&mut self, path: RemotePath) {
        if !self.cache.begin(&path) {
            return;
        }

        let api = Arc::clone(&self.api);
        let tx = self.sender();
        tokio::spawn(async move {
            let result = api.list(&path).await;
            // Receiver lives as long as the browser; a send error means it is gone.
            let _ = tx.send(BrowserEvent::Listed { path, result });
        });
    }

    /// Fetch status of the active directory.
    pub fn status(&self) -> ListingStatus {
        self.cache.status(self.path())
    }

    /// Last good listing of the active directory.
    pub fn current(&self) -> Option<&Listing> {
        self.cache.current()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.sort
    }

    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        self.sort = sort;
    }

    /// Cycle the sort on `key`: ascending, descending, off.
    pub fn toggle_sort(&mut self, key: SortKey) -> Option<SortSpec> {
        self.sort = SortSpec::toggle(self.sort, key);
        self.sort
    }

    /// Active listing filtered by the search text and ordered by the sort spec.
    /// Empty until a listing has been stored.
    pub fn view(&self) -> View<'_> {
        let entries = self.current().map(|l| l.entries.as_slice()).unwrap_or(&[]);
        view::view(entries, &self.search, self.sort)
    }

    /// Download link for `name` in the active directory.
    pub fn download_url(&self, name: &str) -> Result<String> {
        let target = self.path().descend(name)?;
        self.api.download_url(&target)
    }
}
