//! Move and delete.
//!
//! Both await the server directly and report to the caller. Cached listings
//! are only touched after the server confirms the change.

use tracing::{info, warn};

use super::Browser;
use crate::error::{BrowseError, Result};
use crate::path::RemotePath;

impl Browser {
    /// Move or rename `source` to `destination`, a `/`-separated path from
    /// the server root.
    ///
    /// An empty destination is rejected before anything is sent. On success
    /// the listings of the source, its parent and the destination's parent
    /// are invalidated.
    pub async fn move_entry(&mut self, source: &RemotePath, destination: &str) -> Result<()> {
        let target = RemotePath::normalize(destination);
        if target.is_root() {
            return Err(BrowseError::InvalidDestination(destination.to_string()));
        }

        if let Err(e) = self.api.rename(source, &target).await {
            warn!(source = %source, destination = %target, error = %e, "move failed");
            return Err(e);
        }
        info!(source = %source, destination = %target, "moved");

        self.invalidate_around(source);
        if let Some(parent) = target.parent() {
            self.invalidate(&parent);
        }
        Ok(())
    }

    /// Move `name` from the active directory to `destination`.
    pub async fn move_child(&mut self, name: &str, destination: &str) -> Result<()> {
        let source = self.path().descend(name)?;
        self.move_entry(&source, destination).await
    }

    /// Delete `path`. On success the listings of the path and its parent are
    /// invalidated.
    pub async fn delete_entry(&mut self, path: &RemotePath) -> Result<()> {
        if let Err(e) = self.api.delete(path).await {
            warn!(path = %path, error = %e, "delete failed");
            return Err(e);
        }
        info!(path = %path, "deleted");

        self.invalidate_around(path);
        Ok(())
    }

    /// Delete `name` from the active directory.
    pub async fn delete_child(&mut self, name: &str) -> Result<()> {
        let target = self.path().descend(name)?;
        self.delete_entry(&target).await
    }

    fn invalidate_around(&mut self, path: &RemotePath) {
        self.invalidate(path);
        if let Some(parent) = path.parent() {
            self.invalidate(&parent);
        }
    }
}
