//! Directory entries and listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::path::RemotePath;

/// One file or directory record returned by a directory listing.
///
/// Entries are snapshots of the server's view; the client never edits one
/// in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Name, unique within its parent listing
    pub name: String,
    /// Size in bytes (meaningless for directories)
    pub size: u64,
    /// Last modification time
    pub modified_time: DateTime<Utc>,
    /// Whether this entry is a directory
    pub is_directory: bool,
}

impl Entry {
    pub fn is_dir(&self) -> bool {
        self.is_directory
    }

    pub fn is_file(&self) -> bool {
        !self.is_directory
    }

    /// Size for ordering purposes; directories have none.
    pub(crate) fn sort_size(&self) -> Option<u64> {
        (!self.is_directory).then_some(self.size)
    }
}

/// Body of `GET /file?path=...`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ListResponse {
    pub items: Vec<Entry>,
}

/// The full result set for one directory at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub path: RemotePath,
    pub entries: Vec<Entry>,
    pub fetched_at: DateTime<Utc>,
}

impl Listing {
    pub fn new(path: RemotePath, entries: Vec<Entry>) -> Self {
        Self {
            path,
            entries,
            fetched_at: Utc::now(),
        }
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

/// Format a byte count for display.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{}B", bytes)
    } else if bytes < 1_048_576 {
        format!("{:.1}KB", bytes as f64 / 1024.0)
    } else if bytes < 1_073_741_824 {
        format!("{:.1}MB", bytes as f64 / 1_048_576.0)
    } else {
        format!("{:.2}GB", bytes as f64 / 1_073_741_824.0)
    }
}
