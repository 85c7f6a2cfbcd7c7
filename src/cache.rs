//! Listing cache.
//!
//! Stores the last good listing per directory, keyed by [`RemotePath::to_key`],
//! and tracks which directory is active. The cache does no I/O itself: the
//! caller asks [`ListingCache::begin`] whether a fetch is needed, performs
//! it, and hands the outcome back to [`ListingCache::resolve`].
//!
//! At most [`DEFAULT_CAPACITY`] directories are retained (see
//! [`ListingCache::with_capacity`]); past that the least recently used one
//! that is neither active nor being fetched is evicted.
//!
//! A result for a directory that is no longer active is dropped. The check
//! compares the path the fetch was issued for with the active path when the
//! result arrives; there is no per-request generation number.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::Result;
use crate::fs::{Entry, Listing};
use crate::path::RemotePath;

/// Fetch status of one directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ListingStatus {
    /// Never requested, or a fetch was discarded before completing.
    #[default]
    Idle,
    Loading,
    Ready,
    Error(String),
}

/// What [`ListingCache::resolve`] did with a fetch result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Stored,
    Failed,
    /// The path was no longer active; nothing changed.
    Discarded,
}

/// Counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests served from a fresh cached listing
    pub hits: u64,
    /// Fetches issued
    pub fetches: u64,
    pub invalidations: u64,
    /// Results dropped because their path was no longer active
    pub discarded: u64,
}

#[derive(Debug, Default)]
struct Slot {
    listing: Option<Listing>,
    status: ListingStatus,
    stale: bool,
    in_flight: bool,
    /// Invalidated while a fetch was outstanding.
    invalidated_in_flight: bool,
    last_used: u64,
}

impl Slot {
    fn is_fresh(&self) -> bool {
        self.listing.is_some() && !self.stale
    }
}

/// Directories retained by [`ListingCache::new`].
pub const DEFAULT_CAPACITY: usize = 32;

#[derive(Debug)]
pub struct ListingCache {
    active: RemotePath,
    slots: HashMap<String, Slot>,
    capacity: usize,
    clock: u64,
    stats: CacheStats,
}

impl Default for ListingCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl ListingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retain at most `capacity` directories. The active directory and any
    /// directory being fetched are kept even beyond that.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            active: RemotePath::root(),
            slots: HashMap::new(),
            capacity,
            clock: 0,
            stats: CacheStats::default(),
        }
    }

    /// The directory the user is looking at.
    pub fn active(&self) -> &RemotePath {
        &self.active
    }

    pub fn set_active(&mut self, path: RemotePath) {
        debug!(path = %path, "active path changed");
        self.clock += 1;
        if let Some(slot) = self.slots.get_mut(&path.to_key()) {
            slot.last_used = self.clock;
        }
        self.active = path;
        self.evict();
    }

    /// Start a request for `path`. Returns `true` when the caller must fetch.
    ///
    /// No fetch is needed when a fresh listing is cached, or when a fetch for
    /// the same path is already outstanding.
    pub fn begin(&mut self, path: &RemotePath) -> bool {
        self.clock += 1;
        let slot = self.slots.entry(path.to_key()).or_default();
        slot.last_used = self.clock;
        if slot.in_flight {
            return false;
        }
        if slot.is_fresh() {
            self.stats.hits += 1;
            slot.status = ListingStatus::Ready;
            return false;
        }
        slot.in_flight = true;
        slot.status = ListingStatus::Loading;
        self.stats.fetches += 1;
        self.evict();
        true
    }

    /// Record the outcome of a fetch issued for `path`.
    pub fn resolve(&mut self, path: &RemotePath, result: Result<Vec<Entry>>) -> Resolution {
        let is_active = *path == self.active;
        let slot = self.slots.entry(path.to_key()).or_default();
        slot.in_flight = false;
        let invalidated = std::mem::take(&mut slot.invalidated_in_flight);

        if !is_active {
            warn!(path = %path, "discarding listing for inactive path");
            self.stats.discarded += 1;
            slot.stale |= invalidated;
            slot.status = if slot.listing.is_some() {
                ListingStatus::Ready
            } else {
                ListingStatus::Idle
            };
            return Resolution::Discarded;
        }

        match result {
            Ok(entries) => {
                debug!(path = %path, count = entries.len(), "listing stored");
                slot.listing = Some(Listing::new(path.clone(), entries));
                slot.stale = invalidated;
                slot.status = ListingStatus::Ready;
                Resolution::Stored
            }
            Err(e) => {
                warn!(path = %path, error = %e, "listing failed");
                slot.stale |= invalidated;
                slot.status = ListingStatus::Error(e.to_string());
                Resolution::Failed
            }
        }
    }

    /// Force the next request for `path` to fetch again. The last good
    /// listing stays readable until a new one arrives.
    pub fn invalidate(&mut self, path: &RemotePath) {
        if let Some(slot) = self.slots.get_mut(&path.to_key()) {
            self.stats.invalidations += 1;
            slot.stale = true;
            if slot.in_flight {
                slot.invalidated_in_flight = true;
            }
        }
    }

    pub fn status(&self, path: &RemotePath) -> ListingStatus {
        self.slots
            .get(&path.to_key())
            .map(|s| s.status.clone())
            .unwrap_or_default()
    }

    pub fn listing(&self, path: &RemotePath) -> Option<&Listing> {
        self.slots.get(&path.to_key())?.listing.as_ref()
    }

    /// Listing of the active path, if one has been stored.
    pub fn current(&self) -> Option<&Listing> {
        self.listing(&self.active)
    }

    pub fn is_stale(&self, path: &RemotePath) -> bool {
        self.slots
            .get(&path.to_key())
            .is_none_or(|s| s.stale || s.listing.is_none())
    }

    pub fn is_loading(&self, path: &RemotePath) -> bool {
        self.slots.get(&path.to_key()).is_some_and(|s| s.in_flight)
    }

    /// Whether any fetch is outstanding.
    pub fn has_in_flight(&self) -> bool {
        self.slots.values().any(|s| s.in_flight)
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Number of directories currently retained.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn evict(&mut self) {
        let active = self.active.to_key();
        while self.slots.len() > self.capacity {
            let oldest = self
                .slots
                .iter()
                .filter(|(key, slot)| **key != active && !slot.in_flight)
                .min_by_key(|(_, slot)| slot.last_used)
                .map(|(key, _)| key.clone());
            let Some(key) = oldest else { break };
            debug!(path = %key, "evicting listing");
            self.slots.remove(&key);
        }
    }
}
