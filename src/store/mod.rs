//! The local pronoun store.
//!
//! [`PronounStore`] owns the in-memory map from hashed identifier to
//! [`CacheEntry`] behind a single lock, plus the dirty flag that gates disk
//! writes. Nothing else in the crate touches the map directly; the render
//! path and the background cycle both go through the operations here.
//!
//! The map and dirty flag assume a single mutating flow at a time (the
//! refresh cycle is single-flight); the render path only ever takes the read
//! lock.

mod snapshot;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use thiserror::Error;

use crate::entry::CacheEntry;
use crate::eviction::ExpiryPolicy;
use crate::hashing;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// In-memory mapping from hashed identifier to cache entry.
pub struct PronounStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
    dirty: AtomicBool,
    policy: ExpiryPolicy,
}

impl PronounStore {
    #[must_use]
    pub fn new(policy: ExpiryPolicy) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            dirty: AtomicBool::new(false),
            policy,
        }
    }

    /// Current entry count
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Whether in-memory state differs from the last snapshot on disk
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Resolve a raw display name to its cached pronoun.
    ///
    /// This is the render path: hash the name, read the map, return the
    /// value or an empty string. Absence is a normal result, never an error,
    /// and no I/O of any kind happens here.
    #[must_use]
    pub fn lookup(&self, raw_name: &str) -> String {
        let hashed = hashing::hash_name(raw_name);
        if hashed.is_empty() {
            return String::new();
        }
        self.lookup_hashed(&hashed)
    }

    /// Resolve an already-hashed identifier.
    #[must_use]
    pub fn lookup_hashed(&self, hashed_id: &str) -> String {
        self.entries
            .read()
            .get(hashed_id)
            .map(|e| e.display_text().to_string())
            .unwrap_or_default()
    }

    /// Whether an entry exists for this hashed identifier.
    #[must_use]
    pub fn contains(&self, hashed_id: &str) -> bool {
        self.entries.read().contains_key(hashed_id)
    }

    /// Record a lookup verdict, first-write-wins.
    ///
    /// Inserts only if the key is absent: the server read path never
    /// overwrites a value already cached earlier in the same session.
    /// Returns whether an insert happened; inserting marks the store dirty.
    pub fn merge(&self, hashed_id: &str, pronoun: Option<String>, observed_at: i64) -> bool {
        let mut entries = self.entries.write();
        if entries.contains_key(hashed_id) {
            return false;
        }
        entries.insert(hashed_id.to_string(), CacheEntry::new(pronoun, observed_at));
        drop(entries);
        self.dirty.store(true, Ordering::Release);
        true
    }

    /// Remove every entry whose freshness window has elapsed at `now`.
    ///
    /// Returns the number of evicted entries; marks the store dirty when
    /// anything was removed.
    pub fn evict_expired(&self, now: i64) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !self.policy.is_expired(entry, now));
        let evicted = before - entries.len();
        drop(entries);
        if evicted > 0 {
            self.dirty.store(true, Ordering::Release);
        }
        evicted
    }

    /// Drop all in-memory state (session teardown).
    ///
    /// The snapshot file on disk is left alone; only the file survives
    /// across sessions.
    pub fn clear(&self) {
        self.entries.write().clear();
        self.dirty.store(false, Ordering::Release);
    }

}

impl Default for PronounStore {
    fn default() -> Self {
        Self::new(ExpiryPolicy::default())
    }
}
