// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! On-disk snapshot for the pronoun store.
//!
//! The snapshot is a JSON object mapping hashed id to entry, living in a
//! fixed application-data path owned by the host. Persistence policy: only
//! entries with a non-empty pronoun are written. Known-absent entries are
//! session-local; after a restart they are simply re-resolved, which keeps
//! the file small.
//!
//! A missing, empty or malformed file is never an error; the store starts
//! empty and the next refresh repopulates it.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use super::{PronounStore, StoreError};
use crate::entry::CacheEntry;

impl PronounStore {
    /// Populate the store from the snapshot file.
    ///
    /// Only runs when the in-memory map is empty, so a mid-session call can
    /// never clobber live state with a stale load. A successful parse marks
    /// the store dirty so the next persist rewrites the file in normalized
    /// form. Returns the number of entries loaded.
    pub fn load_snapshot(&self, path: &Path) -> usize {
        let mut entries = self.entries.write();
        if !entries.is_empty() {
            return 0;
        }

        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no snapshot to load");
                return 0;
            }
        };
        if raw.trim().is_empty() {
            return 0;
        }

        let loaded: HashMap<String, CacheEntry> = match serde_json::from_str(&raw) {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "snapshot unreadable, starting empty");
                return 0;
            }
        };

        let count = loaded.len();
        *entries = loaded;
        drop(entries);
        self.dirty.store(true, std::sync::atomic::Ordering::Release);
        debug!(count, path = %path.display(), "snapshot loaded");
        count
    }

    /// Write the snapshot file if the store is dirty.
    ///
    /// Returns whether a write happened. The dirty flag is cleared only on
    /// success; an I/O failure leaves it set so the next cycle retries.
    pub fn persist(&self, path: &Path) -> Result<bool, StoreError> {
        if !self.is_dirty() {
            return Ok(false);
        }

        // Snapshot under the lock, write after releasing it. The render path
        // keeps its read access throughout.
        let encoded = {
            let entries = self.entries.read();
            let retained: HashMap<&String, &CacheEntry> = entries
                .iter()
                .filter(|(_, entry)| entry.has_value())
                .collect();
            serde_json::to_string(&retained)?
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, encoded)?;

        self.dirty.store(false, std::sync::atomic::Ordering::Release);
        debug!(path = %path.display(), "snapshot persisted");
        Ok(true)
    }
}
