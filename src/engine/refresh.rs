// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! The periodic refresh cycle.
//!
//! One cycle, in order: evict expired entries, persist if dirty, load the
//! snapshot if the store is empty, gather candidate ids from the host,
//! resolve them remotely, persist again if the read produced changes. Every
//! step runs off the render thread, and failures never escape the cycle;
//! the next tick simply tries again.

use tracing::{debug, info, warn};

use super::PronounEngine;
use crate::entry::epoch_seconds;
use crate::metrics;

impl PronounEngine {
    /// Run one refresh cycle.
    ///
    /// Single-flight: when a previous cycle is still in flight (a slow
    /// network call), this tick is skipped and returns `false`.
    #[tracing::instrument(skip(self))]
    pub async fn refresh_cycle(&self) -> bool {
        if !self.cycle_guard_acquire() {
            debug!("refresh cycle already in flight, skipping tick");
            metrics::record_cycle("skipped");
            return false;
        }

        self.run_cycle().await;
        self.cycle_guard_release();

        metrics::record_cycle("completed");
        metrics::set_store_entries(self.store.len());
        true
    }

    async fn run_cycle(&self) {
        let now = epoch_seconds();
        let cache_path = self.config.read().cache_path.clone();

        // 1. Evict, so lookups never serve spuriously stale entries and
        //    evicted ids re-qualify as candidates below
        let evicted = self.store.evict_expired(now);
        if evicted > 0 {
            info!(evicted, "evicted expired entries");
            metrics::record_evictions(evicted);
        }

        // 2. Persist eviction results (and anything else pending)
        self.persist_if_dirty(&cache_path);

        // 3. First cycle of a session starts from the disk snapshot
        if self.store.is_empty() {
            let loaded = self.store.load_snapshot(&cache_path);
            if loaded > 0 {
                info!(loaded, "read entries from snapshot file");
            }
        }

        // 4–5. Resolve candidates through whichever read path is configured
        self.refresh_from_remote(now).await;

        // 6. Persist whatever the read path changed
        self.persist_if_dirty(&cache_path);
    }

    async fn refresh_from_remote(&self, now: i64) {
        if !self.host.is_logged_in() {
            debug!("not in an authenticated session, skipping remote read");
            return;
        }
        let sender = self.self_hash();
        if sender.is_empty() {
            debug!("local identity unresolvable, skipping remote read");
            return;
        }

        let feed_configured = self.config.read().snapshot_url.is_some();
        if feed_configured {
            self.refresh_from_feed(now).await;
        } else {
            self.refresh_from_lookup(&sender, now).await;
        }
    }

    /// Bulk-lookup variant: one request per cycle covering every visible id
    /// not already cached. The batch is atomic: on any failure the store is
    /// untouched and the ids stay candidates for the next cycle.
    async fn refresh_from_lookup(&self, sender: &str, now: i64) {
        let candidates = self.gather_candidates();
        if candidates.is_empty() {
            debug!("nothing to look up");
            return;
        }

        metrics::record_batch_size(candidates.len());
        match self.api.read_batch(sender, &candidates).await {
            Ok(verdicts) => {
                let mut inserted = 0usize;
                for id in &candidates {
                    let pronoun = verdicts.get(id).cloned().flatten();
                    if self.store.merge(id, pronoun, now) {
                        inserted += 1;
                    }
                }
                debug!(
                    requested = candidates.len(),
                    inserted, "bulk lookup merged"
                );
            }
            Err(e) => {
                // No updates this cycle; retried on the next tick
                warn!(error = %e, "error communicating with server");
            }
        }
    }

    /// Snapshot-feed variant: on a long period, pull the whole published
    /// feed and merge it. First-write-wins keeps values cached earlier in
    /// the session authoritative.
    async fn refresh_from_feed(&self, now: i64) {
        if !self.feed_due() {
            return;
        }

        match self.api.fetch_snapshot().await {
            Ok(records) => {
                let mut inserted = 0usize;
                for record in records {
                    if record.id.is_empty() {
                        continue;
                    }
                    let pronoun = record.pronoun.filter(|p| !p.is_empty());
                    if self.store.merge(&record.id, pronoun, now) {
                        inserted += 1;
                    }
                }
                info!(inserted, "snapshot feed merged");
            }
            Err(e) => {
                warn!(error = %e, "snapshot feed unavailable this cycle");
            }
        }
    }

    fn persist_if_dirty(&self, cache_path: &std::path::Path) {
        match self.store.persist(cache_path) {
            Ok(true) => metrics::record_persist("written"),
            Ok(false) => {}
            Err(e) => {
                // Dirty flag stays set; the next cycle retries the write
                warn!(error = %e, path = %cache_path.display(), "error saving snapshot");
                metrics::record_persist("error");
            }
        }
    }
}
