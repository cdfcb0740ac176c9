// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for the pronoun cache.
//!
//! Uses the `metrics` crate for backend-agnostic collection; the host picks
//! the exporter.
//!
//! # Metric Naming Convention
//! - `pronoun_cache_` prefix for all metrics
//! - `_total` suffix for counters
//!
//! # Labels
//! - `outcome`: hit/miss, completed/skipped/..., accepted/rejected/...

use metrics::{counter, gauge, histogram};

/// Record a render-path lookup
pub fn record_lookup(outcome: &str) {
    counter!(
        "pronoun_cache_lookups_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record a refresh cycle
pub fn record_cycle(outcome: &str) {
    counter!(
        "pronoun_cache_cycles_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record the size of an outbound lookup batch
pub fn record_batch_size(count: usize) {
    histogram!("pronoun_cache_batch_size").record(count as f64);
}

/// Record evicted entries
pub fn record_evictions(count: usize) {
    counter!("pronoun_cache_evictions_total").increment(count as u64);
}

/// Record a snapshot persist
pub fn record_persist(outcome: &str) {
    counter!(
        "pronoun_cache_persists_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record a publish attempt by disposition
pub fn record_publish(disposition: &str) {
    counter!(
        "pronoun_cache_publishes_total",
        "disposition" => disposition.to_string()
    )
    .increment(1);
}

/// Set current store entry count
pub fn set_store_entries(count: usize) {
    gauge!("pronoun_cache_store_entries").set(count as f64);
}
