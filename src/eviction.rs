// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Freshness windows and expiry policy.
//!
//! Entries age out on an asymmetric schedule: a lookup that found nothing is
//! retried after one day, while a confirmed value is kept for two weeks so
//! well-known players are not re-fetched needlessly. The sweep runs once per
//! refresh cycle, before the read path, so evicted ids are re-queried in the
//! same cycle that drops them.

use std::time::Duration;

use crate::entry::CacheEntry;

const DAY_SECS: u64 = 24 * 60 * 60;

/// Expiry windows for cached entries.
///
/// # Example
///
/// ```
/// use pronoun_cache::{CacheEntry, ExpiryPolicy};
///
/// let policy = ExpiryPolicy::default();
/// let unresolved = CacheEntry::new(None, 1_000_000);
///
/// // Unresolved entries are retried after a day
/// assert!(policy.is_expired(&unresolved, 1_000_000 + 36 * 3600));
/// assert!(!policy.is_expired(&unresolved, 1_000_000 + 3600));
/// ```
#[derive(Debug, Clone)]
pub struct ExpiryPolicy {
    /// Window for entries with no resolved value
    pub empty_window: Duration,
    /// Window for entries with a confirmed value
    pub value_window: Duration,
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self::from_days(1, 14)
    }
}

impl ExpiryPolicy {
    #[must_use]
    pub fn from_days(empty_days: u32, value_days: u32) -> Self {
        Self {
            empty_window: Duration::from_secs(u64::from(empty_days) * DAY_SECS),
            value_window: Duration::from_secs(u64::from(value_days) * DAY_SECS),
        }
    }

    /// The freshness window that applies to `entry`.
    #[must_use]
    pub fn window(&self, entry: &CacheEntry) -> Duration {
        if entry.has_value() {
            self.value_window
        } else {
            self.empty_window
        }
    }

    /// Epoch second after which `entry` is stale.
    #[must_use]
    pub fn destroy_after(&self, entry: &CacheEntry) -> i64 {
        entry.retrieved_at.saturating_add(self.window(entry).as_secs() as i64)
    }

    /// Whether `entry` should be evicted at time `now`.
    #[must_use]
    pub fn is_expired(&self, entry: &CacheEntry, now: i64) -> bool {
        now > self.destroy_after(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: i64 = 3600;
    const DAY: i64 = 24 * HOUR;

    fn resolved(retrieved_at: i64) -> CacheEntry {
        CacheEntry::new(Some("They/Them".into()), retrieved_at)
    }

    fn unresolved(retrieved_at: i64) -> CacheEntry {
        CacheEntry::new(None, retrieved_at)
    }

    #[test]
    fn test_default_windows() {
        let policy = ExpiryPolicy::default();
        assert_eq!(policy.empty_window, Duration::from_secs(DAY as u64));
        assert_eq!(policy.value_window, Duration::from_secs(14 * DAY as u64));
    }

    #[test]
    fn test_window_depends_on_value() {
        let policy = ExpiryPolicy::default();
        assert_eq!(policy.window(&resolved(0)), policy.value_window);
        assert_eq!(policy.window(&unresolved(0)), policy.empty_window);
        // Empty string counts as unresolved
        let empty = CacheEntry::new(Some(String::new()), 0);
        assert_eq!(policy.window(&empty), policy.empty_window);
    }

    #[test]
    fn test_unresolved_expires_after_a_day() {
        let policy = ExpiryPolicy::default();
        let entry = unresolved(1_000_000);
        assert!(!policy.is_expired(&entry, 1_000_000 + 23 * HOUR));
        assert!(policy.is_expired(&entry, 1_000_000 + 36 * HOUR));
    }

    #[test]
    fn test_resolved_survives_ten_days() {
        let policy = ExpiryPolicy::default();
        let entry = resolved(1_000_000);
        assert!(!policy.is_expired(&entry, 1_000_000 + 10 * DAY));
        assert!(policy.is_expired(&entry, 1_000_000 + 15 * DAY));
    }

    #[test]
    fn test_boundary_is_exclusive() {
        let policy = ExpiryPolicy::default();
        let entry = unresolved(1_000_000);
        // Exactly at the boundary the entry is still fresh
        assert!(!policy.is_expired(&entry, policy.destroy_after(&entry)));
        assert!(policy.is_expired(&entry, policy.destroy_after(&entry) + 1));
    }

    #[test]
    fn test_destroy_after_saturates() {
        let policy = ExpiryPolicy::default();
        let entry = resolved(i64::MAX - 1);
        assert_eq!(policy.destroy_after(&entry), i64::MAX);
    }
}
