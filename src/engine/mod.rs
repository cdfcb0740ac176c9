// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Pronoun cache engine coordinator.
//!
//! The [`PronounEngine`] ties the components together:
//! - The local store with its disk snapshot
//! - The remote sync client (bulk lookup / snapshot feed / publish)
//! - The eviction sweep
//! - The write reconciler for the local user's own value
//!
//! # Lifecycle
//!
//! ```text
//! Created → Ready → Running → ShuttingDown
//! ```
//!
//! The render path ([`PronounEngine::lookup`]) is a hash plus one map read;
//! everything that can block (network, disk) happens inside the periodic
//! refresh cycle on the background schedule.

mod lifecycle;
mod refresh;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tracing::debug;

use crate::config::EngineConfig;
use crate::eviction::ExpiryPolicy;
use crate::hashing;
use crate::host::{HostApi, WriteOrigin, PRONOUN_KEY};
use crate::metrics;
use crate::reconcile::{ReconcilerState, WriteReconciler};
use crate::remote::RemoteApi;
use crate::store::PronounStore;

/// Engine lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Just created, not yet started
    Created,
    /// Initial refresh done, accepting lookups
    Ready,
    /// Background loop running
    Running,
    /// Graceful teardown in progress
    ShuttingDown,
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "Created"),
            Self::Ready => write!(f, "Ready"),
            Self::Running => write!(f, "Running"),
            Self::ShuttingDown => write!(f, "ShuttingDown"),
        }
    }
}

/// Main engine coordinator.
///
/// # Thread Safety
///
/// The engine is `Send + Sync` and meant to live in an `Arc`: the host UI
/// calls [`lookup`](Self::lookup) while the background task drives
/// [`run`](Self::run). The refresh cycle is single-flight; an overlapping
/// tick is skipped rather than queued.
pub struct PronounEngine {
    /// Configuration (updatable at runtime via the watch channel)
    pub(super) config: RwLock<EngineConfig>,

    /// Runtime config updates (Mutex for interior mutability in the run loop)
    pub(super) config_rx: tokio::sync::Mutex<watch::Receiver<EngineConfig>>,

    /// Engine state (broadcast to watchers)
    pub(super) state: watch::Sender<EngineState>,
    pub(super) state_rx: watch::Receiver<EngineState>,

    pub(super) store: PronounStore,
    pub(super) api: Arc<dyn RemoteApi>,
    pub(super) host: Arc<dyn HostApi>,
    pub(super) reconciler: WriteReconciler,

    /// Hashed identity of the local user, resolved lazily per session
    pub(super) self_hash: RwLock<Option<String>>,

    /// Single-flight guard for the refresh cycle
    pub(super) cycle_running: AtomicBool,

    /// When the snapshot feed was last fetched (feed variant only)
    pub(super) last_feed_fetch: Mutex<Option<Instant>>,
}

impl PronounEngine {
    /// Create a new engine. Call [`start()`](Self::start) to perform the
    /// initial refresh, then drive [`run()`](Self::run) on a background task.
    pub fn new(
        config: EngineConfig,
        config_rx: watch::Receiver<EngineConfig>,
        api: Arc<dyn RemoteApi>,
        host: Arc<dyn HostApi>,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(EngineState::Created);
        let policy = ExpiryPolicy::from_days(config.empty_window_days, config.value_window_days);
        let reconciler = WriteReconciler::new(api.clone(), host.clone());

        Self {
            config: RwLock::new(config),
            config_rx: tokio::sync::Mutex::new(config_rx),
            state: state_tx,
            state_rx,
            store: PronounStore::new(policy),
            api,
            host,
            reconciler,
            self_hash: RwLock::new(None),
            cycle_running: AtomicBool::new(false),
            last_feed_fetch: Mutex::new(None),
        }
    }

    /// Get current engine state.
    #[must_use]
    pub fn state(&self) -> EngineState {
        *self.state_rx.borrow()
    }

    /// Get a receiver to watch state changes.
    #[must_use]
    pub fn state_receiver(&self) -> watch::Receiver<EngineState> {
        self.state_rx.clone()
    }

    /// Check if the engine is serving lookups.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self.state(), EngineState::Ready | EngineState::Running)
    }

    /// Resolve a raw display name to its cached pronoun.
    ///
    /// The render path: never blocks on network or disk, never errors.
    /// Returns the empty string for unknown or unresolved names.
    #[must_use]
    pub fn lookup(&self, raw_name: &str) -> String {
        let text = self.store.lookup(raw_name);
        metrics::record_lookup(if text.is_empty() { "miss" } else { "hit" });
        text
    }

    /// Access the local store (narrow operations only; no raw map access).
    #[must_use]
    pub fn store(&self) -> &PronounStore {
        &self.store
    }

    /// Current reconciler state (mainly for diagnostics and tests).
    #[must_use]
    pub fn reconciler_state(&self) -> ReconcilerState {
        self.reconciler.state()
    }

    /// The local user's hashed identity, resolved and cached on first use.
    ///
    /// Empty when the host cannot name the local player yet (e.g. still
    /// loading in); callers treat empty as "no identity, skip".
    #[must_use]
    pub fn self_hash(&self) -> String {
        if let Some(hash) = self.self_hash.read().as_ref() {
            return hash.clone();
        }
        let Some(name) = self.host.local_display_name() else {
            return String::new();
        };
        let hashed = hashing::hash_name(&name);
        if !hashed.is_empty() {
            *self.self_hash.write() = Some(hashed.clone());
        }
        hashed
    }

    /// Handle a completed login transition.
    ///
    /// Re-resolves the local identity, then auto-publishes the configured
    /// pronoun (quietly) so the server copy tracks the local one.
    pub async fn handle_login(&self) {
        *self.self_hash.write() = None;
        let sender = self.self_hash();
        if sender.is_empty() {
            debug!("login observed but local player not resolvable yet");
            return;
        }

        let pronoun = self
            .host
            .config_value(PRONOUN_KEY)
            .filter(|p| !p.is_empty());
        if let Some(pronoun) = pronoun {
            let max_len = self.config.read().max_pronoun_len;
            self.reconciler.on_login(&sender, &pronoun, max_len).await;
        }
    }

    /// Handle a logout transition: the cached identity is no longer valid.
    pub fn handle_logout(&self) {
        *self.self_hash.write() = None;
    }

    /// Handle a configuration change notification from the host.
    pub async fn handle_config_changed(
        &self,
        key: &str,
        old_value: Option<&str>,
        new_value: Option<&str>,
        origin: WriteOrigin,
    ) {
        let sender = self.self_hash();
        let max_len = self.config.read().max_pronoun_len;
        self.reconciler
            .on_config_changed(&sender, key, old_value, new_value, origin, max_len)
            .await;
    }

    /// Hash the host's current candidate names, dropping empties, ids
    /// already cached, and duplicates (order preserved).
    pub(super) fn gather_candidates(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut candidates = Vec::new();
        for raw in self.host.visible_identifiers() {
            let hashed = hashing::hash_name(&raw);
            if hashed.is_empty() || self.store.contains(&hashed) {
                continue;
            }
            if seen.insert(hashed.clone()) {
                candidates.push(hashed);
            }
        }
        candidates
    }

    /// Whether the snapshot feed is due for a fetch; stamps the fetch time
    /// when it is.
    pub(super) fn feed_due(&self) -> bool {
        let period = self.config.read().snapshot_refresh_secs;
        let mut last = self.last_feed_fetch.lock();
        let due = last.map_or(true, |at| at.elapsed().as_secs() >= period);
        if due {
            *last = Some(Instant::now());
        }
        due
    }

    pub(super) fn cycle_guard_acquire(&self) -> bool {
        self.cycle_running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(super) fn cycle_guard_release(&self) {
        self.cycle_running.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::types::{LookupRecord, PublishResponse};
    use crate::remote::ApiError;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct NullApi;

    #[async_trait]
    impl RemoteApi for NullApi {
        async fn read_batch(
            &self,
            _sender_id: &str,
            _ids: &[String],
        ) -> Result<HashMap<String, Option<String>>, ApiError> {
            Ok(HashMap::new())
        }
        async fn publish(
            &self,
            _sender_id: &str,
            _pronoun: &str,
            _api_key: Option<&str>,
        ) -> Result<PublishResponse, ApiError> {
            Ok(PublishResponse::with_status(200))
        }
        async fn fetch_snapshot(&self) -> Result<Vec<LookupRecord>, ApiError> {
            Ok(Vec::new())
        }
    }

    struct StaticHost {
        name: Option<String>,
        visible: Vec<String>,
    }

    impl HostApi for StaticHost {
        fn is_logged_in(&self) -> bool {
            self.name.is_some()
        }
        fn local_display_name(&self) -> Option<String> {
            self.name.clone()
        }
        fn visible_identifiers(&self) -> Vec<String> {
            self.visible.clone()
        }
        fn config_value(&self, _key: &str) -> Option<String> {
            None
        }
        fn set_config_value(&self, _key: &str, _value: &str) {}
        fn notify_user(&self, _text: &str) {}
    }

    fn test_engine(host: StaticHost) -> PronounEngine {
        let config = EngineConfig::default();
        let (_tx, rx) = watch::channel(config.clone());
        PronounEngine::new(config, rx, Arc::new(NullApi), Arc::new(host))
    }

    #[test]
    fn test_engine_created_state() {
        let engine = test_engine(StaticHost {
            name: None,
            visible: vec![],
        });
        assert_eq!(engine.state(), EngineState::Created);
        assert!(!engine.is_ready());
    }

    #[test]
    fn test_lookup_unknown_is_empty() {
        let engine = test_engine(StaticHost {
            name: None,
            visible: vec![],
        });
        assert_eq!(engine.lookup("Whoever"), "");
    }

    #[test]
    fn test_self_hash_cached_per_session() {
        let engine = test_engine(StaticHost {
            name: Some("Tester".into()),
            visible: vec![],
        });
        let first = engine.self_hash();
        assert_eq!(first.len(), 32);
        assert_eq!(engine.self_hash(), first);

        engine.handle_logout();
        assert_eq!(engine.self_hash(), first);
    }

    #[test]
    fn test_self_hash_empty_when_unresolvable() {
        let engine = test_engine(StaticHost {
            name: None,
            visible: vec![],
        });
        assert_eq!(engine.self_hash(), "");
    }

    #[test]
    fn test_gather_candidates_dedups_and_skips_cached() {
        let engine = test_engine(StaticHost {
            name: None,
            visible: vec![
                "Alice".into(),
                "<img=41>Alice".into(), // same identity, decorated
                "Bob".into(),
                String::new(),
                "<img=3>".into(), // markup only, hashes empty
            ],
        });
        engine
            .store()
            .merge(&crate::hashing::hash_name("Bob"), None, 0);

        let candidates = engine.gather_candidates();
        assert_eq!(candidates, vec![crate::hashing::hash_name("Alice")]);
    }

    #[test]
    fn test_feed_due_respects_period() {
        let engine = test_engine(StaticHost {
            name: None,
            visible: vec![],
        });
        assert!(engine.feed_due());
        // Just stamped, nowhere near the 40 minute period
        assert!(!engine.feed_due());
    }

    #[test]
    fn test_cycle_guard_is_exclusive() {
        let engine = test_engine(StaticHost {
            name: None,
            visible: vec![],
        });
        assert!(engine.cycle_guard_acquire());
        assert!(!engine.cycle_guard_acquire());
        engine.cycle_guard_release();
        assert!(engine.cycle_guard_acquire());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(EngineState::Created.to_string(), "Created");
        assert_eq!(EngineState::ShuttingDown.to_string(), "ShuttingDown");
    }
}
