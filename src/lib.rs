//! # Pronoun Cache
//!
//! A client-side cache/sync engine that resolves player display names to
//! short pronoun strings via an external lookup service, embedded in a game
//! client host.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Render Path (host UI)                  │
//! │  • lookup(raw_name) → "" or pronoun                        │
//! │  • Hash + map read only, never network, never disk         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       PronounStore                          │
//! │  • hashed id → CacheEntry (pronoun, retrievedAt)           │
//! │  • Dirty-gated JSON snapshot on disk                       │
//! │  • Asymmetric expiry: 1 day unresolved / 14 days confirmed │
//! └─────────────────────────────────────────────────────────────┘
//!                              ▲
//!                 (periodic refresh cycle, off the UI thread)
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Remote Service (HTTP)                      │
//! │  • Bulk lookup: hashed ids in, {id, pronoun} records out   │
//! │  • Publish: own value in, status/apikey out                │
//! │  • Optional gzip snapshot feed on a long period            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Raw names never leave the process and never touch disk: every identifier
//! is one-way hashed before it is used as a cache key or wire id.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pronoun_cache::{EngineConfig, HostApi, HttpApi, PronounEngine};
//! use tokio::sync::watch;
//!
//! # fn host() -> Arc<dyn HostApi> { unimplemented!() }
//! #[tokio::main]
//! async fn main() {
//!     let config = EngineConfig::default();
//!     let api = Arc::new(HttpApi::new(&config).expect("http client"));
//!
//!     let (_tx, rx) = watch::channel(config.clone());
//!     let engine = Arc::new(PronounEngine::new(config, rx, api, host()));
//!
//!     // Initial refresh, then the background loop
//!     engine.start().await;
//!     let runner = engine.clone();
//!     tokio::spawn(async move { runner.run().await });
//!
//!     // Render path: cheap, synchronous, non-blocking
//!     let text = engine.lookup("Some Player");
//!     if !text.is_empty() {
//!         println!("{text}");
//!     }
//!
//!     engine.shutdown().await;
//! }
//! ```
//!
//! ## Modules
//!
//! - [`engine`]: The [`PronounEngine`] coordinator and refresh scheduler
//! - [`store`]: The local hashed-id → entry map with its disk snapshot
//! - [`remote`]: Wire protocol and the HTTP sync client
//! - [`reconcile`]: Publish / rollback state machine for the local user's value
//! - [`hashing`]: Privacy-preserving identifier hashing
//! - [`eviction`]: Freshness windows and expiry policy
//! - [`host`]: The collaborator interface the embedding host implements

pub mod config;
pub mod engine;
pub mod entry;
pub mod eviction;
pub mod hashing;
pub mod host;
pub mod metrics;
pub mod reconcile;
pub mod remote;
pub mod store;

pub use config::EngineConfig;
pub use engine::{EngineState, PronounEngine};
pub use entry::CacheEntry;
pub use eviction::ExpiryPolicy;
pub use host::{HostApi, WriteOrigin, API_KEY_PREFIX, PRONOUN_KEY};
pub use reconcile::{ReconcilerState, WriteReconciler};
pub use remote::types::{LookupRecord, PublishDisposition, PublishResponse};
pub use remote::{ApiError, HttpApi, RemoteApi};
pub use store::{PronounStore, StoreError};
