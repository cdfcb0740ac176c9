//! Configuration for the pronoun cache engine.
//!
//! # Example
//!
//! ```
//! use pronoun_cache::EngineConfig;
//!
//! // Minimal config (uses defaults)
//! let config = EngineConfig::default();
//! assert_eq!(config.refresh_secs, 1800); // 30 minutes
//!
//! // Full config
//! let config = EngineConfig {
//!     api_url: "https://pronouns.example.net/publish/".into(),
//!     refresh_secs: 600,
//!     max_pronoun_len: 24,
//!     ..Default::default()
//! };
//! ```

use std::path::PathBuf;

use serde::Deserialize;

/// Configuration for the pronoun cache engine.
///
/// All fields have sensible defaults. The host typically overrides
/// `cache_path` to point into its own data directory.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Lookup/publish endpoint (POST for bulk lookup, PUT for publish)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Static snapshot feed URL (gzip JSON array). When set, the read path
    /// fetches the whole feed on `snapshot_refresh_secs` instead of issuing
    /// per-cycle bulk lookups.
    #[serde(default)]
    pub snapshot_url: Option<String>,

    /// On-disk snapshot location
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,

    /// Refresh cycle period in seconds (default: 30 minutes)
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,

    /// Snapshot feed fetch period in seconds (default: 40 minutes)
    #[serde(default = "default_snapshot_refresh_secs")]
    pub snapshot_refresh_secs: u64,

    /// Freshness windows in days: entries with no resolved value are retried
    /// after `empty_window_days`, confirmed values age out after
    /// `value_window_days`.
    #[serde(default = "default_empty_window_days")]
    pub empty_window_days: u32,
    #[serde(default = "default_value_window_days")]
    pub value_window_days: u32,

    /// Longest pronoun accepted before a publish is rejected locally
    #[serde(default = "default_max_pronoun_len")]
    pub max_pronoun_len: usize,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    "https://api.player-pronouns.net/publish/".to_string()
}
fn default_cache_path() -> PathBuf {
    PathBuf::from("./pronouns/pronouns.json")
}
fn default_refresh_secs() -> u64 {
    30 * 60
}
fn default_snapshot_refresh_secs() -> u64 {
    40 * 60
}
fn default_empty_window_days() -> u32 {
    1
}
fn default_value_window_days() -> u32 {
    14
}
fn default_max_pronoun_len() -> usize {
    32
}
fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            snapshot_url: None,
            cache_path: default_cache_path(),
            refresh_secs: default_refresh_secs(),
            snapshot_refresh_secs: default_snapshot_refresh_secs(),
            empty_window_days: default_empty_window_days(),
            value_window_days: default_value_window_days(),
            max_pronoun_len: default_max_pronoun_len(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}
