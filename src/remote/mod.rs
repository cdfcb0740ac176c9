//! Remote service client.
//!
//! Two outbound operations exist: a bulk lookup (many hashed ids in, one
//! verdict per id out) and a single-record publish of the local user's own
//! value. A third read path, the static snapshot feed, replaces bulk lookups
//! when configured. [`RemoteApi`] is the seam; [`HttpApi`] is the production
//! implementation.

pub mod http;
pub mod types;

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use types::{LookupRecord, PublishResponse};

#[derive(Error, Debug)]
pub enum ApiError {
    /// Could not reach the service at all (connectivity, timeout). Never
    /// triggers a rollback: "could not ask" is not "server said no".
    #[error("transport error: {0}")]
    Transport(String),
    /// Reached the service but could not make sense of the reply.
    #[error("malformed response: {0}")]
    Malformed(String),
    /// The service answered with an explicit error indicator; the whole
    /// batch is treated as failed and retried next cycle.
    #[error("service error: {0}")]
    Service(String),
}

/// Outbound operations against the pronoun service.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Resolve a batch of hashed ids in a single request.
    ///
    /// On success the map holds a verdict for **every** requested id:
    /// `Some(value)` for a match, `None` for a confirmed "not found". Any
    /// failure yields no verdicts at all; the batch is atomic from the
    /// caller's perspective. An empty `ids` slice is a no-op.
    async fn read_batch(
        &self,
        sender_id: &str,
        ids: &[String],
    ) -> Result<HashMap<String, Option<String>>, ApiError>;

    /// Publish the local user's value, optionally presenting a previously
    /// issued authorization token. Returns the parsed application response;
    /// interpretation (messages, rollback) is the reconciler's job.
    async fn publish(
        &self,
        sender_id: &str,
        pronoun: &str,
        api_key: Option<&str>,
    ) -> Result<PublishResponse, ApiError>;

    /// Fetch the full static snapshot feed (gzip JSON array of records).
    async fn fetch_snapshot(&self) -> Result<Vec<LookupRecord>, ApiError>;
}

pub use http::HttpApi;
