// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! HTTP implementation of [`RemoteApi`].
//!
//! Bulk lookups POST to the service endpoint, publishes PUT to the same
//! endpoint, and the snapshot feed is a GET against a fixed object-storage
//! URL returning a gzip JSON array. The service speaks application status
//! inside a 200 HTTP envelope; transport-level failures map to
//! [`ApiError::Transport`] and nothing else.

use std::collections::HashMap;
use std::io::Read;
use std::time::Duration;

use async_trait::async_trait;
use flate2::read::GzDecoder;
use tracing::debug;

use super::types::{LookupRecord, LookupRequest, LookupResponse, PublishRequest, PublishResponse};
use super::{ApiError, RemoteApi};
use crate::config::EngineConfig;

pub struct HttpApi {
    client: reqwest::Client,
    api_url: String,
    snapshot_url: Option<String>,
}

impl HttpApi {
    pub fn new(config: &EngineConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            snapshot_url: config.snapshot_url.clone(),
        })
    }
}

#[async_trait]
impl RemoteApi for HttpApi {
    async fn read_batch(
        &self,
        sender_id: &str,
        ids: &[String],
    ) -> Result<HashMap<String, Option<String>>, ApiError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let request = LookupRequest {
            sender_username: sender_id,
            usernames: ids,
        };
        debug!(batch = ids.len(), "bulk lookup");

        let response = self
            .client
            .post(&self.api_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        parse_lookup(&text, ids)
    }

    async fn publish(
        &self,
        sender_id: &str,
        pronoun: &str,
        api_key: Option<&str>,
    ) -> Result<PublishResponse, ApiError> {
        let request = PublishRequest {
            username: sender_id,
            pronoun,
            apikey: api_key,
        };
        debug!(has_key = api_key.is_some(), "publishing pronoun");

        let response = self
            .client
            .put(&self.api_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        response
            .json::<PublishResponse>()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))
    }

    async fn fetch_snapshot(&self) -> Result<Vec<LookupRecord>, ApiError> {
        let Some(ref url) = self.snapshot_url else {
            return Ok(Vec::new());
        };

        let bytes = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        decode_feed(&bytes)
    }
}

/// Parse a bulk lookup reply into one verdict per requested id.
///
/// An `errorMessage` key anywhere in the reply fails the whole batch. On
/// success every requested id gets a verdict: the matched pronoun, or `None`
/// for ids the service does not know.
fn parse_lookup(
    text: &str,
    ids: &[String],
) -> Result<HashMap<String, Option<String>>, ApiError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| ApiError::Malformed(e.to_string()))?;

    if let Some(message) = value.get("errorMessage") {
        return Err(ApiError::Service(message.to_string()));
    }

    let response: LookupResponse =
        serde_json::from_value(value).map_err(|e| ApiError::Malformed(e.to_string()))?;

    let mut verdicts = HashMap::with_capacity(ids.len());
    for id in ids {
        let pronoun = response
            .find(id)
            .and_then(|record| record.pronoun.clone())
            .filter(|p| !p.is_empty());
        verdicts.insert(id.clone(), pronoun);
    }
    Ok(verdicts)
}

/// Gunzip and parse the snapshot feed.
fn decode_feed(bytes: &[u8]) -> Result<Vec<LookupRecord>, ApiError> {
    let mut decoder = GzDecoder::new(bytes);
    let mut json = String::new();
    decoder
        .read_to_string(&mut json)
        .map_err(|e| ApiError::Malformed(e.to_string()))?;
    serde_json::from_str(&json).map_err(|e| ApiError::Malformed(e.to_string()))
}
