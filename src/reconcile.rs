// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Publish / rollback state machine for the local user's own value.
//!
//! A qualifying configuration change (or a login transition) publishes the
//! new pronoun to the service. When the service rejects the write (rate
//! limit, bad authorization, anything non-200), the host configuration is
//! reverted to its previous value. The revert is an engine-originated write:
//! its change notification must not re-trigger a publish, otherwise the
//! engine and the config layer feed back into each other forever.
//!
//! ```text
//!            qualifying user change / login
//!   Idle ───────────────────────────────────▶ Pending
//!     ▲                                          │
//!     │ success, or transport failure            │ service rejected
//!     ├──────────────────────────────────────────┤
//!     │                                          ▼
//!     └───────────────────────────────────  RolledBack
//!        revert notification observed
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::host::{HostApi, WriteOrigin, API_KEY_PREFIX, PRONOUN_KEY};
use crate::metrics;
use crate::remote::types::PublishDisposition;
use crate::remote::{ApiError, RemoteApi};

/// Reconciler lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilerState {
    /// Nothing in flight
    Idle,
    /// Publish in flight
    Pending,
    /// Reverted the configuration; absorbing the echo of that write
    RolledBack,
}

impl std::fmt::Display for ReconcilerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Pending => write!(f, "Pending"),
            Self::RolledBack => write!(f, "RolledBack"),
        }
    }
}

/// Submits the local user's value and reverts the host configuration when
/// the service says no.
pub struct WriteReconciler {
    state: Mutex<ReconcilerState>,
    api: Arc<dyn RemoteApi>,
    host: Arc<dyn HostApi>,
}

impl WriteReconciler {
    pub fn new(api: Arc<dyn RemoteApi>, host: Arc<dyn HostApi>) -> Self {
        Self {
            state: Mutex::new(ReconcilerState::Idle),
            api,
            host,
        }
    }

    #[must_use]
    pub fn state(&self) -> ReconcilerState {
        *self.state.lock()
    }

    /// Handle a configuration change notification.
    ///
    /// Engine-originated writes never qualify; they only retire a pending
    /// rollback. A rolled-back state also absorbs the next pronoun-key
    /// notification from hosts that cannot tag origins.
    pub async fn on_config_changed(
        &self,
        sender_id: &str,
        key: &str,
        old_value: Option<&str>,
        new_value: Option<&str>,
        origin: WriteOrigin,
        max_len: usize,
    ) {
        if origin == WriteOrigin::Engine {
            let mut state = self.state.lock();
            if *state == ReconcilerState::RolledBack {
                debug!("rollback write observed, reconciler idle again");
                *state = ReconcilerState::Idle;
            }
            return;
        }

        if key != PRONOUN_KEY {
            return;
        }

        {
            let mut state = self.state.lock();
            if *state == ReconcilerState::RolledBack {
                debug!("untagged rollback echo absorbed");
                *state = ReconcilerState::Idle;
                return;
            }
        }

        let Some(value) = new_value.filter(|v| !v.is_empty()) else {
            return;
        };

        self.submit(sender_id, old_value, value, false, max_len).await;
    }

    /// Publish the already-configured value after a login transition.
    ///
    /// Confirmation chatter is suppressed so every login does not spam the
    /// user; rollback behavior is unchanged.
    pub async fn on_login(&self, sender_id: &str, pronoun: &str, max_len: usize) {
        if pronoun.is_empty() {
            return;
        }
        // Reverting to the current value is a harmless no-op write
        self.submit(sender_id, Some(pronoun), pronoun, true, max_len)
            .await;
    }

    async fn submit(
        &self,
        sender_id: &str,
        old_value: Option<&str>,
        value: &str,
        login_triggered: bool,
        max_len: usize,
    ) {
        if value.chars().count() > max_len {
            if !login_triggered {
                self.host.notify_user(&format!(
                    "That pronoun is too long (max {max_len} characters)."
                ));
            }
            self.roll_back(old_value);
            metrics::record_publish("too_long");
            return;
        }

        if !self.host.is_logged_in() || sender_id.is_empty() {
            debug!("publish skipped, no authenticated identity");
            return;
        }

        *self.state.lock() = ReconcilerState::Pending;

        let key_name = format!("{API_KEY_PREFIX}{sender_id}");
        let api_key = self.host.config_value(&key_name).filter(|k| !k.is_empty());

        match self
            .api
            .publish(sender_id, value, api_key.as_deref())
            .await
        {
            Ok(response) => {
                if let Some(ref issued) = response.apikey {
                    self.host.set_config_value(&key_name, issued);
                    self.host.notify_user(
                        "An API key has been received and stored in your client config. Do not share it!",
                    );
                    self.host.notify_user(
                        "If you lose this key you will not be able to update your pronoun until it is removed from the database!",
                    );
                }

                let disposition = response.disposition();
                metrics::record_publish(&disposition.to_string());
                match disposition {
                    PublishDisposition::Accepted => {
                        info!("pronoun published");
                        if !login_triggered {
                            self.host.notify_user(response.message());
                        }
                        *self.state.lock() = ReconcilerState::Idle;
                    }
                    PublishDisposition::RateLimited => {
                        warn!("publish rate limited");
                        if !login_triggered {
                            self.host.notify_user(
                                "The pronoun service is busy - please wait before updating again.",
                            );
                        }
                        self.roll_back(old_value);
                    }
                    PublishDisposition::Rejected => {
                        warn!(status = response.status_code(), "publish rejected");
                        if !login_triggered {
                            self.host.notify_user(&format!(
                                "Error {} - {}",
                                response.status_code(),
                                response.message()
                            ));
                        }
                        self.roll_back(old_value);
                    }
                }
            }
            Err(e @ ApiError::Transport(_)) => {
                // Could not ask: no rollback, retried whenever the user (or
                // the next login) tries again
                error!(error = %e, "error putting data to server");
                metrics::record_publish("transport_error");
                *self.state.lock() = ReconcilerState::Idle;
            }
            Err(e) => {
                error!(error = %e, "unusable publish response");
                metrics::record_publish("malformed");
                *self.state.lock() = ReconcilerState::Idle;
            }
        }
    }

    /// Revert the configuration to its previous value.
    ///
    /// The write is engine-originated; `RolledBack` stands until the
    /// resulting change notification comes back around.
    fn roll_back(&self, old_value: Option<&str>) {
        *self.state.lock() = ReconcilerState::RolledBack;
        self.host
            .set_config_value(PRONOUN_KEY, old_value.unwrap_or(""));
    }
}
