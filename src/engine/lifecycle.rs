//! Engine lifecycle: start, run loop, shutdown.

use std::time::Duration;

use tracing::{debug, info};

use super::{EngineState, PronounEngine};

impl PronounEngine {
    /// Start the engine: run the initial refresh (loads the snapshot and
    /// resolves whoever is already visible), then mark the engine ready.
    #[tracing::instrument(skip(self))]
    pub async fn start(&self) {
        info!("pronoun cache starting");
        self.refresh_cycle().await;
        let _ = self.state.send(EngineState::Ready);
        info!("pronoun cache ready");
    }

    /// Drive the periodic refresh until shutdown.
    ///
    /// Reacts to runtime config updates (a changed `refresh_secs` re-arms
    /// the interval) and exits when [`shutdown()`](Self::shutdown) flips the
    /// engine state.
    #[tracing::instrument(skip(self))]
    pub async fn run(&self) {
        let _ = self.state.send(EngineState::Running);
        info!("pronoun cache running");

        let mut config_rx = self.config_rx.lock().await;
        let mut state_rx = self.state_rx.clone();
        let mut period = self.config.read().refresh_secs;
        let mut ticker = tokio::time::interval(Duration::from_secs(period.max(1)));
        // The first interval tick fires immediately; start() already
        // refreshed, so swallow it.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.refresh_cycle().await;
                }

                Ok(()) = config_rx.changed() => {
                    let new_config = config_rx.borrow().clone();
                    debug!(refresh_secs = new_config.refresh_secs, "config updated");
                    let new_period = new_config.refresh_secs;
                    *self.config.write() = new_config;
                    if new_period != period {
                        period = new_period;
                        ticker = tokio::time::interval(Duration::from_secs(period.max(1)));
                        ticker.tick().await;
                    }
                }

                Ok(()) = state_rx.changed() => {
                    if *state_rx.borrow() == EngineState::ShuttingDown {
                        break;
                    }
                }
            }
        }

        info!("pronoun cache run loop stopped");
    }

    /// Graceful teardown: flush the snapshot, then drop all session state.
    ///
    /// Only the cache file survives a teardown; the in-memory map and the
    /// cached local identity do not.
    #[tracing::instrument(skip(self))]
    pub async fn shutdown(&self) {
        info!("pronoun cache stopping");
        let _ = self.state.send(EngineState::ShuttingDown);

        let cache_path = self.config.read().cache_path.clone();
        if let Err(e) = self.store.persist(&cache_path) {
            tracing::warn!(error = %e, "could not flush snapshot on shutdown");
        }

        self.store.clear();
        self.handle_logout();
        info!("pronoun cache stopped");
    }
}
