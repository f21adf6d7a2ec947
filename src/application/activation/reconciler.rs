//! Reconciliation loop.
//!
//! Periodically re-derives the correct set of live events from the store
//! and converges the registry to match. The loop is the recovery path
//! after restarts (timers are not persisted) and the only path that
//! notices schedule edits.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use crate::config::ActivationConfig;
use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::EventStore;

use super::registry::ActiveEventRegistry;

/// What one reconciliation tick changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub activated: usize,
    pub deactivated: usize,
}

/// Background service converging the registry to the store.
pub struct ReconciliationLoop {
    store: Arc<dyn EventStore>,
    registry: ActiveEventRegistry,
    config: ActivationConfig,
}

impl ReconciliationLoop {
    pub fn new(
        store: Arc<dyn EventStore>,
        registry: ActiveEventRegistry,
        config: ActivationConfig,
    ) -> Self {
        Self {
            store,
            registry,
            config,
        }
    }

    /// Run the loop until the shutdown signal flips.
    ///
    /// The first tick fires immediately, rebuilding active state from the
    /// store after a restart. A failed tick is logged and retried at the
    /// next interval; it never stops the loop.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.config.reconcile_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::info!("reconciliation loop stopping");
                        return;
                    }
                }

                _ = interval.tick() => {
                    match self.tick().await {
                        Ok(outcome) if outcome != ReconcileOutcome::default() => {
                            tracing::info!(
                                activated = outcome.activated,
                                deactivated = outcome.deactivated,
                                "reconciliation tick converged registry"
                            );
                        }
                        Ok(_) => {}
                        Err(e) => {
                            tracing::warn!(error = %e, "reconciliation tick failed; retrying next interval");
                        }
                    }
                }
            }
        }
    }

    /// One reconciliation pass.
    ///
    /// Fetch failure aborts the tick before any registry mutation: a
    /// flaky store must never evict live events or half-activate a batch.
    pub async fn tick(&self) -> Result<ReconcileOutcome, DomainError> {
        let now = Timestamp::now();
        let window_start = now.minus_mins(self.config.window_buffer_mins);
        let window_end = now.plus_mins(self.config.window_buffer_mins);

        let fetched = self.store.events_in_window(window_start, window_end).await?;

        let mut outcome = ReconcileOutcome::default();

        let fetched_ids: std::collections::HashSet<_> =
            fetched.iter().map(|record| *record.id()).collect();

        for record in &fetched {
            if self.registry.activate(record).await {
                outcome.activated += 1;
            }
        }

        for id in self.registry.active_ids().await {
            if !fetched_ids.contains(&id) && self.registry.deactivate(&id).await {
                outcome.deactivated += 1;
            }
        }

        Ok(outcome)
    }

    /// The reconcile interval, exposed for wiring and logs.
    pub fn interval(&self) -> Duration {
        self.config.reconcile_interval()
    }
}
