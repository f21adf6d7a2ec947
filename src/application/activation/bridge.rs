//! Activation bridge - immediate activation off the event bus.
//!
//! The event-creation path does not call the registry directly. It
//! publishes `event.created`, and this handler activates the new event
//! when its schedule already intersects the active window - so a creator
//! who starts an event "now" gets a code immediately instead of waiting
//! for the next reconciliation tick. Both paths share the registry's
//! idempotent `activate`, so racing with a tick is harmless.
//!
//! `event.edited` is observed but deliberately deferred: a changed
//! schedule takes effect at the next tick, keeping the lag bounded by
//! the reconcile interval.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ActivationConfig;
use crate::domain::event::{EventCreated, EventRecord, EVENT_CREATED, EVENT_EDITED};
use crate::domain::foundation::{DomainError, EventEnvelope, Timestamp};
use crate::ports::{EventHandler, EventStore, EventSubscriber};

use super::registry::ActiveEventRegistry;

/// Event types this bridge listens for.
pub const ACTIVATION_EVENT_TYPES: &[&str] = &[EVENT_CREATED, EVENT_EDITED];

/// Bridge between the internal event bus and the registry.
pub struct ActivationBridge {
    registry: ActiveEventRegistry,
    store: Arc<dyn EventStore>,
    config: ActivationConfig,
}

impl ActivationBridge {
    pub fn new(
        registry: ActiveEventRegistry,
        store: Arc<dyn EventStore>,
        config: ActivationConfig,
    ) -> Self {
        Self {
            registry,
            store,
            config,
        }
    }

    /// Create as an Arc and register with an event subscriber.
    pub fn register(
        registry: ActiveEventRegistry,
        store: Arc<dyn EventStore>,
        config: ActivationConfig,
        subscriber: &impl EventSubscriber,
    ) -> Arc<Self> {
        let bridge = Arc::new(Self::new(registry, store, config));
        subscriber.subscribe_all(ACTIVATION_EVENT_TYPES, bridge.clone());
        bridge
    }

    /// Activate the record now if its schedule intersects the current
    /// active window. Returns whether activation happened.
    pub async fn check_and_activate(&self, record: &EventRecord) -> bool {
        let now = Timestamp::now();
        let window_start = now.minus_mins(self.config.window_buffer_mins);
        let window_end = now.plus_mins(self.config.window_buffer_mins);

        if !record.overlaps(&window_start, &window_end) {
            return false;
        }

        self.registry.activate(record).await
    }
}

#[async_trait]
impl EventHandler for ActivationBridge {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        match event.event_type.as_str() {
            EVENT_CREATED => {
                let created: EventCreated = event.payload_as()?;

                // Re-read the record so activation works from the
                // authoritative store state, not the payload snapshot.
                match self.store.find_by_id(&created.event_id).await? {
                    Some(record) => {
                        if self.check_and_activate(&record).await {
                            tracing::info!(
                                event_id = %created.event_id,
                                "event activated immediately on creation"
                            );
                        }
                    }
                    None => {
                        tracing::warn!(
                            event_id = %created.event_id,
                            "created event vanished before activation check"
                        );
                    }
                }
            }
            EVENT_EDITED => {
                // Schedule edits converge at the next reconciliation tick.
                tracing::debug!(
                    aggregate_id = %event.aggregate_id,
                    "schedule edit observed; deferring to next reconcile tick"
                );
            }
            _ => {}
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "ActivationBridge"
    }
}
