//! Active event registry.
//!
//! The single source of truth for "is this event live right now". Each
//! tracked event owns one rotation timer; the registry owns every
//! timer's cancellation. Both writers (`activate`, `deactivate`) are
//! idempotent, so the reconciliation loop and the immediate-activation
//! bridge may race freely without double-starting timers.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::ActivationConfig;
use crate::domain::event::EventRecord;
use crate::domain::foundation::EventId;
use crate::ports::RoomBroadcaster;

use super::code::AccessCode;

/// Ephemeral state for one live event.
///
/// Invariant: at most one exists per event id at any instant; the entry
/// map's write lock is the arbiter.
struct ActiveEvent {
    name: String,
    code: AccessCode,
    timer: JoinHandle<()>,
}

struct RegistryInner {
    entries: RwLock<HashMap<EventId, ActiveEvent>>,
    broadcaster: Arc<dyn RoomBroadcaster>,
    config: ActivationConfig,
}

/// Authoritative mapping from event id to live state.
///
/// Cheap to clone; clones share the same entry map. Constructed once at
/// startup (or per test) and handed to the gateway, the reconciliation
/// loop, and the activation bridge - there is no global instance.
#[derive(Clone)]
pub struct ActiveEventRegistry {
    inner: Arc<RegistryInner>,
}

impl ActiveEventRegistry {
    /// Creates an empty registry.
    pub fn new(config: ActivationConfig, broadcaster: Arc<dyn RoomBroadcaster>) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                entries: RwLock::new(HashMap::new()),
                broadcaster,
                config,
            }),
        }
    }

    /// True when the event is currently tracked as live.
    pub async fn is_active(&self, id: &EventId) -> bool {
        self.inner.entries.read().await.contains_key(id)
    }

    /// The event's current access code, `None` when not live.
    pub async fn current_code(&self, id: &EventId) -> Option<AccessCode> {
        self.inner
            .entries
            .read()
            .await
            .get(id)
            .map(|entry| entry.code.clone())
    }

    /// The event's display name, `None` when not live.
    pub async fn display_name(&self, id: &EventId) -> Option<String> {
        self.inner
            .entries
            .read()
            .await
            .get(id)
            .map(|entry| entry.name.clone())
    }

    /// Ids of all currently tracked events.
    pub async fn active_ids(&self) -> Vec<EventId> {
        self.inner.entries.read().await.keys().copied().collect()
    }

    /// Starts tracking an event. Idempotent: a tracked id is a no-op and
    /// returns `false`.
    ///
    /// The initial code is generated before this returns, so a
    /// just-activated event never shows a blank code while waiting for
    /// the first rotation tick.
    pub async fn activate(&self, record: &EventRecord) -> bool {
        let id = *record.id();
        let code = {
            let mut entries = self.inner.entries.write().await;
            if entries.contains_key(&id) {
                return false;
            }

            let code = AccessCode::generate(self.inner.config.code_digits);
            let timer = self.spawn_rotation(id);
            entries.insert(
                id,
                ActiveEvent {
                    name: record.name().to_string(),
                    code: code.clone(),
                    timer,
                },
            );
            code
        };

        self.inner.broadcaster.code_update(&id, code.as_str()).await;
        tracing::info!(event_id = %id, name = %record.name(), "event activated");
        true
    }

    /// Stops tracking an event: aborts its rotation timer exactly once,
    /// signals "event ended" to both rooms and evicts their members.
    /// Idempotent: an untracked id is a no-op and returns `false`.
    pub async fn deactivate(&self, id: &EventId) -> bool {
        let removed = self.inner.entries.write().await.remove(id);

        match removed {
            Some(entry) => {
                entry.timer.abort();
                self.inner.broadcaster.event_ended(id).await;
                tracing::info!(event_id = %id, "event deactivated");
                true
            }
            None => false,
        }
    }

    /// Deactivates every tracked event. Called on process shutdown and
    /// at the end of tests.
    pub async fn shutdown(&self) {
        for id in self.active_ids().await {
            self.deactivate(&id).await;
        }
    }

    /// Spawns the per-event rotation loop.
    ///
    /// The task holds only a weak reference to the registry: cancellation
    /// belongs to `deactivate`, and a dropped registry must not be kept
    /// alive by its own timers.
    fn spawn_rotation(&self, id: EventId) -> JoinHandle<()> {
        let weak: Weak<RegistryInner> = Arc::downgrade(&self.inner);
        let period = self.inner.config.rotation_period();
        let digits = self.inner.config.code_digits;

        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; the initial code was
            // already generated by `activate`.
            ticks.tick().await;

            loop {
                ticks.tick().await;

                let Some(inner) = weak.upgrade() else {
                    break;
                };

                let code = AccessCode::generate(digits);
                {
                    let mut entries = inner.entries.write().await;
                    match entries.get_mut(&id) {
                        Some(entry) => entry.code = code.clone(),
                        // Deactivated while this tick was in flight.
                        None => break,
                    }
                }

                // Rotation is unconditional; a broadcast with no
                // subscribers is not a failure.
                inner.broadcaster.code_update(&id, code.as_str()).await;
                tracing::debug!(event_id = %id, "access code rotated");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Timestamp, UserId};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every outbound signal for assertions.
    #[derive(Default)]
    struct RecordingBroadcaster {
        code_updates: Mutex<Vec<(EventId, String)>>,
        ended: Mutex<Vec<EventId>>,
    }

    #[async_trait]
    impl RoomBroadcaster for RecordingBroadcaster {
        async fn code_update(&self, event: &EventId, code: &str) {
            self.code_updates
                .lock()
                .unwrap()
                .push((*event, code.to_string()));
        }

        async fn event_ended(&self, event: &EventId) {
            self.ended.lock().unwrap().push(*event);
        }
    }

    fn record() -> EventRecord {
        let now = Timestamp::now();
        EventRecord::new(
            "Intro to Systems",
            None,
            now,
            now.plus_mins(60),
            UserId::new("creator").unwrap(),
            true,
        )
        .unwrap()
    }

    fn registry() -> (ActiveEventRegistry, Arc<RecordingBroadcaster>) {
        let broadcaster = Arc::new(RecordingBroadcaster::default());
        let registry = ActiveEventRegistry::new(ActivationConfig::default(), broadcaster.clone());
        (registry, broadcaster)
    }

    #[tokio::test]
    async fn activate_tracks_event_and_generates_code_synchronously() {
        let (registry, _) = registry();
        let event = record();

        assert!(registry.activate(&event).await);
        assert!(registry.is_active(event.id()).await);

        let code = registry.current_code(event.id()).await.unwrap();
        assert_eq!(code.as_str().len(), 4);

        registry.shutdown().await;
    }

    #[tokio::test]
    async fn activate_is_idempotent() {
        let (registry, broadcaster) = registry();
        let event = record();

        assert!(registry.activate(&event).await);
        let first_code = registry.current_code(event.id()).await.unwrap();

        assert!(!registry.activate(&event).await);
        let second_code = registry.current_code(event.id()).await.unwrap();

        // The no-op second call neither regenerated the code nor
        // re-broadcast it.
        assert_eq!(first_code, second_code);
        assert_eq!(broadcaster.code_updates.lock().unwrap().len(), 1);

        registry.shutdown().await;
    }

    #[tokio::test]
    async fn concurrent_activations_yield_one_state() {
        let (registry, _) = registry();
        let event = record();

        let r1 = registry.clone();
        let r2 = registry.clone();
        let e1 = event.clone();
        let e2 = event.clone();
        let (a, b) = tokio::join!(
            tokio::spawn(async move { r1.activate(&e1).await }),
            tokio::spawn(async move { r2.activate(&e2).await }),
        );

        // Exactly one of the racing calls won.
        assert!(a.unwrap() ^ b.unwrap());
        assert_eq!(registry.active_ids().await.len(), 1);

        registry.shutdown().await;
    }

    #[tokio::test]
    async fn deactivate_notifies_and_is_idempotent() {
        let (registry, broadcaster) = registry();
        let event = record();
        registry.activate(&event).await;

        assert!(registry.deactivate(event.id()).await);
        assert!(!registry.is_active(event.id()).await);
        assert_eq!(broadcaster.ended.lock().unwrap().as_slice(), &[*event.id()]);

        // Second call is a no-op, not an error, and does not re-signal.
        assert!(!registry.deactivate(event.id()).await);
        assert_eq!(broadcaster.ended.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deactivate_unknown_id_is_noop() {
        let (registry, broadcaster) = registry();
        assert!(!registry.deactivate(&EventId::new()).await);
        assert!(broadcaster.ended.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn rotation_replaces_code_and_broadcasts() {
        let (registry, broadcaster) = registry();
        let event = record();
        registry.activate(&event).await;

        let initial = registry.current_code(event.id()).await.unwrap();

        // Let the rotation task arm its first interval deadline.
        tokio::task::yield_now().await;

        // Cross two rotation boundaries.
        tokio::time::advance(std::time::Duration::from_secs(61)).await;
        tokio::task::yield_now().await;

        let rotated = registry.current_code(event.id()).await.unwrap();
        let updates = broadcaster.code_updates.lock().unwrap().len();

        // Initial broadcast plus at least one rotation.
        assert!(updates >= 2, "expected rotation broadcasts, saw {updates}");
        // A 4-digit space makes an accidental repeat across two
        // rotations unlikely but possible; assert on broadcast count
        // rather than inequality of codes.
        let _ = (initial, rotated);

        registry.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn deactivate_stops_rotation() {
        let (registry, broadcaster) = registry();
        let event = record();
        registry.activate(&event).await;
        registry.deactivate(event.id()).await;

        let before = broadcaster.code_updates.lock().unwrap().len();
        tokio::time::advance(std::time::Duration::from_secs(120)).await;
        tokio::task::yield_now().await;
        let after = broadcaster.code_updates.lock().unwrap().len();

        assert_eq!(before, after, "aborted timer must not keep rotating");
    }
}
