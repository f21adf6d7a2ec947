//! In-memory event store.
//!
//! Implements the `EventStore` and `JoinTokenStore` ports over plain maps.
//! A fault toggle lets tests exercise the reconciler's failed-fetch policy.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::event::{CheckInEntry, EventRecord};
use crate::domain::foundation::{DomainError, ErrorCode, EventId, Timestamp, UserId};
use crate::ports::{EventStore, JoinToken, JoinTokenStore};

/// In-memory implementation of the `EventStore` port.
pub struct InMemoryEventStore {
    events: RwLock<HashMap<EventId, EventRecord>>,
    fail_fetch: AtomicBool,
}

impl InMemoryEventStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            events: RwLock::new(HashMap::new()),
            fail_fetch: AtomicBool::new(false),
        }
    }

    /// When set, `events_in_window` fails until cleared. Lets tests drive
    /// the reconciler's abort-on-fetch-failure policy.
    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    /// Direct read of a stored record, for test assertions.
    pub async fn snapshot(&self, id: &EventId) -> Option<EventRecord> {
        self.events.read().await.get(id).cloned()
    }
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn events_in_window(
        &self,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<EventRecord>, DomainError> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(DomainError::store("simulated window-query failure"));
        }

        let events = self.events.read().await;
        Ok(events
            .values()
            .filter(|e| e.overlaps(&start, &end))
            .cloned()
            .collect())
    }

    async fn create_event(&self, record: EventRecord) -> Result<EventRecord, DomainError> {
        let mut events = self.events.write().await;
        events.insert(*record.id(), record.clone());
        Ok(record)
    }

    async fn update_event(&self, record: EventRecord) -> Result<EventRecord, DomainError> {
        let mut events = self.events.write().await;
        if !events.contains_key(record.id()) {
            return Err(DomainError::new(
                ErrorCode::EventNotFound,
                format!("no event {}", record.id()),
            ));
        }
        events.insert(*record.id(), record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<EventRecord>, DomainError> {
        Ok(self.events.read().await.get(id).cloned())
    }

    async fn register_user(&self, id: &EventId, user: &UserId) -> Result<(), DomainError> {
        let mut events = self.events.write().await;
        let record = events
            .get_mut(id)
            .ok_or_else(|| DomainError::new(ErrorCode::EventNotFound, format!("no event {id}")))?;
        record.register(user.clone());
        Ok(())
    }

    async fn check_in_user(
        &self,
        id: &EventId,
        user: &UserId,
    ) -> Result<CheckInEntry, DomainError> {
        let mut events = self.events.write().await;
        let record = events
            .get_mut(id)
            .ok_or_else(|| DomainError::new(ErrorCode::EventNotFound, format!("no event {id}")))?;
        Ok(record.check_in(user.clone(), Timestamp::now()))
    }
}

/// In-memory implementation of the `JoinTokenStore` port.
#[derive(Default)]
pub struct InMemoryJoinTokenStore {
    tokens: RwLock<Vec<JoinToken>>,
}

impl InMemoryJoinTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JoinTokenStore for InMemoryJoinTokenStore {
    async fn find(&self, token: &str) -> Result<Option<JoinToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.iter().find(|t| t.token == token).cloned())
    }

    async fn exists(&self, email: &str, event: &EventId) -> Result<bool, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.iter().any(|t| t.email == email && &t.event == event))
    }

    async fn mint(&self, email: &str, event: &EventId) -> Result<JoinToken, DomainError> {
        let token = JoinToken {
            token: Uuid::new_v4().to_string(),
            email: email.to_string(),
            event: *event,
        };
        self.tokens.write().await.push(token.clone());
        Ok(token)
    }
}
