//! CreateEventHandler - Command handler for creating events.

use std::sync::Arc;

use crate::domain::event::{EventCreated, EventRecord};
use crate::domain::foundation::{DomainError, DomainEvent, Timestamp, UserId};
use crate::ports::{EventPublisher, EventStore};

/// Command to create a new scheduled event.
#[derive(Debug, Clone)]
pub struct CreateEventCommand {
    pub name: String,
    pub description: Option<String>,
    pub time_start: Timestamp,
    pub time_end: Timestamp,
    pub requires_code: bool,
    pub created_by: UserId,
}

/// Handler for creating events.
///
/// Persists the record and publishes `event.created`; the activation
/// bridge picks that up for the immediate-activation path.
pub struct CreateEventHandler {
    store: Arc<dyn EventStore>,
    publisher: Arc<dyn EventPublisher>,
}

impl CreateEventHandler {
    pub fn new(store: Arc<dyn EventStore>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { store, publisher }
    }

    pub async fn handle(&self, cmd: CreateEventCommand) -> Result<EventRecord, DomainError> {
        // 1. Build and validate the aggregate
        let record = EventRecord::new(
            cmd.name,
            cmd.description,
            cmd.time_start,
            cmd.time_end,
            cmd.created_by.clone(),
            cmd.requires_code,
        )?;

        // 2. Persist
        let record = self.store.create_event(record).await?;

        // 3. Publish for the activation bridge
        let event = EventCreated {
            event_id: *record.id(),
            name: record.name().to_string(),
            time_start: *record.time_start(),
            time_end: *record.time_end(),
            created_by: record.created_by().clone(),
            requires_code: record.requires_code(),
        };
        self.publisher
            .publish(event.to_envelope().with_user_id(cmd.created_by.to_string()))
            .await?;

        Ok(record)
    }
}
