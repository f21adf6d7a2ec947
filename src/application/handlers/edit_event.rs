//! EditEventHandler - Command handler for rescheduling events.
//!
//! Publishes `event.edited` after the write; activation deliberately
//! catches up at the next reconciliation tick rather than immediately.

use std::sync::Arc;

use crate::domain::event::{EventEdited, EventRecord};
use crate::domain::foundation::{DomainError, DomainEvent, ErrorCode, EventId, Timestamp};
use crate::ports::{EventPublisher, EventStore};

/// Command to change an event's schedule.
#[derive(Debug, Clone)]
pub struct EditEventCommand {
    pub event_id: EventId,
    pub time_start: Timestamp,
    pub time_end: Timestamp,
}

/// Handler for rescheduling events.
pub struct EditEventHandler {
    store: Arc<dyn EventStore>,
    publisher: Arc<dyn EventPublisher>,
}

impl EditEventHandler {
    pub fn new(store: Arc<dyn EventStore>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { store, publisher }
    }

    pub async fn handle(&self, cmd: EditEventCommand) -> Result<EventRecord, DomainError> {
        let mut record = self
            .store
            .find_by_id(&cmd.event_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(ErrorCode::EventNotFound, format!("no event {}", cmd.event_id))
            })?;

        record.reschedule(cmd.time_start, cmd.time_end)?;
        let record = self.store.update_event(record).await?;

        let event = EventEdited {
            event_id: *record.id(),
            time_start: *record.time_start(),
            time_end: *record.time_end(),
        };
        self.publisher.publish(event.to_envelope()).await?;

        Ok(record)
    }
}
