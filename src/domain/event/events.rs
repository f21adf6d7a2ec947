//! Domain events emitted by the event lifecycle.
//!
//! The activation bridge subscribes to these: `event.created` drives the
//! immediate-activation path, `event.edited` is observed but deferred to
//! the next reconciliation tick.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainEvent, EventId, Timestamp, UserId};

pub const EVENT_CREATED: &str = "event.created";
pub const EVENT_EDITED: &str = "event.edited";

/// Published after a new event record is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventCreated {
    pub event_id: EventId,
    pub name: String,
    pub time_start: Timestamp,
    pub time_end: Timestamp,
    pub created_by: UserId,
    pub requires_code: bool,
}

impl DomainEvent for EventCreated {
    fn event_type(&self) -> &'static str {
        EVENT_CREATED
    }

    fn aggregate_id(&self) -> String {
        self.event_id.to_string()
    }

    fn aggregate_type(&self) -> &'static str {
        "Event"
    }
}

/// Published after an event's schedule changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEdited {
    pub event_id: EventId,
    pub time_start: Timestamp,
    pub time_end: Timestamp,
}

impl DomainEvent for EventEdited {
    fn event_type(&self) -> &'static str {
        EVENT_EDITED
    }

    fn aggregate_id(&self) -> String {
        self.event_id.to_string()
    }

    fn aggregate_type(&self) -> &'static str {
        "Event"
    }
}
