//! EventStore port - the persistent store's fixed interface.
//!
//! The store itself (validation, indexing, durability) is an external
//! collaborator; this crate only consumes the operations below. Attendance
//! writes are append-if-absent so the gateway can retry them blindly.

use async_trait::async_trait;

use crate::domain::event::{CheckInEntry, EventRecord};
use crate::domain::foundation::{DomainError, EventId, Timestamp, UserId};

/// Port over the persistent event store.
///
/// # Contract
///
/// - `events_in_window` returns every record whose `[time_start, time_end]`
///   interval intersects `[start, end]`.
/// - `register_user` and `check_in_user` are idempotent: repeating a call
///   for the same `(event, user)` pair changes nothing and does not error.
/// - `check_in_user` registers attendance implicitly when absent and
///   returns the persisted entry - the original one on repeats.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Fetch all events whose schedule intersects the given window.
    async fn events_in_window(
        &self,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<EventRecord>, DomainError>;

    /// Persist a newly created event record.
    async fn create_event(&self, record: EventRecord) -> Result<EventRecord, DomainError>;

    /// Replace an existing record (the reschedule path). Errors with
    /// `EventNotFound` when the id was never created.
    async fn update_event(&self, record: EventRecord) -> Result<EventRecord, DomainError>;

    /// Fetch one event by id, `None` when missing.
    async fn find_by_id(&self, id: &EventId) -> Result<Option<EventRecord>, DomainError>;

    /// Append the user to the event's attending set if absent.
    async fn register_user(&self, id: &EventId, user: &UserId) -> Result<(), DomainError>;

    /// Append a check-in entry for the user if absent, registering
    /// attendance implicitly. Returns the persisted entry.
    async fn check_in_user(
        &self,
        id: &EventId,
        user: &UserId,
    ) -> Result<CheckInEntry, DomainError>;
}
