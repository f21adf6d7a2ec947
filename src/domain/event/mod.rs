//! Scheduled event aggregate.
//!
//! An [`EventRecord`] is the persisted shape of one scheduled event:
//! its time window, its creator, whether check-in requires the rotating
//! code, and the attendance sets. Attendance mutations are append-if-absent
//! so retries and replays are harmless.

mod errors;
mod events;

pub use errors::EventError;
pub use events::{EventCreated, EventEdited, EVENT_CREATED, EVENT_EDITED};

use serde::{Deserialize, Serialize};

use super::foundation::{EventId, Timestamp, UserId, ValidationError};

/// Bounds for event names, shared with the creation route validation.
const NAME_MIN: usize = 5;
const NAME_MAX: usize = 100;

/// One user's check-in, unique per user within an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInEntry {
    pub user: UserId,
    pub at: Timestamp,
}

/// Persisted record of a scheduled event.
///
/// Invariant: every user in `checked_in` also appears in `attending`;
/// [`EventRecord::check_in`] registers attendance implicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    id: EventId,
    name: String,
    description: Option<String>,
    time_start: Timestamp,
    time_end: Timestamp,
    created_by: UserId,
    requires_code: bool,
    attending: Vec<UserId>,
    checked_in: Vec<CheckInEntry>,
}

impl EventRecord {
    /// Creates a new event record, validating name and schedule.
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        time_start: Timestamp,
        time_end: Timestamp,
        created_by: UserId,
        requires_code: bool,
    ) -> Result<Self, EventError> {
        let name = validate_name(name.into())?;
        if !time_start.is_before(&time_end) {
            return Err(EventError::StartNotBeforeEnd);
        }

        Ok(Self {
            id: EventId::new(),
            name,
            description,
            time_start,
            time_end,
            created_by,
            requires_code,
            attending: Vec::new(),
            checked_in: Vec::new(),
        })
    }

    pub fn id(&self) -> &EventId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn time_start(&self) -> &Timestamp {
        &self.time_start
    }

    pub fn time_end(&self) -> &Timestamp {
        &self.time_end
    }

    pub fn created_by(&self) -> &UserId {
        &self.created_by
    }

    pub fn requires_code(&self) -> bool {
        self.requires_code
    }

    pub fn attending(&self) -> &[UserId] {
        &self.attending
    }

    pub fn checked_in(&self) -> &[CheckInEntry] {
        &self.checked_in
    }

    /// True when the given user created this event.
    pub fn is_creator(&self, user: &UserId) -> bool {
        &self.created_by == user
    }

    /// True when the user has a persisted check-in.
    pub fn is_checked_in(&self, user: &UserId) -> bool {
        self.checked_in.iter().any(|entry| &entry.user == user)
    }

    /// True when the user is registered as attending.
    pub fn is_attending(&self, user: &UserId) -> bool {
        self.attending.contains(user)
    }

    /// Registers a user as attending. Append-if-absent; returns whether
    /// the set changed.
    pub fn register(&mut self, user: UserId) -> bool {
        if self.attending.contains(&user) {
            return false;
        }
        self.attending.push(user);
        true
    }

    /// Records a check-in for the user. Append-if-absent: a repeated
    /// check-in returns the original entry unchanged. Registers the
    /// user as attending when absent.
    pub fn check_in(&mut self, user: UserId, at: Timestamp) -> CheckInEntry {
        if let Some(existing) = self.checked_in.iter().find(|e| e.user == user) {
            return existing.clone();
        }

        self.register(user.clone());

        let entry = CheckInEntry { user, at };
        self.checked_in.push(entry.clone());
        entry
    }

    /// Replaces the schedule. Used by the edit route; activation catches
    /// up at the next reconciliation tick.
    pub fn reschedule(
        &mut self,
        time_start: Timestamp,
        time_end: Timestamp,
    ) -> Result<(), EventError> {
        if !time_start.is_before(&time_end) {
            return Err(EventError::StartNotBeforeEnd);
        }
        self.time_start = time_start;
        self.time_end = time_end;
        Ok(())
    }

    /// Interval-intersection test against an activation window.
    pub fn overlaps(&self, window_start: &Timestamp, window_end: &Timestamp) -> bool {
        self.time_start <= *window_end && self.time_end >= *window_start
    }
}

fn validate_name(raw: String) -> Result<String, EventError> {
    let name = raw.trim().to_string();
    if name.is_empty() {
        return Err(ValidationError::empty_field("name").into());
    }
    if name.len() < NAME_MIN || name.len() > NAME_MAX {
        return Err(
            ValidationError::length_out_of_range("name", NAME_MIN, NAME_MAX, name.len()).into(),
        );
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn record() -> EventRecord {
        let now = Timestamp::now();
        EventRecord::new(
            "Intro to Systems",
            None,
            now,
            now.plus_mins(60),
            user("creator"),
            true,
        )
        .unwrap()
    }

    #[test]
    fn new_trims_and_keeps_name() {
        let now = Timestamp::now();
        let event = EventRecord::new(
            "  Intro to Systems  ",
            None,
            now,
            now.plus_mins(30),
            user("creator"),
            false,
        )
        .unwrap();
        assert_eq!(event.name(), "Intro to Systems");
    }

    #[test]
    fn new_rejects_short_name() {
        let now = Timestamp::now();
        let result = EventRecord::new("abc", None, now, now.plus_mins(30), user("c"), false);
        assert!(matches!(result, Err(EventError::Validation(_))));
    }

    #[test]
    fn new_rejects_inverted_schedule() {
        let now = Timestamp::now();
        let result = EventRecord::new(
            "Intro to Systems",
            None,
            now.plus_mins(30),
            now,
            user("c"),
            false,
        );
        assert!(matches!(result, Err(EventError::StartNotBeforeEnd)));
    }

    #[test]
    fn register_is_append_if_absent() {
        let mut event = record();
        assert!(event.register(user("alice")));
        assert!(!event.register(user("alice")));
        assert_eq!(event.attending().len(), 1);
    }

    #[test]
    fn check_in_registers_attendance_implicitly() {
        let mut event = record();
        assert!(!event.is_attending(&user("alice")));

        event.check_in(user("alice"), Timestamp::now());

        assert!(event.is_attending(&user("alice")));
        assert!(event.is_checked_in(&user("alice")));
    }

    #[test]
    fn repeated_check_in_keeps_original_timestamp() {
        let mut event = record();
        let first = event.check_in(user("alice"), Timestamp::from_unix_secs(1000));
        let second = event.check_in(user("alice"), Timestamp::from_unix_secs(2000));

        assert_eq!(first, second);
        assert_eq!(event.checked_in().len(), 1);
    }

    #[test]
    fn overlaps_matches_interval_intersection() {
        let now = Timestamp::now();
        let event = EventRecord::new(
            "Intro to Systems",
            None,
            now.minus_mins(5),
            now.plus_mins(55),
            user("c"),
            true,
        )
        .unwrap();

        // Window [now-15, now+15] intersects the schedule.
        assert!(event.overlaps(&now.minus_mins(15), &now.plus_mins(15)));
        // A window entirely after the event ends does not.
        assert!(!event.overlaps(&now.plus_mins(60), &now.plus_mins(90)));
    }

    #[test]
    fn ended_event_does_not_overlap_buffered_window() {
        let now = Timestamp::now();
        let event = EventRecord::new(
            "Intro to Systems",
            None,
            now.minus_mins(80),
            now.minus_mins(20),
            user("c"),
            true,
        )
        .unwrap();

        assert!(!event.overlaps(&now.minus_mins(15), &now.plus_mins(15)));
    }

    #[test]
    fn reschedule_validates_order() {
        let mut event = record();
        let now = Timestamp::now();
        assert!(event.reschedule(now.plus_mins(10), now).is_err());
        assert!(event.reschedule(now, now.plus_mins(10)).is_ok());
    }
}
