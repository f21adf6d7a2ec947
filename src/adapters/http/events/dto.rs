//! HTTP DTOs for event endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing
//! independent evolution.

use serde::{Deserialize, Serialize};

use crate::domain::event::EventRecord;
use crate::domain::foundation::Timestamp;

// ════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════

/// Request to create a new event.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub time_start: Timestamp,
    pub time_end: Timestamp,
    #[serde(default = "default_requires_code")]
    pub requires_code: bool,
}

fn default_requires_code() -> bool {
    true
}

/// Request to reschedule an event.
#[derive(Debug, Clone, Deserialize)]
pub struct EditEventRequest {
    pub time_start: Timestamp,
    pub time_end: Timestamp,
}

// ════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════

/// One check-in entry as exposed over HTTP.
#[derive(Debug, Clone, Serialize)]
pub struct CheckedInUser {
    pub user: String,
    pub timestamp: String,
}

/// Event view for API responses; the eligibility fetch reads this.
#[derive(Debug, Clone, Serialize)]
pub struct EventResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub time_start: Timestamp,
    pub time_end: Timestamp,
    pub created_by: String,
    pub requires_code: bool,
    pub attending: Vec<String>,
    pub checked_in: Vec<CheckedInUser>,
}

impl From<&EventRecord> for EventResponse {
    fn from(record: &EventRecord) -> Self {
        Self {
            id: record.id().to_string(),
            name: record.name().to_string(),
            description: record.description().map(String::from),
            time_start: *record.time_start(),
            time_end: *record.time_end(),
            created_by: record.created_by().to_string(),
            requires_code: record.requires_code(),
            attending: record.attending().iter().map(|u| u.to_string()).collect(),
            checked_in: record
                .checked_in()
                .iter()
                .map(|entry| CheckedInUser {
                    user: entry.user.to_string(),
                    timestamp: entry.at.to_rfc3339(),
                })
                .collect(),
        }
    }
}

/// Standard error body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
