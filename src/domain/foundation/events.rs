//! Domain event envelope and related types.
//!
//! Events cross the internal bus wrapped in an [`EventEnvelope`]:
//! a typed header (envelope id, event type, aggregate context, timestamp)
//! around a JSON payload. Handlers route on `event_type` and deserialize
//! the payload into the concrete event struct.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use super::{DomainError, ErrorCode, Timestamp};

/// Unique identifier for one published envelope.
///
/// Distinct from [`super::EventId`], which identifies the scheduled-event
/// aggregate itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvelopeId(Uuid);

impl EnvelopeId {
    /// Creates a new random EnvelopeId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EnvelopeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EnvelopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tracing metadata attached to every envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Correlates envelopes triggered by the same external request.
    pub correlation_id: Option<String>,

    /// The user whose action produced the event, if any.
    pub user_id: Option<String>,
}

/// Envelope carrying one domain event across the bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub envelope_id: EnvelopeId,
    pub event_type: String,
    pub aggregate_id: String,
    pub aggregate_type: String,
    pub occurred_at: Timestamp,
    pub payload: Value,
    pub metadata: EventMetadata,
}

impl EventEnvelope {
    /// Builds an envelope for the given event type and aggregate.
    pub fn new(
        event_type: impl Into<String>,
        aggregate_id: impl Into<String>,
        aggregate_type: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            envelope_id: EnvelopeId::new(),
            event_type: event_type.into(),
            aggregate_id: aggregate_id.into(),
            aggregate_type: aggregate_type.into(),
            occurred_at: Timestamp::now(),
            payload,
            metadata: EventMetadata::default(),
        }
    }

    /// Attaches a correlation id.
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.metadata.correlation_id = Some(correlation_id.into());
        self
    }

    /// Attaches the acting user's id.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.metadata.user_id = Some(user_id.into());
        self
    }

    /// Deserializes the payload into a concrete event struct.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, DomainError> {
        serde_json::from_value(self.payload.clone()).map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Malformed '{}' payload: {}", self.event_type, e),
            )
        })
    }
}

/// A domain event that can be wrapped into an [`EventEnvelope`].
pub trait DomainEvent: Serialize {
    /// Stable dotted event type string, e.g. `"event.created"`.
    fn event_type(&self) -> &'static str;

    /// The aggregate the event belongs to.
    fn aggregate_id(&self) -> String;

    /// The aggregate kind, for routing and logging.
    fn aggregate_type(&self) -> &'static str;

    /// Wraps the event into an envelope for publishing.
    fn to_envelope(&self) -> EventEnvelope {
        let payload =
            serde_json::to_value(self).expect("domain event serialization should not fail");
        EventEnvelope::new(
            self.event_type(),
            self.aggregate_id(),
            self.aggregate_type(),
            payload,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Ping {
        target: String,
    }

    impl DomainEvent for Ping {
        fn event_type(&self) -> &'static str {
            "test.ping"
        }

        fn aggregate_id(&self) -> String {
            self.target.clone()
        }

        fn aggregate_type(&self) -> &'static str {
            "Test"
        }
    }

    #[test]
    fn to_envelope_carries_type_and_aggregate() {
        let event = Ping {
            target: "t-1".to_string(),
        };
        let envelope = event.to_envelope();

        assert_eq!(envelope.event_type, "test.ping");
        assert_eq!(envelope.aggregate_id, "t-1");
        assert_eq!(envelope.aggregate_type, "Test");
    }

    #[test]
    fn payload_roundtrips_through_envelope() {
        let event = Ping {
            target: "t-2".to_string(),
        };
        let envelope = event.to_envelope();

        let back: Ping = envelope.payload_as().unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn payload_as_rejects_wrong_shape() {
        let envelope = EventEnvelope::new("test.ping", "t-3", "Test", json!({"other": 1}));
        assert!(envelope.payload_as::<Ping>().is_err());
    }

    #[test]
    fn metadata_builders_attach_fields() {
        let envelope = EventEnvelope::new("test.ping", "t-4", "Test", json!({}))
            .with_correlation_id("req-1")
            .with_user_id("u-1");

        assert_eq!(envelope.metadata.correlation_id.as_deref(), Some("req-1"));
        assert_eq!(envelope.metadata.user_id.as_deref(), Some("u-1"));
    }
}
