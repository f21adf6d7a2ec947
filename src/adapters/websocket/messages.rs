//! WebSocket message types for the check-in/chat/creator protocol.
//!
//! Defines the protocol between the gateway and connected clients:
//! - Client → Server: activity probe, joins, check-ins, chat
//! - Server → Client: code feed, attendance fan-out, chat, terminal signals

use serde::{Deserialize, Serialize};

// ============================================
// Client → Server Messages
// ============================================

/// All message types that can be received from a client.
///
/// Event ids travel as plain strings (the store-native identifier's
/// string encoding). The optional `identity` field is accepted for
/// compatibility with older clients but the identity bound to the
/// connection at upgrade time is authoritative.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Probe whether an event is live. Only the negative is answered.
    IsActive { event_id: String },

    /// Join the creator's code feed (and mirrored chat membership).
    JoinCreator { event_id: String },

    /// Check in with the rotating code.
    CheckIn {
        event_id: String,
        code: String,
        #[serde(default)]
        identity: Option<String>,
    },

    /// Check in to an event that does not require a code.
    CheckInNoCode {
        event_id: String,
        #[serde(default)]
        identity: Option<String>,
    },

    /// Re-enter the chat room after a reconnect; no code required.
    Rejoin { event_id: String },

    /// Send a chat message to the event's chat room.
    SendMessage { event_id: String, body: String },
}

// ============================================
// Server → Client Messages
// ============================================

/// All message types that can be sent to a client.
///
/// `Serialize` is the wire direction; `Deserialize` exists so tests can
/// parse what the gateway emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Fresh access code. Creator room only.
    CodeUpdate { code: String },

    /// A user checked in. Creator room only.
    UserCheckedIn { user: String, timestamp: String },

    /// Chat fan-out to everyone in the chat room.
    ChatMessage { sender: String, body: String },

    /// Reply to `is_active` when the event is not live.
    NotActive,

    /// Check-in or rejoin succeeded; chat membership granted.
    SuccessJoin,

    /// Terminal signal: the event left the active window. Sent to both
    /// rooms just before eviction.
    EventEnded,

    /// Validation or store failure. The connection keeps its prior room
    /// state.
    Error { message: String },
}

impl ServerMessage {
    /// Convenience constructor for error replies.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_message_deserializes_check_in() {
        let json = r#"{"type": "check_in", "event_id": "abc", "code": "0042"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(
            msg,
            ClientMessage::CheckIn { code, identity: None, .. } if code == "0042"
        ));
    }

    #[test]
    fn client_message_accepts_legacy_identity_field() {
        let json = r#"{"type": "check_in_no_code", "event_id": "abc", "identity": "a@b.c"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(
            msg,
            ClientMessage::CheckInNoCode { identity: Some(i), .. } if i == "a@b.c"
        ));
    }

    #[test]
    fn client_message_deserializes_is_active() {
        let json = r#"{"type": "is_active", "event_id": "abc"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::IsActive { .. }));
    }

    #[test]
    fn client_message_rejects_unknown_type() {
        let json = r#"{"type": "make_me_admin"}"#;
        assert!(serde_json::from_str::<ClientMessage>(json).is_err());
    }

    #[test]
    fn server_message_serializes_with_type_tag() {
        let msg = ServerMessage::CodeUpdate {
            code: "0042".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"code_update""#));
        assert!(json.contains(r#""code":"0042""#));
    }

    #[test]
    fn unit_variants_serialize_without_payload() {
        let json = serde_json::to_string(&ServerMessage::NotActive).unwrap();
        assert_eq!(json, r#"{"type":"not_active"}"#);

        let json = serde_json::to_string(&ServerMessage::SuccessJoin).unwrap();
        assert_eq!(json, r#"{"type":"success_join"}"#);
    }

    #[test]
    fn error_constructor_wraps_message() {
        let msg = ServerMessage::error("nope");
        assert_eq!(
            msg,
            ServerMessage::Error {
                message: "nope".to_string()
            }
        );
    }
}
