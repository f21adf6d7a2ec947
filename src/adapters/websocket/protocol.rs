//! Check-in/chat/creator message protocol.
//!
//! One [`Gateway`] instance serves every connection; each inbound
//! message is handled against the registry, the store, and the rooms.
//! Failures follow the error taxonomy: validation problems become
//! `error` replies with room state untouched, store failures become a
//! generic `error` with the detail kept server-side.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::application::activation::ActiveEventRegistry;
use crate::domain::event::EventRecord;
use crate::domain::foundation::{AuthenticatedUser, EventId, UserId};
use crate::ports::EventStore;

use super::messages::{ClientMessage, ServerMessage};
use super::rooms::{RoomId, RoomManager};

/// What handling one inbound message produced.
///
/// `subscriptions` carries the room feeds this connection gained; the
/// socket loop wires them into its outbound channel.
pub struct HandleOutcome {
    pub reply: Option<ServerMessage>,
    pub subscriptions: Vec<(RoomId, broadcast::Receiver<ServerMessage>)>,
}

impl HandleOutcome {
    fn silent() -> Self {
        Self {
            reply: None,
            subscriptions: Vec::new(),
        }
    }

    fn reply(message: ServerMessage) -> Self {
        Self {
            reply: Some(message),
            subscriptions: Vec::new(),
        }
    }
}

/// Protocol service shared by all connections.
pub struct Gateway {
    registry: ActiveEventRegistry,
    store: Arc<dyn EventStore>,
    rooms: Arc<RoomManager>,
}

impl Gateway {
    pub fn new(
        registry: ActiveEventRegistry,
        store: Arc<dyn EventStore>,
        rooms: Arc<RoomManager>,
    ) -> Self {
        Self {
            registry,
            store,
            rooms,
        }
    }

    /// Handle one inbound message for the identity bound to the
    /// connection. Never fails: protocol problems come back as `error`
    /// replies.
    pub async fn handle(&self, user: &AuthenticatedUser, msg: ClientMessage) -> HandleOutcome {
        match msg {
            ClientMessage::IsActive { event_id } => self.is_active(&event_id).await,
            ClientMessage::JoinCreator { event_id } => self.join_creator(user, &event_id).await,
            ClientMessage::CheckIn {
                event_id, code, ..
            } => self.check_in(user, &event_id, &code).await,
            ClientMessage::CheckInNoCode { event_id, .. } => {
                self.check_in_no_code(user, &event_id).await
            }
            ClientMessage::Rejoin { event_id } => self.rejoin(user, &event_id).await,
            ClientMessage::SendMessage { event_id, body } => {
                self.send_message(user, &event_id, &body).await
            }
        }
    }

    /// Only the negative is answered: an active event's view is driven
    /// by the join flow, so the probe stays silent for live events.
    async fn is_active(&self, event_id: &str) -> HandleOutcome {
        let Ok(id) = event_id.parse::<EventId>() else {
            // An unparseable id cannot name a live event.
            return HandleOutcome::reply(ServerMessage::NotActive);
        };

        if self.registry.is_active(&id).await {
            HandleOutcome::silent()
        } else {
            HandleOutcome::reply(ServerMessage::NotActive)
        }
    }

    async fn join_creator(&self, user: &AuthenticatedUser, event_id: &str) -> HandleOutcome {
        let id = match parse_event_id(event_id) {
            Ok(id) => id,
            Err(reply) => return HandleOutcome::reply(reply),
        };

        let Some(code) = self.registry.current_code(&id).await else {
            return HandleOutcome::reply(ServerMessage::error("Event is not active"));
        };

        let record = match self.load_event(&id).await {
            Ok(record) => record,
            Err(reply) => return HandleOutcome::reply(reply),
        };
        if !record.is_creator(&user.id) {
            return HandleOutcome::reply(ServerMessage::error(
                "Only the event creator can join the code feed",
            ));
        }

        let creator_room = RoomId::creator(id);
        let chat_room = RoomId::chat(id);
        let creator_rx = self.rooms.join(creator_room, &user.id).await;
        let chat_rx = self.rooms.join(chat_room, &user.id).await;

        tracing::debug!(event_id = %id, user = %user.id, "creator joined code feed");

        HandleOutcome {
            // The current code immediately; rotations follow on the feed.
            reply: Some(ServerMessage::CodeUpdate {
                code: code.as_str().to_string(),
            }),
            subscriptions: vec![(creator_room, creator_rx), (chat_room, chat_rx)],
        }
    }

    async fn check_in(
        &self,
        user: &AuthenticatedUser,
        event_id: &str,
        code: &str,
    ) -> HandleOutcome {
        let id = match parse_event_id(event_id) {
            Ok(id) => id,
            Err(reply) => return HandleOutcome::reply(reply),
        };

        // The comparison is against whatever code the registry holds at
        // this instant. A code read just before a rotation is already
        // stale; there is no grace window past the boundary.
        let Some(current) = self.registry.current_code(&id).await else {
            return HandleOutcome::reply(ServerMessage::error("Event is not active"));
        };
        if !current.matches(code) {
            return HandleOutcome::reply(ServerMessage::error("Incorrect code"));
        }

        self.complete_check_in(user, id).await
    }

    async fn check_in_no_code(&self, user: &AuthenticatedUser, event_id: &str) -> HandleOutcome {
        let id = match parse_event_id(event_id) {
            Ok(id) => id,
            Err(reply) => return HandleOutcome::reply(reply),
        };

        if !self.registry.is_active(&id).await {
            return HandleOutcome::reply(ServerMessage::error("Event is not active"));
        }

        let record = match self.load_event(&id).await {
            Ok(record) => record,
            Err(reply) => return HandleOutcome::reply(reply),
        };
        if record.requires_code() {
            return HandleOutcome::reply(ServerMessage::error("This event requires a code"));
        }

        self.complete_check_in(user, id).await
    }

    /// Re-entry after a reconnect. An existing persisted check-in is the
    /// proof of presence; no code is asked for again.
    async fn rejoin(&self, user: &AuthenticatedUser, event_id: &str) -> HandleOutcome {
        let id = match parse_event_id(event_id) {
            Ok(id) => id,
            Err(reply) => return HandleOutcome::reply(reply),
        };

        if !self.registry.is_active(&id).await {
            return HandleOutcome::reply(ServerMessage::error("Event is not active"));
        }

        let record = match self.load_event(&id).await {
            Ok(record) => record,
            Err(reply) => return HandleOutcome::reply(reply),
        };
        if !record.is_checked_in(&user.id) {
            return HandleOutcome::reply(ServerMessage::error(
                "No existing check-in for this event",
            ));
        }

        let chat_room = RoomId::chat(id);
        let chat_rx = self.rooms.join(chat_room, &user.id).await;

        tracing::debug!(event_id = %id, user = %user.id, "rejoined chat room");

        HandleOutcome {
            reply: Some(ServerMessage::SuccessJoin),
            subscriptions: vec![(chat_room, chat_rx)],
        }
    }

    async fn send_message(
        &self,
        user: &AuthenticatedUser,
        event_id: &str,
        body: &str,
    ) -> HandleOutcome {
        let id = match parse_event_id(event_id) {
            Ok(id) => id,
            Err(reply) => return HandleOutcome::reply(reply),
        };

        let chat_room = RoomId::chat(id);
        if !self.rooms.is_member(&chat_room, &user.id).await {
            return HandleOutcome::reply(ServerMessage::error(
                "Join the event before sending messages",
            ));
        }

        self.rooms
            .broadcast(
                &chat_room,
                ServerMessage::ChatMessage {
                    sender: user.id.to_string(),
                    body: body.to_string(),
                },
            )
            .await;

        HandleOutcome::silent()
    }

    /// Shared tail of both check-in variants: persist (append-if-absent),
    /// grant chat membership, announce to the creator room.
    async fn complete_check_in(&self, user: &AuthenticatedUser, id: EventId) -> HandleOutcome {
        let entry = match self.store.check_in_user(&id, &user.id).await {
            Ok(entry) => entry,
            Err(e) => {
                tracing::error!(event_id = %id, user = %user.id, error = %e, "check-in write failed");
                return HandleOutcome::reply(ServerMessage::error("Could not record your check-in"));
            }
        };

        let chat_room = RoomId::chat(id);
        let chat_rx = self.rooms.join(chat_room, &user.id).await;

        self.rooms
            .broadcast(
                &RoomId::creator(id),
                ServerMessage::UserCheckedIn {
                    user: entry.user.to_string(),
                    timestamp: entry.at.to_rfc3339(),
                },
            )
            .await;

        tracing::info!(event_id = %id, user = %user.id, "user checked in");

        HandleOutcome {
            reply: Some(ServerMessage::SuccessJoin),
            subscriptions: vec![(chat_room, chat_rx)],
        }
    }

    async fn load_event(&self, id: &EventId) -> Result<EventRecord, ServerMessage> {
        match self.store.find_by_id(id).await {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Err(ServerMessage::error("Event not found")),
            Err(e) => {
                tracing::error!(event_id = %id, error = %e, "event lookup failed");
                Err(ServerMessage::error("Could not load the event"))
            }
        }
    }

    /// Chat-room membership check, for tests and diagnostics.
    pub async fn is_chat_member(&self, id: &EventId, user: &UserId) -> bool {
        self.rooms.is_member(&RoomId::chat(*id), user).await
    }
}

fn parse_event_id(raw: &str) -> Result<EventId, ServerMessage> {
    raw.parse::<EventId>()
        .map_err(|_| ServerMessage::error("Invalid event id"))
}
