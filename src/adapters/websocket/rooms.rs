//! WebSocket room management for event-based message routing.
//!
//! Every live event owns two rooms: the chat room (all checked-in
//! participants, creator included) and the creator room (the rotating
//! code feed). Membership is derived from protocol activity - granted on
//! successful check-in/join, revoked when the event deactivates - not
//! from connection lifetime.
//!
//! ```text
//! Room: {event-a}_chat     Room: {event-a}_creator
//! ├── alice                └── creator
//! ├── bob
//! └── creator
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};

use crate::domain::foundation::{EventId, UserId};
use crate::ports::RoomBroadcaster;

use super::messages::ServerMessage;

/// Which of an event's two rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomKind {
    Chat,
    Creator,
}

/// One broadcast group: an event plus a room kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoomId {
    pub event: EventId,
    pub kind: RoomKind,
}

impl RoomId {
    pub fn chat(event: EventId) -> Self {
        Self {
            event,
            kind: RoomKind::Chat,
        }
    }

    pub fn creator(event: EventId) -> Self {
        Self {
            event,
            kind: RoomKind::Creator,
        }
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.kind {
            RoomKind::Chat => "chat",
            RoomKind::Creator => "creator",
        };
        write!(f, "{}_{}", self.event, suffix)
    }
}

/// Manages the broadcast groups for live events.
///
/// # Thread Safety
///
/// Uses `RwLock` for the room registry since broadcasts (reads) vastly
/// outnumber joins and evictions (writes).
pub struct RoomManager {
    /// Map of room → broadcast sender for that room.
    rooms: RwLock<HashMap<RoomId, broadcast::Sender<ServerMessage>>>,

    /// Membership by identity, the protocol's authorization state.
    members: RwLock<HashMap<RoomId, HashSet<UserId>>>,

    /// Channel capacity for each room's broadcast channel.
    channel_capacity: usize,
}

impl RoomManager {
    /// Create a new room manager with specified channel capacity.
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            members: RwLock::new(HashMap::new()),
            channel_capacity,
        }
    }

    /// Create with default capacity (128 messages).
    pub fn with_default_capacity() -> Self {
        Self::new(128)
    }

    /// Grant the user membership of a room and subscribe to its feed.
    ///
    /// The room is created on first join. Joining a room the user is
    /// already a member of just hands back a fresh receiver (reconnects
    /// arrive this way via `rejoin`).
    pub async fn join(
        &self,
        room: RoomId,
        user: &UserId,
    ) -> broadcast::Receiver<ServerMessage> {
        let receiver = {
            let mut rooms = self.rooms.write().await;
            let sender = rooms.entry(room).or_insert_with(|| {
                let (tx, _) = broadcast::channel(self.channel_capacity);
                tx
            });
            sender.subscribe()
        };

        self.members
            .write()
            .await
            .entry(room)
            .or_default()
            .insert(user.clone());

        receiver
    }

    /// True when the identity holds membership of the room.
    pub async fn is_member(&self, room: &RoomId, user: &UserId) -> bool {
        self.members
            .read()
            .await
            .get(room)
            .is_some_and(|set| set.contains(user))
    }

    /// Broadcast a message to everyone in a room.
    ///
    /// A missing room or a room with no live receivers is a no-op, not
    /// an error.
    pub async fn broadcast(&self, room: &RoomId, message: ServerMessage) {
        let rooms = self.rooms.read().await;
        if let Some(sender) = rooms.get(room) {
            // Ignore send errors (no receivers is OK)
            let _ = sender.send(message);
        }
    }

    /// Drop both of an event's rooms: membership is revoked and every
    /// subscribed receiver closes, regardless of connection state.
    pub async fn evict_event(&self, event: &EventId) {
        let chat = RoomId::chat(*event);
        let creator = RoomId::creator(*event);

        {
            let mut rooms = self.rooms.write().await;
            rooms.remove(&chat);
            rooms.remove(&creator);
        }
        {
            let mut members = self.members.write().await;
            members.remove(&chat);
            members.remove(&creator);
        }
    }

    /// Count of live receivers in a room (0 if the room doesn't exist).
    pub async fn receiver_count(&self, room: &RoomId) -> usize {
        self.rooms
            .read()
            .await
            .get(room)
            .map(|s| s.receiver_count())
            .unwrap_or(0)
    }

    /// Count of member identities in a room.
    pub async fn member_count(&self, room: &RoomId) -> usize {
        self.members
            .read()
            .await
            .get(room)
            .map(|set| set.len())
            .unwrap_or(0)
    }

    /// All rooms that currently exist (for monitoring/debugging).
    pub async fn active_rooms(&self) -> Vec<RoomId> {
        self.rooms.read().await.keys().copied().collect()
    }
}

impl Default for RoomManager {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

#[async_trait]
impl RoomBroadcaster for RoomManager {
    async fn code_update(&self, event: &EventId, code: &str) {
        self.broadcast(
            &RoomId::creator(*event),
            ServerMessage::CodeUpdate {
                code: code.to_string(),
            },
        )
        .await;
    }

    async fn event_ended(&self, event: &EventId) {
        // Terminal signal first, then eviction closes the channels.
        self.broadcast(&RoomId::chat(*event), ServerMessage::EventEnded)
            .await;
        self.broadcast(&RoomId::creator(*event), ServerMessage::EventEnded)
            .await;
        self.evict_event(event).await;
    }
}
