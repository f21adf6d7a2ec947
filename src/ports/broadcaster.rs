//! RoomBroadcaster port - outbound signals from the activation subsystem.
//!
//! The registry and rotation timers announce code changes and event
//! endings without knowing how connections are grouped; the WebSocket
//! room manager implements this port.

use async_trait::async_trait;

use crate::domain::foundation::EventId;

/// Outbound fan-out used by the activation subsystem.
///
/// # Contract
///
/// Both methods are fire-and-forget: delivery to zero subscribers is not
/// an error, and implementations must not block rotation on slow
/// receivers.
#[async_trait]
pub trait RoomBroadcaster: Send + Sync {
    /// Announce a fresh access code to the event's creator room.
    async fn code_update(&self, event: &EventId, code: &str);

    /// Announce the terminal "event ended" signal to both of the event's
    /// rooms and evict their members.
    async fn event_ended(&self, event: &EventId);
}
