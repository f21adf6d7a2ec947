//! Real-time gateway.
//!
//! Multiplexes many concurrent WebSocket connections into per-event
//! broadcast groups and implements the check-in/chat/creator protocol.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Activation subsystem                        │
//! │   registry timers ──► code_update / event_ended signals      │
//! └─────────────────────────────────────────────────────────────┘
//!                               │ RoomBroadcaster port
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       RoomManager                            │
//! │   {event}_chat          {event}_creator                      │
//! │   ├── alice             └── creator                          │
//! │   └── bob                                                    │
//! └─────────────────────────────────────────────────────────────┘
//!                               ▲
//!                               │ joins / broadcasts
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Gateway                               │
//! │   is_active / join_creator / check_in / check_in_no_code /   │
//! │   rejoin / send_message                                      │
//! └─────────────────────────────────────────────────────────────┘
//!                               ▲
//!                               │ one socket loop per connection
//!                          ws_handler
//! ```
//!
//! # Components
//!
//! - [`messages`] - the wire protocol types
//! - [`rooms`] - broadcast groups and activity-derived membership
//! - [`protocol`] - the message table implementation
//! - [`handler`] - axum upgrade handler and socket loop

pub mod handler;
pub mod messages;
pub mod protocol;
pub mod rooms;

pub use handler::{gateway_router, ws_handler, GatewayState};
pub use messages::{ClientMessage, ServerMessage};
pub use protocol::{Gateway, HandleOutcome};
pub use rooms::{RoomId, RoomKind, RoomManager};
