//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - Session validator implementations (JWT, mock)
//! - `events` - Event bus implementations (in-memory)
//! - `http` - REST surface for the event creation path
//! - `store` - Event store implementations (in-memory reference)
//! - `websocket` - Real-time gateway (rooms, protocol, upgrade handler)

pub mod auth;
pub mod events;
pub mod http;
pub mod store;
pub mod websocket;

pub use auth::{JwtSessionValidator, MockSessionValidator};
pub use events::InMemoryEventBus;
pub use store::{InMemoryEventStore, InMemoryJoinTokenStore};
