//! HTTP adapters - REST surface consumed by the event pages.
//!
//! Deliberately small: the real-time work happens on the WebSocket
//! gateway. This surface covers event creation (the immediate-activation
//! path), rescheduling, the single-event fetch the client's eligibility
//! check uses, and the deferred join-by-link entry point.

pub mod events;

pub use events::{event_routes, EventHandlers};
