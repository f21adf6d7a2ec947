//! HTTP endpoints for event CRUD and the deferred join flow.

mod dto;
mod handlers;
mod routes;

pub use dto::{CreateEventRequest, EditEventRequest, ErrorResponse, EventResponse};
pub use handlers::EventHandlers;
pub use routes::event_routes;
