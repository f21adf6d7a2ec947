//! Command handlers for the event lifecycle.

mod create_event;
mod edit_event;

pub use create_event::{CreateEventCommand, CreateEventHandler};
pub use edit_event::{EditEventCommand, EditEventHandler};
