//! HTTP routes for event endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers::{create_event, edit_event, get_event, join_by_token, EventHandlers};

/// Creates the event router with all endpoints.
pub fn event_routes(handlers: EventHandlers) -> Router {
    Router::new()
        .route("/", post(create_event))
        .route("/:id", get(get_event))
        .route("/:id", put(edit_event))
        .route("/join/:token", post(join_by_token))
        .with_state(handlers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{
        InMemoryEventBus, InMemoryEventStore, InMemoryJoinTokenStore, MockSessionValidator,
    };
    use crate::application::handlers::{CreateEventHandler, EditEventHandler};
    use std::sync::Arc;

    #[test]
    fn event_routes_builds() {
        let store = Arc::new(InMemoryEventStore::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let handlers = EventHandlers::new(
            Arc::new(CreateEventHandler::new(store.clone(), bus.clone())),
            Arc::new(EditEventHandler::new(store.clone(), bus)),
            store,
            Arc::new(InMemoryJoinTokenStore::new()),
            Arc::new(MockSessionValidator::new()),
        );
        let _router = event_routes(handlers);
    }
}
