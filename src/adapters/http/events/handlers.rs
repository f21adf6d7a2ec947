//! HTTP handlers for event endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Path, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::application::handlers::{
    CreateEventCommand, CreateEventHandler, EditEventCommand, EditEventHandler,
};
use crate::domain::foundation::{AuthenticatedUser, DomainError, ErrorCode, EventId};
use crate::ports::{EventStore, JoinTokenStore, SessionValidator};

use super::dto::{CreateEventRequest, EditEventRequest, ErrorResponse, EventResponse};

// ════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct EventHandlers {
    create_handler: Arc<CreateEventHandler>,
    edit_handler: Arc<EditEventHandler>,
    store: Arc<dyn EventStore>,
    tokens: Arc<dyn JoinTokenStore>,
    sessions: Arc<dyn SessionValidator>,
}

impl EventHandlers {
    pub fn new(
        create_handler: Arc<CreateEventHandler>,
        edit_handler: Arc<EditEventHandler>,
        store: Arc<dyn EventStore>,
        tokens: Arc<dyn JoinTokenStore>,
        sessions: Arc<dyn SessionValidator>,
    ) -> Self {
        Self {
            create_handler,
            edit_handler,
            store,
            tokens,
            sessions,
        }
    }
}

// ════════════════════════════════════════════════════════════════════
// Auth extractor
// ════════════════════════════════════════════════════════════════════

/// Extractor that resolves the bearer token into an authenticated user.
///
/// Routes using it reject unauthenticated requests with 401 before the
/// handler body runs.
pub struct RequireAuth(pub AuthenticatedUser);

#[async_trait]
impl FromRequestParts<EventHandlers> for RequireAuth {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &EventHandlers,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(unauthorized)?;

        let user = state
            .sessions
            .validate(token)
            .await
            .map_err(|_| unauthorized())?;

        Ok(RequireAuth(user))
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new(
            "You must be logged in to access this resource",
        )),
    )
        .into_response()
}

// ════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════

/// POST /events - Create a new event
pub async fn create_event(
    State(handlers): State<EventHandlers>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<CreateEventRequest>,
) -> Response {
    let cmd = CreateEventCommand {
        name: req.name,
        description: req.description,
        time_start: req.time_start,
        time_end: req.time_end,
        requires_code: req.requires_code,
        created_by: user.id,
    };

    match handlers.create_handler.handle(cmd).await {
        Ok(record) => (StatusCode::CREATED, Json(EventResponse::from(&record))).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /events/:id - Fetch one event
///
/// The client's eligibility check reads this: role, `requires_code`, and
/// any existing check-in all come out of the response.
pub async fn get_event(
    State(handlers): State<EventHandlers>,
    RequireAuth(_user): RequireAuth,
    Path(event_id): Path<String>,
) -> Response {
    let id = match event_id.parse::<EventId>() {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Invalid event id")),
            )
                .into_response()
        }
    };

    match handlers.store.find_by_id(&id).await {
        Ok(Some(record)) => (StatusCode::OK, Json(EventResponse::from(&record))).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Event not found")),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// PUT /events/:id - Reschedule an event
///
/// Activation converges at the next reconciliation tick; there is no
/// immediate re-activation on edit.
pub async fn edit_event(
    State(handlers): State<EventHandlers>,
    RequireAuth(user): RequireAuth,
    Path(event_id): Path<String>,
    Json(req): Json<EditEventRequest>,
) -> Response {
    let id = match event_id.parse::<EventId>() {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Invalid event id")),
            )
                .into_response()
        }
    };

    // Only the creator may reschedule.
    match handlers.store.find_by_id(&id).await {
        Ok(Some(record)) if !record.is_creator(&user.id) => {
            return (
                StatusCode::FORBIDDEN,
                Json(ErrorResponse::new("Only the event creator can edit it")),
            )
                .into_response()
        }
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Event not found")),
            )
                .into_response()
        }
        Err(e) => return error_response(e),
    }

    let cmd = EditEventCommand {
        event_id: id,
        time_start: req.time_start,
        time_end: req.time_end,
    };

    match handlers.edit_handler.handle(cmd).await {
        Ok(record) => (StatusCode::OK, Json(EventResponse::from(&record))).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /events/join/:token - Deferred join-by-link entry point
///
/// Acknowledges the token without completing the flow. No auth: the
/// token itself is the credential the flow will eventually consume.
pub async fn join_by_token(
    State(handlers): State<EventHandlers>,
    Path(token): Path<String>,
) -> Response {
    match handlers.tokens.find(&token).await {
        Ok(Some(_)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": format!("Used {token} to join event")
            })),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Unknown join token")),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(e: DomainError) -> Response {
    let status = match e.code {
        ErrorCode::ValidationFailed | ErrorCode::EmptyField | ErrorCode::InvalidFormat => {
            StatusCode::BAD_REQUEST
        }
        ErrorCode::EventNotFound | ErrorCode::TokenNotFound => StatusCode::NOT_FOUND,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        _ => {
            tracing::error!(error = %e, "request failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Internal server error")),
            )
                .into_response();
        }
    };

    (status, Json(ErrorResponse::new(e.message))).into_response()
}
