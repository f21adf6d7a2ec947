//! WebSocket upgrade handler and per-connection socket loop.
//!
//! Connection lifecycle:
//! 1. Resolve the identity from the `token` query parameter; no identity
//!    means the connection is refused before upgrade (401, no grace)
//! 2. Upgrade to WebSocket
//! 3. Dispatch inbound messages through the [`Gateway`] protocol
//! 4. Forward every joined room feed into the outbound channel
//! 5. On disconnect, drop the feeds; room membership itself persists
//!    until the event deactivates

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::domain::foundation::AuthenticatedUser;
use crate::ports::SessionValidator;

use super::messages::{ClientMessage, ServerMessage};
use super::protocol::Gateway;
use super::rooms::RoomId;

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct GatewayState {
    pub gateway: Arc<Gateway>,
    pub sessions: Arc<dyn SessionValidator>,
}

impl GatewayState {
    pub fn new(gateway: Arc<Gateway>, sessions: Arc<dyn SessionValidator>) -> Self {
        Self { gateway, sessions }
    }
}

#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    token: Option<String>,
}

/// Handle WebSocket upgrade requests.
///
/// Route: `GET /ws?token=...`
///
/// The authentication gate runs before the upgrade: a missing or invalid
/// token terminates the request with 401 and no channel is ever opened.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<GatewayState>,
) -> Response {
    let Some(token) = params.token else {
        return (StatusCode::UNAUTHORIZED, "authentication required").into_response();
    };

    match state.sessions.validate(&token).await {
        Ok(user) => ws.on_upgrade(move |socket| handle_socket(socket, user, state.gateway)),
        Err(e) => {
            tracing::debug!(error = %e, "rejected connection with invalid session");
            (StatusCode::UNAUTHORIZED, "authentication required").into_response()
        }
    }
}

/// Run one established connection until it closes.
async fn handle_socket(socket: WebSocket, user: AuthenticatedUser, gateway: Arc<Gateway>) {
    let (mut sink, mut stream) = socket.split();

    // All outbound traffic (direct replies and room feeds) funnels
    // through one channel so the sink has a single writer.
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ServerMessage>();

    let send_task: JoinHandle<()> = tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!(error = %e, "outbound message failed to serialize");
                    continue;
                }
            };
            if sink.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    let mut forwarders: Vec<JoinHandle<()>> = Vec::new();
    let mut joined: HashSet<RoomId> = HashSet::new();

    tracing::debug!(user = %user.id, "connection established");

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                let client_msg = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(msg) => msg,
                    Err(_) => {
                        let _ = out_tx.send(ServerMessage::error("Unrecognized message"));
                        continue;
                    }
                };

                let outcome = gateway.handle(&user, client_msg).await;

                if let Some(reply) = outcome.reply {
                    let _ = out_tx.send(reply);
                }
                for (room, rx) in outcome.subscriptions {
                    // One forwarder per room per connection; repeated
                    // joins must not duplicate the feed.
                    if joined.insert(room) {
                        forwarders.push(spawn_forwarder(rx, out_tx.clone()));
                    }
                }
            }
            Ok(Message::Close(_)) => {
                tracing::debug!(user = %user.id, "client sent close frame");
                break;
            }
            Ok(Message::Binary(_)) => {
                tracing::warn!(user = %user.id, "received unsupported binary message");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                // WebSocket protocol keep-alive - handled by axum.
            }
            Err(e) => {
                tracing::debug!(user = %user.id, error = %e, "receive error");
                break;
            }
        }
    }

    // The connection is gone; its feeds go with it. Membership stays in
    // the room manager so a later `rejoin` needs no re-proof.
    for forwarder in forwarders {
        forwarder.abort();
    }
    send_task.abort();

    tracing::debug!(user = %user.id, "connection closed");
}

/// Pipe one room feed into the connection's outbound channel until the
/// room is evicted or the connection goes away.
fn spawn_forwarder(
    mut rx: broadcast::Receiver<ServerMessage>,
    out: mpsc::UnboundedSender<ServerMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(msg) => {
                    if out.send(msg).is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "slow consumer missed room messages");
                }
                // Room evicted: the terminal signal was already queued.
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// Create the axum router for the gateway endpoint.
///
/// # Example
///
/// ```ignore
/// let app = Router::new()
///     .merge(gateway_router())
///     .with_state(gateway_state);
/// ```
pub fn gateway_router() -> Router<GatewayState> {
    Router::new().route("/ws", get(ws_handler))
}
