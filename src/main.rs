//! Rollcall server binary.
//!
//! Wires the activation subsystem, the real-time gateway, and the REST
//! surface into one axum application. All services are explicit objects
//! with an init/shutdown lifecycle - nothing lives at module scope.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::Router;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use rollcall::adapters::http::{event_routes, EventHandlers};
use rollcall::adapters::websocket::{gateway_router, Gateway, GatewayState, RoomManager};
use rollcall::adapters::{
    InMemoryEventBus, InMemoryEventStore, InMemoryJoinTokenStore, JwtSessionValidator,
};
use rollcall::application::activation::{
    ActivationBridge, ActiveEventRegistry, ReconciliationLoop,
};
use rollcall::application::handlers::{CreateEventHandler, EditEventHandler};
use rollcall::config::AppConfig;
use rollcall::ports::{EventStore, JoinTokenStore, RoomBroadcaster, SessionValidator};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.server.log_level))
        .init();

    // Rooms implement the broadcaster port, so the activation subsystem
    // reaches connections without knowing about WebSockets.
    let rooms = Arc::new(RoomManager::with_default_capacity());
    let registry = ActiveEventRegistry::new(
        config.activation.clone(),
        rooms.clone() as Arc<dyn RoomBroadcaster>,
    );

    let store: Arc<dyn EventStore> = Arc::new(InMemoryEventStore::new());
    let tokens: Arc<dyn JoinTokenStore> = Arc::new(InMemoryJoinTokenStore::new());
    let sessions: Arc<dyn SessionValidator> = Arc::new(JwtSessionValidator::new(&config.auth));

    // The creation path publishes events; the bridge turns them into
    // immediate activations.
    let bus = Arc::new(InMemoryEventBus::new());
    let _bridge = ActivationBridge::register(
        registry.clone(),
        store.clone(),
        config.activation.clone(),
        bus.as_ref(),
    );

    // Background reconciliation against the store.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let reconciler =
        ReconciliationLoop::new(store.clone(), registry.clone(), config.activation.clone());
    let reconciler_task = tokio::spawn(async move { reconciler.run(shutdown_rx).await });

    let gateway = Arc::new(Gateway::new(registry.clone(), store.clone(), rooms.clone()));

    let event_handlers = EventHandlers::new(
        Arc::new(CreateEventHandler::new(store.clone(), bus.clone())),
        Arc::new(EditEventHandler::new(store.clone(), bus.clone())),
        store.clone(),
        tokens,
        sessions.clone(),
    );

    let app = Router::new()
        .nest("/events", event_routes(event_handlers))
        .merge(gateway_router().with_state(GatewayState::new(gateway, sessions)))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )));

    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "rollcall server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop the reconciler, then tear down every live event (timers,
    // rooms) before exit.
    let _ = shutdown_tx.send(true);
    let _ = reconciler_task.await;
    registry.shutdown().await;

    tracing::info!("rollcall server stopped");
    Ok(())
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new().allow_origin(origins)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
