use axum::{
    routing::{delete, get, post},
    Router,
};
use brainaim::{
    room, signal,
    websockets::{self, InMemoryConnectionManager},
    AppState, ServerConfig,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "brainaim=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    info!(
        bind_addr = %config.bind_addr,
        tick_ms = config.round.tick_period.as_millis() as u64,
        round_ms = config.round.round_duration.as_millis() as u64,
        quorum = %config.round.quorum,
        "Starting brainaim server"
    );

    let app_state = AppState::new(
        config.round.clone(),
        Arc::new(InMemoryConnectionManager::new()),
    );

    tokio::spawn(room::cleanup_task::start_cleanup_task(
        app_state.room_repository.clone(),
        config.cleanup.clone(),
    ));

    let app = Router::new()
        .route("/", get(|| async { "brainaim" }))
        .route("/room", post(room::create_room))
        .route("/room/:room_id", get(room::get_room))
        .route("/rooms", get(room::list_rooms))
        .route("/signal", post(signal::handlers::ingest_signal))
        .route("/sources", get(signal::handlers::list_sources))
        .route("/sources/:source_id", delete(signal::handlers::remove_source))
        .route("/ws/:room_id", get(websockets::websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Server running on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
