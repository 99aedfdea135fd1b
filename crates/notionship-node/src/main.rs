//! # Notionship Node
//!
//! Serves one outline editing session over HTTP and WebSocket.

use std::time::Duration;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod api;
mod config;
mod engine;
mod state;

use config::NodeConfig;
use state::AppState;

/// How long to wait for pending saves on shutdown.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Run the node until interrupted.
pub async fn run_server(config: NodeConfig) -> anyhow::Result<()> {
    let (state, writer) = AppState::bootstrap(&config).await;
    let app = create_router(state.clone());

    info!("Listening on http://{}", config.addr);

    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Open WebSocket tasks may still hold the state; release the persister
    // explicitly so the writer drains and exits.
    state.shutdown().await;
    drop(state);

    match tokio::time::timeout(FLUSH_TIMEOUT, writer).await {
        Ok(Ok(())) => info!("Pending saves flushed"),
        Ok(Err(e)) => warn!("Persister task failed: {}", e),
        Err(_) => warn!("Timed out waiting for pending saves"),
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// Create the API router.
pub(crate) fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(api::health::health_check))

        // Document API
        .route("/api/v1/document", get(api::document::get_document))
        .route("/api/v1/command", post(api::document::apply_command))
        .route("/api/v1/key", post(api::document::apply_key))
        .route("/api/v1/rows", post(api::document::append_row))
        .route("/api/v1/rows/:id/text", put(api::document::set_text))
        .route("/api/v1/rows/:id/checked", put(api::document::set_checked))
        .route("/api/v1/positions/:index/indent", post(api::document::reindent))
        .route("/api/v1/positions/:index", delete(api::document::remove_row))
        .route("/api/v1/clear", post(api::document::clear))

        // WebSocket endpoints
        .route("/ws/document", get(api::ws::document_stream))

        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Notionship node starting...");

    run_server(NodeConfig::from_env()).await
}
