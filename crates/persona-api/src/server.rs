//! Router assembly and the API daemon loop.

use crate::routes::{self, AppState};
use axum::routing::{get, post};
use axum::Router;
use persona_kernel::PersonaKernel;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the API router around a booted kernel.
pub fn build_router(kernel: Arc<PersonaKernel>) -> Router {
    let state = Arc::new(AppState { kernel });

    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/memories", post(routes::store_memory))
        .route("/api/memories/retrieve", post(routes::retrieve_memories))
        .route(
            "/api/users/{user_id}/memories",
            get(routes::list_user_memories),
        )
        .route("/api/tools", get(routes::list_tools))
        .route("/api/tools/{name}", post(routes::run_tool))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Serve the API on `listen_addr` until Ctrl+C.
pub async fn run_daemon(kernel: Arc<PersonaKernel>, listen_addr: &str) -> std::io::Result<()> {
    let addr: SocketAddr = listen_addr.parse().map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("invalid listen address '{listen_addr}': {e}"),
        )
    })?;

    let app = build_router(kernel);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Persona API listening on http://{}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Persona API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
