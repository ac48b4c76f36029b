//! Router setup with all API routes and middleware.
//!
//! Configures the axum Router with permissive CORS (the browser client may
//! be served from any origin), request tracing, and a body limit sized for
//! chat messages.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(handlers::chat))
        .route("/agora-token", get(handlers::agora_token))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(64 * 1024)) // chat messages are small
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server on the configured port.
///
/// Binds to 127.0.0.1 (localhost only).
pub async fn start_server(port: u16, state: AppState) -> Result<(), mindease_core::MindEaseError> {
    let addr = format!("127.0.0.1:{}", port);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| mindease_core::MindEaseError::Api(format!("Failed to bind: {}", e)))?;

    tracing::info!(addr = %addr, "API server listening");

    axum::serve(listener, router)
        .await
        .map_err(|e| mindease_core::MindEaseError::Api(format!("Server error: {}", e)))?;

    Ok(())
}
