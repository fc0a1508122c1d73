//! HTTP boundary for the assistant core.
//!
//! A thin axum layer: routing, wire DTOs, input sanitation, and error
//! mapping. Everything stateful lives in the core; handlers only translate
//! between HTTP and the [`Assistant`](crate::agent::Assistant) API.

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use state::AppState;

use std::net::SocketAddr;

use axum::routing::{delete, get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::error::ShopkeepError;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(routes::chat))
        .route("/chat/stream", post(routes::chat_stream))
        .route("/session/{id}", delete(routes::delete_session))
        .route("/session/{id}/history", get(routes::session_history))
        .route("/sessions", get(routes::list_sessions))
        .route("/capabilities", get(routes::capabilities))
        .route("/health", get(routes::health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until shutdown.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<(), ShopkeepError> {
    let app = router(state);
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "assistant server ready to accept connections");
    axum::serve(listener, app).await?;
    Ok(())
}
