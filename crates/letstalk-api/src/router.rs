//! Route table assembly.

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{health, roster, ws};
use crate::state::AppState;

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/api/health", get(health::health))
        .route("/api/health/detailed", get(health::health_detailed))
        .route("/api/users", get(roster::get_users))
        .route("/api/friends", get(roster::get_friends))
        .route("/api/friend-requests", get(roster::get_friend_requests))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
