//! WebSocket upgrade handler.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{error, info, warn};

use letstalk_core::types::id::UserId;

use crate::state::AppState;

/// Query parameters for the WebSocket upgrade.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// JWT access token. Optional: a missing or invalid token yields an
    /// anonymous session that is served but never tracked by presence.
    pub token: Option<String>,
}

/// GET /ws?token={jwt} — WebSocket upgrade.
pub async fn ws_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
) -> Response {
    let user_id: Option<UserId> = query.token.as_deref().and_then(|token| {
        match state.jwt_decoder.decode(token) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(error = %e, "Rejecting token, serving session as anonymous");
                None
            }
        }
    });

    ws.on_upgrade(move |socket| handle_ws_connection(state, user_id, socket))
}

/// Handles an established WebSocket connection.
async fn handle_ws_connection(state: AppState, user_id: Option<UserId>, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (ctx, mut outbound_rx) = state.realtime.open_session(user_id);
    state.realtime.router.on_connect(&ctx).await;

    let conn_id = ctx.connection_id();
    info!(conn_id = %conn_id, user_id = ?user_id, "WebSocket connection established");

    // Forward outbound events onto the socket.
    let outbound_task = tokio::spawn(async move {
        while let Some(event) = outbound_rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(t) => t,
                Err(e) => {
                    error!(error = %e, "Failed to serialize outbound event");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // Serialized per-connection inbound stream.
    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Text(text)) => {
                state.realtime.router.handle_frame(&ctx, text.as_str()).await;
                // An explicit `end` marks the handle dead; close the socket.
                if !ctx.handle.is_alive() {
                    break;
                }
            }
            Ok(Message::Close(_)) => {
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    // Cleanup backstop: runs on every exit path, explicit `end` or not.
    outbound_task.abort();
    state.realtime.router.on_disconnect(&ctx).await;

    info!(conn_id = %conn_id, "WebSocket connection closed");
}
