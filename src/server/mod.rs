/// Periodic liveness probing and eviction.
pub mod liveness;
/// Subscriber connection tracking and broadcast.
pub mod registry;
/// WebSocket upgrade and per-client sessions.
pub mod ws;

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::services::ServeDir;

use crate::context::ServerContext;

/// Build the HTTP router: the WebSocket endpoint plus the static browser UI.
pub fn router(ctx: Arc<ServerContext>) -> Router {
    let static_dir = ctx.config.static_dir.clone();

    Router::new()
        .route("/ws", get(ws::ws_handler))
        .fallback_service(ServeDir::new(static_dir))
        .with_state(ctx)
}
