use std::{ops::ControlFlow, sync::Arc};

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{context::ServerContext, mpris::metadata::PositionSample};

use super::registry::ClientId;

/// Greeting sent to every new subscriber.
const WELCOME: &str = "Welcome to the WebSocket server!";

/// Upgrade handler for `/ws`.
pub async fn ws_handler(ws: WebSocketUpgrade, State(ctx): State<Arc<ServerContext>>) -> Response {
    ws.on_upgrade(move |socket| client_session(socket, ctx))
}

/// Drive one subscriber connection from accept to removal.
///
/// The welcome text and the current snapshot are written before the client
/// is registered, so no broadcast can reach it ahead of its initial state.
async fn client_session(socket: WebSocket, ctx: Arc<ServerContext>) {
    let (mut sink, mut stream) = socket.split();

    if sink.send(Message::Text(WELCOME.into())).await.is_err() {
        return;
    }
    let initial = ctx.current_json().await;
    if sink.send(Message::Text(initial.into())).await.is_err() {
        return;
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let id = ctx.registry.add(tx).await;

    loop {
        tokio::select! {
            queued = rx.recv() => match queued {
                Some(message) => {
                    let closing = matches!(message, Message::Close(_));
                    if sink.send(message).await.is_err() || closing {
                        break;
                    }
                }
                // registry dropped the slot
                None => break,
            },
            incoming = stream.next() => match incoming {
                Some(Ok(message)) => {
                    if handle_incoming(&ctx, id, message).await.is_break() {
                        break;
                    }
                }
                Some(Err(e)) => {
                    debug!("WebSocket error on client {id}: {e}");
                    break;
                }
                None => break,
            },
        }
    }

    ctx.registry.remove(id).await;
}

async fn handle_incoming(ctx: &ServerContext, id: ClientId, message: Message) -> ControlFlow<()> {
    match message {
        Message::Text(text) if text.as_str() == "ping" => {
            ctx.registry.mark_alive(id).await;
            let reply = ping_reply(ctx).await;
            ctx.registry.send_to(id, Message::Text(reply.into())).await;
            ControlFlow::Continue(())
        }
        Message::Text(_) | Message::Binary(_) => ControlFlow::Continue(()),
        // The transport answers pings itself; traffic in either direction
        // is proof of life.
        Message::Ping(_) | Message::Pong(_) => {
            ctx.registry.mark_alive(id).await;
            ControlFlow::Continue(())
        }
        Message::Close(_) => ControlFlow::Break(()),
    }
}

/// Reply for a client-level "ping" text frame: the live position when a
/// player is bound, plain "pong" otherwise or in the plain-pong variant.
async fn ping_reply(ctx: &ServerContext) -> String {
    if ctx.config.plain_pong {
        return "pong".to_string();
    }

    let Some(active) = ctx.active_player().await else {
        return "pong".to_string();
    };

    match active.proxy.position().await {
        Ok(position_us) => PositionSample::from_micros(position_us).to_json(),
        Err(e) => {
            warn!("Position read for ping reply failed: {e}");
            ctx.lose_connection().await;
            "pong".to_string()
        }
    }
}
