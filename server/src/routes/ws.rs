//! WebSocket handler — room-scoped broadcast relay.
//!
//! DESIGN
//! ======
//! The relay is deliberately dumb: it owns no canvas state and performs no
//! merge. On upgrade, the connection joins the room named in the query and
//! enters a `select!` loop:
//! - Inbound client frames → decoded (malformed frames are logged and
//!   dropped so one bad peer cannot poison a room), then either absorbed
//!   (`presence-announce`) or fanned out verbatim to room peers.
//! - Frames broadcast by peers → forwarded to this client.
//!
//! Frames are never echoed back to their sender. `presence-announce` updates
//! the member record for this connection and triggers a fresh
//! `presence-sync` snapshot to the whole room (sender included — it needs
//! the roster too). Disconnecting removes the member and rebroadcasts the
//! snapshot; the last client out tears the room down.

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::state::AppState;

/// Outbound queue depth per connection. A client that falls this far behind
/// starts losing frames rather than stalling the room.
const CLIENT_QUEUE: usize = 256;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    room: String,
}

pub async fn handle_ws(
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
    ws: WebSocketUpgrade,
) -> Response {
    if params.room.is_empty() {
        return (StatusCode::BAD_REQUEST, "room required").into_response();
    }
    ws.on_upgrade(move |socket| run_ws(socket, state, params.room))
}

async fn run_ws(mut socket: WebSocket, state: AppState, room: String) {
    let conn_id = Uuid::new_v4();
    let (client_tx, mut client_rx) = mpsc::channel::<String>(CLIENT_QUEUE);

    state.join(&room, conn_id, client_tx).await;
    info!(%conn_id, room, "ws: client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        handle_inbound(&state, &room, conn_id, &text).await;
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(text) = client_rx.recv() => {
                if socket.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        }
    }

    let room_alive = state.leave(&room, conn_id).await;
    if room_alive {
        broadcast_presence(&state, &room).await;
    }
    info!(%conn_id, room, room_alive, "ws: client disconnected");
}

/// Decode and route one inbound text frame.
///
/// Split from the socket loop so relay behavior is testable without a live
/// websocket.
async fn handle_inbound(state: &AppState, room: &str, conn_id: Uuid, text: &str) {
    let event = match frames::decode(text) {
        Ok(event) => event,
        Err(e) => {
            warn!(%conn_id, room, error = %e, "ws: dropping malformed frame");
            return;
        }
    };

    match event {
        frames::Event::PresenceAnnounce { member } => {
            info!(%conn_id, room, member_id = %member.id, "ws: presence announce");
            state.announce(room, conn_id, member).await;
            broadcast_presence(state, room).await;
        }
        // Everything else is relayed verbatim; content was validated only as
        // far as "decodes as a known event". Clients do their own payload
        // validation.
        _ => state.broadcast(room, text, Some(conn_id)).await,
    }
}

/// Broadcast the room's membership snapshot to every client in it.
async fn broadcast_presence(state: &AppState, room: &str) {
    let members = state.snapshot(room).await;
    let event = frames::Event::PresenceSync { members };
    match frames::encode(&event) {
        Ok(text) => state.broadcast(room, &text, None).await,
        Err(e) => warn!(room, error = %e, "ws: presence snapshot encode failed"),
    }
}
