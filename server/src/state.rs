//! Shared relay state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the live rooms: each room maps connection ids to an outbound frame
//! sender and to the member record that connection announced. The relay
//! stores no canvas content — canvas state lives only in clients, and late
//! joiners bootstrap from peers, so a room is nothing but its connections.
//!
//! Rooms are created on first join and torn down when the last connection
//! leaves.

use std::collections::HashMap;
use std::sync::Arc;

use frames::Member;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

/// Per-room live state.
#[derive(Default)]
pub struct RoomState {
    /// Connected clients: connection id → sender for outbound frames.
    pub clients: HashMap<Uuid, mpsc::Sender<String>>,
    /// Member record per connection, set by `presence-announce`.
    pub members: HashMap<Uuid, Member>,
}

impl RoomState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The membership snapshot broadcast to the room, in stable id order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Member> {
        let mut members: Vec<Member> = self.members.values().cloned().collect();
        members.sort_by(|a, b| a.id.cmp(&b.id));
        members
    }
}

/// Shared application state. Clone is required by Axum — the rooms map is
/// behind an `Arc`.
#[derive(Clone, Default)]
pub struct AppState {
    pub rooms: Arc<RwLock<HashMap<String, RoomState>>>,
}

impl AppState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection with a room, creating the room if needed.
    pub async fn join(&self, room: &str, conn_id: Uuid, tx: mpsc::Sender<String>) {
        let mut rooms = self.rooms.write().await;
        rooms.entry(room.into()).or_default().clients.insert(conn_id, tx);
    }

    /// Store or replace the member record a connection announced. Replacing
    /// is identity continuity: the same connection re-announcing (e.g. after
    /// login) stays one participant.
    pub async fn announce(&self, room: &str, conn_id: Uuid, member: Member) {
        let mut rooms = self.rooms.write().await;
        if let Some(state) = rooms.get_mut(room) {
            state.members.insert(conn_id, member);
        }
    }

    /// Remove a connection; drops the room entirely when it was the last
    /// one. Returns `true` while the room still exists.
    pub async fn leave(&self, room: &str, conn_id: Uuid) -> bool {
        let mut rooms = self.rooms.write().await;
        let Some(state) = rooms.get_mut(room) else {
            return false;
        };
        state.clients.remove(&conn_id);
        state.members.remove(&conn_id);
        if state.clients.is_empty() {
            rooms.remove(room);
            false
        } else {
            true
        }
    }

    /// The room's current membership snapshot.
    pub async fn snapshot(&self, room: &str) -> Vec<Member> {
        let rooms = self.rooms.read().await;
        rooms.get(room).map(RoomState::snapshot).unwrap_or_default()
    }

    /// Fan a frame out to every room client except `exclude`. Slow or gone
    /// receivers are skipped rather than awaited — a relay must never stall
    /// the room on one client.
    pub async fn broadcast(&self, room: &str, text: &str, exclude: Option<Uuid>) {
        let rooms = self.rooms.read().await;
        let Some(state) = rooms.get(room) else {
            return;
        };
        for (conn_id, tx) in &state.clients {
            if Some(*conn_id) == exclude {
                continue;
            }
            if let Err(e) = tx.try_send(text.to_owned()) {
                tracing::warn!(%conn_id, error = %e, "relay: dropping frame for client");
            }
        }
    }
}
