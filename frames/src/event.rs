//! Event taxonomy and JSON codec for the room broadcast channel.
//!
//! Every websocket text message is one [`Event`], serialized as
//! `{"event": "<name>", "payload": {...}}`. The relay forwards events
//! verbatim to room peers (never back to the sender); only
//! `presence-announce` is absorbed by the relay, which answers with a fresh
//! `presence-sync` snapshot to the whole room.
//!
//! There are no acknowledgements, retries, or cross-publisher ordering
//! guarantees. A frame that fails to decode is dropped by the receiver.

#[cfg(test)]
#[path = "event_test.rs"]
mod event_test;

use serde::{Deserialize, Serialize};

use crate::path::{Path, Point};

/// Error returned by [`decode`].
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The text is not a well-formed event frame (bad JSON, unknown event
    /// name, unknown tool tag, wrong payload shape).
    #[error("failed to decode event frame: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Presence record for one participant, as carried on the wire.
///
/// Cursor position is not part of the record — it travels separately via
/// [`Event::CursorMove`] so that membership churn and cursor chatter stay
/// independent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub color: String,
}

/// A single message on the room broadcast channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum Event {
    /// A peer committed a path. Receivers append it to the committed set and
    /// drop any live entry for the sender.
    Draw {
        path: Path,
        #[serde(rename = "senderId")]
        sender_id: String,
    },
    /// A peer's path is still in progress. Receivers upsert it into the live
    /// map keyed by sender.
    DrawProgress {
        path: Path,
        #[serde(rename = "senderId")]
        sender_id: String,
    },
    /// A peer's cursor moved. Coordinates are world-space.
    CursorMove {
        #[serde(rename = "senderId")]
        sender_id: String,
        x: f64,
        y: f64,
        color: String,
        name: String,
    },
    /// A newly joined peer asks for the current canvas. Any peer holding a
    /// non-empty committed set may answer after a randomized delay.
    RequestState {
        #[serde(rename = "senderId")]
        sender_id: String,
    },
    /// Bootstrap reply: the sender's full committed set. Receivers adopt it
    /// only if their own set is empty or strictly smaller.
    SyncState {
        paths: Vec<Path>,
        #[serde(rename = "senderId")]
        sender_id: String,
    },
    /// Client → relay: announce or refresh the sender's member record.
    /// Re-announcing with a new id is identity continuity (e.g. after
    /// login), not a new participant.
    PresenceAnnounce { member: Member },
    /// Relay → clients: full membership snapshot. Receivers rebuild their
    /// collaborator set from it, minus themselves.
    PresenceSync { members: Vec<Member> },
}

impl Event {
    /// The sender id carried by the event, if it has one.
    #[must_use]
    pub fn sender_id(&self) -> Option<&str> {
        match self {
            Self::Draw { sender_id, .. }
            | Self::DrawProgress { sender_id, .. }
            | Self::CursorMove { sender_id, .. }
            | Self::RequestState { sender_id }
            | Self::SyncState { sender_id, .. } => Some(sender_id),
            Self::PresenceAnnounce { member } => Some(&member.id),
            Self::PresenceSync { .. } => None,
        }
    }

    /// Convenience constructor for a cursor event.
    #[must_use]
    pub fn cursor(member: &Member, at: Point) -> Self {
        Self::CursorMove {
            sender_id: member.id.clone(),
            x: at.x,
            y: at.y,
            color: member.color.clone(),
            name: member.name.clone(),
        }
    }
}

/// Encode an event to its wire JSON.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] if serialization fails; with this event
/// shape that cannot happen in practice.
pub fn encode(event: &Event) -> Result<String, CodecError> {
    Ok(serde_json::to_string(event)?)
}

/// Decode one wire frame.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] for malformed JSON, unknown event names,
/// unknown tool tags, or payloads of the wrong shape.
pub fn decode(text: &str) -> Result<Event, CodecError> {
    Ok(serde_json::from_str(text)?)
}
