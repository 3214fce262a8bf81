//! Presence roster: who is in the room and where their cursor is.
//!
//! Collaborators are ephemeral — reconstructed entirely from presence
//! snapshots and cursor events, and dropped when a snapshot no longer lists
//! them. The local client never appears in its own roster.

#[cfg(test)]
#[path = "presence_test.rs"]
mod presence_test;

use std::collections::BTreeMap;

use frames::{Member, Point};

/// One remote participant.
#[derive(Debug, Clone, PartialEq)]
pub struct Collaborator {
    pub id: String,
    pub name: String,
    pub color: String,
    /// Last known cursor position, in world coordinates.
    pub cursor: Point,
}

impl Collaborator {
    fn from_member(member: &Member) -> Self {
        Self {
            id: member.id.clone(),
            name: member.name.clone(),
            color: member.color.clone(),
            cursor: Point::new(0.0, 0.0),
        }
    }
}

/// The set of currently known remote participants.
#[derive(Debug, Default)]
pub struct Roster {
    members: BTreeMap<String, Collaborator>,
}

impl Roster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the roster from a membership snapshot, excluding `self_id`.
    /// Cursor positions of members that were already known are preserved.
    pub fn sync(&mut self, members: &[Member], self_id: &str) {
        let mut next = BTreeMap::new();
        for member in members {
            if member.id == self_id {
                continue;
            }
            let mut collab = Collaborator::from_member(member);
            if let Some(known) = self.members.get(&member.id) {
                collab.cursor = known.cursor;
            }
            next.insert(member.id.clone(), collab);
        }
        self.members = next;
    }

    /// Upsert a collaborator's cursor from a `cursor-move` event. Creates the
    /// entry if the cursor arrives before the next presence snapshot.
    pub fn upsert_cursor(&mut self, id: &str, at: Point, color: &str, name: &str) {
        let entry = self.members.entry(id.into()).or_insert_with(|| Collaborator {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            cursor: at,
        });
        entry.cursor = at;
        entry.color = color.into();
        entry.name = name.into();
    }

    /// Remove one participant (e.g. the roster owner saw them leave).
    pub fn remove(&mut self, id: &str) {
        self.members.remove(id);
    }

    /// All known collaborators, in stable id order.
    pub fn iter(&self) -> impl Iterator<Item = &Collaborator> {
        self.members.values()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Collaborator> {
        self.members.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
