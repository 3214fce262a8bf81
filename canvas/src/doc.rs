//! Document model: the committed path list, live peer paths, and history.
//!
//! `PathStore` owns the canvas content for one room: the committed paths in
//! insertion order (insertion order is z-order — later paths draw on top),
//! the in-progress paths of peers keyed by client id, and the local undo/redo
//! history. Remote events append or replace content but never create history
//! entries; history tracks only what the local client did, so undo/redo and
//! clear are strictly local operations that are never broadcast.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::BTreeMap;

use frames::Path;
use uuid::Uuid;

/// An operation the local client performed, revertible by `undo`.
#[derive(Debug, Clone)]
enum HistoryOp {
    /// A local commit; the path is found by id so remote paths that arrived
    /// afterwards are untouched.
    Commit(Uuid),
    /// A full clear, holding everything it removed.
    Clear(Vec<Path>),
}

/// An operation reverted by `undo`, re-appliable by `redo`.
#[derive(Debug, Clone)]
enum UndoneOp {
    /// The exact path object a commit-undo removed.
    Commit(Path),
    /// A clear that was undone; redo clears again.
    Clear,
}

/// In-memory store of canvas content for one room.
#[derive(Debug, Default)]
pub struct PathStore {
    committed: Vec<Path>,
    live: BTreeMap<String, Path>,
    undoable: Vec<HistoryOp>,
    undone: Vec<UndoneOp>,
}

impl PathStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Committed paths ---

    /// Commit a locally authored path. Clears the redo branch: new work
    /// invalidates it (linear history, no branching redo).
    pub fn commit(&mut self, path: Path) {
        self.undoable.push(HistoryOp::Commit(path.id));
        self.committed.push(path);
        self.undone.clear();
    }

    /// Append a path committed by a peer and drop that peer's live entry.
    /// Not undoable locally.
    pub fn apply_remote(&mut self, sender_id: &str, path: Path) {
        self.live.remove(sender_id);
        self.committed.push(path);
    }

    /// The committed paths in z-order.
    #[must_use]
    pub fn committed(&self) -> &[Path] {
        &self.committed
    }

    /// Remove a committed path by index (history-panel deletion). Local-only
    /// and outside the undo history; returns the removed path if the index
    /// was valid.
    pub fn remove_at(&mut self, index: usize) -> Option<Path> {
        if index < self.committed.len() {
            Some(self.committed.remove(index))
        } else {
            None
        }
    }

    /// Adopt a peer's bootstrap snapshot if it wins the coarse merge rule:
    /// our set is empty, or theirs is strictly larger. Returns whether the
    /// snapshot was adopted.
    pub fn adopt_if_larger(&mut self, incoming: Vec<Path>) -> bool {
        if self.committed.is_empty() || incoming.len() > self.committed.len() {
            self.committed = incoming;
            true
        } else {
            false
        }
    }

    // --- Live paths ---

    /// Upsert a peer's in-progress path.
    pub fn upsert_live(&mut self, sender_id: &str, path: Path) {
        self.live.insert(sender_id.into(), path);
    }

    /// Drop a peer's in-progress path (e.g. when the peer leaves).
    pub fn remove_live(&mut self, sender_id: &str) {
        self.live.remove(sender_id);
    }

    /// Live peer paths, keyed by client id, in deterministic key order.
    #[must_use]
    pub fn live(&self) -> &BTreeMap<String, Path> {
        &self.live
    }

    // --- History ---

    /// Revert the most recent local operation. A commit-undo removes its
    /// path; a clear-undo restores the whole cleared set beneath anything
    /// committed since. Returns whether anything changed.
    pub fn undo(&mut self) -> bool {
        match self.undoable.pop() {
            None => false,
            Some(HistoryOp::Commit(id)) => {
                // The path may be gone already (removed via the history
                // panel, or replaced wholesale by a bootstrap snapshot); the
                // op is spent either way.
                match self.committed.iter().rposition(|p| p.id == id) {
                    Some(pos) => {
                        let path = self.committed.remove(pos);
                        self.undone.push(UndoneOp::Commit(path));
                        true
                    }
                    None => false,
                }
            }
            Some(HistoryOp::Clear(mut paths)) => {
                paths.append(&mut self.committed);
                self.committed = paths;
                self.undone.push(UndoneOp::Clear);
                true
            }
        }
    }

    /// Re-apply the most recently undone operation. Returns whether anything
    /// changed.
    pub fn redo(&mut self) -> bool {
        match self.undone.pop() {
            None => false,
            Some(UndoneOp::Commit(path)) => {
                self.undoable.push(HistoryOp::Commit(path.id));
                self.committed.push(path);
                true
            }
            Some(UndoneOp::Clear) => {
                let paths = std::mem::take(&mut self.committed);
                self.undoable.push(HistoryOp::Clear(paths));
                true
            }
        }
    }

    /// Clear the whole canvas as a single undoable step. Returns whether
    /// anything was cleared.
    pub fn clear_all(&mut self) -> bool {
        if self.committed.is_empty() {
            return false;
        }
        let paths = std::mem::take(&mut self.committed);
        self.undoable.push(HistoryOp::Clear(paths));
        self.undone.clear();
        true
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undoable.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    /// Number of committed paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.committed.len()
    }

    /// Returns `true` if there are no committed paths.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }
}
