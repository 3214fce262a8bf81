//! Session engine: the state machine between input events and effects.
//!
//! `EngineCore` owns one room's worth of client state — document, camera,
//! roster, brush, gesture — and is strictly sans-IO so it can be tested
//! without a socket or a window. Every entry point returns a list of
//! [`Action`]s for the host to execute: publish a frame, redraw, or start a
//! timer. Commits are optimistic and local-first; the broadcast is
//! best-effort fan-out, so a dropped publish loses only the remote view of
//! that frame, never local state.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use frames::{BrushSettings, Event, Member, Path, Point, Tool};
use rand::Rng;

use crate::camera::{Camera, wheel_zoom_factor};
use crate::consts::{ICON_BASE_SIZE, PUBLISH_THROTTLE_MS, SYNC_REPLY_MAX_DELAY_MS};
use crate::doc::PathStore;
use crate::input::{ActiveTool, Button, InputState, Modifiers, WheelDelta};
use crate::presence::Roster;

/// Effects returned from engine entry points for the host to execute.
#[derive(Debug, Clone)]
pub enum Action {
    /// Broadcast a `draw` frame with this committed path.
    PublishCommit(Path),
    /// Broadcast a `draw-progress` frame with the in-progress path.
    PublishProgress(Path),
    /// Broadcast a `cursor-move` frame at this world position.
    PublishCursor(Point),
    /// Announce (or re-announce) the local member record.
    PublishPresence(Member),
    /// Ask peers for the current canvas state.
    PublishStateRequest,
    /// Answer a peer's state request with the full committed set.
    PublishStateReply(Vec<Path>),
    /// Start a one-shot timer; when it fires, call
    /// [`EngineCore::state_reply`] and execute what it returns.
    ScheduleStateReply { delay_ms: u64 },
    /// Redraw the whole scene.
    RenderFull,
    /// Stroke just the newest freehand segment.
    RenderSegment { from: Point, to: Point },
}

/// The local client's identity. The id may be swapped once post-login
/// (identity continuity), never otherwise.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub color: String,
}

/// Core client state for one room.
pub struct EngineCore {
    pub doc: PathStore,
    pub camera: Camera,
    pub roster: Roster,
    pub tool: ActiveTool,
    pub brush: BrushSettings,
    pub input: InputState,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub dpr: f64,
    identity: Identity,
    current: Option<Path>,
    last_publish_ms: f64,
}

impl EngineCore {
    #[must_use]
    pub fn new(identity: Identity) -> Self {
        Self {
            doc: PathStore::new(),
            camera: Camera::default(),
            roster: Roster::new(),
            tool: ActiveTool::default(),
            brush: BrushSettings::default(),
            input: InputState::Idle,
            viewport_width: 0.0,
            viewport_height: 0.0,
            dpr: 1.0,
            identity,
            current: None,
            last_publish_ms: f64::NEG_INFINITY,
        }
    }

    // --- Queries ---

    /// The local identity.
    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// The local member record as announced to peers.
    #[must_use]
    pub fn member(&self) -> Member {
        Member {
            id: self.identity.id.clone(),
            name: self.identity.name.clone(),
            color: self.identity.color.clone(),
        }
    }

    /// The locally in-progress path, if a drawing gesture is active.
    #[must_use]
    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_ref()
    }

    // --- Session lifecycle ---

    /// The join sequence, run once the channel subscription is confirmed:
    /// announce ourselves, then ask peers for the canvas.
    #[must_use]
    pub fn channel_subscribed(&self) -> Vec<Action> {
        vec![
            Action::PublishPresence(self.member()),
            Action::PublishStateRequest,
        ]
    }

    /// Swap in a post-login identity without disturbing canvas or history,
    /// and re-announce so peers update the same participant.
    pub fn set_identity(&mut self, id: String, name: String) -> Vec<Action> {
        self.identity.id = id;
        self.identity.name = name;
        vec![Action::PublishPresence(self.member())]
    }

    // --- Settings ---

    pub fn set_tool(&mut self, tool: ActiveTool) {
        self.tool = tool;
    }

    pub fn set_brush(&mut self, brush: BrushSettings) {
        self.brush = brush;
    }

    /// Update viewport dimensions (CSS pixels) and device pixel ratio.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.viewport_width = width_css;
        self.viewport_height = height_css;
        self.dpr = dpr;
    }

    // --- Pointer events ---

    /// Pointer pressed. Select tool and middle button pan; everything else
    /// starts a new path seeded from the brush settings.
    pub fn on_pointer_down(&mut self, screen: Point, button: Button) -> Vec<Action> {
        if button == Button::Secondary {
            return Vec::new();
        }
        if button == Button::Middle || self.tool == ActiveTool::Select {
            self.input = InputState::Panning { last_screen: screen };
            return Vec::new();
        }
        let ActiveTool::Draw(tool) = self.tool else {
            return Vec::new();
        };
        if tool == Tool::Icon {
            // Icon stamps are placed via [`Self::insert_icon`], not dragged.
            return Vec::new();
        }
        let world = self.camera.screen_to_world(screen);
        self.current = Some(Path::begin(tool, world, &self.brush));
        self.input = InputState::Drawing { start_world: world };
        Vec::new()
    }

    /// Pointer moved. Pans, extends the in-progress path, or just reports the
    /// cursor, depending on the active gesture. `now_ms` is the host clock
    /// used to throttle publishes to one per frame interval.
    pub fn on_pointer_move(&mut self, screen: Point, now_ms: f64) -> Vec<Action> {
        match self.input {
            InputState::Panning { last_screen } => {
                self.camera.pan_by(screen.x - last_screen.x, screen.y - last_screen.y);
                self.input = InputState::Panning { last_screen: screen };
                vec![Action::RenderFull]
            }
            InputState::Drawing { start_world } => {
                let world = self.camera.screen_to_world(screen);
                let Some(current) = self.current.as_mut() else {
                    return Vec::new();
                };
                let mut actions = Vec::new();
                if current.tool.is_shape() {
                    // Shapes rubber-band: only start and end matter, and the
                    // previous preview frame must be erased.
                    current.points = vec![start_world, world];
                    actions.push(Action::RenderFull);
                } else {
                    let from = current.points.last().copied().unwrap_or(world);
                    current.points.push(world);
                    actions.push(Action::RenderSegment { from, to: world });
                }
                if self.publish_gate(now_ms) {
                    if let Some(current) = self.current.as_ref() {
                        actions.push(Action::PublishProgress(current.clone()));
                    }
                    actions.push(Action::PublishCursor(world));
                }
                actions
            }
            InputState::Idle => {
                let world = self.camera.screen_to_world(screen);
                if self.publish_gate(now_ms) {
                    vec![Action::PublishCursor(world)]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Pointer released (or left the canvas). Commits the in-progress path
    /// unless it is a degenerate shape, and auto-switches shape tools back to
    /// pencil so a second click doesn't stamp another shape.
    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        match std::mem::take(&mut self.input) {
            InputState::Idle | InputState::Panning { .. } => Vec::new(),
            InputState::Drawing { .. } => {
                let Some(path) = self.current.take() else {
                    return Vec::new();
                };
                let was_shape = path.tool.is_shape();
                let mut actions = Vec::new();
                if path.is_degenerate() {
                    // A preview may be on screen; erase it.
                    actions.push(Action::RenderFull);
                } else {
                    self.doc.commit(path.clone());
                    actions.push(Action::PublishCommit(path));
                    actions.push(Action::RenderFull);
                }
                if was_shape {
                    self.tool = ActiveTool::Draw(Tool::Pencil);
                }
                actions
            }
        }
    }

    /// Wheel input: ctrl/cmd zooms about the cursor, otherwise scrolls the
    /// view.
    pub fn on_wheel(&mut self, screen: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        if modifiers.zoom_chord() {
            self.camera.zoom_at(screen, wheel_zoom_factor(delta.dy));
        } else {
            self.camera.pan_by(-delta.dx, -delta.dy);
        }
        vec![Action::RenderFull]
    }

    // --- Direct operations ---

    /// Stamp an icon at the world point under the viewport center and commit
    /// it like any other path.
    pub fn insert_icon(&mut self, name: &str) -> Vec<Action> {
        let center = Point::new(self.viewport_width / 2.0, self.viewport_height / 2.0);
        let anchor = self.camera.screen_to_world(center);
        let path = Path::icon_stamp(name, anchor, &self.brush.color, ICON_BASE_SIZE);
        self.doc.commit(path.clone());
        vec![Action::PublishCommit(path), Action::RenderFull]
    }

    /// Undo the most recent local operation. Local-only: peers are not told.
    pub fn undo(&mut self) -> Vec<Action> {
        if self.doc.undo() { vec![Action::RenderFull] } else { Vec::new() }
    }

    /// Redo the most recently undone operation. Local-only.
    pub fn redo(&mut self) -> Vec<Action> {
        if self.doc.redo() { vec![Action::RenderFull] } else { Vec::new() }
    }

    /// Clear the canvas as one undoable step. Local-only.
    pub fn clear_all(&mut self) -> Vec<Action> {
        if self.doc.clear_all() { vec![Action::RenderFull] } else { Vec::new() }
    }

    /// Delete one committed path by index (history panel). Local-only.
    pub fn remove_path_at(&mut self, index: usize) -> Vec<Action> {
        if self.doc.remove_at(index).is_some() {
            vec![Action::RenderFull]
        } else {
            Vec::new()
        }
    }

    // --- Inbound channel events ---

    /// Apply one inbound event. Malformed content makes the event a no-op —
    /// a single bad peer must never corrupt the local session.
    pub fn apply_event(&mut self, event: Event) -> Vec<Action> {
        match event {
            Event::Draw { path, sender_id } => self.apply_draw(&sender_id, path),
            Event::DrawProgress { path, sender_id } => self.apply_progress(&sender_id, path),
            Event::CursorMove { sender_id, x, y, color, name } => {
                self.apply_cursor(&sender_id, x, y, &color, &name)
            }
            Event::RequestState { sender_id } => self.apply_state_request(&sender_id),
            Event::SyncState { paths, sender_id } => self.apply_sync_state(&sender_id, paths),
            // Announces are absorbed by the relay; only snapshots come back.
            Event::PresenceAnnounce { .. } => Vec::new(),
            Event::PresenceSync { members } => self.apply_presence_sync(&members),
        }
    }

    fn apply_draw(&mut self, sender_id: &str, path: Path) -> Vec<Action> {
        if sender_id == self.identity.id || !path.is_well_formed() {
            return Vec::new();
        }
        self.doc.apply_remote(sender_id, path);
        vec![Action::RenderFull]
    }

    fn apply_progress(&mut self, sender_id: &str, path: Path) -> Vec<Action> {
        if sender_id == self.identity.id || !path.is_well_formed() {
            return Vec::new();
        }
        self.doc.upsert_live(sender_id, path);
        vec![Action::RenderFull]
    }

    fn apply_cursor(&mut self, sender_id: &str, x: f64, y: f64, color: &str, name: &str) -> Vec<Action> {
        if sender_id == self.identity.id || !x.is_finite() || !y.is_finite() {
            return Vec::new();
        }
        self.roster.upsert_cursor(sender_id, Point::new(x, y), color, name);
        Vec::new()
    }

    fn apply_state_request(&mut self, sender_id: &str) -> Vec<Action> {
        if sender_id == self.identity.id || self.doc.is_empty() {
            return Vec::new();
        }
        // Randomized delay spreads replies across holders so a join doesn't
        // cause a reply storm.
        let delay_ms = rand::rng().random_range(0..=SYNC_REPLY_MAX_DELAY_MS);
        vec![Action::ScheduleStateReply { delay_ms }]
    }

    /// Called by the host when a scheduled reply timer fires. Re-checks the
    /// canvas: a clear may have emptied it while the timer ran.
    #[must_use]
    pub fn state_reply(&self) -> Vec<Action> {
        if self.doc.is_empty() {
            return Vec::new();
        }
        vec![Action::PublishStateReply(self.doc.committed().to_vec())]
    }

    fn apply_sync_state(&mut self, sender_id: &str, paths: Vec<Path>) -> Vec<Action> {
        if sender_id == self.identity.id {
            return Vec::new();
        }
        let paths: Vec<Path> = paths.into_iter().filter(Path::is_well_formed).collect();
        if self.doc.adopt_if_larger(paths) {
            vec![Action::RenderFull]
        } else {
            Vec::new()
        }
    }

    fn apply_presence_sync(&mut self, members: &[Member]) -> Vec<Action> {
        self.roster.sync(members, &self.identity.id);
        // Departed peers take their live previews with them.
        let departed: Vec<String> = self
            .doc
            .live()
            .keys()
            .filter(|id| !members.iter().any(|m| &m.id == *id))
            .cloned()
            .collect();
        let any_departed = !departed.is_empty();
        for id in departed {
            self.doc.remove_live(&id);
        }
        if any_departed { vec![Action::RenderFull] } else { Vec::new() }
    }

    /// One publish per frame interval: returns true and arms the gate if
    /// enough time has passed since the last publish.
    fn publish_gate(&mut self, now_ms: f64) -> bool {
        if now_ms - self.last_publish_ms >= PUBLISH_THROTTLE_MS {
            self.last_publish_ms = now_ms;
            true
        } else {
            false
        }
    }
}
