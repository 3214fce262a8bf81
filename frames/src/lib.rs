//! Shared wire model for the realtime drawing channel.
//!
//! This crate owns the representation used by both `server` and `cli` (and by
//! the `canvas` engine, which applies inbound events): the path/tool data
//! model with its geometry rules, and the event taxonomy with its JSON codec.
//! Keeping the model here means the relay, the engine, and any host agree on
//! exactly one wire shape.

pub mod event;
pub mod path;

pub use event::{CodecError, Event, Member, decode, encode};
pub use path::{
    ARROW_HEAD_ANGLE, ARROW_HEAD_LEN, Bounds, BrushSettings, Path, Point, Tool,
};
