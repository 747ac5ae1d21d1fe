//! Protocol decoding modules.
//!
//! - `wire`: bounded cursor, varints and tagged submessages shared by all
//!   packet bodies
//! - `game`: packet type resolution, per-type decoders and the dispatcher
//!
//! Decoders are pure functions of the payload slice and contain no I/O;
//! sources and the inspection layer handle files, logging and aggregation.

pub mod game;
pub mod wire;
