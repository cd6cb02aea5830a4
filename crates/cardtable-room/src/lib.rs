//! Room coordination for Cardtable.
//!
//! A room is one table: the local player, a replica for every peer, the
//! game log, and the recording. It routes each inbound batch to the
//! replica of whoever sent it and runs the `hello`/`welcome` handshake.
//!
//! # Key types
//!
//! - [`Room`]: the coordinator itself, plain synchronous state
//! - [`RoomHandle`] / [`spawn_room`]: the room as a Tokio actor
//! - [`RoomEvent`]: chat, log lines, and per-peer errors for the UI
//! - [`Logger`]: the human-readable game log
//! - [`RoomConfig`]: protocol version, join delay, recording, table rules
//!
//! A `Room` also implements [`ReplayTarget`](cardtable_replay::ReplayTarget),
//! so a recording can be played back into a fresh, never-joined room.

mod actor;
mod config;
mod error;
mod logger;
mod playback;
mod room;

pub use actor::{DEFAULT_CHANNEL_SIZE, RoomHandle, spawn_room};
pub use config::{JOIN_DELAY, RoomConfig, TRAY_COLOR};
pub use error::RoomError;
pub use logger::{Logger, describe};
pub use playback::RoomInverse;
pub use room::{Room, RoomEvent};
