//! Game recording and playback for Cardtable.
//!
//! Two pieces:
//!
//! - [`Recorder`]: an append-only log of every inbound message, with the
//!   gzip replay file format (see the [`recorder`] module docs).
//! - [`Replay`]: a cursor over a recording that drives a [`ReplayTarget`]
//!   forward and backward in time.
//!
//! Replay never re-sends anything. The target is normally a room whose
//! local player is absent, so the recorded commands land on replicas only.
//!
//! # Example
//!
//! ```rust
//! use cardtable_replay::Recorder;
//!
//! let mut rec = Recorder::new("table@conference.example.org", "alice");
//! rec.record("bob", "[Setlife] 17");
//!
//! let text = rec.to_text();
//! let parsed = Recorder::parse_text(&text).unwrap();
//! assert_eq!(parsed.entries()[0].text, "[Setlife] 17");
//! ```

pub mod recorder;
mod error;
mod replay;

pub use error::ReplayError;
pub use recorder::{Entry, REPLAY_HEADER, Recorder};
pub use replay::{Replay, ReplayTarget};
