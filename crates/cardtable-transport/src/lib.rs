//! Transport abstraction layer for Cardtable.
//!
//! Cardtable does not own its network. Games are played inside a group chat
//! room (any service with multi-user rooms will do), and every participant's
//! commands travel as ordinary text messages in that room. This crate defines
//! the narrow seam the rest of the workspace talks to:
//!
//! - [`GroupChannel`]: send a text message to the room, receive the next
//!   [`ChannelEvent`] (a message or a presence change).
//! - [`LocalHub`] / [`LocalChannel`]: an in-process room used by tests and
//!   local play.
//!
//! # Ordering
//!
//! Implementations must deliver messages from one sender in the order they
//! were sent. Nothing is assumed about ordering across senders.
//!
//! # Feature Flags
//!
//! - `local` (default): the in-process [`LocalHub`]

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "local")]
mod local;

pub use error::TransportError;
#[cfg(feature = "local")]
pub use local::{LocalChannel, LocalHub};

/// Something that happened in the group channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// A text message from `sender`. Every member receives every message,
    /// including the sender itself.
    Message { sender: String, text: String },

    /// A user entered the room.
    Joined(String),

    /// A user left the room.
    Left(String),
}

/// A joined group chat room that can send and receive text.
pub trait GroupChannel: Send + Sync + 'static {
    /// The error type for channel operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends a text message to every member of the room.
    async fn send(&self, text: &str) -> Result<(), Self::Error>;

    /// Receives the next event from the room.
    ///
    /// Returns `Ok(None)` when the channel is cleanly closed.
    async fn recv(&self) -> Result<Option<ChannelEvent>, Self::Error>;

    /// Leaves the room.
    async fn leave(&self) -> Result<(), Self::Error>;

    /// Returns the stable identity this client is known by in the room.
    fn identity(&self) -> &str;
}
