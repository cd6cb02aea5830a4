//! Error types for the room layer.

use cardtable_player::PlayerError;
use cardtable_protocol::{PlayerId, ProtocolError};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// A player with this id is already at the table.
    #[error("player {0} is already at the table")]
    DuplicatePlayer(PlayerId),

    /// A local action was requested before [`Room::join`](crate::Room::join).
    #[error("no local player has joined the room")]
    NotJoined,

    /// Encoding an outbound batch failed, or the configuration holds a
    /// value that can't go on the wire.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A local action was rejected by the player state.
    #[error(transparent)]
    Player(#[from] PlayerError),

    /// The room actor's command channel is full or closed.
    #[error("room {0} is unavailable")]
    Unavailable(String),
}
