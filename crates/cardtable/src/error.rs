//! Unified error type for Cardtable.

use cardtable_player::PlayerError;
use cardtable_protocol::ProtocolError;
use cardtable_replay::ReplayError;
use cardtable_room::RoomError;
use cardtable_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `cardtable` facade you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant lets `?` convert sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum CardtableError {
    /// The in-process hub failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A group channel implementation failed.
    #[error("channel error: {0}")]
    Channel(String),

    /// Encoding or decoding a command failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A local action was rejected.
    #[error(transparent)]
    Player(#[from] PlayerError),

    /// Loading or seeking a replay failed.
    #[error(transparent)]
    Replay(#[from] ReplayError),

    /// The room rejected an operation or its actor is gone.
    #[error(transparent)]
    Room(#[from] RoomError),
}
