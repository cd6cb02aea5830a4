//! Error types for the player layer.

use cardtable_protocol::{ItemId, Zone};

/// Errors raised while mutating a player's table state.
///
/// Every operation validates before it mutates, so when one of these comes
/// back the player is exactly as it was before the call.
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    /// No battlefield item (or tray) has this id.
    #[error("unknown item id {0}")]
    UnknownItem(ItemId),

    /// An index past the end of a zone.
    #[error("index {index} out of range for {zone} of length {len}")]
    IndexOutOfRange { zone: Zone, index: usize, len: usize },

    /// The zone has no card to take.
    #[error("{0} is empty")]
    EmptyZone(Zone),

    /// The card is a hidden placeholder and can't be revealed.
    #[error("cannot reveal a hidden card from {0}")]
    HiddenCard(Zone),

    /// The operation needs a tray and the player has none.
    #[error("player has no tray")]
    NoTray,

    /// The item id is already registered for this player.
    #[error("item id {0} is already taken")]
    ItemIdTaken(ItemId),

    /// Every item id in the configured range is in use.
    #[error("no free item id left")]
    ItemIdsExhausted,

    /// The requested move is not allowed.
    #[error("invalid move: {0}")]
    InvalidMove(String),

    /// Moving onto the battlefield needs a position.
    #[error("a battlefield move needs a position")]
    MissingPosition,
}
