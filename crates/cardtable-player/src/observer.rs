//! Change notifications.
//!
//! A [`PlayerObserver`] is told about every visible change to a player's
//! table, whether it came from a local action or a remote command. A UI
//! repaints from these; the room forwards them. All methods default to
//! doing nothing.

use cardtable_protocol::{ItemId, PlayerId, Zone};

use crate::{BattlefieldItem, Tray};

/// Receives change notifications from a [`Player`](crate::Player).
pub trait PlayerObserver: Send + Sync {
    /// The contents or count of a pile changed.
    fn zone_updated(&self, _player: &PlayerId, _zone: Zone) {}

    /// Life points changed.
    fn life_updated(&self, _player: &PlayerId, _life: i32) {}

    /// An item entered the battlefield.
    fn item_entered(&self, _player: &PlayerId, _item: &BattlefieldItem) {}

    /// An item moved, was tapped, flipped, turned over, or had counters set.
    fn item_changed(&self, _player: &PlayerId, _item: &BattlefieldItem) {}

    /// An item left the battlefield.
    fn item_removed(&self, _player: &PlayerId, _item: ItemId) {}

    /// The tray was created, replaced, or removed (`None`).
    fn tray_changed(&self, _player: &PlayerId, _tray: Option<&Tray>) {}
}

/// Ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl PlayerObserver for NullObserver {}
