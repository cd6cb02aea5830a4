//! A comparable, serializable snapshot of what peers can see.

use std::collections::BTreeMap;

use cardtable_protocol::{ItemId, PlayerId};
use serde::Serialize;

use crate::{Player, Tray};

/// The publicly visible part of a player.
///
/// Hidden piles are reduced to counts and battlefield items are ordered by
/// id, so two replicas that converged compare equal even if their items
/// entered in a different order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub version: String,
    pub life: i32,
    pub library: usize,
    pub hand: usize,
    pub graveyard: Vec<String>,
    pub exile: Vec<String>,
    pub tray: Option<Tray>,
    pub battlefield: Vec<ItemView>,
}

/// One battlefield item in a [`PlayerView`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemView {
    pub item_id: ItemId,
    pub card: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub tapped: bool,
    pub flipped: bool,
    pub face_up: bool,
    pub counters: BTreeMap<String, i32>,
}

impl Player {
    /// Takes a snapshot of the visible state.
    pub fn view(&self) -> PlayerView {
        let mut battlefield: Vec<ItemView> = self
            .battlefield
            .iter()
            .map(|item| ItemView {
                item_id: item.item_id,
                card: item.card.id().to_string(),
                name: item.card.name().to_string(),
                x: item.x,
                y: item.y,
                tapped: item.tapped,
                flipped: item.flipped,
                face_up: item.face_up,
                counters: item.counters.clone(),
            })
            .collect();
        battlefield.sort_by_key(|item| item.item_id);

        PlayerView {
            id: self.id.clone(),
            version: self.version.clone(),
            life: self.life,
            library: self.library.len(),
            hand: self.hand.len(),
            graveyard: self.graveyard.iter().map(|card| card.id.clone()).collect(),
            exile: self.exile.iter().map(|card| card.id.clone()).collect(),
            tray: self.tray.clone().map(|tray| Tray { color: None, ..tray }),
            battlefield,
        }
    }
}
