//! Cards, tokens, and the things that sit on the table.

use std::collections::BTreeMap;

use cardtable_protocol::ItemId;
use serde::{Deserialize, Serialize};

/// A card, identified by its database id.
///
/// Two copies of the same card in a deck are equal; the zone and index
/// are what tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
}

impl Card {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A token. Tokens only exist on the battlefield.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    pub description: String,
}

/// What a battlefield item shows: a card or a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CardRef {
    Card(Card),
    Token(Token),
}

impl CardRef {
    /// The database id sent in `enter`.
    pub fn id(&self) -> &str {
        match self {
            Self::Card(card) => &card.id,
            Self::Token(token) => &token.id,
        }
    }

    /// The display name sent in `enter`.
    pub fn name(&self) -> &str {
        match self {
            Self::Card(card) => &card.name,
            Self::Token(token) => &token.description,
        }
    }

    pub fn is_token(&self) -> bool {
        matches!(self, Self::Token(_))
    }
}

impl From<Card> for CardRef {
    fn from(card: Card) -> Self {
        Self::Card(card)
    }
}

impl From<Token> for CardRef {
    fn from(token: Token) -> Self {
        Self::Token(token)
    }
}

/// A card or token in play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattlefieldItem {
    pub item_id: ItemId,
    pub card: CardRef,
    pub x: f64,
    pub y: f64,
    pub tapped: bool,
    pub flipped: bool,
    pub face_up: bool,
    /// Named counters. A counter is present only while non-zero.
    pub counters: BTreeMap<String, i32>,
}

impl BattlefieldItem {
    pub(crate) fn new(item_id: ItemId, card: CardRef, x: f64, y: f64) -> Self {
        Self {
            item_id,
            card,
            x,
            y,
            tapped: false,
            flipped: false,
            face_up: true,
            counters: BTreeMap::new(),
        }
    }

    /// Sets a counter, removing it when `count` is zero.
    pub(crate) fn set_counter(&mut self, kind: &str, count: i32) {
        if count != 0 {
            self.counters.insert(kind.to_string(), count);
        } else {
            self.counters.remove(kind);
        }
    }
}

/// A player's tray: their public summary on the shared table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tray {
    pub item_id: ItemId,
    pub x: f64,
    pub y: f64,
    /// Background color as RGB in `0.0..=1.0`. Not sent over the wire.
    pub color: Option<(f32, f32, f32)>,
}

/// A deck: the card list a reset shuffles into the library.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub name: String,
    pub cards: Vec<Card>,
}
