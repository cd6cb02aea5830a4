//! Core protocol types: identities, zones, and the command vocabulary.
//!
//! Every mutation a player makes to their side of the table is described by
//! one [`Command`]. Commands are what travels on the wire (as text lines, see
//! [`LineCodec`](crate::LineCodec)), what the replay log re-derives inverses
//! for, and what a replica applies to stay in sync with its peer.

use serde::{Deserialize, Serialize};

use std::fmt;

/// The protocol version announced in `hello` and `welcome`.
///
/// Sent as a bare token, so it must never contain whitespace.
pub const PROTOCOL_VERSION: &str = "0.31";

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The stable identity of a participant in the group channel.
///
/// This is whatever name the transport tags messages with (a room nick, a
/// resource string). It is a newtype so it can't be confused with a card id
/// or a free-form name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Creates a player id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A per-owner handle for something on the table: a battlefield item or the
/// owner's tray.
///
/// Handles are 16 bits wide and travel as lowercase hex. `Display` prints
/// the wire form, so `ItemId(0x2a)` shows as `2a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u16);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Zones
// ---------------------------------------------------------------------------

/// Where a card can be.
///
/// Library and hand are hidden: a replica of another player only knows how
/// many cards they hold. Graveyard and exile are public, ordered lists of
/// card ids. The battlefield holds items with positions and flags instead
/// of bare cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    Library,
    Hand,
    Graveyard,
    Exile,
    Battlefield,
}

impl Zone {
    /// The four zones that hold cards rather than battlefield items.
    pub const PILES: [Zone; 4] =
        [Zone::Library, Zone::Hand, Zone::Graveyard, Zone::Exile];

    /// Returns `true` for zones whose contents are only known by count to
    /// other players.
    pub fn is_hidden(self) -> bool {
        matches!(self, Self::Library | Self::Hand)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Library => "library",
            Self::Hand => "hand",
            Self::Graveyard => "graveyard",
            Self::Exile => "exile",
            Self::Battlefield => "battlefield",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// The fixed set of command kinds, without arguments.
///
/// The order of [`CommandKind::ALL`] is the order the decoder tries
/// matchers in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    Hello,
    Welcome,
    Reset,
    Tray,
    Update,
    SetLife,
    Enter,
    Exit,
    Bury,
    Unbury,
    Exile,
    Unexile,
    Mulligan,
    Shuffle,
    Move,
    Tap,
    Flip,
    Face,
    Counters,
}

impl CommandKind {
    /// Every kind, in decoding order.
    pub const ALL: [CommandKind; 19] = [
        Self::Hello,
        Self::Welcome,
        Self::Reset,
        Self::Tray,
        Self::Update,
        Self::SetLife,
        Self::Enter,
        Self::Exit,
        Self::Bury,
        Self::Unbury,
        Self::Exile,
        Self::Unexile,
        Self::Mulligan,
        Self::Shuffle,
        Self::Move,
        Self::Tap,
        Self::Flip,
        Self::Face,
        Self::Counters,
    ];

    /// The wire template for this kind.
    ///
    /// Placeholders: `%d` signed decimal, `%.2f` two-decimal fixed point,
    /// `%x` lowercase hex item id, `%s` bare token, `"%s"` quoted string.
    /// Everything else is literal.
    pub fn template(self) -> &'static str {
        match self {
            Self::Hello => "[Hello] %s",
            Self::Welcome => "[Welcome] %s",
            Self::Reset => "[Reset]",
            Self::Tray => "[CreateTray] as %x at (%.2f, %.2f)",
            Self::Update => "[Update] %d %d",
            Self::SetLife => "[Setlife] %d",
            Self::Enter => "[Enter] %s \"%s\" as %x at (%.2f,%.2f)",
            Self::Exit => "[Exit] %x",
            Self::Bury => "[Bury] %s",
            Self::Unbury => "[Unbury] %d",
            Self::Exile => "[Exile] %s",
            Self::Unexile => "[Unexile] %d",
            Self::Mulligan => "[Mulligan]",
            Self::Shuffle => "[Shuffle]",
            Self::Move => "[Move] %x to (%.2f,%.2f)",
            Self::Tap => "[Tap] %x",
            Self::Flip => "[Flip] %x",
            Self::Face => "[Face] %x",
            Self::Counters => "[Counter] %d \"%s\" counter on %x",
        }
    }

    /// Number of arguments the kind carries.
    pub fn arity(self) -> usize {
        self.template().matches('%').count()
    }

    /// Short lowercase name, used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Hello => "hello",
            Self::Welcome => "welcome",
            Self::Reset => "reset",
            Self::Tray => "tray",
            Self::Update => "update",
            Self::SetLife => "setlife",
            Self::Enter => "enter",
            Self::Exit => "exit",
            Self::Bury => "bury",
            Self::Unbury => "unbury",
            Self::Exile => "exile",
            Self::Unexile => "unexile",
            Self::Mulligan => "mulligan",
            Self::Shuffle => "shuffle",
            Self::Move => "move",
            Self::Tap => "tap",
            Self::Flip => "flip",
            Self::Face => "face",
            Self::Counters => "counters",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One discrete mutation of a player's table state.
///
/// Coordinates are table coordinates and travel with two decimals, so a
/// command only round-trips exactly through the codec when its coordinates
/// are already rounded to hundredths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Command {
    /// Handshake initialization, carrying the sender's version.
    Hello { version: String },

    /// Handshake response header; the rest of the batch is the full state.
    Welcome { version: String },

    /// Clear every zone and the battlefield, life back to default.
    Reset,

    /// Create (or replace) the sender's tray.
    Tray { item: ItemId, x: f64, y: f64 },

    /// Library and hand card counts.
    Update { library: usize, hand: usize },

    /// Set life points.
    SetLife { life: i32 },

    /// A card or token enters the battlefield.
    Enter {
        card: String,
        name: String,
        item: ItemId,
        x: f64,
        y: f64,
    },

    /// The tray or a battlefield item is removed.
    Exit { item: ItemId },

    /// A card is put on top of the graveyard.
    Bury { card: String },

    /// The graveyard card at `index` is removed.
    Unbury { index: usize },

    /// A card is put into exile.
    Exile { card: String },

    /// The exiled card at `index` is removed.
    Unexile { index: usize },

    /// Hand goes back into the library, one card fewer is drawn.
    Mulligan,

    /// The library was shuffled.
    Shuffle,

    /// A battlefield item moved.
    Move { item: ItemId, x: f64, y: f64 },

    /// Toggle the tapped flag.
    Tap { item: ItemId },

    /// Toggle the flipped flag.
    Flip { item: ItemId },

    /// Turn the item face up or face down.
    Face { item: ItemId },

    /// Set a named counter; zero removes it.
    Counters { count: i32, kind: String, item: ItemId },
}

impl Command {
    /// Returns the argument-less kind of this command.
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Hello { .. } => CommandKind::Hello,
            Self::Welcome { .. } => CommandKind::Welcome,
            Self::Reset => CommandKind::Reset,
            Self::Tray { .. } => CommandKind::Tray,
            Self::Update { .. } => CommandKind::Update,
            Self::SetLife { .. } => CommandKind::SetLife,
            Self::Enter { .. } => CommandKind::Enter,
            Self::Exit { .. } => CommandKind::Exit,
            Self::Bury { .. } => CommandKind::Bury,
            Self::Unbury { .. } => CommandKind::Unbury,
            Self::Exile { .. } => CommandKind::Exile,
            Self::Unexile { .. } => CommandKind::Unexile,
            Self::Mulligan => CommandKind::Mulligan,
            Self::Shuffle => CommandKind::Shuffle,
            Self::Move { .. } => CommandKind::Move,
            Self::Tap { .. } => CommandKind::Tap,
            Self::Flip { .. } => CommandKind::Flip,
            Self::Face { .. } => CommandKind::Face,
            Self::Counters { .. } => CommandKind::Counters,
        }
    }

    /// Returns the item id the command refers to, if any.
    pub fn item(&self) -> Option<ItemId> {
        match self {
            Self::Tray { item, .. }
            | Self::Enter { item, .. }
            | Self::Exit { item }
            | Self::Move { item, .. }
            | Self::Tap { item }
            | Self::Flip { item }
            | Self::Face { item }
            | Self::Counters { item, .. } => Some(*item),
            _ => None,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_display_is_lowercase_hex() {
        assert_eq!(ItemId(0x2a).to_string(), "2a");
        assert_eq!(ItemId(0xffff).to_string(), "ffff");
        assert_eq!(ItemId(0).to_string(), "0");
    }

    #[test]
    fn test_player_id_display_and_from() {
        let pid = PlayerId::from("alice");
        assert_eq!(pid.to_string(), "alice");
        assert_eq!(pid, PlayerId::new(String::from("alice")));
    }

    #[test]
    fn test_player_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&PlayerId::from("bob")).unwrap();
        assert_eq!(json, "\"bob\"");
    }

    #[test]
    fn test_kind_arity_matches_template() {
        assert_eq!(CommandKind::Reset.arity(), 0);
        assert_eq!(CommandKind::Tray.arity(), 3);
        assert_eq!(CommandKind::Enter.arity(), 5);
        assert_eq!(CommandKind::Counters.arity(), 3);
    }

    #[test]
    fn test_all_kinds_are_distinct() {
        for (i, a) in CommandKind::ALL.iter().enumerate() {
            for b in &CommandKind::ALL[i + 1..] {
                assert_ne!(a, b);
                assert_ne!(a.template(), b.template());
            }
        }
    }

    #[test]
    fn test_command_kind_and_item() {
        let cmd = Command::Counters {
            count: 3,
            kind: "loyalty".into(),
            item: ItemId(7),
        };
        assert_eq!(cmd.kind(), CommandKind::Counters);
        assert_eq!(cmd.item(), Some(ItemId(7)));
        assert_eq!(Command::Shuffle.item(), None);
    }

    #[test]
    fn test_command_json_is_internally_tagged() {
        let json: serde_json::Value =
            serde_json::to_value(Command::SetLife { life: 17 }).unwrap();
        assert_eq!(json["type"], "setlife");
        assert_eq!(json["life"], 17);
    }

    #[test]
    fn test_command_json_counters_keeps_kind_field() {
        let cmd = Command::Counters {
            count: 2,
            kind: "+1/+1".into(),
            item: ItemId(9),
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["type"], "counters");
        assert_eq!(json["kind"], "+1/+1");
        assert_eq!(serde_json::from_value::<Command>(json).unwrap(), cmd);
    }

    #[test]
    fn test_zone_hidden_and_display() {
        assert!(Zone::Library.is_hidden());
        assert!(Zone::Hand.is_hidden());
        assert!(!Zone::Graveyard.is_hidden());
        assert_eq!(Zone::Exile.to_string(), "exile");
    }
}
