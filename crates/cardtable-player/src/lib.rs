//! Player state for Cardtable.
//!
//! This crate owns everything about one participant's side of the table:
//!
//! 1. **State**: library, hand, graveyard, exile, battlefield, tray, life
//!    ([`Player`]).
//! 2. **Local actions**: drawing, discarding, moving cards, tapping; each
//!    one mutates the state and queues the commands a peer needs
//!    ([`Player::take_outbox`]).
//! 3. **Interpreter**: applying a peer's commands to its replica
//!    ([`Player::handle_batch`]), plus the `welcome` full-state dump.
//! 4. **Inverses**: the undo of an inbound batch, for backward replay
//!    ([`Player::invert_batch`]).
//!
//! # How it fits in the stack
//!
//! ```text
//! Room (above)      routes each sender's batches to that sender's replica
//!     ↕
//! Player (this crate)  zones, items, interpreter
//!     ↕
//! Protocol (below)  Command, ItemId, Zone
//! ```
//!
//! # Example
//!
//! ```rust
//! use cardtable_player::{Player, TableConfig};
//! use cardtable_protocol::{Command, PlayerId};
//!
//! let mut alice = Player::local(PlayerId::from("alice"), TableConfig::default());
//! alice.set_life(17);
//!
//! let mut replica = Player::replica(PlayerId::from("alice"), TableConfig::default());
//! for batch in alice.take_outbox() {
//!     replica.handle_batch(&PlayerId::from("alice"), &batch.commands).unwrap();
//! }
//! assert_eq!(replica.life(), 17);
//! ```

mod apply;
mod card;
mod catalog;
mod config;
mod error;
mod inverse;
mod items;
mod observer;
mod player;
mod view;

pub use card::{BattlefieldItem, Card, CardRef, Deck, Token, Tray};
pub use catalog::{CardCatalog, EmptyCatalog, MemoryCatalog};
pub use config::{DEFAULT_HAND_SIZE, DEFAULT_LIFE, MAX_ITEM_ID, TableConfig};
pub use error::PlayerError;
pub use inverse::Inverse;
pub use items::{ItemKind, ItemRegistry};
pub use observer::{NullObserver, PlayerObserver};
pub use player::{Outgoing, Player, Source};
pub use view::{ItemView, PlayerView};
