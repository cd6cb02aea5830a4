//! # Cardtable
//!
//! A shared virtual card table played over a group chat channel.
//!
//! Every participant keeps their own copy of the whole table. Local
//! actions mutate the local player and go out as short text commands;
//! peers apply them to a replica of that player. A newcomer says `hello`
//! and every seated player answers with a `welcome` describing their side
//! of the table. Everything received is recorded and can be replayed
//! forward and backward later.
//!
//! ## Layers
//!
//! | crate | what it does |
//! |---|---|
//! | [`transport`] | the group channel seam, plus an in-process hub |
//! | [`protocol`] | commands and their text line format |
//! | [`player`] | one player's zones, the interpreter, inverses |
//! | [`replay`] | recordings, replay files, seekable playback |
//! | [`room`] | routing, handshake, game log, the room actor |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cardtable::prelude::*;
//! use cardtable_transport::LocalHub;
//!
//! # async fn demo() -> Result<(), CardtableError> {
//! cardtable::init_tracing();
//!
//! let hub = LocalHub::new();
//! let client = TableClientBuilder::new().join(hub.join("alice")?).await?;
//! client.run().await
//! # }
//! ```

mod client;
mod error;

pub use cardtable_player as player;
pub use cardtable_protocol as protocol;
pub use cardtable_replay as replay;
pub use cardtable_room as room;
pub use cardtable_transport as transport;

pub use client::{DEFAULT_ROOM_NAME, TableClient, TableClientBuilder};
pub use error::CardtableError;

/// Installs a `tracing` subscriber that prints to stderr.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Calling this
/// more than once is harmless.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub mod prelude {
    pub use crate::{CardtableError, TableClient, TableClientBuilder};
    pub use cardtable_player::{
        Card, CardRef, Deck, Player, PlayerView, Source, TableConfig, Token,
    };
    pub use cardtable_protocol::{Command, ItemId, PlayerId, Zone};
    pub use cardtable_replay::{Recorder, Replay, ReplayTarget};
    pub use cardtable_room::{Room, RoomConfig, RoomEvent, RoomHandle, RoomInverse};
    pub use cardtable_transport::{ChannelEvent, GroupChannel};
}
