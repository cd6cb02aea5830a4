//! Wire protocol for Cardtable.
//!
//! This crate defines the language peers speak over the group channel:
//!
//! - **Types** ([`Command`], [`CommandKind`], [`PlayerId`], [`ItemId`],
//!   [`Zone`]): the vocabulary of table mutations.
//! - **Codec** ([`LineCodec`], [`escape_chat`]): how commands become text
//!   lines and how inbound text is told apart from chat.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! The protocol layer sits between the transport (text messages with a
//! sender) and player state (zones). It knows nothing about who owns what;
//! it only turns commands into lines and lines back into commands.
//!
//! ```text
//! Transport (sender, text) -> Protocol (Vec<Command>) -> Player state
//! ```
//!
//! # Example
//!
//! ```rust
//! use cardtable_protocol::{Command, Inbound, LineCodec};
//!
//! let codec = LineCodec::new().unwrap();
//! let text = codec.encode_batch(&[Command::SetLife { life: 17 }]).unwrap();
//! assert_eq!(text, "[Setlife] 17");
//! assert_eq!(
//!     codec.decode(&text),
//!     Inbound::Commands(vec![Command::SetLife { life: 17 }])
//! );
//! ```

mod codec;
mod error;
mod types;

pub use codec::{escape_chat, Inbound, LineCodec};
pub use error::ProtocolError;
pub use types::{Command, CommandKind, ItemId, PlayerId, Zone, PROTOCOL_VERSION};
