//! Error types for the protocol layer.
//!
//! Decoding never fails: a line that matches no command template is simply
//! not a command (see [`Inbound`](crate::Inbound)). Errors here come from
//! the encoding side, where a command holds arguments the line format
//! cannot carry.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A command argument cannot be written to the wire.
    ///
    /// Bare tokens must be non-empty and free of whitespace, quoted strings
    /// must not contain a newline, and coordinates must be finite.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The message is invalid at the protocol level.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// A command template failed to compile into a matcher.
    #[error("bad command pattern: {0}")]
    Pattern(#[from] regex::Error),
}
