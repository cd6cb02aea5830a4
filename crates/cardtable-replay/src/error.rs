//! Error types for recording and replay.

use cardtable_protocol::ProtocolError;

/// Errors from reading replay files or seeking through them.
///
/// A file that fails to parse is rejected whole; nothing is half-loaded.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// Reading or writing the file failed.
    #[error("replay i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The three header lines are missing or wrong.
    #[error("bad replay header: {0}")]
    BadHeader(String),

    /// An entry line could not be parsed.
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    /// An entry is older than the one before it.
    #[error("line {line}: entry is out of time order")]
    Unsorted { line: usize },

    /// A backward seek reached an entry that was skipped over without
    /// recording its inverse.
    #[error("no reverse history for entry {index}; seek forward over it first")]
    NoReverseHistory { index: usize },

    /// The line codec could not be built.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The entry-line pattern failed to compile.
    #[error("bad entry pattern: {0}")]
    Pattern(#[from] regex::Error),
}
