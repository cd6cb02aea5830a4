/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The channel was closed.
    #[error("channel closed: {0}")]
    ChannelClosed(String),

    /// Sending a message failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// The transport was shut down.
    #[error("transport shut down")]
    Shutdown,
}
