//! In-process group channel built on tokio channels.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::{ChannelEvent, GroupChannel, TransportError};

type Members = HashMap<String, mpsc::UnboundedSender<ChannelEvent>>;

/// An in-process chat room. Every [`LocalChannel`] joined through the same
/// hub sees every message sent by any member, its own included.
#[derive(Clone, Default)]
pub struct LocalHub {
    members: Arc<Mutex<Members>>,
}

impl LocalHub {
    /// Creates an empty room.
    pub fn new() -> Self {
        Self::default()
    }

    /// Joins the room under `identity`. Existing members receive a
    /// [`ChannelEvent::Joined`].
    ///
    /// Joining twice with the same identity replaces the earlier membership.
    pub fn join(&self, identity: &str) -> Result<LocalChannel, TransportError> {
        let (tx, rx) = mpsc::unbounded_channel();
        {
            let mut members =
                self.members.lock().map_err(|_| TransportError::Shutdown)?;
            for member in members.values() {
                let _ = member.send(ChannelEvent::Joined(identity.to_string()));
            }
            members.insert(identity.to_string(), tx);
        }
        tracing::debug!(identity, "joined local hub");
        Ok(LocalChannel {
            identity: identity.to_string(),
            hub: self.clone(),
            rx: tokio::sync::Mutex::new(rx),
        })
    }

    /// Returns the number of members currently in the room.
    pub fn member_count(&self) -> usize {
        self.members.lock().map(|m| m.len()).unwrap_or(0)
    }

    fn broadcast(&self, event: &ChannelEvent) -> Result<(), TransportError> {
        let members =
            self.members.lock().map_err(|_| TransportError::Shutdown)?;
        for member in members.values() {
            // A member whose receiver is gone simply misses the message.
            let _ = member.send(event.clone());
        }
        Ok(())
    }

    fn remove(&self, identity: &str) -> Result<(), TransportError> {
        let removed = self
            .members
            .lock()
            .map_err(|_| TransportError::Shutdown)?
            .remove(identity)
            .is_some();
        if removed {
            self.broadcast(&ChannelEvent::Left(identity.to_string()))?;
        }
        Ok(())
    }
}

/// One member's connection to a [`LocalHub`].
pub struct LocalChannel {
    identity: String,
    hub: LocalHub,
    rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<ChannelEvent>>,
}

impl GroupChannel for LocalChannel {
    type Error = TransportError;

    async fn send(&self, text: &str) -> Result<(), Self::Error> {
        let is_member = self
            .hub
            .members
            .lock()
            .map_err(|_| TransportError::Shutdown)?
            .contains_key(&self.identity);
        if !is_member {
            return Err(TransportError::ChannelClosed(format!(
                "{} is not in the room",
                self.identity
            )));
        }
        self.hub.broadcast(&ChannelEvent::Message {
            sender: self.identity.clone(),
            text: text.to_string(),
        })
    }

    async fn recv(&self) -> Result<Option<ChannelEvent>, Self::Error> {
        Ok(self.rx.lock().await.recv().await)
    }

    async fn leave(&self) -> Result<(), Self::Error> {
        self.hub.remove(&self.identity)?;
        self.rx.lock().await.close();
        tracing::debug!(identity = %self.identity, "left local hub");
        Ok(())
    }

    fn identity(&self) -> &str {
        &self.identity
    }
}
