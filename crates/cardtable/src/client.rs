//! `TableClient` builder and client loop.
//!
//! This is the entry point for sitting down at a table. It ties the layers
//! together: group channel → room actor → players.
//!
//! ```text
//! channel.recv() ──Message/Left──→ RoomHandle ──→ room task
//!                                                    │
//! channel.send() ←──────── outbound queue ←──────────┘
//! ```
//!
//! The tray goes down `join_delay` after `hello`, so peers' welcome
//! replies arrive before we announce ourselves.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use cardtable_player::{CardCatalog, PlayerObserver};
use cardtable_protocol::PlayerId;
use cardtable_room::{DEFAULT_CHANNEL_SIZE, Room, RoomConfig, RoomEvent, RoomHandle, spawn_room};
use cardtable_transport::{ChannelEvent, GroupChannel};
use tokio::sync::mpsc;

use crate::CardtableError;

/// Room name used when none is given.
pub const DEFAULT_ROOM_NAME: &str = "cardtable";

/// Builder for configuring and joining a table.
///
/// # Example
///
/// ```rust,no_run
/// use cardtable::prelude::*;
/// use cardtable_transport::LocalHub;
///
/// # async fn demo() -> Result<(), CardtableError> {
/// let hub = LocalHub::new();
/// let client = TableClientBuilder::new()
///     .room_name("friday-night")
///     .join(hub.join("alice")?)
///     .await?;
/// let handle = client.handle();
/// tokio::spawn(client.run());
/// handle.act(|me| { me.set_life(18); Ok(()) }).await?;
/// # Ok(())
/// # }
/// ```
pub struct TableClientBuilder {
    room_name: String,
    config: RoomConfig,
    catalog: Option<Arc<dyn CardCatalog>>,
    observer: Option<Arc<dyn PlayerObserver>>,
    channel_size: usize,
}

impl TableClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            room_name: DEFAULT_ROOM_NAME.to_string(),
            config: RoomConfig::default(),
            catalog: None,
            observer: None,
            channel_size: DEFAULT_CHANNEL_SIZE,
        }
    }

    /// Sets the room name written into recordings.
    pub fn room_name(mut self, name: impl Into<String>) -> Self {
        self.room_name = name.into();
        self
    }

    /// Sets the room configuration.
    pub fn config(mut self, config: RoomConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets where card and token ids are looked up.
    pub fn catalog(mut self, catalog: Arc<dyn CardCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Sets who hears about zone and item changes.
    pub fn observer(mut self, observer: Arc<dyn PlayerObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Sets the room actor's command channel size.
    pub fn channel_size(mut self, size: usize) -> Self {
        self.channel_size = size;
        self
    }

    /// Starts the room actor and joins it under the channel's identity.
    ///
    /// `hello` is queued right away; nothing is sent until
    /// [`TableClient::run`] pumps the channel.
    pub async fn join<C: GroupChannel>(self, channel: C) -> Result<TableClient<C>, CardtableError> {
        let mut room = Room::new(self.room_name, self.config.clone())?;
        if let Some(catalog) = self.catalog {
            room = room.with_catalog(catalog);
        }
        if let Some(observer) = self.observer {
            room = room.with_observer(observer);
        }
        let events = room.subscribe();

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let handle = spawn_room(room, outbound_tx, self.channel_size);
        let id = PlayerId::new(channel.identity());
        handle.join(id.clone()).await?;
        tracing::info!(player = %id, room = %handle.name(), "table client joined");

        Ok(TableClient {
            channel,
            handle,
            outbound: outbound_rx,
            events: Some(events),
            join_delay: self.config.join_delay,
        })
    }
}

impl Default for TableClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A joined table, ready to pump traffic.
///
/// Take the [`RoomHandle`] for local actions and the event receiver for
/// chat and the game log, then call [`run()`](Self::run).
pub struct TableClient<C: GroupChannel> {
    channel: C,
    handle: RoomHandle,
    outbound: mpsc::UnboundedReceiver<String>,
    events: Option<mpsc::UnboundedReceiver<RoomEvent>>,
    join_delay: Duration,
}

impl<C: GroupChannel> TableClient<C> {
    /// Returns a handle to the room actor.
    pub fn handle(&self) -> RoomHandle {
        self.handle.clone()
    }

    /// Takes the room event receiver. Returns `None` after the first call.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<RoomEvent>> {
        self.events.take()
    }

    /// Returns the identity this client plays under.
    pub fn identity(&self) -> &str {
        self.channel.identity()
    }

    /// Runs the client loop until the channel closes.
    pub async fn run(self) -> Result<(), CardtableError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the client loop until the channel closes or `shutdown`
    /// resolves, then leaves the channel and stops the room actor.
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) -> Result<(), CardtableError> {
        let Self {
            channel,
            handle,
            mut outbound,
            join_delay,
            ..
        } = self;
        let channel_error = |e: C::Error| CardtableError::Channel(e.to_string());

        let tray_timer = tokio::time::sleep(join_delay);
        tokio::pin!(tray_timer);
        tokio::pin!(shutdown);
        let mut tray_pending = true;

        loop {
            tokio::select! {
                event = channel.recv() => match event.map_err(channel_error)? {
                    Some(ChannelEvent::Message { sender, text }) => {
                        handle.deliver(PlayerId::new(sender), text).await?;
                    }
                    Some(ChannelEvent::Left(user)) => {
                        handle.user_left(PlayerId::new(user)).await?;
                    }
                    Some(ChannelEvent::Joined(user)) => {
                        tracing::debug!(%user, "user entered channel");
                    }
                    None => {
                        tracing::info!(identity = %channel.identity(), "channel closed");
                        break;
                    }
                },
                Some(text) = outbound.recv() => {
                    channel.send(&text).await.map_err(channel_error)?;
                }
                () = &mut tray_timer, if tray_pending => {
                    tray_pending = false;
                    let tray = handle.create_tray().await?;
                    tracing::debug!(item = %tray, "tray placed");
                }
                () = &mut shutdown => {
                    tracing::info!(identity = %channel.identity(), "leaving table");
                    channel.leave().await.map_err(channel_error)?;
                    break;
                }
            }
        }

        // The actor may already be gone.
        let _ = handle.shutdown().await;
        Ok(())
    }
}
