//! Room actor: an isolated Tokio task that owns a [`Room`].
//!
//! Transport I/O happens on other tasks. Everything that touches player
//! state is marshalled onto this one task through an mpsc channel, so the
//! room itself needs no locking. After every command the actor drains the
//! room's outgoing queue into the `outbound` channel.

use cardtable_player::{Player, PlayerError};
use cardtable_protocol::{ItemId, PlayerId};
use tokio::sync::{mpsc, oneshot};

use crate::{Room, RoomError};

/// Default command channel size for room actors.
pub const DEFAULT_CHANNEL_SIZE: usize = 64;

type RoomJob = Box<dyn FnOnce(&mut Room) + Send>;

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    /// A message arrived from the channel.
    Inbound { sender: PlayerId, text: String },

    /// A user left the channel.
    Left { player: PlayerId },

    /// Run a closure against the room. Replies travel inside the closure.
    Run(RoomJob),

    /// Shut down the room.
    Shutdown,
}

/// Handle to a running room actor. Used to send commands to it.
///
/// This is cheap to clone; it's just an `mpsc::Sender` wrapper.
#[derive(Clone)]
pub struct RoomHandle {
    name: String,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Returns the room's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.name.clone())
    }

    /// Hands an inbound channel message to the room (fire-and-forget).
    pub async fn deliver(&self, sender: PlayerId, text: String) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Inbound { sender, text })
            .await
            .map_err(|_| self.unavailable())
    }

    /// Tells the room a user left the channel.
    pub async fn user_left(&self, player: PlayerId) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Left { player })
            .await
            .map_err(|_| self.unavailable())
    }

    /// Runs `f` on the room task and returns its result.
    pub async fn with_room<R, F>(&self, f: F) -> Result<R, RoomError>
    where
        F: FnOnce(&mut Room) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: RoomJob = Box::new(move |room| {
            let _ = reply_tx.send(f(room));
        });
        self.sender
            .send(RoomCommand::Run(job))
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Joins the table as the local player.
    pub async fn join(&self, id: PlayerId) -> Result<(), RoomError> {
        self.with_room(move |room| room.join(id)).await?
    }

    /// Runs a local action on the local player. See [`Room::act`].
    pub async fn act<R, F>(&self, f: F) -> Result<R, RoomError>
    where
        F: FnOnce(&mut Player) -> Result<R, PlayerError> + Send + 'static,
        R: Send + 'static,
    {
        self.with_room(move |room| room.act(f)).await?
    }

    /// Puts the local player's tray on the table.
    pub async fn create_tray(&self) -> Result<ItemId, RoomError> {
        self.with_room(Room::create_tray).await?
    }

    /// Sends a chat line.
    pub async fn chat(&self, text: impl Into<String>) -> Result<(), RoomError> {
        let text = text.into();
        self.with_room(move |room| room.send_chat(&text)).await?
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| self.unavailable())
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct RoomActor {
    room: Room,
    receiver: mpsc::Receiver<RoomCommand>,
    outbound: mpsc::UnboundedSender<String>,
}

impl RoomActor {
    /// Runs the actor loop, processing commands until shutdown.
    async fn run(mut self) {
        tracing::info!(room = %self.room.name(), "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Inbound { sender, text } => {
                    if let Err(err) = self.room.receive(&sender, &text) {
                        tracing::warn!(room = %self.room.name(), %sender, error = %err, "inbound message failed");
                    }
                }
                RoomCommand::Left { player } => self.room.user_left(&player),
                RoomCommand::Run(job) => job(&mut self.room),
                RoomCommand::Shutdown => {
                    tracing::info!(room = %self.room.name(), "room shutting down");
                    break;
                }
            }
            self.drain();
        }

        tracing::info!(room = %self.room.name(), "room actor stopped");
    }

    fn drain(&mut self) {
        for text in self.room.take_outgoing() {
            // The client loop is gone; nothing left to send to.
            if self.outbound.send(text).is_err() {
                tracing::debug!(room = %self.room.name(), "outbound queue closed, dropping message");
            }
        }
    }
}

/// Spawns a room actor task and returns a handle to communicate with it.
///
/// Outbound message text is pushed to `outbound` in order. `channel_size`
/// controls backpressure: if the command channel fills up, senders wait.
pub fn spawn_room(
    room: Room,
    outbound: mpsc::UnboundedSender<String>,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);
    let name = room.name().to_string();

    let actor = RoomActor {
        room,
        receiver: rx,
        outbound,
    };
    tokio::spawn(actor.run());

    RoomHandle { name, sender: tx }
}
