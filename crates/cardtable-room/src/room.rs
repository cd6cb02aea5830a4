//! The room coordinator.
//!
//! A [`Room`] owns every [`Player`] at one table, keyed by the identity
//! the transport reports for each sender. It is plain synchronous state;
//! [`spawn_room`](crate::spawn_room) puts it behind an actor.
//!
//! # Inbound flow
//!
//! ```text
//! receive(sender, text)
//!   ├─ record (every message, own echoes included)
//!   ├─ own echo? stop
//!   ├─ decode
//!   │    ├─ commands → game log → handle_commands
//!   │    └─ chat     → RoomEvent::Chat
//!   └─ flush the local player's outbox (welcome replies)
//! ```
//!
//! # Handshake
//!
//! A `hello` from an unknown sender creates a replica that counts as
//! already welcomed (it is new, there's nothing to catch up on), and makes
//! the local player reply with a full-state `welcome` once it has a tray.
//! A `welcome` from an unknown sender creates a replica that the welcome
//! itself then fills in.

use std::collections::BTreeMap;
use std::sync::Arc;

use cardtable_player::{
    CardCatalog, EmptyCatalog, NullObserver, Outgoing, Player, PlayerError, PlayerObserver,
    PlayerView,
};
use cardtable_protocol::{
    Command, Inbound, ItemId, LineCodec, PlayerId, ProtocolError, escape_chat,
};
use cardtable_replay::Recorder;
use tokio::sync::mpsc;

use crate::{Logger, RoomConfig, RoomError};

/// Something the UI layer should hear about.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    /// A chat line, inbound or our own.
    Chat { sender: PlayerId, text: String },
    /// A new game log line.
    Log(String),
    /// A peer's batch failed to apply to its replica.
    Error { player: PlayerId, message: String },
    /// A player appeared at the table.
    PlayerAdded(PlayerId),
    /// A player left the table.
    PlayerRemoved(PlayerId),
}

/// Every player at one table, plus the game log and the recording.
pub struct Room {
    name: String,
    config: RoomConfig,
    codec: LineCodec,
    local_id: Option<PlayerId>,
    players: BTreeMap<PlayerId, Player>,
    logger: Logger,
    recorder: Option<Recorder>,
    outgoing: Vec<String>,
    subscribers: Vec<mpsc::UnboundedSender<RoomEvent>>,
    catalog: Arc<dyn CardCatalog>,
    observer: Arc<dyn PlayerObserver>,
}

impl std::fmt::Debug for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Room")
            .field("name", &self.name)
            .field("local_id", &self.local_id)
            .field("players", &self.players.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Room {
    /// Creates an empty room.
    ///
    /// # Errors
    /// [`RoomError::Protocol`] if `config.version` is empty or contains
    /// whitespace, since it travels as a bare token.
    pub fn new(name: impl Into<String>, config: RoomConfig) -> Result<Self, RoomError> {
        if config.version.is_empty() || config.version.contains(char::is_whitespace) {
            return Err(ProtocolError::InvalidArgument(format!(
                "version {:?} is not a single token",
                config.version
            ))
            .into());
        }
        Ok(Self {
            name: name.into(),
            config,
            codec: LineCodec::new()?,
            local_id: None,
            players: BTreeMap::new(),
            logger: Logger::new(),
            recorder: None,
            outgoing: Vec::new(),
            subscribers: Vec::new(),
            catalog: Arc::new(EmptyCatalog),
            observer: Arc::new(NullObserver),
        })
    }

    /// Card lookups for every player created from now on.
    pub fn with_catalog(mut self, catalog: Arc<dyn CardCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Change notifications for every player created from now on.
    pub fn with_observer(mut self, observer: Arc<dyn PlayerObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Returns a receiver for room events. Any number may subscribe.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<RoomEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    pub fn local_id(&self) -> Option<&PlayerId> {
        self.local_id.as_ref()
    }

    /// The local player, once joined.
    pub fn local(&self) -> Option<&Player> {
        self.local_id.as_ref().and_then(|id| self.players.get(id))
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    /// Every player, local included, ordered by id.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// Public snapshots of every player, ordered by id.
    pub fn views(&self) -> Vec<PlayerView> {
        self.players.values().map(Player::view).collect()
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn logger_mut(&mut self) -> &mut Logger {
        &mut self.logger
    }

    /// The recording, if recording is on and the local player joined.
    pub fn recorder(&self) -> Option<&Recorder> {
        self.recorder.as_ref()
    }

    /// Takes the queued outbound messages, oldest first.
    pub fn take_outgoing(&mut self) -> Vec<String> {
        std::mem::take(&mut self.outgoing)
    }

    // -----------------------------------------------------------------------
    // Local side
    // -----------------------------------------------------------------------

    /// Joins the table as `id`: creates the local player, starts recording,
    /// and queues `hello`.
    pub fn join(&mut self, id: PlayerId) -> Result<(), RoomError> {
        if self.local_id.is_some() || self.players.contains_key(&id) {
            return Err(RoomError::DuplicatePlayer(id));
        }
        if self.config.record {
            self.recorder = Some(Recorder::new(self.name.clone(), id.to_string()));
        }
        let player = self.new_player(id.clone(), true);
        self.add_player(player);
        self.local_id = Some(id.clone());
        tracing::info!(room = %self.name, player = %id, "joined table");

        let hello = Outgoing {
            commands: vec![Command::Hello {
                version: self.config.version.clone(),
            }],
            logged: true,
        };
        self.queue(&id, &hello)
    }

    /// Runs a local action on the local player and queues whatever it
    /// emitted.
    ///
    /// ```rust
    /// # use cardtable_room::{Room, RoomConfig};
    /// # use cardtable_protocol::PlayerId;
    /// let mut room = Room::new("table", RoomConfig::default()).unwrap();
    /// room.join(PlayerId::from("alice")).unwrap();
    /// room.act(|me| {
    ///     me.set_life(18);
    ///     Ok(())
    /// })
    /// .unwrap();
    /// assert_eq!(room.take_outgoing(), vec!["[Hello] 0.31", "[Setlife] 18"]);
    /// ```
    pub fn act<R>(
        &mut self,
        f: impl FnOnce(&mut Player) -> Result<R, PlayerError>,
    ) -> Result<R, RoomError> {
        let id = self.local_id.clone().ok_or(RoomError::NotJoined)?;
        let player = self.players.get_mut(&id).ok_or(RoomError::NotJoined)?;
        let result = f(player);
        self.flush()?;
        Ok(result?)
    }

    /// Puts the local player's tray on the table.
    pub fn create_tray(&mut self) -> Result<ItemId, RoomError> {
        let color = self.config.tray_color;
        self.act(|me| me.create_tray(None, Some(color)))
    }

    /// Queues a chat line and shows it locally. Empty text is dropped.
    pub fn send_chat(&mut self, text: &str) -> Result<(), RoomError> {
        let id = self.local_id.clone().ok_or(RoomError::NotJoined)?;
        if let Some(escaped) = escape_chat(text) {
            self.outgoing.push(escaped);
            self.emit(RoomEvent::Chat {
                sender: id,
                text: text.to_string(),
            });
        }
        Ok(())
    }

    /// Encodes and queues everything in the local player's outbox.
    pub fn flush(&mut self) -> Result<(), RoomError> {
        let Some(id) = self.local_id.clone() else {
            return Ok(());
        };
        let batches = self
            .players
            .get_mut(&id)
            .map(Player::take_outbox)
            .unwrap_or_default();
        for batch in &batches {
            self.queue(&id, batch)?;
        }
        Ok(())
    }

    fn queue(&mut self, id: &PlayerId, batch: &Outgoing) -> Result<(), RoomError> {
        let text = self.codec.encode_batch(&batch.commands)?;
        if batch.logged {
            self.log_commands(id, &batch.commands);
        }
        self.outgoing.push(text);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Remote side
    // -----------------------------------------------------------------------

    /// Handles one message from the channel.
    ///
    /// Per-peer failures are reported as [`RoomEvent::Error`], never
    /// returned. The error case is a local welcome reply that can't be
    /// encoded.
    pub fn receive(&mut self, sender: &PlayerId, text: &str) -> Result<(), RoomError> {
        if let Some(recorder) = &mut self.recorder {
            recorder.record(sender.as_str(), text);
        }
        if self.local_id.as_ref() == Some(sender) {
            return Ok(());
        }

        match self.codec.decode(text) {
            Inbound::Commands(cmds) => {
                self.log_commands(sender, &cmds);
                self.handle_commands(sender, &cmds);
            }
            Inbound::Chat(text) => self.emit(RoomEvent::Chat {
                sender: sender.clone(),
                text,
            }),
            Inbound::Ignored => {}
        }
        self.flush()
    }

    /// Routes a decoded batch from `sender` to the players.
    pub fn handle_commands(&mut self, sender: &PlayerId, cmds: &[Command]) {
        let Some(first) = cmds.first() else {
            return;
        };

        let mut failures = Vec::new();
        match first {
            Command::Hello { version } => {
                if !self.players.contains_key(sender) {
                    let mut player = self.new_player(sender.clone(), false).with_version(version);
                    player.set_welcomed(true);
                    self.add_player(player);
                }
                if let Some(local) = self.local_id.as_ref().and_then(|id| self.players.get_mut(id)) {
                    if let Err(err) = local.handle_batch(sender, cmds) {
                        failures.push((local.id().clone(), err));
                    }
                }
            }
            Command::Welcome { version } => {
                if !self.players.contains_key(sender) {
                    let player = self.new_player(sender.clone(), false).with_version(version);
                    self.add_player(player);
                }
            }
            _ => {}
        }

        for player in self.players.values_mut().filter(|p| !p.is_local()) {
            if let Err(err) = player.handle_batch(sender, cmds) {
                failures.push((player.id().clone(), err));
            }
        }
        for (player, err) in failures {
            tracing::warn!(room = %self.name, %player, error = %err, "batch failed to apply");
            self.emit(RoomEvent::Error {
                player,
                message: err.to_string(),
            });
        }
    }

    /// A user left the channel: drops their replica and its tray.
    pub fn user_left(&mut self, id: &PlayerId) {
        if self.local_id.as_ref() == Some(id) {
            return;
        }
        if let Some(mut player) = self.players.remove(id) {
            player.remove_tray();
            tracing::info!(room = %self.name, player = %id, "player left");
            self.emit(RoomEvent::PlayerRemoved(id.clone()));
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    pub(crate) fn new_player(&self, id: PlayerId, local: bool) -> Player {
        let player = if local {
            Player::local(id, self.config.table.clone()).with_version(self.config.version.clone())
        } else {
            Player::replica(id, self.config.table.clone())
        };
        player
            .with_catalog(Arc::clone(&self.catalog))
            .with_observer(Arc::clone(&self.observer))
    }

    pub(crate) fn add_player(&mut self, player: Player) {
        let id = player.id().clone();
        tracing::debug!(room = %self.name, player = %id, local = player.is_local(), "player added");
        self.players.insert(id.clone(), player);
        self.emit(RoomEvent::PlayerAdded(id));
    }

    pub(crate) fn remove_player(&mut self, id: &PlayerId) -> Option<Player> {
        let player = self.players.remove(id)?;
        self.emit(RoomEvent::PlayerRemoved(id.clone()));
        Some(player)
    }

    pub(crate) fn player_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id)
    }

    pub(crate) fn log_commands(&mut self, sender: &PlayerId, cmds: &[Command]) {
        for line in self.logger.log_commands(sender, cmds) {
            self.emit(RoomEvent::Log(line));
        }
    }

    pub(crate) fn emit(&mut self, event: RoomEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

// =========================================================================
// Tests
// =========================================================================
