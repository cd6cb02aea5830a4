//! The player: one participant's zones, items, and life.
//!
//! A [`Player`] is either **local** (the user at this table, whose actions
//! produce outbound commands) or a **replica** (a mirror of a peer, driven
//! only by that peer's inbound commands). Both share the same mutation
//! primitives, so a replica that applies everything the local player
//! emitted ends up with the same visible state.
//!
//! # Zones
//!
//! ```text
//! library   Vec<Option<Card>>   top = last; `None` = hidden placeholder
//! hand      Vec<Option<Card>>   hidden from peers, count only
//! graveyard Vec<Card>           public, top = last
//! exile     Vec<Card>           public
//! battlefield Vec<BattlefieldItem>
//! ```
//!
//! # Lifecycle
//!
//! ```text
//!   Uninitialized ──(create_tray / `tray`)──→ Active
//!         ↑                                     │
//!         └───────(remove_tray / `exit`)────────┘
//! ```

use std::fmt;
use std::sync::Arc;

use cardtable_protocol::{Command, ItemId, PlayerId, Zone, PROTOCOL_VERSION};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::{
    BattlefieldItem, Card, CardCatalog, CardRef, Deck, EmptyCatalog, ItemKind,
    ItemRegistry, NullObserver, PlayerError, PlayerObserver, TableConfig, Tray,
};

/// A batch of commands the local player wants sent, as one message.
#[derive(Debug, Clone, PartialEq)]
pub struct Outgoing {
    pub commands: Vec<Command>,
    /// Whether the batch belongs in the game log. Welcome replies don't.
    pub logged: bool,
}

/// Where [`Player::move_card`] takes a card from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// The card at `index` of a pile. Not valid for the battlefield.
    Pile(Zone, usize),
    /// A battlefield item.
    Item(ItemId),
    /// A card from outside the game, such as one conjured onto the table.
    External(CardRef),
}

/// One participant's side of the table.
#[derive(Clone)]
pub struct Player {
    pub(crate) id: PlayerId,
    pub(crate) local: bool,
    pub(crate) version: String,
    pub(crate) config: TableConfig,

    pub(crate) library: Vec<Option<Card>>,
    pub(crate) hand: Vec<Option<Card>>,
    pub(crate) graveyard: Vec<Card>,
    pub(crate) exile: Vec<Card>,
    pub(crate) battlefield: Vec<BattlefieldItem>,
    pub(crate) tray: Option<Tray>,
    pub(crate) items: ItemRegistry,
    pub(crate) life: i32,
    pub(crate) has_been_welcomed: bool,
    pub(crate) deck: Option<Deck>,

    pub(crate) rng: StdRng,
    pub(crate) outbox: Vec<Outgoing>,
    pub(crate) observer: Arc<dyn PlayerObserver>,
    pub(crate) catalog: Arc<dyn CardCatalog>,
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("id", &self.id)
            .field("local", &self.local)
            .field("life", &self.life)
            .field("library", &self.library.len())
            .field("hand", &self.hand.len())
            .field("graveyard", &self.graveyard.len())
            .field("exile", &self.exile.len())
            .field("battlefield", &self.battlefield.len())
            .field("tray", &self.tray)
            .finish_non_exhaustive()
    }
}

impl Player {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Creates the local player. Its actions queue outbound commands.
    pub fn local(id: PlayerId, config: TableConfig) -> Self {
        let mut player = Self::new(id, config);
        player.local = true;
        player
    }

    /// Creates a replica of a remote peer. It never emits anything.
    pub fn replica(id: PlayerId, config: TableConfig) -> Self {
        Self::new(id, config)
    }

    fn new(id: PlayerId, config: TableConfig) -> Self {
        Self {
            id,
            local: false,
            version: PROTOCOL_VERSION.to_string(),
            items: ItemRegistry::new(config.max_item_id),
            life: config.default_life,
            config,
            library: Vec::new(),
            hand: Vec::new(),
            graveyard: Vec::new(),
            exile: Vec::new(),
            battlefield: Vec::new(),
            tray: None,
            has_been_welcomed: false,
            deck: None,
            rng: StdRng::from_rng(&mut rand::rng()),
            outbox: Vec::new(),
            observer: Arc::new(NullObserver),
            catalog: Arc::new(EmptyCatalog),
        }
    }

    /// Sets the peer's protocol version string.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn PlayerObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn CardCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Seeds the shuffle and item-id generator, for reproducible games.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// A silent, non-local copy used to simulate commands.
    pub(crate) fn shadow(&self) -> Self {
        let mut copy = self.clone();
        copy.local = false;
        copy.outbox.clear();
        copy.observer = Arc::new(NullObserver);
        copy
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    pub fn is_local(&self) -> bool {
        self.local
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn life(&self) -> i32 {
        self.life
    }

    pub fn library(&self) -> &[Option<Card>] {
        &self.library
    }

    pub fn hand(&self) -> &[Option<Card>] {
        &self.hand
    }

    pub fn graveyard(&self) -> &[Card] {
        &self.graveyard
    }

    pub fn exile(&self) -> &[Card] {
        &self.exile
    }

    pub fn battlefield(&self) -> &[BattlefieldItem] {
        &self.battlefield
    }

    pub fn tray(&self) -> Option<&Tray> {
        self.tray.as_ref()
    }

    pub fn deck(&self) -> Option<&Deck> {
        self.deck.as_ref()
    }

    /// Returns the battlefield item with this id.
    pub fn item(&self, id: ItemId) -> Option<&BattlefieldItem> {
        self.battlefield.iter().find(|item| item.item_id == id)
    }

    pub fn items(&self) -> &ItemRegistry {
        &self.items
    }

    /// Whether this replica already applied a `welcome` from its peer.
    pub fn has_been_welcomed(&self) -> bool {
        self.has_been_welcomed
    }

    pub fn set_welcomed(&mut self, welcomed: bool) {
        self.has_been_welcomed = welcomed;
    }

    /// Returns `true` once the player has a tray.
    pub fn is_active(&self) -> bool {
        self.tray.is_some()
    }

    /// Drains the batches queued for sending, oldest first.
    pub fn take_outbox(&mut self) -> Vec<Outgoing> {
        std::mem::take(&mut self.outbox)
    }

    // -----------------------------------------------------------------------
    // Life, tray, deck
    // -----------------------------------------------------------------------

    /// Sets life points. Emits `setlife`.
    pub fn set_life(&mut self, life: i32) {
        self.apply_life(life);
        self.send(vec![Command::SetLife { life }]);
    }

    /// Creates the tray, replacing any existing one. Emits `tray`.
    ///
    /// Pass an `item_id` to reuse a known id; otherwise a free one is
    /// picked at random.
    pub fn create_tray(
        &mut self,
        item_id: Option<ItemId>,
        color: Option<(f32, f32, f32)>,
    ) -> Result<ItemId, PlayerError> {
        let (x, y) = self.config.tray_position;
        let id = self.put_tray(item_id, x, y, color)?;
        self.send(vec![Command::Tray { item: id, x, y }]);
        tracing::debug!(player = %self.id, item = %id, "tray created");
        Ok(id)
    }

    /// Removes the tray and everything on the battlefield. Emits `exit`
    /// for the tray.
    pub fn remove_tray(&mut self) {
        if let Some(tray) = self.drop_tray() {
            self.send(vec![Command::Exit { item: tray.item_id }]);
        }
    }

    /// Stores a deck and resets the table with it.
    pub fn load_deck(&mut self, deck: Deck) {
        tracing::debug!(player = %self.id, deck = %deck.name, cards = deck.cards.len(), "deck loaded");
        self.deck = Some(deck);
        self.reset();
    }

    /// Drops the deck and resets the table.
    pub fn unload_deck(&mut self) {
        self.deck = None;
        self.reset();
    }

    /// Clears every zone and the battlefield, restores default life, and
    /// shuffles the deck (if any) into the library. Emits `reset` and
    /// `update`.
    pub fn reset(&mut self) {
        self.clear_table();
        if let Some(deck) = &self.deck {
            self.library = deck.cards.iter().cloned().map(Some).collect();
            self.library.shuffle(&mut self.rng);
            self.notify_zone(Zone::Library);
        }
        let update = self.counts();
        self.send(vec![Command::Reset, update]);
    }

    // -----------------------------------------------------------------------
    // Library and hand
    // -----------------------------------------------------------------------

    /// Shuffles the library. Emits `shuffle`.
    pub fn shuffle_library(&mut self) {
        self.library.shuffle(&mut self.rng);
        self.notify_zone(Zone::Library);
        self.send(vec![Command::Shuffle]);
    }

    /// Moves the top library card to the bottom. Local only.
    pub fn library_top_to_bottom(&mut self) {
        if let Some(card) = self.library.pop() {
            self.library.insert(0, card);
            self.notify_zone(Zone::Library);
        }
    }

    /// Draws the top card of the library. Does nothing on an empty library.
    pub fn draw_card(&mut self) -> Result<(), PlayerError> {
        match self.library.len() {
            0 => Ok(()),
            len => self.move_card(Source::Pile(Zone::Library, len - 1), Some(Zone::Hand), None),
        }
    }

    /// Draws up to `count` cards, stopping when the library runs out.
    pub fn draw_cards(&mut self, count: usize) -> Result<(), PlayerError> {
        for _ in 0..count.min(self.library.len()) {
            self.draw_card()?;
        }
        Ok(())
    }

    /// Draws the configured opening hand.
    pub fn draw_opening_hand(&mut self) -> Result<(), PlayerError> {
        self.draw_cards(self.config.hand_size)
    }

    /// Shuffles the hand. Local only.
    pub fn shuffle_hand(&mut self) {
        self.hand.shuffle(&mut self.rng);
        self.notify_zone(Zone::Hand);
    }

    /// Puts the hand card at `index` into the graveyard.
    pub fn discard(&mut self, index: usize) -> Result<(), PlayerError> {
        self.move_card(Source::Pile(Zone::Hand, index), Some(Zone::Graveyard), None)
    }

    /// Discards a random hand card, if there is one.
    pub fn discard_random(&mut self) -> Result<(), PlayerError> {
        if self.hand.is_empty() {
            return Ok(());
        }
        let index = self.rng.random_range(0..self.hand.len());
        self.discard(index)
    }

    /// Shuffles the hand, then discards all of it.
    pub fn discard_all(&mut self) -> Result<(), PlayerError> {
        self.shuffle_hand();
        while !self.hand.is_empty() {
            self.discard(0)?;
        }
        Ok(())
    }

    /// Shuffles the hand into the library and draws one card fewer.
    ///
    /// Does nothing with fewer than two cards in hand. Emits only
    /// `mulligan`; peers mirror it by count.
    pub fn mulligan(&mut self) {
        let keep = self.hand.len().saturating_sub(1);
        if keep < 1 {
            return;
        }
        self.library.append(&mut self.hand);
        self.library.shuffle(&mut self.rng);
        let split = self.library.len() - keep;
        self.hand = self.library.split_off(split);

        self.notify_zone(Zone::Library);
        self.notify_zone(Zone::Hand);
        self.send(vec![Command::Mulligan]);
    }

    // -----------------------------------------------------------------------
    // Graveyard
    // -----------------------------------------------------------------------

    /// Puts the whole graveyard under the library and shuffles.
    ///
    /// Emits one `unbury` per card from the top down plus an `update`,
    /// then `shuffle`.
    pub fn shuffle_graveyard_into_library(&mut self) {
        let mut cmds: Vec<Command> = (0..self.graveyard.len())
            .rev()
            .map(|index| Command::Unbury { index })
            .collect();
        cmds.push(Command::Update {
            library: self.library.len() + self.graveyard.len(),
            hand: self.hand.len(),
        });
        self.send(cmds);

        let mut library: Vec<Option<Card>> =
            self.graveyard.drain(..).map(Some).collect();
        library.append(&mut self.library);
        self.library = library;

        self.notify_zone(Zone::Graveyard);
        self.shuffle_library();
    }

    /// Returns the top graveyard card to the hand.
    pub fn graveyard_top_to_hand(&mut self) -> Result<(), PlayerError> {
        match self.graveyard.len() {
            0 => Ok(()),
            len => self.move_card(Source::Pile(Zone::Graveyard, len - 1), Some(Zone::Hand), None),
        }
    }

    // -----------------------------------------------------------------------
    // Moving cards
    // -----------------------------------------------------------------------

    /// Moves one card between zones.
    ///
    /// `target` of `None` removes the card from the game. Moving onto the
    /// battlefield needs a `position`; moving within it repositions the
    /// item. Tokens leaving the battlefield are removed from the game
    /// whatever the target.
    ///
    /// Emits `exit`/`enter` as their own batches when an item leaves or
    /// enters, then one batch with `unbury`/`unexile`, `move`,
    /// `bury`/`exile`, and `update` as applicable.
    pub fn move_card(
        &mut self,
        source: Source,
        target: Option<Zone>,
        position: Option<(f64, f64)>,
    ) -> Result<(), PlayerError> {
        let position = match target {
            Some(Zone::Battlefield) => Some(position.ok_or(PlayerError::MissingPosition)?),
            _ => None,
        };
        match source {
            Source::Pile(zone, index) => self.move_from_pile(zone, index, target, position),
            Source::Item(id) => self.move_from_battlefield(id, target, position),
            Source::External(card) => self.move_from_outside(card, target, position),
        }
    }

    fn move_from_pile(
        &mut self,
        origin: Zone,
        index: usize,
        target: Option<Zone>,
        position: Option<(f64, f64)>,
    ) -> Result<(), PlayerError> {
        if origin == Zone::Battlefield {
            return Err(PlayerError::InvalidMove(
                "battlefield items move by item id".into(),
            ));
        }
        if target == Some(origin) {
            return Err(PlayerError::InvalidMove(format!("card is already in the {origin}")));
        }
        let len = self.pile_len(origin);
        if index >= len {
            return Err(PlayerError::IndexOutOfRange { zone: origin, index, len });
        }
        let revealed = matches!(
            target,
            Some(Zone::Graveyard | Zone::Exile | Zone::Battlefield)
        );
        if revealed && self.peek(origin, index).is_none() {
            return Err(PlayerError::HiddenCard(origin));
        }
        if target == Some(Zone::Battlefield) {
            if self.tray.is_none() {
                return Err(PlayerError::NoTray);
            }
            if self.items.is_full() {
                return Err(PlayerError::ItemIdsExhausted);
            }
        }

        let card = self.take_from_pile(origin, index);
        self.notify_zone(origin);
        let mut cmds = Vec::new();
        match origin {
            Zone::Graveyard => cmds.push(Command::Unbury { index }),
            Zone::Exile => cmds.push(Command::Unexile { index }),
            _ => {}
        }

        match (target, card) {
            (Some(Zone::Battlefield), Some(card)) => {
                let (x, y) = position.unwrap_or_default();
                self.create_card_item(card.into(), None, x, y)?;
            }
            (Some(zone), card) => {
                cmds.extend(self.bury_command(zone, card.as_ref()));
                self.push_to_pile(zone, card);
            }
            (None, _) => {}
        }

        if touches_counts(Some(origin), target) {
            cmds.push(self.counts());
        }
        self.send(cmds);
        Ok(())
    }

    fn move_from_battlefield(
        &mut self,
        id: ItemId,
        target: Option<Zone>,
        position: Option<(f64, f64)>,
    ) -> Result<(), PlayerError> {
        let is_token = self
            .item(id)
            .ok_or(PlayerError::UnknownItem(id))?
            .card
            .is_token();

        if target == Some(Zone::Battlefield) {
            let (x, y) = position.unwrap_or_default();
            self.apply_move(id, x, y)?;
            self.send(vec![Command::Move { item: id, x, y }]);
            return Ok(());
        }

        let target = if is_token { None } else { target };
        let item = self.take_item(id)?;
        self.send(vec![Command::Exit { item: id }]);

        let mut cmds = Vec::new();
        if let (Some(zone), CardRef::Card(card)) = (target, item.card) {
            cmds.extend(self.bury_command(zone, Some(&card)));
            self.push_to_pile(zone, Some(card));
            if touches_counts(None, Some(zone)) {
                cmds.push(self.counts());
            }
        }
        self.send(cmds);
        Ok(())
    }

    fn move_from_outside(
        &mut self,
        card: CardRef,
        target: Option<Zone>,
        position: Option<(f64, f64)>,
    ) -> Result<(), PlayerError> {
        match (target, card) {
            (None, _) => Err(PlayerError::InvalidMove("a card from outside needs a target".into())),
            (Some(Zone::Battlefield), card) => {
                let (x, y) = position.unwrap_or_default();
                self.create_card_item(card, None, x, y).map(|_| ())
            }
            (Some(_), CardRef::Token(_)) => Err(PlayerError::InvalidMove(
                "tokens only exist on the battlefield".into(),
            )),
            (Some(zone), CardRef::Card(card)) => {
                let mut cmds: Vec<Command> =
                    self.bury_command(zone, Some(&card)).into_iter().collect();
                self.push_to_pile(zone, Some(card));
                if touches_counts(None, Some(zone)) {
                    cmds.push(self.counts());
                }
                self.send(cmds);
                Ok(())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Battlefield
    // -----------------------------------------------------------------------

    /// Puts a card or token onto the battlefield. Emits `enter`.
    pub fn create_card_item(
        &mut self,
        card: CardRef,
        item_id: Option<ItemId>,
        x: f64,
        y: f64,
    ) -> Result<ItemId, PlayerError> {
        let cmd_card = card.id().to_string();
        let name = card.name().to_string();
        let id = self.insert_item(card, item_id, x, y)?;
        self.send(vec![Command::Enter {
            card: cmd_card,
            name,
            item: id,
            x,
            y,
        }]);
        Ok(id)
    }

    /// Takes an item off the battlefield. Emits `exit`.
    pub fn remove_card_item(&mut self, id: ItemId) -> Result<BattlefieldItem, PlayerError> {
        let item = self.take_item(id)?;
        self.send(vec![Command::Exit { item: id }]);
        Ok(item)
    }

    /// Repositions a battlefield item. Emits `move`.
    pub fn move_item(&mut self, id: ItemId, x: f64, y: f64) -> Result<(), PlayerError> {
        self.move_card(Source::Item(id), Some(Zone::Battlefield), Some((x, y)))
    }

    /// Sets a named counter; zero removes it. Emits `counters`.
    pub fn set_counters(&mut self, id: ItemId, count: i32, kind: &str) -> Result<(), PlayerError> {
        self.apply_counters(id, count, kind)?;
        self.send(vec![Command::Counters {
            count,
            kind: kind.to_string(),
            item: id,
        }]);
        Ok(())
    }

    /// Toggles the tapped flag. Emits `tap`.
    pub fn toggle_tapped(&mut self, id: ItemId) -> Result<(), PlayerError> {
        self.update_item(id, |item| item.tapped = !item.tapped)?;
        self.send(vec![Command::Tap { item: id }]);
        Ok(())
    }

    /// Toggles the flipped flag. Emits `flip`.
    pub fn toggle_flipped(&mut self, id: ItemId) -> Result<(), PlayerError> {
        self.update_item(id, |item| item.flipped = !item.flipped)?;
        self.send(vec![Command::Flip { item: id }]);
        Ok(())
    }

    /// Turns an item face down or face up. Emits `face`.
    pub fn turn_over(&mut self, id: ItemId) -> Result<(), PlayerError> {
        self.update_item(id, |item| item.face_up = !item.face_up)?;
        self.send(vec![Command::Face { item: id }]);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Mutation primitives (shared with the interpreter, never emit)
    // -----------------------------------------------------------------------

    pub(crate) fn send(&mut self, commands: Vec<Command>) {
        if self.local && !commands.is_empty() {
            self.outbox.push(Outgoing {
                commands,
                logged: true,
            });
        }
    }

    pub(crate) fn counts(&self) -> Command {
        Command::Update {
            library: self.library.len(),
            hand: self.hand.len(),
        }
    }

    pub(crate) fn apply_life(&mut self, life: i32) {
        self.life = life;
        self.observer.life_updated(&self.id, life);
    }

    pub(crate) fn put_tray(
        &mut self,
        item_id: Option<ItemId>,
        x: f64,
        y: f64,
        color: Option<(f32, f32, f32)>,
    ) -> Result<ItemId, PlayerError> {
        let old = self.tray.as_ref().map(|tray| tray.item_id);
        if let Some(id) = item_id {
            if self.items.contains(id) && old != Some(id) {
                return Err(PlayerError::ItemIdTaken(id));
            }
        } else if old.is_none() && self.items.is_full() {
            return Err(PlayerError::ItemIdsExhausted);
        }

        if let Some(old) = old {
            self.items.release(old);
        }
        let id = match item_id {
            Some(id) => {
                self.items.register(id, ItemKind::Tray)?;
                id
            }
            None => self.items.allocate(ItemKind::Tray, &mut self.rng)?,
        };
        let color = color.or_else(|| self.tray.as_ref().and_then(|tray| tray.color));
        self.tray = Some(Tray { item_id: id, x, y, color });
        self.observer.tray_changed(&self.id, self.tray.as_ref());
        Ok(id)
    }

    pub(crate) fn drop_tray(&mut self) -> Option<Tray> {
        self.clear_battlefield();
        let tray = self.tray.take()?;
        self.items.release(tray.item_id);
        self.observer.tray_changed(&self.id, None);
        Some(tray)
    }

    pub(crate) fn clear_battlefield(&mut self) {
        for item in std::mem::take(&mut self.battlefield) {
            self.observer.item_removed(&self.id, item.item_id);
        }
        self.items.clear_cards();
    }

    /// Empties every zone and restores default life. Keeps the tray.
    pub(crate) fn clear_table(&mut self) {
        self.library.clear();
        self.hand.clear();
        self.graveyard.clear();
        self.exile.clear();
        self.clear_battlefield();
        for zone in Zone::PILES {
            self.notify_zone(zone);
        }
        self.apply_life(self.config.default_life);
    }

    pub(crate) fn insert_item(
        &mut self,
        card: CardRef,
        item_id: Option<ItemId>,
        x: f64,
        y: f64,
    ) -> Result<ItemId, PlayerError> {
        if self.tray.is_none() {
            return Err(PlayerError::NoTray);
        }
        let id = match item_id {
            Some(id) => {
                self.items.register(id, ItemKind::Card)?;
                id
            }
            None => self.items.allocate(ItemKind::Card, &mut self.rng)?,
        };
        let item = BattlefieldItem::new(id, card, x, y);
        self.observer.item_entered(&self.id, &item);
        self.battlefield.push(item);
        Ok(id)
    }

    pub(crate) fn take_item(&mut self, id: ItemId) -> Result<BattlefieldItem, PlayerError> {
        let index = self
            .battlefield
            .iter()
            .position(|item| item.item_id == id)
            .ok_or(PlayerError::UnknownItem(id))?;
        let item = self.battlefield.remove(index);
        self.items.release(id);
        self.observer.item_removed(&self.id, id);
        Ok(item)
    }

    pub(crate) fn update_item(
        &mut self,
        id: ItemId,
        f: impl FnOnce(&mut BattlefieldItem),
    ) -> Result<(), PlayerError> {
        let item = self
            .battlefield
            .iter_mut()
            .find(|item| item.item_id == id)
            .ok_or(PlayerError::UnknownItem(id))?;
        f(item);
        self.observer.item_changed(&self.id, item);
        Ok(())
    }

    pub(crate) fn apply_move(&mut self, id: ItemId, x: f64, y: f64) -> Result<(), PlayerError> {
        self.update_item(id, |item| {
            item.x = x;
            item.y = y;
        })
    }

    pub(crate) fn apply_counters(
        &mut self,
        id: ItemId,
        count: i32,
        kind: &str,
    ) -> Result<(), PlayerError> {
        self.update_item(id, |item| item.set_counter(kind, count))
    }

    pub(crate) fn notify_zone(&self, zone: Zone) {
        self.observer.zone_updated(&self.id, zone);
    }

    /// Resolves a card id through the catalog, falling back to the id.
    pub(crate) fn resolve_card(&self, id: &str) -> Card {
        self.catalog
            .card(id)
            .unwrap_or_else(|| Card::new(id, id))
    }

    /// Resolves what an `enter` refers to: a known token, else a card.
    pub(crate) fn resolve_item(&self, id: &str, name: &str) -> CardRef {
        if let Some(token) = self.catalog.token(id) {
            return CardRef::Token(token);
        }
        let card = self
            .catalog
            .card(id)
            .unwrap_or_else(|| Card::new(id, name));
        CardRef::Card(card)
    }

    // -----------------------------------------------------------------------
    // Pile helpers
    // -----------------------------------------------------------------------

    pub(crate) fn pile_len(&self, zone: Zone) -> usize {
        match zone {
            Zone::Library => self.library.len(),
            Zone::Hand => self.hand.len(),
            Zone::Graveyard => self.graveyard.len(),
            Zone::Exile => self.exile.len(),
            Zone::Battlefield => self.battlefield.len(),
        }
    }

    fn peek(&self, zone: Zone, index: usize) -> Option<&Card> {
        match zone {
            Zone::Library => self.library.get(index)?.as_ref(),
            Zone::Hand => self.hand.get(index)?.as_ref(),
            Zone::Graveyard => self.graveyard.get(index),
            Zone::Exile => self.exile.get(index),
            Zone::Battlefield => None,
        }
    }

    fn take_from_pile(&mut self, zone: Zone, index: usize) -> Option<Card> {
        match zone {
            Zone::Library => self.library.remove(index),
            Zone::Hand => self.hand.remove(index),
            Zone::Graveyard => Some(self.graveyard.remove(index)),
            Zone::Exile => Some(self.exile.remove(index)),
            Zone::Battlefield => None,
        }
    }

    fn push_to_pile(&mut self, zone: Zone, card: Option<Card>) {
        match (zone, card) {
            (Zone::Library, card) => self.library.push(card),
            (Zone::Hand, card) => self.hand.push(card),
            (Zone::Graveyard, Some(card)) => self.graveyard.push(card),
            (Zone::Exile, Some(card)) => self.exile.push(card),
            _ => return,
        }
        self.notify_zone(zone);
    }

    fn bury_command(&self, zone: Zone, card: Option<&Card>) -> Option<Command> {
        let card = card?.id.clone();
        match zone {
            Zone::Graveyard => Some(Command::Bury { card }),
            Zone::Exile => Some(Command::Exile { card }),
            _ => None,
        }
    }
}

/// Whether a move changes a count peers track by `update`.
fn touches_counts(origin: Option<Zone>, target: Option<Zone>) -> bool {
    [origin, target]
        .into_iter()
        .flatten()
        .any(|zone| matches!(zone, Zone::Library | Zone::Hand | Zone::Exile))
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Player {
        Player::local(PlayerId::from("alice"), TableConfig::default()).with_seed(1)
    }

    /// Alice with a tray down and nothing queued.
    fn seated() -> Player {
        let mut player = alice();
        player.create_tray(None, None).unwrap();
        player.take_outbox();
        player
    }

    fn deck(size: usize) -> Deck {
        Deck {
            name: "d".into(),
            cards: (0..size).map(|i| Card::new(format!("c{i}"), "Card")).collect(),
        }
    }

    #[test]
    fn test_replica_actions_queue_nothing() {
        let mut replica = Player::replica(PlayerId::from("bob"), TableConfig::default());
        replica.set_life(3);
        replica.create_tray(None, None).unwrap();
        assert!(replica.take_outbox().is_empty());
        assert_eq!(replica.life(), 3);
    }

    #[test]
    fn test_create_tray_twice_frees_old_id() {
        let mut player = alice();
        let first = player.create_tray(None, None).unwrap();
        let second = player.create_tray(None, None).unwrap();

        assert_eq!(player.tray().map(|t| t.item_id), Some(second));
        assert_eq!(player.items().len(), 1);
        if first != second {
            assert!(!player.items().contains(first));
        }
    }

    #[test]
    fn test_create_tray_keeps_color_on_replacement() {
        let mut player = alice();
        player.create_tray(None, Some((0.8, 0.8, 1.0))).unwrap();
        player.create_tray(None, None).unwrap();
        assert_eq!(player.tray().and_then(|t| t.color), Some((0.8, 0.8, 1.0)));
    }

    #[test]
    fn test_reset_with_deck_emits_reset_then_update() {
        let mut player = alice();
        player.load_deck(deck(5));

        let out = player.take_outbox();
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0].commands,
            vec![Command::Reset, Command::Update { library: 5, hand: 0 }]
        );
        assert!(out[0].logged);
    }

    #[test]
    fn test_unload_deck_empties_library() {
        let mut player = alice();
        player.load_deck(deck(5));
        player.unload_deck();
        assert!(player.library().is_empty());
        assert!(player.deck().is_none());
    }

    #[test]
    fn test_draw_cards_stops_at_empty_library() {
        let mut player = alice();
        player.load_deck(deck(3));
        player.draw_cards(10).unwrap();
        assert_eq!(player.hand().len(), 3);
        assert!(player.library().is_empty());
        player.draw_card().unwrap();
        assert_eq!(player.hand().len(), 3);
    }

    #[test]
    fn test_draw_card_takes_from_top() {
        let mut player = alice();
        player.load_deck(deck(3));
        let top = player.library().last().cloned().flatten();
        player.draw_card().unwrap();
        assert_eq!(player.hand()[0], top);
    }

    #[test]
    fn test_library_top_to_bottom_is_local_only() {
        let mut player = alice();
        player.load_deck(deck(3));
        player.take_outbox();
        let top = player.library().last().cloned();

        player.library_top_to_bottom();

        assert_eq!(player.library().first().cloned(), top);
        assert!(player.take_outbox().is_empty());
    }

    #[test]
    fn test_external_card_to_graveyard_emits_bury_only() {
        let mut player = alice();
        player
            .move_card(
                Source::External(Card::new("x1", "X").into()),
                Some(Zone::Graveyard),
                None,
            )
            .unwrap();
        let out = player.take_outbox();
        assert_eq!(out[0].commands, vec![Command::Bury { card: "x1".into() }]);
    }

    #[test]
    fn test_external_token_to_pile_is_rejected() {
        let mut player = alice();
        let token = CardRef::Token(crate::Token {
            id: "t".into(),
            description: "1/1".into(),
        });
        assert!(matches!(
            player.move_card(Source::External(token), Some(Zone::Hand), None),
            Err(PlayerError::InvalidMove(_))
        ));
    }

    #[test]
    fn test_hand_to_battlefield_emits_enter_then_update() {
        let mut player = seated();
        player.load_deck(deck(3));
        player.draw_card().unwrap();
        player.take_outbox();

        player
            .move_card(Source::Pile(Zone::Hand, 0), Some(Zone::Battlefield), Some((1.0, 2.0)))
            .unwrap();

        let out = player.take_outbox();
        assert_eq!(out.len(), 2);
        assert!(matches!(out[0].commands[0], Command::Enter { x, y, .. } if x == 1.0 && y == 2.0));
        assert_eq!(out[1].commands, vec![Command::Update { library: 2, hand: 0 }]);
    }

    #[test]
    fn test_draw_then_discard_emits_counts_and_bury() {
        let mut player = alice();
        let (a, b, c) = (Card::new("A", "A"), Card::new("B", "B"), Card::new("C", "C"));
        player.library = vec![Some(a), Some(b), Some(c.clone())];

        player.draw_card().unwrap();
        assert_eq!(player.hand(), &[Some(c.clone())]);
        assert_eq!(player.library().len(), 2);

        player.discard(0).unwrap();
        assert!(player.hand().is_empty());
        assert_eq!(player.graveyard(), &[c]);

        let out: Vec<Vec<Command>> =
            player.take_outbox().into_iter().map(|batch| batch.commands).collect();
        assert_eq!(
            out,
            vec![
                vec![Command::Update { library: 2, hand: 1 }],
                vec![
                    Command::Bury { card: "C".into() },
                    Command::Update { library: 2, hand: 0 },
                ],
            ]
        );
    }

    #[test]
    fn test_set_counters_zero_removes_kind() {
        let mut player = seated();
        let id = player
            .create_card_item(Card::new("pw", "Planeswalker").into(), None, 0.0, 0.0)
            .unwrap();
        player.set_counters(id, 3, "loyalty").unwrap();
        player.take_outbox();

        player.set_counters(id, 0, "loyalty").unwrap();

        assert!(!player.item(id).unwrap().counters.contains_key("loyalty"));
        let out = player.take_outbox();
        assert_eq!(
            out[0].commands,
            vec![Command::Counters { count: 0, kind: "loyalty".into(), item: id }]
        );
    }

    #[test]
    fn test_create_card_item_without_tray_returns_no_tray() {
        let mut player = alice();
        assert!(matches!(
            player.create_card_item(Card::new("x", "X").into(), None, 0.0, 0.0),
            Err(PlayerError::NoTray)
        ));
        assert!(player.battlefield().is_empty());
        assert!(player.items().is_empty());
        assert!(player.take_outbox().is_empty());
    }

    #[test]
    fn test_hand_to_battlefield_without_tray_keeps_card() {
        let mut player = alice();
        player.load_deck(deck(3));
        player.draw_card().unwrap();
        player.take_outbox();

        assert!(matches!(
            player.move_card(Source::Pile(Zone::Hand, 0), Some(Zone::Battlefield), Some((0.0, 0.0))),
            Err(PlayerError::NoTray)
        ));
        assert_eq!(player.hand().len(), 1);
        assert!(player.battlefield().is_empty());
        assert!(player.take_outbox().is_empty());
    }

    #[test]
    fn test_remove_tray_clears_battlefield() {
        let mut player = seated();
        player
            .create_card_item(Card::new("x", "X").into(), None, 0.0, 0.0)
            .unwrap();
        player.remove_tray();
        assert!(player.battlefield().is_empty());
        assert!(player.items().is_empty());
    }

    #[test]
    fn test_discard_random_on_empty_hand_is_noop() {
        let mut player = alice();
        player.discard_random().unwrap();
        assert!(player.take_outbox().is_empty());
    }

    #[test]
    fn test_debug_does_not_dump_cards() {
        let player = alice();
        let text = format!("{player:?}");
        assert!(text.starts_with("Player"));
        assert!(text.contains("alice"));
    }
}
