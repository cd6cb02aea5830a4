//! Item-id registry.
//!
//! Every tray and battlefield item a player owns has a 16-bit id, unique
//! among that player's items. Local items get a random free id; replicas
//! register whatever id the owner announced.

use std::collections::HashMap;

use cardtable_protocol::ItemId;
use rand::Rng;

use crate::PlayerError;

/// What an item id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Tray,
    Card,
}

/// Tracks which item ids a player has handed out.
#[derive(Debug, Clone)]
pub struct ItemRegistry {
    items: HashMap<ItemId, ItemKind>,
    max_id: u16,
}

impl ItemRegistry {
    /// Creates an empty registry handing out ids in `0..=max_id`.
    pub fn new(max_id: u16) -> Self {
        Self {
            items: HashMap::new(),
            max_id,
        }
    }

    /// Picks a random unused id and registers it.
    ///
    /// Draws are retried until one is free.
    pub fn allocate<R: Rng>(
        &mut self,
        kind: ItemKind,
        rng: &mut R,
    ) -> Result<ItemId, PlayerError> {
        if self.is_full() {
            return Err(PlayerError::ItemIdsExhausted);
        }
        loop {
            let id = ItemId(rng.random_range(0..=self.max_id));
            if !self.items.contains_key(&id) {
                self.items.insert(id, kind);
                return Ok(id);
            }
        }
    }

    /// Registers an id chosen elsewhere.
    ///
    /// # Errors
    /// [`PlayerError::ItemIdTaken`] if the id is already in use.
    pub fn register(&mut self, id: ItemId, kind: ItemKind) -> Result<(), PlayerError> {
        if self.items.contains_key(&id) {
            return Err(PlayerError::ItemIdTaken(id));
        }
        self.items.insert(id, kind);
        Ok(())
    }

    /// Frees an id. Freeing an unknown id does nothing.
    pub fn release(&mut self, id: ItemId) {
        self.items.remove(&id);
    }

    pub fn kind(&self, id: ItemId) -> Option<ItemKind> {
        self.items.get(&id).copied()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns `true` when every id in range is taken.
    pub fn is_full(&self) -> bool {
        self.items.len() > usize::from(self.max_id)
    }

    pub(crate) fn clear_cards(&mut self) {
        self.items.retain(|_, kind| *kind == ItemKind::Tray);
    }
}
