//! Card lookup.
//!
//! The wire only carries card ids. A [`CardCatalog`] turns those ids back
//! into cards and tokens when a replica applies `bury`, `exile`, or
//! `enter`. The card database itself lives outside this crate.

use std::collections::HashMap;

use crate::{Card, Token};

/// Resolves card and token ids.
pub trait CardCatalog: Send + Sync {
    /// Looks up a card by id.
    fn card(&self, id: &str) -> Option<Card>;

    /// Looks up a token by id.
    fn token(&self, _id: &str) -> Option<Token> {
        None
    }
}

/// A catalog that knows nothing. Unknown ids become cards named by their id.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyCatalog;

impl CardCatalog for EmptyCatalog {
    fn card(&self, _id: &str) -> Option<Card> {
        None
    }
}

/// An in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    cards: HashMap<String, Card>,
    tokens: HashMap<String, Token>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_card(&mut self, card: Card) {
        self.cards.insert(card.id.clone(), card);
    }

    pub fn insert_token(&mut self, token: Token) {
        self.tokens.insert(token.id.clone(), token);
    }
}

impl CardCatalog for MemoryCatalog {
    fn card(&self, id: &str) -> Option<Card> {
        self.cards.get(id).cloned()
    }

    fn token(&self, id: &str) -> Option<Token> {
        self.tokens.get(id).cloned()
    }
}
