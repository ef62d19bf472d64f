//! Persistence for decks.
//!
//! The scheduler only needs to resolve a deck by id and to write card statistics back,
//! which is what [`DeckStore`] captures. [`SqliteStore`] is the durable backend used by the
//! app, [`MemoryStore`] keeps everything in a map.

pub mod db;
pub mod memory;

use crate::models::{Card, Deck};
use thiserror::Error;
use uuid::Uuid;

pub use db::SqliteStore;
pub use memory::MemoryStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Deck not found: {0}")]
    DeckNotFound(Uuid),

    #[error("No valid cards were generated")]
    NoCardsGenerated,

    #[error("Card '{question}' has {correct} correct answers out of {attempts} attempts")]
    InvalidCard {
        question: String,
        attempts: u32,
        correct: u32,
    },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

pub trait DeckStore {
    /// Returns `Ok(None)` when no deck has this id.
    fn load_deck(&self, id: Uuid) -> StoreResult<Option<Deck>>;

    /// Replaces the stored cards of a deck and stamps its last review time.
    fn save_cards(&self, id: Uuid, cards: &[Card]) -> StoreResult<()>;
}

impl<S: DeckStore + ?Sized> DeckStore for &S {
    fn load_deck(&self, id: Uuid) -> StoreResult<Option<Deck>> {
        (**self).load_deck(id)
    }

    fn save_cards(&self, id: Uuid, cards: &[Card]) -> StoreResult<()> {
        (**self).save_cards(id, cards)
    }
}
