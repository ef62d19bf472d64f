//! In-memory deck store.

use super::{DeckStore, StoreError, StoreResult};
use crate::models::{Card, Deck};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    decks: Mutex<HashMap<Uuid, Deck>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Deck>> {
        // Poisoning is ignored; every write replaces whole values.
        self.decks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, deck: Deck) {
        self.lock().insert(deck.id, deck);
    }

    pub fn remove(&self, id: Uuid) -> Option<Deck> {
        self.lock().remove(&id)
    }

    pub fn get(&self, id: Uuid) -> Option<Deck> {
        self.lock().get(&id).cloned()
    }
}

impl DeckStore for MemoryStore {
    fn load_deck(&self, id: Uuid) -> StoreResult<Option<Deck>> {
        Ok(self.get(id))
    }

    fn save_cards(&self, id: Uuid, cards: &[Card]) -> StoreResult<()> {
        let mut decks = self.lock();
        let deck = decks.get_mut(&id).ok_or(StoreError::DeckNotFound(id))?;
        deck.cards = cards.to_vec();
        deck.last_review = Some(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_and_save() {
        let store = MemoryStore::new();
        let deck = Deck::new("Capitals", vec![Card::new("France", "Paris")]);
        store.insert(deck.clone());

        let mut cards = deck.cards.clone();
        cards[0].record_grade(true);
        store.save_cards(deck.id, &cards).unwrap();

        let loaded = store.load_deck(deck.id).unwrap().unwrap();
        assert_eq!(loaded.cards[0].attempts, 1);
        assert!(loaded.last_review.is_some());
    }

    #[test]
    fn test_save_to_removed_deck_fails() {
        let store = MemoryStore::new();
        let deck = Deck::new("Capitals", vec![Card::new("France", "Paris")]);
        store.insert(deck.clone());
        store.remove(deck.id);

        let result = store.save_cards(deck.id, &deck.cards);
        assert!(matches!(result, Err(StoreError::DeckNotFound(id)) if id == deck.id));
    }
}
