//! Container for all available decks
use super::Deck;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct DeckSet {
    pub decks: Vec<Deck>,
}

impl DeckSet {
    pub fn find(&self, id: Uuid) -> Option<&Deck> {
        self.decks.iter().find(|d| d.id == id)
    }

    /// Replaces the deck with the same id, or appends it.
    pub fn upsert(&mut self, deck: Deck) {
        match self.decks.iter_mut().find(|d| d.id == deck.id) {
            Some(existing) => *existing = deck,
            None => self.decks.push(deck),
        }
    }

    pub fn remove(&mut self, id: Uuid) {
        self.decks.retain(|d| d.id != id);
    }

    /// Returns `title` (trimmed) if no deck uses it yet, otherwise the first free
    /// `"<title> (1)"`, `"<title> (2)"`, ...
    pub fn unique_title(&self, title: &str) -> String {
        let base = title.trim();
        let taken = |candidate: &str| self.decks.iter().any(|d| d.title == candidate);
        if !taken(base) {
            return base.to_string();
        }
        (1..)
            .map(|counter| format!("{} ({})", base, counter))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| base.to_string())
    }
}
