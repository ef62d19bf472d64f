//! SQLite backed deck store
//!
//! Handles database initialization and CRUD operations for decks and their cards.
//! Cards are keyed by `(deck_id, position)`, so reading them back ordered by position
//! restores creation order.

use super::{DeckStore, StoreError, StoreResult};
use crate::models::{Card, CardStatus, Deck, DeckSet};
use chrono::{DateTime, Utc};
use log::{debug, info};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use uuid::Uuid;

pub struct SqliteStore {
    conn: Connection,
}

fn to_millis(time: DateTime<Utc>) -> i64 {
    time.timestamp_millis()
}

fn from_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

fn parse_id(raw: String) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

impl SqliteStore {
    /// Opens (or creates) the database file and makes sure the schema exists
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        info!("Opening deck database at {}", path.display());
        let store = Self {
            conn: Connection::open(path)?,
        };
        store.init()?;
        Ok(store)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init()?;
        Ok(store)
    }

    /// Creates tables for decks and cards
    fn init(&self) -> StoreResult<()> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS decks (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                last_review INTEGER
            );
            CREATE TABLE IF NOT EXISTS cards (
                deck_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                question TEXT NOT NULL,
                answer TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'new',
                attempts INTEGER NOT NULL DEFAULT 0,
                correct_attempts INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (deck_id, position),
                FOREIGN KEY (deck_id) REFERENCES decks(id) ON DELETE CASCADE
            );",
        )?;
        Ok(())
    }

    /// Creates a new deck from raw cards and stores it
    pub fn create_deck(&self, title: &str, cards: Vec<Card>) -> StoreResult<Deck> {
        let deck = Deck::new(title, cards);
        self.save_deck(&deck)?;
        info!("Deck '{}' created with {} cards", deck.title, deck.len());
        Ok(deck)
    }

    /// Creates the deck only when the database holds no decks yet.
    /// Returns `None` if there was something stored already.
    pub fn create_deck_if_empty(&self, title: &str, cards: Vec<Card>) -> StoreResult<Option<Deck>> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM decks", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(None);
        }
        self.create_deck(title, cards).map(Some)
    }

    /// Inserts the deck or overwrites the stored copy with the same id
    pub fn save_deck(&self, deck: &Deck) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO decks (id, title, created_at, last_review) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                created_at = excluded.created_at,
                last_review = excluded.last_review",
            params![
                deck.id.to_string(),
                deck.title,
                to_millis(deck.created_at),
                deck.last_review.map(to_millis),
            ],
        )?;
        Self::replace_cards(&tx, deck.id, &deck.cards)?;
        tx.commit()?;
        Ok(())
    }

    /// Appends a card at the end of a deck
    pub fn add_card(&self, deck_id: Uuid, question: &str, answer: &str) -> StoreResult<Card> {
        if !self.deck_exists(deck_id)? {
            return Err(StoreError::DeckNotFound(deck_id));
        }

        let next_position: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM cards WHERE deck_id = ?1",
            params![deck_id.to_string()],
            |row| row.get(0),
        )?;

        let card = Card::new(question, answer);
        self.conn.execute(
            "INSERT INTO cards (deck_id, position, question, answer, status, attempts, correct_attempts)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, 0)",
            params![
                deck_id.to_string(),
                next_position,
                card.question,
                card.answer,
                card.status.as_str()
            ],
        )?;

        Ok(card)
    }

    /// Retrieves the cards of a deck in creation order
    pub fn get_cards(&self, deck_id: Uuid) -> StoreResult<Vec<Card>> {
        let mut stmt = self.conn.prepare(
            "SELECT question, answer, status, attempts, correct_attempts
             FROM cards WHERE deck_id = ?1 ORDER BY position ASC",
        )?;

        let cards = stmt
            .query_map(params![deck_id.to_string()], |row| {
                Ok(Card {
                    question: row.get(0)?,
                    answer: row.get(1)?,
                    status: CardStatus::parse(&row.get::<_, String>(2)?),
                    attempts: row.get(3)?,
                    correct_attempts: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<Card>>>()?;

        Ok(cards)
    }

    pub fn get_deck(&self, id: Uuid) -> StoreResult<Option<Deck>> {
        let header = self
            .conn
            .query_row(
                "SELECT title, created_at, last_review FROM decks WHERE id = ?1",
                params![id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, Option<i64>>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((title, created_at, last_review)) = header else {
            return Ok(None);
        };

        Ok(Some(Deck {
            id,
            title,
            created_at: from_millis(created_at),
            last_review: last_review.map(from_millis),
            cards: self.get_cards(id)?,
        }))
    }

    /// Loads all decks with their cards into memory, oldest first
    pub fn list_decks(&self) -> StoreResult<DeckSet> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM decks ORDER BY created_at ASC, rowid ASC")?;
        let ids = stmt
            .query_map([], |row| parse_id(row.get(0)?))?
            .collect::<rusqlite::Result<Vec<Uuid>>>()?;

        let mut decks = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(deck) = self.get_deck(id)? {
                decks.push(deck);
            }
        }

        debug!("Loaded {} decks", decks.len());
        Ok(DeckSet { decks })
    }

    /// Deletes a deck and its cards. Deleting an unknown id is not an error.
    pub fn delete_deck(&self, id: Uuid) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM cards WHERE deck_id = ?1", params![id.to_string()])?;
        tx.execute("DELETE FROM decks WHERE id = ?1", params![id.to_string()])?;
        tx.commit()?;
        info!("Deck {} deleted", id);
        Ok(())
    }

    fn deck_exists(&self, id: Uuid) -> StoreResult<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM decks WHERE id = ?1",
                params![id.to_string()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn replace_cards(conn: &Connection, deck_id: Uuid, cards: &[Card]) -> StoreResult<()> {
        conn.execute(
            "DELETE FROM cards WHERE deck_id = ?1",
            params![deck_id.to_string()],
        )?;

        let mut stmt = conn.prepare(
            "INSERT INTO cards (deck_id, position, question, answer, status, attempts, correct_attempts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for (position, card) in cards.iter().enumerate() {
            stmt.execute(params![
                deck_id.to_string(),
                position as i64,
                card.question,
                card.answer,
                card.status.as_str(),
                card.attempts,
                card.correct_attempts,
            ])?;
        }
        Ok(())
    }
}

impl DeckStore for SqliteStore {
    fn load_deck(&self, id: Uuid) -> StoreResult<Option<Deck>> {
        self.get_deck(id)
    }

    fn save_cards(&self, id: Uuid, cards: &[Card]) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        let updated = tx.execute(
            "UPDATE decks SET last_review = ?1 WHERE id = ?2",
            params![to_millis(Utc::now()), id.to_string()],
        )?;
        if updated == 0 {
            return Err(StoreError::DeckNotFound(id));
        }
        Self::replace_cards(&tx, id, cards)?;
        tx.commit()?;
        debug!("Saved statistics of {} cards for deck {}", cards.len(), id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_cards() -> Vec<Card> {
        vec![
            Card::new("cześć", "hello"),
            Card::new("dziękuję", "thank you"),
            Card::new("proszę", "please"),
        ]
    }

    #[test]
    fn test_create_and_get_deck() {
        let store = SqliteStore::open_in_memory().unwrap();
        let deck = store.create_deck("Polish Vocabulary", sample_cards()).unwrap();

        let loaded = store.get_deck(deck.id).unwrap().unwrap();
        assert_eq!(loaded.title, "Polish Vocabulary");
        assert_eq!(loaded.cards, deck.cards);
        assert_eq!(loaded.created_at.timestamp_millis(), deck.created_at.timestamp_millis());
        assert!(loaded.last_review.is_none());
    }

    #[test]
    fn test_create_deck_if_empty_only_seeds_once() {
        let store = SqliteStore::open_in_memory().unwrap();

        let seeded = store.create_deck_if_empty("Polish Vocabulary", sample_cards()).unwrap();
        assert!(seeded.is_some());

        let again = store.create_deck_if_empty("Polish Vocabulary", sample_cards()).unwrap();
        assert!(again.is_none());
        assert_eq!(store.list_decks().unwrap().decks.len(), 1);
    }

    #[test]
    fn test_create_deck_if_empty_reports_failure() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.conn.execute_batch("DROP TABLE cards;").unwrap();

        let result = store.create_deck_if_empty("Polish Vocabulary", sample_cards());
        assert!(matches!(result, Err(StoreError::Sqlite(_))));
    }

    #[test]
    fn test_missing_deck_is_none() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.load_deck(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_cards_keep_creation_order() {
        let store = SqliteStore::open_in_memory().unwrap();
        let deck = store.create_deck("Order", Vec::new()).unwrap();
        store.add_card(deck.id, "one", "1").unwrap();
        store.add_card(deck.id, "two", "2").unwrap();
        store.add_card(deck.id, "three", "3").unwrap();

        let questions: Vec<String> = store
            .get_cards(deck.id)
            .unwrap()
            .into_iter()
            .map(|c| c.question)
            .collect();
        assert_eq!(questions, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_add_card_to_unknown_deck_fails() {
        let store = SqliteStore::open_in_memory().unwrap();
        let result = store.add_card(Uuid::new_v4(), "q", "a");
        assert!(matches!(result, Err(StoreError::DeckNotFound(_))));
    }

    #[test]
    fn test_save_cards_updates_statistics() {
        let store = SqliteStore::open_in_memory().unwrap();
        let deck = store.create_deck("Stats", sample_cards()).unwrap();

        let mut cards = deck.cards.clone();
        cards[1].record_grade(true);
        cards[1].record_grade(false);
        store.save_cards(deck.id, &cards).unwrap();

        let loaded = store.get_deck(deck.id).unwrap().unwrap();
        assert_eq!(loaded.cards[1].attempts, 2);
        assert_eq!(loaded.cards[1].correct_attempts, 1);
        assert_eq!(loaded.cards[1].status, CardStatus::Seen);
        assert_eq!(loaded.cards[0].attempts, 0);
        assert!(loaded.last_review.is_some());
    }

    #[test]
    fn test_save_cards_for_unknown_deck_fails() {
        let store = SqliteStore::open_in_memory().unwrap();
        let result = store.save_cards(Uuid::new_v4(), &sample_cards());
        assert!(matches!(result, Err(StoreError::DeckNotFound(_))));
    }

    #[test]
    fn test_save_deck_overwrites_existing() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut deck = store.create_deck("Before", sample_cards()).unwrap();

        deck.title = "After".to_string();
        deck.cards.truncate(1);
        store.save_deck(&deck).unwrap();

        let set = store.list_decks().unwrap();
        assert_eq!(set.decks.len(), 1);
        assert_eq!(set.decks[0].title, "After");
        assert_eq!(set.decks[0].cards.len(), 1);
    }

    #[test]
    fn test_delete_deck() {
        let store = SqliteStore::open_in_memory().unwrap();
        let keep = store.create_deck("Keep", sample_cards()).unwrap();
        let removed = store.create_deck("Drop", sample_cards()).unwrap();

        store.delete_deck(removed.id).unwrap();

        let set = store.list_decks().unwrap();
        assert_eq!(set.decks.len(), 1);
        assert_eq!(set.decks[0].id, keep.id);
        assert!(store.get_cards(removed.id).unwrap().is_empty());
    }

    #[test]
    fn test_open_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decks.sqlite3");

        let id = {
            let store = SqliteStore::open(&path).unwrap();
            store.create_deck("Persisted", sample_cards()).unwrap().id
        };

        let reopened = SqliteStore::open(&path).unwrap();
        let deck = reopened.get_deck(id).unwrap().unwrap();
        assert_eq!(deck.cards.len(), 3);
    }
}
