//! Deck is a titled set of cards
use super::Card;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_review: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl Deck {
    /// Creates a fresh deck. The title is trimmed and card statistics start from zero.
    pub fn new(title: &str, cards: Vec<Card>) -> Self {
        let cards = cards
            .into_iter()
            .map(|mut card| {
                card.reset_stats();
                card
            })
            .collect();

        Self {
            id: Uuid::new_v4(),
            title: title.trim().to_string(),
            created_at: Utc::now(),
            last_review: None,
            cards,
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new("My Deck", Vec::new())
    }
}
