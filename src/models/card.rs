//! Card is a pair <question, answer> plus the statistics gathered while studying it
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    #[default]
    New,
    Seen,
}

impl CardStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CardStatus::New => "new",
            CardStatus::Seen => "seen",
        }
    }

    /// Unknown values fall back to `New`.
    pub fn parse(value: &str) -> Self {
        match value {
            "seen" => CardStatus::Seen,
            _ => CardStatus::New,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    #[serde(alias = "front")]
    pub question: String,
    #[serde(alias = "back")]
    pub answer: String,
    #[serde(default)]
    pub status: CardStatus,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub correct_attempts: u32,
}

impl Card {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            status: CardStatus::New,
            attempts: 0,
            correct_attempts: 0,
        }
    }

    /// Records one grading event. Keeps `correct_attempts <= attempts`.
    pub fn record_grade(&mut self, is_correct: bool) {
        self.attempts += 1;
        if is_correct {
            self.correct_attempts += 1;
        }
        self.status = CardStatus::Seen;
    }

    /// False when the card claims more correct answers than attempts.
    pub fn has_valid_stats(&self) -> bool {
        self.correct_attempts <= self.attempts
    }

    /// Clears the statistics, used when a deck is created from raw cards.
    pub fn reset_stats(&mut self) {
        self.status = CardStatus::New;
        self.attempts = 0;
        self.correct_attempts = 0;
    }
}
