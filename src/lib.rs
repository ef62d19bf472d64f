pub mod config;
pub mod database;
pub mod export;
pub mod models;
pub mod scheduler;

pub use database::{DeckStore, MemoryStore, SqliteStore, StoreError};
pub use models::{Card, CardStatus, Deck, DeckSet, Progress};
pub use scheduler::{GradeOutcome, SessionScheduler, StudyError};
