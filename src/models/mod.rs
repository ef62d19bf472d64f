pub mod card;
pub mod deck;
pub mod deck_set;
pub mod progress;

pub use card::{Card, CardStatus};
pub use deck::Deck;
pub use deck_set::DeckSet;
pub use progress::Progress;
